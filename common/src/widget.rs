//! The recording widget state machine.
//!
//! Every browser callback becomes one method call here. The widget updates
//! its own state and answers with the [`Effect`]s the host has to carry out;
//! it never touches the platform itself. Completions of asynchronous work
//! carry the [`SessionId`] they were started for, and anything reported for a
//! session that is no longer current is dropped.

use serde::{Deserialize, Serialize};

use crate::blob_store::{BlobStore, MediaChunk};
use crate::capture::CaptureConstraints;
use crate::config::WidgetConfig;
use crate::error::WidgetError;
use crate::render::{render, ControlsView, LabelText, RecordButton};
use crate::timer::{Countdown, Tick, TimerLabel, TICK_INTERVAL_MS};
use crate::upload::{artifact_filename, check_status, UploadRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(pub u64);

impl SessionId {
    fn next(self) -> Self {
        SessionId(self.0 + 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Idle,
    /// Waiting for the user to grant camera and microphone access
    Requesting,
    Recording,
    /// Recorder asked to stop, waiting for its final chunk
    Stopping,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    User,
    TimeLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum UploadState {
    #[default]
    None,
    InFlight,
    /// Succeeded. Controls stay locked; there is no way back.
    Done,
}

#[derive(Debug)]
pub enum Effect<C> {
    /// Replace the element's markup and rebind its controls
    Render(String),
    /// Push button states and label texts to the current controls
    SyncControls(ControlsView),
    RequestCapture {
        session: SessionId,
        constraints: CaptureConstraints,
    },
    /// Attach the granted stream to the preview and start recording it
    StartRecorder { session: SessionId },
    StopRecorder { session: SessionId },
    /// Stop every track of the session's capture stream
    ReleaseCapture { session: SessionId },
    StartTimer { session: SessionId, interval_ms: u32 },
    CancelTimer { session: SessionId },
    Upload(UploadRequest<C>),
    Download { artifact: C, filename: String },
    Play { chunks: Vec<C> },
    /// Detach any stream or recording from the preview element
    ClearPreview,
}

pub struct RecordingWidget<C> {
    id: String,
    config: WidgetConfig,
    phase: Phase,
    session: SessionId,
    countdown: Option<Countdown>,
    store: BlobStore<C>,
    label: LabelText,
    timer_label: Option<TimerLabel>,
    upload: UploadState,
    mounted: bool,
}

impl<C: MediaChunk> RecordingWidget<C> {
    pub fn new(id: impl Into<String>, config: WidgetConfig) -> Self {
        let timer_label = idle_timer_label(&config);
        Self {
            id: id.into(),
            config,
            phase: Phase::Idle,
            session: SessionId(0),
            countdown: None,
            store: BlobStore::new(),
            label: LabelText::Configured,
            timer_label,
            upload: UploadState::None,
            mounted: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn store(&self) -> &BlobStore<C> {
        &self.store
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn countdown(&self) -> Option<&Countdown> {
        self.countdown.as_ref()
    }

    /// Markup for the label span in its current state
    pub fn label_markup(&self) -> String {
        self.label.markup(&self.config.label)
    }

    pub fn controls(&self) -> ControlsView {
        let locked = matches!(self.upload, UploadState::InFlight | UploadState::Done);
        let has_recording = self.store.recording().map_or(false, |r| r.size() > 0);

        let (record_button, record_enabled) = match self.phase {
            Phase::Idle => (RecordButton::Record, !locked),
            Phase::Requesting => (RecordButton::Record, false),
            Phase::Recording => (RecordButton::Stop, true),
            Phase::Stopping => (RecordButton::Stop, false),
        };
        let idle = self.phase == Phase::Idle;

        ControlsView {
            record_button,
            record_enabled,
            play_enabled: idle && has_recording && !locked,
            download_enabled: idle && has_recording,
            submit_enabled: idle && has_recording && !locked,
            label: self.label.clone(),
            timer_label: self.timer_label,
        }
    }

    fn render_effect(&self) -> Effect<C> {
        Effect::Render(render(&self.id, &self.config, &self.controls()))
    }

    fn sync_effect(&self) -> Effect<C> {
        Effect::SyncControls(self.controls())
    }

    pub fn mount(&mut self) -> Vec<Effect<C>> {
        log::debug!("[{}] mounted", self.id);
        self.mounted = true;
        vec![self.render_effect()]
    }

    /// Tear down any active session. Late completions for it are ignored.
    pub fn unmount(&mut self) -> Vec<Effect<C>> {
        log::debug!("[{}] unmounted in phase {:?}", self.id, self.phase);
        self.mounted = false;

        let session = self.session;
        let mut effects = Vec::new();
        match self.phase {
            Phase::Idle => {}
            Phase::Requesting => {
                effects.push(Effect::ReleaseCapture { session });
            }
            Phase::Recording | Phase::Stopping => {
                if self.countdown.take().is_some() {
                    effects.push(Effect::CancelTimer { session });
                }
                effects.push(Effect::StopRecorder { session });
                effects.push(Effect::ReleaseCapture { session });
            }
        }
        if self.phase != Phase::Idle {
            self.session = self.session.next();
            self.phase = Phase::Idle;
            self.store.reset();
        }
        effects
    }

    /// React to an attribute change. Invalid values are rejected and leave
    /// the configuration untouched.
    pub fn set_attribute(&mut self, name: &str, value: Option<&str>) -> Result<Vec<Effect<C>>, WidgetError> {
        if !self.config.apply_attribute(name, value)? {
            return Ok(Vec::new());
        }
        log::debug!("[{}] attribute {} = {:?}", self.id, name, value);

        if self.phase == Phase::Idle {
            self.timer_label = idle_timer_label(&self.config);
        }
        if self.mounted {
            Ok(vec![self.render_effect()])
        } else {
            Ok(Vec::new())
        }
    }

    /// The record button: starts a session when idle, stops it while
    /// recording, and is ignored otherwise.
    pub fn press_record(&mut self) -> Vec<Effect<C>> {
        match self.phase {
            Phase::Idle => self.begin_capture(),
            Phase::Recording => self.begin_stop(StopReason::User),
            Phase::Requesting | Phase::Stopping => {
                log::debug!("[{}] record pressed while {:?}, ignoring", self.id, self.phase);
                Vec::new()
            }
        }
    }

    fn begin_capture(&mut self) -> Vec<Effect<C>> {
        if matches!(self.upload, UploadState::InFlight | UploadState::Done) {
            log::warn!("[{}] recording is locked after submission", self.id);
            return Vec::new();
        }

        self.session = self.session.next();
        self.phase = Phase::Requesting;
        self.store.reset();
        self.label = LabelText::Configured;
        self.timer_label = idle_timer_label(&self.config);

        log::info!("[{}] requesting capture for session {:?}", self.id, self.session);
        vec![
            self.sync_effect(),
            Effect::RequestCapture {
                session: self.session,
                constraints: CaptureConstraints::from(&self.config),
            },
        ]
    }

    pub fn on_capture_granted(&mut self, session: SessionId) -> Vec<Effect<C>> {
        if !self.is_current(session, Phase::Requesting) {
            log::debug!("[{}] stale capture grant for {:?}", self.id, session);
            return vec![Effect::ReleaseCapture { session }];
        }

        self.phase = Phase::Recording;
        let mut effects = vec![Effect::StartRecorder { session }];

        self.countdown = Countdown::start(session, self.config.max_time);
        if let Some(countdown) = &self.countdown {
            log::debug!("[{}] time limit {} seconds", self.id, countdown.max_secs());
            effects.push(Effect::StartTimer {
                session,
                interval_ms: TICK_INTERVAL_MS,
            });
        }

        log::info!("[{}] capture granted, recording {:?}", self.id, session);
        effects.push(self.sync_effect());
        effects
    }

    pub fn on_capture_failed(&mut self, session: SessionId, error: WidgetError) -> Vec<Effect<C>> {
        if !self.is_current(session, Phase::Requesting) {
            return Vec::new();
        }
        log::error!("[{}] getUserMedia error: {}", self.id, error);
        self.phase = Phase::Idle;
        vec![self.sync_effect()]
    }

    /// The recorder could not be constructed or started.
    pub fn on_recorder_failed(&mut self, session: SessionId, error: WidgetError) -> Vec<Effect<C>> {
        if session != self.session || self.phase == Phase::Idle {
            return Vec::new();
        }
        log::error!("[{}] recorder failed: {}", self.id, error);

        let mut effects = Vec::new();
        if self.countdown.take().is_some() {
            effects.push(Effect::CancelTimer { session });
        }
        effects.push(Effect::ReleaseCapture { session });
        self.phase = Phase::Idle;
        self.store.reset();
        effects.push(self.sync_effect());
        effects
    }

    /// Returns whether the chunk was stored.
    pub fn on_chunk(&mut self, session: SessionId, chunk: C) -> bool {
        if session != self.session || !matches!(self.phase, Phase::Recording | Phase::Stopping) {
            log::debug!("[{}] dropping chunk from stale session {:?}", self.id, session);
            return false;
        }
        self.store.append(chunk)
    }

    pub fn on_tick(&mut self, session: SessionId) -> Vec<Effect<C>> {
        let tick = match self.countdown.as_mut() {
            Some(countdown) if countdown.session() == session && self.phase == Phase::Recording => countdown.tick(),
            _ => {
                log::debug!("[{}] tick for inactive timer {:?}", self.id, session);
                return Vec::new();
            }
        };

        match tick {
            Tick::Running { remaining } => {
                self.timer_label = Some(TimerLabel::Remaining(remaining));
                vec![self.sync_effect()]
            }
            Tick::Expired => {
                let elapsed = self.countdown.as_ref().map_or(0, Countdown::elapsed);
                log::info!("[{}] time limit reached after {} ticks", self.id, elapsed);
                self.begin_stop(StopReason::TimeLimit)
            }
        }
    }

    fn begin_stop(&mut self, reason: StopReason) -> Vec<Effect<C>> {
        let session = self.session;
        let mut effects = Vec::new();

        if self.countdown.take().is_some() {
            effects.push(Effect::CancelTimer { session });
        }
        self.phase = Phase::Stopping;
        self.timer_label = match reason {
            StopReason::TimeLimit => Some(TimerLabel::Complete),
            StopReason::User => idle_timer_label(&self.config),
        };

        log::info!("[{}] stopping {:?} ({:?})", self.id, session, reason);
        effects.push(Effect::StopRecorder { session });
        effects.push(Effect::ReleaseCapture { session });
        effects.push(self.sync_effect());
        effects
    }

    /// The recorder delivered its last chunk and stopped.
    pub fn on_recorder_stopped(&mut self, session: SessionId) -> Vec<Effect<C>> {
        if !self.is_current(session, Phase::Stopping) {
            log::debug!("[{}] recorder stop for inactive session {:?}", self.id, session);
            return Vec::new();
        }

        log::info!(
            "[{}] recorder stopped: {} chunks, {} bytes",
            self.id,
            self.store.pending_count(),
            self.store.pending_size()
        );
        if let Err(e) = self.store.finalize() {
            log::error!("[{}] could not assemble recording: {}", self.id, e);
        }

        self.phase = Phase::Idle;
        vec![self.render_effect()]
    }

    pub fn press_play(&self) -> Vec<Effect<C>> {
        match self.store.chunks() {
            Some(chunks) if self.phase == Phase::Idle && !chunks.is_empty() => vec![Effect::Play {
                chunks: chunks.to_vec(),
            }],
            _ => Vec::new(),
        }
    }

    pub fn press_download(&self) -> Vec<Effect<C>> {
        match self.store.artifact() {
            Some(artifact) if artifact.size() > 0 => vec![Effect::Download {
                artifact: artifact.clone(),
                filename: artifact_filename(&self.id),
            }],
            _ => Vec::new(),
        }
    }

    /// Post the recording to the configured `action` URL. Play, submit and
    /// record are locked until the upload fails; after a successful upload
    /// they stay locked.
    pub fn press_submit(&mut self) -> Result<Vec<Effect<C>>, WidgetError> {
        if self.phase != Phase::Idle {
            return Ok(Vec::new());
        }
        if matches!(self.upload, UploadState::InFlight | UploadState::Done) {
            log::warn!("[{}] submit ignored, upload {:?}", self.id, self.upload);
            return Ok(Vec::new());
        }
        let artifact = match self.store.artifact() {
            Some(artifact) if artifact.size() > 0 => artifact.clone(),
            _ => return Err(WidgetError::NothingToSubmit),
        };
        if self.config.action.is_empty() {
            return Err(WidgetError::MissingAction);
        }

        self.upload = UploadState::InFlight;
        self.label = LabelText::Uploading;
        log::info!("[{}] uploading {} bytes to {}", self.id, artifact.size(), self.config.action);

        Ok(vec![
            self.sync_effect(),
            Effect::Upload(UploadRequest {
                url: self.config.action.clone(),
                filename: artifact_filename(&self.id),
                payload: artifact,
            }),
        ])
    }

    /// `result` is the HTTP status of the finished request, or the network
    /// error that prevented one.
    pub fn on_upload_finished(&mut self, result: Result<u16, WidgetError>) -> Vec<Effect<C>> {
        if self.upload != UploadState::InFlight {
            return Vec::new();
        }

        match result.and_then(check_status) {
            Ok(status) => {
                log::info!("[{}] upload complete (HTTP {})", self.id, status);
                self.upload = UploadState::Done;
                self.label = LabelText::UploadComplete;
            }
            Err(e) => {
                log::error!("[{}] upload failed: {}", self.id, e);
                self.upload = UploadState::None;
                self.label = LabelText::UploadFailed(e.label_text().unwrap_or_else(|| e.to_string()));
            }
        }
        vec![self.sync_effect()]
    }

    /// Discard the saved recording.
    pub fn delete_recording(&mut self) -> Vec<Effect<C>> {
        if self.phase != Phase::Idle {
            return Vec::new();
        }
        self.store.clear();
        vec![Effect::ClearPreview, self.sync_effect()]
    }

    fn is_current(&self, session: SessionId, phase: Phase) -> bool {
        session == self.session && self.phase == phase
    }
}

fn idle_timer_label(config: &WidgetConfig) -> Option<TimerLabel> {
    config.has_time_limit().then_some(TimerLabel::MaxTime(config.max_time))
}
