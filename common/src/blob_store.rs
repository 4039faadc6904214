//! In-memory store for the chunks of the current recording and the last
//! finalized artifact.

use crate::error::WidgetError;

/// Media type of every artifact the widget produces.
pub const ARTIFACT_MIME_TYPE: &str = "video/webm";

/// An opaque piece of recorded media.
///
/// The store never looks inside a chunk: it only needs its size (to drop
/// empty chunks) and a way to join an ordered run of chunks into one.
pub trait MediaChunk: Clone {
    fn size(&self) -> u64;

    /// Join `parts` in order into a single artifact of `mime_type`.
    fn concat(parts: &[Self], mime_type: &str) -> Result<Self, WidgetError>;
}

impl MediaChunk for Vec<u8> {
    fn size(&self) -> u64 {
        self.len() as u64
    }

    fn concat(parts: &[Self], _mime_type: &str) -> Result<Self, WidgetError> {
        Ok(parts.concat())
    }
}

/// A finished recording: the raw chunk sequence plus its concatenation.
#[derive(Debug, Clone)]
pub struct Recording<C> {
    chunks: Vec<C>,
    artifact: C,
}

impl<C: MediaChunk> Recording<C> {
    pub fn chunks(&self) -> &[C] {
        &self.chunks
    }

    pub fn artifact(&self) -> &C {
        &self.artifact
    }

    pub fn size(&self) -> u64 {
        self.artifact.size()
    }
}

#[derive(Debug)]
pub struct BlobStore<C> {
    pending: Vec<C>,
    saved: Option<Recording<C>>,
}

impl<C> Default for BlobStore<C> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
            saved: None,
        }
    }
}

impl<C: MediaChunk> BlobStore<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk to the in-progress recording. Zero-length chunks are
    /// dropped; returns whether the chunk was kept.
    pub fn append(&mut self, chunk: C) -> bool {
        if chunk.size() == 0 {
            return false;
        }
        self.pending.push(chunk);
        true
    }

    /// Forget the in-progress chunks. The last finalized recording stays
    /// readable until the next `finalize`.
    pub fn reset(&mut self) {
        self.pending.clear();
    }

    /// Concatenate the chunks gathered since the last `reset` and save them
    /// as the current recording, replacing any previous one.
    pub fn finalize(&mut self) -> Result<&Recording<C>, WidgetError> {
        let artifact = C::concat(&self.pending, ARTIFACT_MIME_TYPE)?;
        let chunks = std::mem::take(&mut self.pending);
        Ok(&*self.saved.insert(Recording { chunks, artifact }))
    }

    /// Drop the saved recording.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.saved = None;
    }

    pub fn recording(&self) -> Option<&Recording<C>> {
        self.saved.as_ref()
    }

    /// Finalized single artifact, used for download and upload
    pub fn artifact(&self) -> Option<&C> {
        self.saved.as_ref().map(Recording::artifact)
    }

    /// Raw ordered chunk sequence of the saved recording, used for playback
    pub fn chunks(&self) -> Option<&[C]> {
        self.saved.as_ref().map(Recording::chunks)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn pending_size(&self) -> u64 {
        self.pending.iter().map(MediaChunk::size).sum()
    }
}
