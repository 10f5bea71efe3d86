//! Frame sources
//!
//! A session can draw frames from the device camera (Local) or an external
//! "hardware" stream (Remote). Sources are exclusive singletons per session:
//! the orchestrator releases one before acquiring the other.

use async_trait::async_trait;

use crate::{Error, Result};

use super::RawFrame;

/// Where a frame comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureKind {
    /// Device camera
    Local,
    /// Externally streamed image/video endpoint
    Remote,
}

impl std::fmt::Display for CaptureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local => write!(f, "local camera"),
            Self::Remote => write!(f, "hardware stream"),
        }
    }
}

impl CaptureKind {
    /// The source that must be released before this one activates
    #[must_use]
    pub const fn counterpart(self) -> Self {
        match self {
            Self::Local => Self::Remote,
            Self::Remote => Self::Local,
        }
    }
}

/// A still-frame source
#[async_trait]
pub trait FrameSource: Send {
    fn kind(&self) -> CaptureKind;

    /// Acquire the underlying stream
    ///
    /// # Errors
    ///
    /// Returns [`Error::Media`] when the device or stream is unavailable;
    /// the source stays inactive.
    async fn acquire(&mut self) -> Result<()>;

    /// Grab one frame from the active stream
    ///
    /// # Errors
    ///
    /// Returns [`Error::Media`] when the source is inactive or reports no
    /// usable dimensions yet ("frame not ready").
    async fn grab(&mut self) -> Result<RawFrame>;

    /// Release the underlying stream. Idempotent.
    fn release(&mut self);

    fn is_active(&self) -> bool;
}

/// Frame source backed by an HTTP still-image endpoint
///
/// Covers MJPEG-style hardware cameras that expose a snapshot URL, and
/// doubles as the local source in deployments where the device camera is
/// reachable over HTTP.
pub struct SnapshotSource {
    kind: CaptureKind,
    url: String,
    client: reqwest::Client,
    active: bool,
}

impl SnapshotSource {
    #[must_use]
    pub fn new(kind: CaptureKind, url: &str) -> Self {
        Self {
            kind,
            url: url.to_string(),
            client: reqwest::Client::new(),
            active: false,
        }
    }
}

#[async_trait]
impl FrameSource for SnapshotSource {
    fn kind(&self) -> CaptureKind {
        self.kind
    }

    async fn acquire(&mut self) -> Result<()> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::Media(format!("stream unreachable: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::Media(format!(
                "stream returned {}",
                response.status()
            )));
        }

        self.active = true;
        tracing::info!(kind = %self.kind, url = %self.url, "frame source acquired");
        Ok(())
    }

    async fn grab(&mut self) -> Result<RawFrame> {
        if !self.active {
            return Err(Error::Media(format!("{} is not active", self.kind)));
        }

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::Media(format!("snapshot fetch failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::Media(format!(
                "snapshot returned {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Media(format!("snapshot read failed: {e}")))?;

        let frame = super::decode(&bytes)?;
        if !frame.is_ready() {
            return Err(Error::Media("frame not ready".to_string()));
        }
        Ok(frame)
    }

    fn release(&mut self) {
        if self.active {
            self.active = false;
            tracing::info!(kind = %self.kind, "frame source released");
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

/// Synthetic gradient source for the harness and tests
///
/// Construct with zero dimensions to exercise the "frame not ready" path.
pub struct TestPatternSource {
    kind: CaptureKind,
    width: u32,
    height: u32,
    active: bool,
}

impl TestPatternSource {
    #[must_use]
    pub const fn new(kind: CaptureKind, width: u32, height: u32) -> Self {
        Self {
            kind,
            width,
            height,
            active: false,
        }
    }
}

#[async_trait]
impl FrameSource for TestPatternSource {
    fn kind(&self) -> CaptureKind {
        self.kind
    }

    async fn acquire(&mut self) -> Result<()> {
        self.active = true;
        tracing::info!(kind = %self.kind, "test pattern source acquired");
        Ok(())
    }

    async fn grab(&mut self) -> Result<RawFrame> {
        if !self.active {
            return Err(Error::Media(format!("{} is not active", self.kind)));
        }
        if self.width == 0 || self.height == 0 {
            return Err(Error::Media("frame not ready".to_string()));
        }

        let mut pixels = Vec::with_capacity((self.width * self.height * 3) as usize);
        for y in 0..self.height {
            for x in 0..self.width {
                #[allow(clippy::cast_possible_truncation)]
                pixels.extend_from_slice(&[
                    ((x * 255) / self.width) as u8,
                    ((y * 255) / self.height) as u8,
                    96,
                ]);
            }
        }

        Ok(RawFrame {
            width: self.width,
            height: self.height,
            pixels,
        })
    }

    fn release(&mut self) {
        self.active = false;
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn inactive_source_refuses_grab() {
        let mut source = TestPatternSource::new(CaptureKind::Local, 32, 32);
        assert!(source.grab().await.is_err());

        source.acquire().await.unwrap();
        assert!(source.grab().await.is_ok());
    }

    #[tokio::test]
    async fn zero_dimension_source_reports_frame_not_ready() {
        let mut source = TestPatternSource::new(CaptureKind::Remote, 0, 0);
        source.acquire().await.unwrap();
        let err = source.grab().await.unwrap_err();
        assert!(err.to_string().contains("frame not ready"));
    }

    #[test]
    fn counterpart_is_symmetric() {
        assert_eq!(CaptureKind::Local.counterpart(), CaptureKind::Remote);
        assert_eq!(CaptureKind::Remote.counterpart(), CaptureKind::Local);
    }
}
