//! Photo viewer and video player modals

use std::fmt;
use tracing::debug;

use bmj_common::media::video_mime_type;
use bmj_common::{Error, MediaKind, MediaRef, Result};

use crate::keyboard::{Key, KeyListener, KeyboardHub};

/// Photo viewer state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerState {
    Closed,
    /// Showing the photo at this gallery index
    Open(usize),
}

impl fmt::Display for ViewerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewerState::Closed => write!(f, "closed"),
            ViewerState::Open(i) => write!(f, "open({})", i),
        }
    }
}

/// Paged photo viewer with circular navigation
///
/// Left/Right/Escape are bound while the viewer is open. The binding is
/// attached by [`open`](Self::open) and released on every path back to
/// `Closed`, including dropping the controller.
#[derive(Debug)]
pub struct MediaViewerController {
    state: ViewerState,
    keyboard: KeyboardHub,
    listener: Option<KeyListener>,
}

impl MediaViewerController {
    pub fn new(keyboard: KeyboardHub) -> Self {
        Self {
            state: ViewerState::Closed,
            keyboard,
            listener: None,
        }
    }

    pub fn state(&self) -> ViewerState {
        self.state
    }

    pub fn current(&self) -> Option<usize> {
        match self.state {
            ViewerState::Open(i) => Some(i),
            ViewerState::Closed => None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.current().is_some()
    }

    pub fn has_key_binding(&self) -> bool {
        self.listener.is_some()
    }

    /// Show the photo at `index` in a gallery of `len` photos
    pub fn open(&mut self, index: usize, len: usize) -> Result<()> {
        if index >= len {
            return Err(Error::InvalidState(format!(
                "photo index {} out of range for {} photos",
                index, len
            )));
        }
        if self.listener.is_none() {
            self.listener = Some(self.keyboard.attach());
        }
        self.state = ViewerState::Open(index);
        debug!(index, len, "Viewer opened");
        Ok(())
    }

    pub fn next(&mut self, len: usize) {
        if let ViewerState::Open(i) = self.state {
            if len > 1 {
                self.state = ViewerState::Open((i + 1) % len);
            }
        }
    }

    pub fn prev(&mut self, len: usize) {
        if let ViewerState::Open(i) = self.state {
            if len > 1 {
                self.state = ViewerState::Open((i + len - 1) % len);
            }
        }
    }

    pub fn close(&mut self) {
        if self.is_open() {
            debug!("Viewer closed");
        }
        self.state = ViewerState::Closed;
        self.listener = None;
    }

    /// Keep the index valid after the gallery changed size underneath
    pub fn clamp_to(&mut self, len: usize) {
        if let ViewerState::Open(i) = self.state {
            if len == 0 {
                self.close();
            } else if i >= len {
                self.state = ViewerState::Open(len - 1);
            }
        }
    }

    /// Apply every pending key press, returning how many were handled
    pub fn poll_keys(&mut self, len: usize) -> usize {
        let mut handled = 0;
        while let Some(key) = self.listener.as_mut().and_then(KeyListener::try_next) {
            match key {
                Key::Left => self.prev(len),
                Key::Right => self.next(len),
                Key::Escape => self.close(),
                Key::Enter | Key::Other(_) => continue,
            }
            handled += 1;
        }
        handled
    }
}

/// Video player modal, no navigation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoModalController {
    playing: Option<MediaRef>,
}

impl VideoModalController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, video: MediaRef) {
        debug!(video = %video, "Video opened");
        self.playing = Some(video);
    }

    pub fn close(&mut self) {
        self.playing = None;
    }

    pub fn current(&self) -> Option<&MediaRef> {
        self.playing.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.playing.is_some()
    }

    /// Single `(url, mime)` source for the open video
    pub fn source(&self, origin: &str) -> Option<(String, &'static str)> {
        self.playing
            .as_ref()
            .map(|v| (MediaKind::Video.display_url(origin, v), video_mime_type(v)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewer() -> (KeyboardHub, MediaViewerController) {
        let hub = KeyboardHub::new();
        let viewer = MediaViewerController::new(hub.clone());
        (hub, viewer)
    }

    #[test]
    fn test_open_rejects_out_of_range() {
        let (hub, mut viewer) = viewer();
        assert!(viewer.open(3, 3).is_err());
        assert!(!viewer.is_open());
        assert_eq!(hub.listener_count(), 0);
    }

    #[test]
    fn test_single_photo_navigation_is_noop() {
        let (_hub, mut viewer) = viewer();
        viewer.open(0, 1).unwrap();
        viewer.next(1);
        viewer.prev(1);
        assert_eq!(viewer.state(), ViewerState::Open(0));
    }

    #[test]
    fn test_clamp_after_gallery_shrinks() {
        let (hub, mut viewer) = viewer();
        viewer.open(4, 5).unwrap();
        viewer.clamp_to(3);
        assert_eq!(viewer.current(), Some(2));

        viewer.clamp_to(0);
        assert!(!viewer.is_open());
        assert_eq!(hub.listener_count(), 0);
    }

    #[test]
    fn test_video_source_picks_mime_from_extension() {
        let mut modal = VideoModalController::new();
        assert!(modal.source("http://x").is_none());

        modal.open(MediaRef::new("videos/rally.mov"));
        let (url, mime) = modal.source("http://x").unwrap();
        assert_eq!(url, "http://x/api/uploads/videos/rally.mov");
        assert_eq!(mime, "video/quicktime");

        modal.close();
        assert!(!modal.is_open());
    }

    #[test]
    fn test_state_display() {
        assert_eq!(ViewerState::Open(2).to_string(), "open(2)");
        assert_eq!(ViewerState::Closed.to_string(), "closed");
    }
}
