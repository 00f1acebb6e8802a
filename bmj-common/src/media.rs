//! Opaque media references
//!
//! Photos and videos are stored by the persistence collaborator and reach the
//! core as path strings (`photos/3f2a….jpg`). The core only adds, removes and
//! iterates them; it never reads file contents.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stored path of a photo or video, as reported by the service
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaRef(String);

impl MediaRef {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path segment, with either separator style
    pub fn basename(&self) -> &str {
        self.0
            .rsplit(|c: char| c == '/' || c == '\\')
            .next()
            .unwrap_or(self.0.as_str())
    }

    /// Lowercased file extension, if any
    pub fn extension(&self) -> Option<String> {
        let name = self.basename();
        let (stem, ext) = name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}

impl fmt::Display for MediaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MediaRef {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for MediaRef {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Kind of attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Photo,
    Video,
}

impl MediaKind {
    /// Storage and URL directory for this kind
    pub fn dir(self) -> &'static str {
        match self {
            MediaKind::Photo => "photos",
            MediaKind::Video => "videos",
        }
    }

    /// Site-relative display path: `/api/uploads/{dir}/{basename}`
    ///
    /// Stored references are always stripped to their basename first.
    pub fn display_path(self, media: &MediaRef) -> String {
        format!("/api/uploads/{}/{}", self.dir(), media.basename())
    }

    /// Absolute display URL under `origin` (e.g. `http://127.0.0.1:5740`)
    pub fn display_url(self, origin: &str, media: &MediaRef) -> String {
        format!("{}{}", origin.trim_end_matches('/'), self.display_path(media))
    }
}

/// MIME type for a video source element, chosen from the file extension
///
/// A single source is emitted per video; the type tells the player how to
/// decode the one stored file.
pub fn video_mime_type(video: &MediaRef) -> &'static str {
    match video.extension().as_deref() {
        Some("mov") => "video/quicktime",
        Some("avi") => "video/x-msvideo",
        Some("webm") => "video/webm",
        Some("mkv") => "video/x-matroska",
        _ => "video/mp4",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basename_strips_directories() {
        assert_eq!(MediaRef::new("photos/abc.jpg").basename(), "abc.jpg");
        assert_eq!(MediaRef::new("C:\\uploads\\photos\\abc.jpg").basename(), "abc.jpg");
        assert_eq!(MediaRef::new("abc.jpg").basename(), "abc.jpg");
    }

    #[test]
    fn test_display_url_uses_basename() {
        let photo = MediaRef::new("uploads/photos/2024/abc.jpg");
        assert_eq!(
            MediaKind::Photo.display_path(&photo),
            "/api/uploads/photos/abc.jpg"
        );
        assert_eq!(
            MediaKind::Video.display_url("http://localhost:5740/", &MediaRef::new("videos/v.mp4")),
            "http://localhost:5740/api/uploads/videos/v.mp4"
        );
    }

    #[test]
    fn test_extension_and_mime() {
        assert_eq!(MediaRef::new("videos/a.MOV").extension().as_deref(), Some("mov"));
        assert_eq!(MediaRef::new("videos/.hidden").extension(), None);
        assert_eq!(video_mime_type(&MediaRef::new("videos/a.MOV")), "video/quicktime");
        assert_eq!(video_mime_type(&MediaRef::new("videos/a.avi")), "video/x-msvideo");
        assert_eq!(video_mime_type(&MediaRef::new("videos/a")), "video/mp4");
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let json = serde_json::to_string(&vec![MediaRef::new("photos/a.jpg")]).unwrap();
        assert_eq!(json, r#"["photos/a.jpg"]"#);
    }
}
