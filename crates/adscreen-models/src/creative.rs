//! The submitted creative asset and its probe metadata.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Kind of creative under analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Video,
    Image,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Image => "image",
        }
    }

    /// Whether this kind of creative can carry an audio track.
    pub fn may_have_audio(&self) -> bool {
        matches!(self, Self::Video)
    }

    /// Guess the media kind from a filename extension. Defaults to video,
    /// which is the common submission path.
    pub fn from_filename(filename: &str) -> Self {
        let ext = filename
            .rsplit_once('.')
            .map(|(_, e)| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "jpg" | "jpeg" | "png" | "gif" | "webp" | "bmp" => Self::Image,
            _ => Self::Video,
        }
    }
}

/// A submitted ad creative. Immutable once constructed; owned exclusively
/// by one analysis invocation.
#[derive(Debug, Clone)]
pub struct Creative {
    /// Original filename from the upload.
    pub filename: String,
    /// Media kind (video or still image).
    pub kind: MediaKind,
    /// Raw binary payload.
    pub payload: Vec<u8>,
}

impl Creative {
    pub fn new(filename: impl Into<String>, kind: MediaKind, payload: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            kind,
            payload,
        }
    }

    /// Construct a creative, inferring the kind from the filename.
    pub fn from_upload(filename: impl Into<String>, payload: Vec<u8>) -> Self {
        let filename = filename.into();
        let kind = MediaKind::from_filename(&filename);
        Self {
            filename,
            kind,
            payload,
        }
    }

    /// MIME type of a still-image payload, from the filename extension.
    /// Only meaningful for image creatives; sampled video frames are
    /// always JPEG.
    pub fn image_mime(&self) -> &'static str {
        let ext = self
            .filename
            .rsplit_once('.')
            .map(|(_, e)| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "png" => "image/png",
            "gif" => "image/gif",
            "webp" => "image/webp",
            "bmp" => "image/bmp",
            _ => "image/jpeg",
        }
    }
}

/// Video metadata discovered at probe time.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VideoInfo {
    /// Duration in seconds.
    pub duration: f64,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_kind_from_filename() {
        assert_eq!(MediaKind::from_filename("ad.mp4"), MediaKind::Video);
        assert_eq!(MediaKind::from_filename("banner.PNG"), MediaKind::Image);
        assert_eq!(MediaKind::from_filename("still.jpeg"), MediaKind::Image);
        assert_eq!(MediaKind::from_filename("noextension"), MediaKind::Video);
    }

    #[test]
    fn test_image_mime_from_extension() {
        let png = Creative::from_upload("banner.PNG", vec![1]);
        assert_eq!(png.image_mime(), "image/png");
        let jpg = Creative::from_upload("still.jpg", vec![1]);
        assert_eq!(jpg.image_mime(), "image/jpeg");
        let webp = Creative::from_upload("promo.webp", vec![1]);
        assert_eq!(webp.image_mime(), "image/webp");
    }

    #[test]
    fn test_audio_capability() {
        assert!(MediaKind::Video.may_have_audio());
        assert!(!MediaKind::Image.may_have_audio());
    }
}
