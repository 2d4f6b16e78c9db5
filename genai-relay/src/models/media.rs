//! Per-route rules for the media-grounded generation endpoints.

/// MIME type declared for every image payload, whatever was uploaded.
pub const IMAGE_PAYLOAD_MIME_TYPE: &str = "image/png";

/// MIME type assumed when an upload part carries no `Content-Type`.
pub const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// The three routes that take exactly one attached file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaRoute {
    Image,
    Document,
    Audio,
}

impl MediaRoute {
    /// Multipart field that must carry the file.
    pub fn field_name(self) -> &'static str {
        match self {
            MediaRoute::Image => "image",
            MediaRoute::Document => "document",
            MediaRoute::Audio => "audio",
        }
    }

    pub fn default_prompt(self) -> &'static str {
        match self {
            MediaRoute::Image => "Describe the image",
            MediaRoute::Document => "Analyze this document",
            MediaRoute::Audio => "Transcribe or analyze the following audio",
        }
    }

    /// Label used in logs and metrics.
    pub fn label(self) -> &'static str {
        self.field_name()
    }

    /// An absent or empty prompt falls back to the route default.
    pub fn resolve_prompt(self, prompt: Option<String>) -> String {
        prompt
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| self.default_prompt().to_string())
    }

    /// MIME type to declare on the inline payload.
    ///
    /// Images are always labelled PNG; documents and audio keep the type the
    /// client declared for the upload.
    pub fn payload_mime_type(self, declared: &str) -> String {
        match self {
            MediaRoute::Image => IMAGE_PAYLOAD_MIME_TYPE.to_string(),
            MediaRoute::Document | MediaRoute::Audio => declared.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_or_empty_prompt_uses_route_default() {
        assert_eq!(MediaRoute::Image.resolve_prompt(None), "Describe the image");
        assert_eq!(
            MediaRoute::Document.resolve_prompt(Some(String::new())),
            "Analyze this document"
        );
        assert_eq!(
            MediaRoute::Audio.resolve_prompt(None),
            "Transcribe or analyze the following audio"
        );
    }

    #[test]
    fn explicit_prompt_wins() {
        assert_eq!(
            MediaRoute::Image.resolve_prompt(Some("Count the cats".to_string())),
            "Count the cats"
        );
    }

    #[test]
    fn image_payload_is_always_png() {
        assert_eq!(MediaRoute::Image.payload_mime_type("image/jpeg"), "image/png");
        assert_eq!(
            MediaRoute::Image.payload_mime_type(FALLBACK_MIME_TYPE),
            "image/png"
        );
    }

    #[test]
    fn document_and_audio_keep_declared_type() {
        assert_eq!(
            MediaRoute::Document.payload_mime_type("application/pdf"),
            "application/pdf"
        );
        assert_eq!(MediaRoute::Audio.payload_mime_type("audio/mpeg"), "audio/mpeg");
    }
}
