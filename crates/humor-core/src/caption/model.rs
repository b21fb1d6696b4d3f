use serde::{Deserialize, Serialize};

/// Image attached to a caption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl ImageRef {
    /// Alt text for the image, with a generic fallback.
    pub fn alt_text(&self) -> &str {
        self.description.as_deref().unwrap_or("Caption image")
    }
}

/// One votable caption.
///
/// Owned by the record store; the controller keeps read-only copies for the
/// duration of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptionItem {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub image: Option<ImageRef>,
    pub is_public: bool,
    #[serde(default)]
    pub like_count: i64,
}

impl CaptionItem {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            image: None,
            is_public: true,
            like_count: 0,
        }
    }

    pub fn with_image(mut self, url: impl Into<String>, description: Option<String>) -> Self {
        self.image = Some(ImageRef {
            url: url.into(),
            description,
        });
        self
    }

    pub fn private(mut self) -> Self {
        self.is_public = false;
        self
    }
}
