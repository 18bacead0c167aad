use async_trait::async_trait;

use crate::error::ShelfError;

/// An image of a product label, ready to hand to an analysis service.
#[derive(Debug, Clone)]
pub struct LabelImage {
    /// Where the image came from (file path, upload name).
    pub source: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// External service that turns a label image into free-form text.
///
/// Implementations own timeouts and retries; the text they return is fed
/// to the extractor as-is.
#[async_trait]
pub trait LabelAnalyzer: Send + Sync {
    /// Provider name (e.g., "gemini", "openai").
    fn name(&self) -> &str;

    /// Describe the label in `image` as text.
    async fn analyze(&self, image: &LabelImage) -> Result<String, ShelfError>;
}
