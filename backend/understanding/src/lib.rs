//! Label understanding: turning a product label into a [`ProductRecord`].
//!
//! [`TextExtractor`] parses the free-form text a vision model produces;
//! [`VisionAnalyzer`] is the collaborator that produces it.
//!
//! [`ProductRecord`]: shelfscan_core::ProductRecord

pub mod extractor;
pub mod image;
pub mod strategy;
pub mod vision;

pub use extractor::TextExtractor;
pub use image::{detect_image_mime, load_label_image};
pub use strategy::{
    default_strategies, BoldStrategy, ColonStrategy, LabeledLine, LineStrategy, NumberedStrategy,
};
pub use vision::{VisionAnalyzer, VisionProvider, LABEL_PROMPT};
