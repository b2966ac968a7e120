//! Record codecs.

mod json;
mod text;

pub use json::{JsonRecordCodec, JSON_FORMAT_VERSION};
pub use text::TextRecordCodec;

use std::sync::Arc;

use crate::ports::RecordCodec;

/// Selectable payload format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CodecKind {
    #[default]
    Text,
    Json,
}

impl CodecKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "text" | "text/plain" => Some(Self::Text),
            "json" | "application/json" => Some(Self::Json),
            _ => None,
        }
    }

    pub fn build(self) -> Arc<dyn RecordCodec> {
        match self {
            Self::Text => Arc::new(TextRecordCodec),
            Self::Json => Arc::new(JsonRecordCodec),
        }
    }
}
