//! Error types for the scoping graph viewer.

use thiserror::Error;
use wasm_bindgen::JsValue;

/// Errors raised while loading, configuring or drawing a scoping graph.
#[derive(Debug, Error)]
pub enum ScopingError {
    #[error("invalid graph data: {0}")]
    InvalidData(#[from] serde_json::Error),

    #[error("graph has no nodes")]
    EmptyGraph,

    #[error("duplicate node id `{0}`")]
    DuplicateNode(String),

    #[error("no data loaded")]
    NoData,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("render error: {0}")]
    Render(String),
}

impl ScopingError {
    /// Whether this error leaves the viewer without a graph.
    pub fn is_load_failure(&self) -> bool {
        matches!(
            self,
            Self::InvalidData(_) | Self::EmptyGraph | Self::DuplicateNode(_) | Self::NoData
        )
    }
}

impl From<ScopingError> for JsValue {
    fn from(err: ScopingError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ScopingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_failures() {
        assert!(ScopingError::EmptyGraph.is_load_failure());
        assert!(ScopingError::DuplicateNode("a".into()).is_load_failure());
        assert!(!ScopingError::Render("boom".into()).is_load_failure());
    }

    #[test]
    fn test_messages() {
        let err = ScopingError::DuplicateNode("init".into());
        assert_eq!(err.to_string(), "duplicate node id `init`");

        let err: ScopingError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(err.to_string().starts_with("invalid graph data"));
    }
}
