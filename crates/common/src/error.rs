//! Error types shared across Oxboard crates.

use std::path::PathBuf;

/// Top-level error type for Oxboard gesture operations.
#[derive(Debug, thiserror::Error)]
pub enum OxboardError {
    #[error("Invalid mapping '{id}': {}", .issues.join("; "))]
    InvalidMapping { id: String, issues: Vec<String> },

    #[error("Invalid profile '{id}': {count} mapping(s) rejected")]
    InvalidProfile {
        id: String,
        count: usize,
        rejected: Vec<OxboardError>,
    },

    #[error("Frame error: {message}")]
    Frame { message: String },

    #[error("Processing error: {message}")]
    Processing { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using OxboardError.
pub type OxboardResult<T> = Result<T, OxboardError>;

impl OxboardError {
    pub fn invalid_mapping(id: impl Into<String>, issues: Vec<String>) -> Self {
        Self::InvalidMapping {
            id: id.into(),
            issues,
        }
    }

    pub fn frame(msg: impl Into<String>) -> Self {
        Self::Frame {
            message: msg.into(),
        }
    }

    pub fn processing(msg: impl Into<String>) -> Self {
        Self::Processing {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Validation issues carried by a rejected mapping, empty for other variants.
    pub fn issues(&self) -> &[String] {
        match self {
            Self::InvalidMapping { issues, .. } => issues,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_mapping_message_joins_issues() {
        let err = OxboardError::invalid_mapping(
            "vol",
            vec!["name is empty".to_string(), "dead zone out of range".to_string()],
        );
        assert_eq!(
            err.to_string(),
            "Invalid mapping 'vol': name is empty; dead zone out of range"
        );
        assert_eq!(err.issues().len(), 2);
    }

    #[test]
    fn test_other_variants_have_no_issues() {
        let err = OxboardError::frame("bad line");
        assert!(err.issues().is_empty());
        assert_eq!(err.to_string(), "Frame error: bad line");
    }
}
