use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed asset {} while reading {field}: {reason}", path.display())]
    Load {
        path: PathBuf,
        field: String,
        reason: String,
    },

    #[error("vertex format requires {expected} bytes per vertex, vertex type is {actual} bytes")]
    FormatMismatch { expected: usize, actual: usize },

    #[error("transform '{name}' not found in hierarchy")]
    HierarchyResolution { name: String },

    #[error("material index {index} out of range, model has {count} materials")]
    MaterialReference { index: usize, count: usize },

    #[error("cannot encode {field} '{value}'")]
    Encode { field: String, value: String },

    #[error("invalid manifest {}: {source}", path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, AssetError>;
