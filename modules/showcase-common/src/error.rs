use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShowcaseError {
    #[error("Snapshot I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Snapshot parse error in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, ShowcaseError>;
