use thiserror::Error;

/// Fatal input errors. Everything recoverable goes through
/// [`crate::diagnostics::Diagnostics`] instead.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("No page data provided")]
    NoInput,

    #[error("Page index {index} out of range")]
    PageOutOfRange { index: usize, page_count: usize },

    #[error("Invalid page dump: {source}")]
    InvalidPageDump {
        #[source]
        source: serde_json::Error,
    },

    #[error("Read `{path}` error: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {source}")]
    Config {
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid `{name}` pattern: {source}")]
    Pattern {
        name: String,
        #[source]
        source: regex::Error,
    },

    #[error("Serialize output error: {source}")]
    Serialize {
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T, E = ExtractError> = std::result::Result<T, E>;
