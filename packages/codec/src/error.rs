#[derive(thiserror::Error, Debug)]
pub enum CodecError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML error: {message}")]
    Xml {
        message: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("body cannot be parsed to a JSON object (found {found})")]
    NotAnObject { found: &'static str },
}

impl CodecError {
    pub(crate) fn xml(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        CodecError::Xml {
            message: error.to_string(),
            source: Box::new(error),
        }
    }
}
