use courier_codec::CodecError;

use crate::transport::{ResponseHead, TransportError};

pub type Result<T> = std::result::Result<T, Error>;

/// Everything a call can fail with.
///
/// Transport failures are kept apart from [`ApiError`]: the former mean the
/// exchange never completed, the latter that it completed but the client
/// could not or would not hand back a value.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Invalid client configuration: {message}")]
    Config { message: String },
}

impl Error {
    /// The status code, when the server answered with an error status and the
    /// client is configured to raise it.
    pub fn http_code(&self) -> Option<u16> {
        match self {
            Error::Api(ApiError::Response(e)) => Some(e.http_code),
            _ => None,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Response(#[from] ApiResponseError),

    #[error(transparent)]
    Parsing(#[from] ParsingError),

    #[error("{message}")]
    Other {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        ApiError::Other {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ApiError::Other {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// An error status answered while `throw_on_http_error` is set.
///
/// The body is kept verbatim and never decoded.
#[derive(thiserror::Error, Debug, Clone)]
#[error("HTTP {http_code} returned by {url}")]
pub struct ApiResponseError {
    pub url: String,
    pub http_code: u16,
    pub content: String,
    pub response: ResponseHead,
}

/// A request body could not be encoded or a response body decoded.
#[derive(thiserror::Error, Debug)]
#[error("Parsing failed: {source}")]
pub struct ParsingError {
    #[from]
    source: CodecError,
}

impl ParsingError {
    pub fn codec_error(&self) -> &CodecError {
        &self.source
    }
}

impl From<ApiResponseError> for Error {
    fn from(error: ApiResponseError) -> Self {
        Error::Api(ApiError::Response(error))
    }
}

impl From<ParsingError> for Error {
    fn from(error: ParsingError) -> Self {
        Error::Api(ApiError::Parsing(error))
    }
}

impl From<CodecError> for Error {
    fn from(error: CodecError) -> Self {
        Error::Api(ApiError::Parsing(ParsingError::from(error)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::TransportErrorKind;
    use std::error::Error as _;

    #[test]
    fn parsing_error_keeps_codec_cause() {
        let codec = serde_json::from_str::<u32>("nope").unwrap_err();
        let error = Error::from(CodecError::from(codec));

        let Error::Api(ApiError::Parsing(parsing)) = &error else {
            panic!("expected a parsing error, got {error:?}");
        };
        assert!(matches!(parsing.codec_error(), CodecError::Json(_)));
        assert!(parsing.source().is_some());
    }

    #[test]
    fn response_error_exposes_status() {
        let error = Error::from(ApiResponseError {
            url: "http://localhost/x".to_string(),
            http_code: 404,
            content: "missing".to_string(),
            response: ResponseHead {
                status: 404,
                headers: Vec::new(),
            },
        });
        assert_eq!(error.http_code(), Some(404));
        assert_eq!(error.to_string(), "HTTP 404 returned by http://localhost/x");
    }

    #[test]
    fn transport_error_is_not_an_api_error() {
        let error = Error::from(TransportError::new(
            TransportErrorKind::ReadTimeout,
            "read timed out",
        ));
        assert!(matches!(error, Error::Transport(_)));
        assert_eq!(error.http_code(), None);
    }

    #[test]
    fn base_error_preserves_cause_chain() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let error = ApiError::with_source("could not stage body", io);
        assert_eq!(error.to_string(), "could not stage body");
        assert_eq!(error.source().unwrap().to_string(), "disk full");

        let bare = ApiError::new("unsupported");
        assert!(bare.source().is_none());
    }
}
