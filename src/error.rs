//! Error types for gq
//!
//! Covers every way a single invocation can fail:
//! - Configuration (missing file, bad YAML, missing provider section or key)
//! - Input (no question, no data)
//! - LLM requests (transport failures, vendor error statuses, malformed responses)
//! - Standard I/O (reading stdin, writing stdout)

use std::fmt;
use std::io;

/// Result type alias for gq operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for gq
#[derive(Debug)]
pub enum Error {
    /// Configuration errors
    Config(ConfigError),
    /// LLM API errors
    Llm(LlmError),
    /// Invalid command-line input
    Input(InputError),
    /// I/O errors
    Io(IoError),
}

/// Configuration errors
#[derive(Debug)]
pub enum ConfigError {
    /// Home directory could not be determined
    HomeDirNotFound,
    /// Config file could not be read
    ReadFailed { path: String, source: io::Error },
    /// Config file is not valid YAML for the expected schema
    ParseFailed { path: String, details: String },
    /// Provider section absent from the config file
    MissingSection(String),
    /// Required key absent or empty within a provider section
    MissingField { section: String, field: String },
}

/// LLM API errors
#[derive(Debug)]
pub enum LlmError {
    /// HTTP request failed (network error, timeout, unexpected status)
    RequestFailed { model: String, source: String },
    /// API response malformed (invalid JSON, missing fields)
    InvalidResponse { model: String, details: String },
    /// Rate limit exceeded (429 response)
    RateLimitExceeded { model: String, retry_after: Option<u64> },
    /// API authentication failed (invalid key or credentials)
    AuthenticationFailed(String),
    /// Model unavailable (503, model offline, region without service)
    ModelUnavailable(String),
    /// Provider id not known to gq
    UnsupportedProvider(String),
    /// Model not supported by the selected provider
    UnsupportedModel { provider: String, model: String },
}

/// Command-line input errors
#[derive(Debug)]
pub enum InputError {
    /// No question was given where one is required
    NoQuestion,
    /// A question was given but there is no data to ask about
    NoData,
}

/// Standard I/O errors
#[derive(Debug)]
pub enum IoError {
    /// Failed to read piped input
    StdinReadFailed(io::Error),
    /// Failed to write the answer
    WriteFailed(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Config error: {}", e),
            Error::Llm(e) => write!(f, "LLM error: {}", e),
            Error::Input(e) => write!(f, "{}", e),
            Error::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::HomeDirNotFound => write!(f, "could not determine home directory"),
            ConfigError::ReadFailed { path, source } => {
                write!(f, "Error reading config file {}: {}", path, source)
            }
            ConfigError::ParseFailed { path, details } => {
                write!(f, "Error reading config file {}: {}", path, details)
            }
            ConfigError::MissingSection(section) => {
                write!(f, "missing '{}' section", section)
            }
            ConfigError::MissingField { section, field } => {
                write!(f, "missing '{}.{}'", section, field)
            }
        }
    }
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmError::RequestFailed { model, source } => {
                write!(f, "Request to {} failed: {}", model, source)
            }
            LlmError::InvalidResponse { model, details } => {
                write!(f, "Invalid response from {}: {}", model, details)
            }
            LlmError::RateLimitExceeded { model, retry_after } => match retry_after {
                Some(seconds) => write!(
                    f,
                    "Rate limit exceeded for {} (retry after {} seconds)",
                    model, seconds
                ),
                None => write!(f, "Rate limit exceeded for {}", model),
            },
            LlmError::AuthenticationFailed(model) => {
                write!(f, "Authentication failed for {}", model)
            }
            LlmError::ModelUnavailable(details) => {
                write!(f, "Model unavailable: {}", details)
            }
            LlmError::UnsupportedProvider(name) => {
                write!(f, "Unsupported provider: {}", name)
            }
            LlmError::UnsupportedModel { provider, model } => {
                write!(f, "Unsupported model for {}: {}", provider, model)
            }
        }
    }
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::NoQuestion => write!(f, "no question provided"),
            InputError::NoData => write!(f, "no data provided"),
        }
    }
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IoError::StdinReadFailed(source) => write!(f, "Failed to read stdin: {}", source),
            IoError::WriteFailed(source) => write!(f, "Failed to write output: {}", source),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Config(ConfigError::ReadFailed { source, .. })
            | Error::Io(IoError::StdinReadFailed(source))
            | Error::Io(IoError::WriteFailed(source)) => Some(source),
            _ => None,
        }
    }
}

impl std::error::Error for ConfigError {}
impl std::error::Error for LlmError {}
impl std::error::Error for InputError {}
impl std::error::Error for IoError {}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Config(err)
    }
}

impl From<LlmError> for Error {
    fn from(err: LlmError) -> Self {
        Error::Llm(err)
    }
}

impl From<InputError> for Error {
    fn from(err: InputError) -> Self {
        Error::Input(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;

    #[test]
    fn test_input_error_display() {
        assert_eq!(
            Error::Input(InputError::NoQuestion).to_string(),
            "no question provided"
        );
        assert_eq!(Error::Input(InputError::NoData).to_string(), "no data provided");
    }

    #[test]
    fn test_config_error_display() {
        let err = Error::Config(ConfigError::MissingField {
            section: "openAI".to_string(),
            field: "apiKey".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "Config error: missing 'openAI.apiKey'"
        );
    }

    #[test]
    fn test_llm_error_display() {
        let err = Error::Llm(LlmError::RateLimitExceeded {
            model: "gpt-4".to_string(),
            retry_after: Some(60),
        });
        assert_eq!(
            err.to_string(),
            "LLM error: Rate limit exceeded for gpt-4 (retry after 60 seconds)"
        );

        let err = Error::Llm(LlmError::UnsupportedModel {
            provider: "openai".to_string(),
            model: "gpt-2".to_string(),
        });
        assert_eq!(err.to_string(), "LLM error: Unsupported model for openai: gpt-2");
    }

    #[test]
    fn test_write_error_display() {
        let io_err = io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed");
        let err = Error::Io(IoError::WriteFailed(io_err));
        assert_eq!(err.to_string(), "I/O error: Failed to write output: pipe closed");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_error_source_chain() {
        let err = Error::Config(ConfigError::ReadFailed {
            path: "/nope/.gq.yaml".to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        });
        assert!(err.source().is_some());

        let err = Error::Input(InputError::NoData);
        assert!(err.source().is_none());
    }
}
