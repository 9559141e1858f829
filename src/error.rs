use thiserror::Error;

/// Unified error type for docs-publish operations
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Environment error: {0}")]
    Environment(String),

    #[error("Inconsistent publish state: {0}")]
    Inconsistent(String),

    #[error("Command '{program}' failed with exit code {}", describe_code(.code))]
    CommandFailed { program: String, code: Option<i32> },

    #[error("Cannot run command '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Remote operation failed: {0}")]
    Remote(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "none".to_string(),
    }
}

/// Convenience type alias for Results in docs-publish
pub type Result<T> = std::result::Result<T, PublishError>;

impl PublishError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        PublishError::Config(msg.into())
    }

    /// Create an environment error with context
    pub fn environment(msg: impl Into<String>) -> Self {
        PublishError::Environment(msg.into())
    }

    /// Create an inconsistency error with context
    pub fn inconsistent(msg: impl Into<String>) -> Self {
        PublishError::Inconsistent(msg.into())
    }

    /// Create a remote error with context
    pub fn remote(msg: impl Into<String>) -> Self {
        PublishError::Remote(msg.into())
    }

    /// Process exit status to report for this error.
    ///
    /// A failed generator step propagates its own exit status so CI shows the
    /// tool's real result. Everything else, including commands killed by a
    /// signal, exits with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            PublishError::CommandFailed {
                code: Some(code), ..
            } if *code != 0 => *code,
            _ => 1,
        }
    }
}
