//! Build-time and dispatch-time errors

use thiserror::Error;

/// Error type returned by before-hooks and run actions.
pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;

/// Result type for before-hooks and run actions.
pub type CallbackResult = Result<(), CallbackError>;

/// Errors raised while declaring the command tree.
///
/// These are programming errors in the tree definition; callers must not
/// ignore them.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum BuildError {
    #[error("duplicate command name '{name}' under '{parent}'")]
    DuplicateName { parent: String, name: String },

    #[error("cannot mark '{requested}' as default under '{parent}': '{existing}' is already the default")]
    MultipleDefaults {
        parent: String,
        existing: String,
        requested: String,
    },

    #[error("duplicate flag or argument '{name}' on '{command}'")]
    DuplicateArgument { command: String, name: String },

    #[error("'{0}' is reserved and cannot be used as a flag or argument name")]
    ReservedName(String),
}

/// Result type for tree construction.
pub type BuildResult<T> = Result<T, BuildError>;

/// Input that could not be resolved against the tree.
///
/// The message is what the user sees, e.g. `unexpected blargle`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ParseError {
    message: String,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn unexpected(token: &str) -> Self {
        Self::new(format!("unexpected {token}"))
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors surfaced from [`CommandTree::parse`](crate::CommandTree::parse).
///
/// Hook and action errors are passed through untouched: `Display` and
/// `source` are those of the callback's own error.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Hook(CallbackError),

    #[error(transparent)]
    Action(CallbackError),

    #[error("I/O error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl DispatchError {
    /// Create an I/O error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            DispatchError::Parse(_) => crate::exitcode::USAGE,
            DispatchError::Hook(_) | DispatchError::Action(_) => crate::exitcode::SOFTWARE,
            DispatchError::Io { .. } => crate::exitcode::IOERR,
        }
    }

    /// Hand back the error a hook or action returned, if that is what this is.
    pub fn into_callback_error(self) -> Result<CallbackError, Self> {
        match self {
            DispatchError::Hook(e) | DispatchError::Action(e) => Ok(e),
            other => Err(other),
        }
    }
}

/// Result type for parse and dispatch.
pub type DispatchResult<T> = Result<T, DispatchError>;
