//! Error types for the OCR core engine.
//!
//! Mirrors the error-kind taxonomy of the engine's error-handling design:
//! every fallible public operation returns a [`Result`] carrying one of
//! these variants; nothing crosses a component boundary via panic or
//! exception.

use std::fmt;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, OcrError>;

/// Errors the engine distinguishes, one variant per error kind in the
/// error-handling design.
#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    /// Language data missing or corrupt, or any other failure during
    /// `Session::init`. No further operation is valid except another
    /// `init` or destruction.
    #[error("init failed: {message}")]
    Init {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Image open/read failure, invalid rectangle, or missing `set_image`
    /// before recognition. The session remains usable afterwards.
    #[error("input error: {message}")]
    Input { message: String },

    /// Low-level failure inside the recognizer.
    #[error("recognition error: {message}")]
    Recognition {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The recognizer was cancelled or hit its deadline.
    #[error("recognition timed out or was cancelled after {words_done} words")]
    Timeout { words_done: u32 },

    /// A renderer's sink failed (e.g. I/O failure). Other renderers in the
    /// chain still get a chance to run.
    #[error("renderer '{renderer}' failed: {message}")]
    Renderer { renderer: String, message: String },

    /// The grapheme validator rejected its input under the active script
    /// grammar.
    #[error("grapheme validation failed: {message}")]
    Validation { message: String },

    /// A parameter constraint was violated (wrong mode for the parameter,
    /// e.g. setting an init-only parameter after `init`).
    #[error("config error: {message}")]
    Config { message: String },

    /// File-system failure encountered while loading config files or
    /// writing renderer output.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl OcrError {
    pub fn init(message: impl Into<String>) -> Self {
        OcrError::Init {
            message: message.into(),
            source: None,
        }
    }

    pub fn input(message: impl Into<String>) -> Self {
        OcrError::Input { message: message.into() }
    }

    pub fn recognition(message: impl Into<String>) -> Self {
        OcrError::Recognition {
            message: message.into(),
            source: None,
        }
    }

    pub fn renderer(renderer: impl Into<String>, message: impl Into<String>) -> Self {
        OcrError::Renderer {
            renderer: renderer.into(),
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        OcrError::Validation { message: message.into() }
    }

    pub fn config(message: impl Into<String>) -> Self {
        OcrError::Config { message: message.into() }
    }

    /// One-line diagnostic suitable for a CLI's stderr, per the
    /// error-handling design's user-visible behavior requirement.
    pub fn one_line(&self) -> String {
        format!("{}", self)
    }
}

/// Lightweight status distinct from `Result` for operations whose original
/// contract is "returns ok/status" rather than a rich error (e.g.
/// `Session::init`, `Session::recognize`), kept to mirror the source's
/// `ok`/`init_failed`/`error` return-code vocabulary at call sites that
/// want to match on outcome rather than propagate with `?`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    InitFailed,
    Error,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Ok => write!(f, "ok"),
            Status::InitFailed => write!(f, "init_failed"),
            Status::Error => write!(f, "error"),
        }
    }
}
