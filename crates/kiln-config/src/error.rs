//! Error types for intent validation and settings loading.

use miette::Diagnostic;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ValidationError>;

/// Why a raw build intent was rejected.
///
/// Every variant that concerns a specific field carries its dotted path
/// (`imageQuality.avif`, `entry.main`), or `$` for the intent itself.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ValidationError {
    #[error("unknown build mode{}", found.as_ref().map(|m| format!(": '{m}'")).unwrap_or_default())]
    #[diagnostic(
        code(kiln::intent::unknown_mode),
        help("set `mode` to one of \"application\", \"library\" or \"server\"")
    )]
    UnknownMode { found: Option<String> },

    #[error("missing required field `{path}`")]
    #[diagnostic(code(kiln::intent::missing_field))]
    MissingField { path: String },

    #[error("field `{path}` is not allowed here")]
    #[diagnostic(
        code(kiln::intent::unexpected_field),
        help("remove the field, or switch to the mode that accepts it")
    )]
    UnexpectedField { path: String },

    #[error("field `{path}` must be {expected}")]
    #[diagnostic(code(kiln::intent::type_mismatch))]
    TypeMismatch { path: String, expected: &'static str },

    #[error("field `{path}` is out of range: {value} (expected {bounds})")]
    #[diagnostic(code(kiln::intent::out_of_range))]
    OutOfRange {
        path: String,
        value: String,
        bounds: &'static str,
    },
}

impl ValidationError {
    pub fn missing(path: impl Into<String>) -> Self {
        Self::MissingField { path: path.into() }
    }

    pub fn unexpected(path: impl Into<String>) -> Self {
        Self::UnexpectedField { path: path.into() }
    }

    pub fn mismatch(path: impl Into<String>, expected: &'static str) -> Self {
        Self::TypeMismatch {
            path: path.into(),
            expected,
        }
    }

    pub fn out_of_range(
        path: impl Into<String>,
        value: impl ToString,
        bounds: &'static str,
    ) -> Self {
        Self::OutOfRange {
            path: path.into(),
            value: value.to_string(),
            bounds,
        }
    }

    /// Dotted path of the offending field, if the error concerns one.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::UnknownMode { .. } => None,
            Self::MissingField { path }
            | Self::UnexpectedField { path }
            | Self::TypeMismatch { path, .. }
            | Self::OutOfRange { path, .. } => Some(path),
        }
    }
}

/// Failure to load [`EngineSettings`](crate::EngineSettings).
#[derive(Debug, Error, Diagnostic)]
pub enum SettingsError {
    #[error("invalid engine settings: {0}")]
    #[diagnostic(
        code(kiln::settings::invalid),
        help("check kiln.toml and KILN_* environment variables")
    )]
    Invalid(#[from] Box<figment::Error>),

    #[error("engine setting `{key}` is out of range: {value} (expected {bounds})")]
    #[diagnostic(
        code(kiln::settings::out_of_range),
        help("check kiln.toml and KILN_* environment variables")
    )]
    OutOfRange {
        key: &'static str,
        value: String,
        bounds: &'static str,
    },
}

impl From<figment::Error> for SettingsError {
    fn from(err: figment::Error) -> Self {
        Self::Invalid(Box::new(err))
    }
}
