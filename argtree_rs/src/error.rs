//! Error taxonomy shared by declaration and parsing.
//!
//! Declaration errors surface while the command tree is being built; every
//! other variant comes out of a single parse call. The first error aborts the
//! parse and reaches the caller unchanged, except `UnrecognizedArguments`
//! which is collected at the root once every command had its turn.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::command::CommandId;

#[derive(Error, Debug)]
pub enum Error {
    #[error("long name must be non-empty and must not contain '=': `{0}`")]
    InvalidLongName(String),

    #[error("short name must be exactly one character: `{0}`")]
    InvalidShortName(String),

    #[error("{name} occurs more than once")]
    DuplicateName { name: String },

    #[error("subcommand required for `{name}`")]
    SubcommandRequired { command: CommandId, name: String },

    #[error("unknown arguments {}{}", .tokens.join(" "), suggestion_suffix(.suggestion))]
    UnrecognizedArguments {
        tokens: Vec<String>,
        suggestion: Option<String>,
    },

    #[error("not enough arguments for {argument}")]
    MissingValue { argument: String },

    #[error("[{argument}] followed by too many arguments")]
    TooManyValues { argument: String },

    #[error("[{argument}] argument: the parameter must follow")]
    ParameterMustFollow { argument: String },

    #[error("[{argument}] bad {expected} value [{value}]")]
    BadTypedValue {
        argument: String,
        value: String,
        expected: &'static str,
    },

    #[error("bad value [{value}] for [{argument}]. Allowed values are {}", .allowed.join("|"))]
    BadSelectorValue {
        argument: String,
        value: String,
        allowed: Vec<String>,
    },

    #[error("[{argument}] {message}")]
    ValidationFailed { argument: String, message: String },

    #[error("[{argument}] can only be present once")]
    DuplicateOccurrence { argument: String },

    #[error("[{argument}] is required")]
    MissingRequired { argument: String },

    #[error("cannot use default of type {found} for [{argument}], expected {expected}")]
    DefaultTypeMismatch {
        argument: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("[{argument}] cannot open `{}`", .path.display())]
    FileOpenFailed {
        argument: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// The command a `SubcommandRequired` error points at.
    ///
    /// Usage rendering uses it to describe the command that is missing its
    /// subcommand instead of whatever command the caller asked about.
    pub fn subcommand_required(&self) -> Option<CommandId> {
        match self {
            Error::SubcommandRequired { command, .. } => Some(*command),
            _ => None,
        }
    }
}

fn suggestion_suffix(suggestion: &Option<String>) -> String {
    suggestion
        .as_ref()
        .map(|s| format!(" (did you mean {}?)", s))
        .unwrap_or_default()
}

// ============================================================================
// Tests
// ============================================================================
