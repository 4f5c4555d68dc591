//! Error taxonomy for composition, injection and interception.
//!
//! # Invariants
//! - Every variant describes a structural/programmer error; none are
//!   transient and none are retried.
//! - Errors carry enough identity (extension id, target, member name) to
//!   locate the offending definition without a debugger.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ExtensionResult<T> = Result<T, ExtensionError>;

/// Errors raised while composing types, injecting members or calling
/// intercepted operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtensionError {
    /// `can_extend` rejected the base type.
    IncompatibleExtension { extension: String, base: String },
    /// The member name already resolves on the target.
    NameCollision { target: String, name: String },
    /// A hook did not proceed exactly once.
    ContractViolation { operation: String, proceeded: u8 },
    InvalidExtensionId(String),
    DuplicateExtension(String),
    InvalidMemberName(String),
    MemberNotFound { target: String, name: String },
    NotAnOperation { target: String, name: String },
    NotAnAttribute { target: String, name: String },
    /// Failure reported by an operation body itself.
    Operation { operation: String, message: String },
}

impl ExtensionError {
    /// Builds an operation failure, for use inside operation bodies.
    pub fn operation(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Operation {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

impl Display for ExtensionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IncompatibleExtension { extension, base } => {
                write!(f, "extension `{extension}` cannot extend type `{base}`")
            }
            Self::NameCollision { target, name } => {
                write!(f, "member `{name}` already exists on {target}")
            }
            Self::ContractViolation {
                operation,
                proceeded,
            } => write!(
                f,
                "hook around `{operation}` must proceed exactly once, proceeded {proceeded} time(s)"
            ),
            Self::InvalidExtensionId(value) => write!(f, "extension id is invalid: {value}"),
            Self::DuplicateExtension(value) => {
                write!(f, "extension is applied more than once: {value}")
            }
            Self::InvalidMemberName(value) => write!(f, "member name is invalid: `{value}`"),
            Self::MemberNotFound { target, name } => {
                write!(f, "member `{name}` not found on {target}")
            }
            Self::NotAnOperation { target, name } => {
                write!(f, "member `{name}` on {target} is an attribute, not an operation")
            }
            Self::NotAnAttribute { target, name } => {
                write!(f, "member `{name}` on {target} is an operation, not an attribute")
            }
            Self::Operation { operation, message } => {
                write!(f, "operation `{operation}` failed: {message}")
            }
        }
    }
}

impl Error for ExtensionError {}
