//! Members stored in type and instance tables.

use crate::error::{ExtensionError, ExtensionResult};
use crate::model::instance::Instance;
use crate::model::value::{CallArgs, Value};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

static MEMBER_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid member name regex"));

/// Facade accessor names. They always resolve, so nothing may be injected
/// under them.
pub const RESERVED_MEMBER_NAMES: &[&str] = &["extensions", "extension_data"];

type OperationFn = dyn Fn(&mut Instance, &CallArgs) -> ExtensionResult<Value> + Send + Sync;

/// Shared callable bound to a receiver at call time.
#[derive(Clone)]
pub struct Operation {
    body: Arc<OperationFn>,
}

impl Operation {
    pub fn new<F>(body: F) -> Self
    where
        F: Fn(&mut Instance, &CallArgs) -> ExtensionResult<Value> + Send + Sync + 'static,
    {
        Self {
            body: Arc::new(body),
        }
    }

    pub fn invoke(&self, receiver: &mut Instance, args: &CallArgs) -> ExtensionResult<Value> {
        (self.body)(receiver, args)
    }

    /// Returns whether both handles share one implementation.
    pub fn same_as(&self, other: &Operation) -> bool {
        Arc::ptr_eq(&self.body, &other.body)
    }
}

impl Debug for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("Operation(..)")
    }
}

/// One named entry of a member table.
#[derive(Debug, Clone)]
pub enum Member {
    Attribute(Value),
    Operation(Operation),
}

impl Member {
    pub fn as_attribute(&self) -> Option<&Value> {
        match self {
            Self::Attribute(value) => Some(value),
            Self::Operation(_) => None,
        }
    }

    pub fn as_operation(&self) -> Option<&Operation> {
        match self {
            Self::Attribute(_) => None,
            Self::Operation(operation) => Some(operation),
        }
    }

    pub fn is_operation(&self) -> bool {
        matches!(self, Self::Operation(_))
    }
}

impl From<Value> for Member {
    fn from(value: Value) -> Self {
        Self::Attribute(value)
    }
}

impl From<Operation> for Member {
    fn from(value: Operation) -> Self {
        Self::Operation(value)
    }
}

/// Rejects names that are not plain identifiers.
pub fn validate_member_name(name: &str) -> ExtensionResult<()> {
    if MEMBER_NAME_RE.is_match(name) {
        Ok(())
    } else {
        Err(ExtensionError::InvalidMemberName(name.to_string()))
    }
}

pub fn is_reserved_member_name(name: &str) -> bool {
    RESERVED_MEMBER_NAMES.contains(&name)
}
