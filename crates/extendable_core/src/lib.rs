//! Composable behavior injection for dynamic object types.
//!
//! A base [`ObjectType`] is composed with an ordered list of [`Extension`]
//! units into a new type. Units add members through the collision guard
//! ([`set`]) and intercept existing operations ([`wrap`]); the base type is
//! never modified.

pub mod error;
pub mod extension;
pub mod logging;
pub mod model;

pub use error::{ExtensionError, ExtensionResult};
pub use extension::compose::compose;
pub use extension::contract::{validate_extension_id, Extension, ExtensionSet, ExtensionTarget};
pub use extension::extendable::Extendable;
pub use extension::guard::{set, MemberTarget};
pub use extension::intercept::{observe, wrap, wrap_before_after, CallSnapshot, Invocation};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig};
pub use model::instance::Instance;
pub use model::member::{Member, Operation, RESERVED_MEMBER_NAMES};
pub use model::object_type::{ObjectType, TypeBuilder, TypeId, INIT_OPERATION};
pub use model::value::{CallArgs, Value};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
