//! Base-type-side entry point.

use crate::error::ExtensionResult;
use crate::extension::compose::compose;
use crate::extension::contract::{Extension, ExtensionSet};
use crate::model::object_type::ObjectType;
use std::sync::Arc;

/// Composition facade exposed by every type.
pub trait Extendable {
    /// Units applied to this type; empty for base types.
    fn extensions(&self) -> &ExtensionSet;

    /// Derives a new type with `units` applied in argument order.
    fn compose(&self, units: &[Arc<dyn Extension>]) -> ExtensionResult<Arc<ObjectType>>;
}

impl Extendable for ObjectType {
    fn extensions(&self) -> &ExtensionSet {
        &self.extensions
    }

    fn compose(&self, units: &[Arc<dyn Extension>]) -> ExtensionResult<Arc<ObjectType>> {
        compose(self, units)
    }
}
