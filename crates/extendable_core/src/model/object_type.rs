//! Types as values: the builder and the frozen type.
//!
//! # Responsibility
//! - Define base types through `TypeBuilder` with construction-time
//!   duplicate detection.
//! - Freeze builders into immutable, shareable `ObjectType`s.
//!
//! # Invariants
//! - Every built or derived type gets a fresh `TypeId`.
//! - `derive` copies the member table; the source type is never touched.
//! - Only the composition engine derives builders from existing types.

use crate::error::{ExtensionError, ExtensionResult};
use crate::extension::contract::{Extension, ExtensionSet};
use crate::model::instance::Instance;
use crate::model::member::{is_reserved_member_name, validate_member_name, Member, Operation};
use crate::model::value::{CallArgs, Value};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use uuid::Uuid;

/// Name of the constructor operation run by `ObjectType::instantiate`.
pub const INIT_OPERATION: &str = "init";

/// Stable identity of one built or composed type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TypeId(Uuid);

impl TypeId {
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Display for TypeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Mutable type definition.
///
/// Used two ways: to define a base type (`new` + `attribute`/`operation` +
/// `build`), and as the derived copy that composition hands to units
/// through an `ExtensionTarget`.
#[derive(Debug)]
pub struct TypeBuilder {
    name: String,
    base_id: Option<TypeId>,
    members: BTreeMap<String, Member>,
    extensions: ExtensionSet,
    definition_errors: Vec<ExtensionError>,
}

impl TypeBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_id: None,
            members: BTreeMap::new(),
            extensions: ExtensionSet::default(),
            definition_errors: Vec::new(),
        }
    }

    /// Defines a base attribute. Errors surface from `build`.
    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.define(name.into(), Member::Attribute(value.into()));
        self
    }

    /// Defines a base operation. Errors surface from `build`.
    pub fn operation<F>(mut self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&mut Instance, &CallArgs) -> ExtensionResult<Value> + Send + Sync + 'static,
    {
        self.define(name.into(), Member::Operation(Operation::new(body)));
        self
    }

    /// Freezes the definition into a shareable type.
    ///
    /// # Errors
    /// - `InvalidMemberName` for a malformed member name.
    /// - `NameCollision` when one name was defined twice or is a reserved
    ///   facade name.
    pub fn build(self) -> ExtensionResult<Arc<ObjectType>> {
        if let Some(err) = self.definition_errors.first() {
            return Err(err.clone());
        }
        let object_type = self.freeze();
        debug!(
            "event=type_build module=model status=ok type={} id={} members={}",
            object_type.name,
            object_type.id,
            object_type.members.len()
        );
        Ok(Arc::new(object_type))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.get(name)
    }

    pub fn has_member(&self, name: &str) -> bool {
        self.members.contains_key(name)
    }

    pub fn member_names(&self) -> impl Iterator<Item = &str> {
        self.members.keys().map(String::as_str)
    }

    /// Extensions already applied to this definition.
    pub fn extensions(&self) -> &ExtensionSet {
        &self.extensions
    }

    pub(crate) fn describe(&self) -> String {
        format!("type `{}`", self.name)
    }

    /// Writes without any resolution check. Callers own collision policy.
    pub(crate) fn insert_member(&mut self, name: String, member: Member) {
        self.members.insert(name, member);
    }

    pub(crate) fn record_extension(&mut self, extension: Arc<dyn Extension>) {
        self.extensions.push(extension);
    }

    pub(crate) fn freeze(self) -> ObjectType {
        ObjectType {
            id: TypeId::generate(),
            name: self.name,
            base_id: self.base_id,
            members: self.members,
            extensions: self.extensions,
        }
    }

    fn define(&mut self, name: String, member: Member) {
        if let Err(err) = validate_member_name(&name) {
            self.definition_errors.push(err);
            return;
        }
        if is_reserved_member_name(&name) || self.members.contains_key(&name) {
            self.definition_errors.push(ExtensionError::NameCollision {
                target: self.describe(),
                name,
            });
            return;
        }
        self.members.insert(name, member);
    }
}

/// Immutable type: member table plus the record of applied extensions.
#[derive(Debug)]
pub struct ObjectType {
    id: TypeId,
    name: String,
    base_id: Option<TypeId>,
    members: BTreeMap<String, Member>,
    pub(crate) extensions: ExtensionSet,
}

impl ObjectType {
    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Id of the type this one was composed from, `None` for base types.
    pub fn base_id(&self) -> Option<TypeId> {
        self.base_id
    }

    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.get(name)
    }

    pub fn has_member(&self, name: &str) -> bool {
        self.members.contains_key(name)
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.member(name).and_then(Member::as_attribute)
    }

    pub fn operation(&self, name: &str) -> Option<&Operation> {
        self.member(name).and_then(Member::as_operation)
    }

    pub fn member_names(&self) -> impl Iterator<Item = &str> {
        self.members.keys().map(String::as_str)
    }

    /// Creates an instance and runs `init` when the type defines one.
    pub fn instantiate(self: &Arc<Self>, args: CallArgs) -> ExtensionResult<Instance> {
        let mut instance = Instance::new(Arc::clone(self));
        if let Some(init) = self.operation(INIT_OPERATION) {
            init.invoke(&mut instance, &args)?;
        }
        Ok(instance)
    }

    pub(crate) fn describe(&self) -> String {
        format!("type `{}`", self.name)
    }

    /// Structural copy with an independent member table.
    pub(crate) fn derive(&self) -> TypeBuilder {
        TypeBuilder {
            name: self.name.clone(),
            base_id: Some(self.id),
            members: self.members.clone(),
            extensions: self.extensions.clone(),
            definition_errors: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{TypeBuilder, INIT_OPERATION};
    use crate::error::ExtensionError;
    use crate::model::value::CallArgs;
    use serde_json::{json, Value};

    #[test]
    fn build_assigns_fresh_ids() {
        let first = TypeBuilder::new("Point").build().expect("empty type builds");
        let second = TypeBuilder::new("Point").build().expect("empty type builds");

        assert_ne!(first.id(), second.id());
        assert_eq!(first.base_id(), None);
    }

    #[test]
    fn build_rejects_duplicate_definitions() {
        let err = TypeBuilder::new("Point")
            .attribute("x", 0)
            .operation("x", |_, _| Ok(Value::Null))
            .build()
            .expect_err("duplicate member must fail");

        assert_eq!(
            err,
            ExtensionError::NameCollision {
                target: "type `Point`".to_string(),
                name: "x".to_string(),
            }
        );
    }

    #[test]
    fn build_rejects_reserved_facade_names() {
        for reserved in ["extensions", "extension_data"] {
            let err = TypeBuilder::new("Keeper")
                .attribute(reserved, 1)
                .build()
                .expect_err("reserved name must fail");
            assert_eq!(
                err,
                ExtensionError::NameCollision {
                    target: "type `Keeper`".to_string(),
                    name: reserved.to_string(),
                }
            );
        }
    }

    #[test]
    fn build_rejects_malformed_names() {
        let err = TypeBuilder::new("Point")
            .attribute("not a name", 0)
            .build()
            .expect_err("malformed member name must fail");
        assert!(matches!(err, ExtensionError::InvalidMemberName(_)));
    }

    #[test]
    fn derive_copies_members_into_independent_table() {
        let base = TypeBuilder::new("Point")
            .attribute("x", 1)
            .build()
            .expect("base builds");

        let mut derived = base.derive();
        derived.insert_member("y".to_string(), json!(2).into());
        let derived = derived.freeze();

        assert!(derived.has_member("x"));
        assert!(derived.has_member("y"));
        assert!(!base.has_member("y"));
        assert_eq!(derived.base_id(), Some(base.id()));
        assert_ne!(derived.id(), base.id());
    }

    #[test]
    fn instantiate_runs_init_with_arguments() {
        let point = TypeBuilder::new("Point")
            .operation(INIT_OPERATION, |receiver, args| {
                let x = args.arg(0).cloned().unwrap_or(Value::Null);
                receiver.extension_data_mut().insert("x".to_string(), x);
                Ok(Value::Null)
            })
            .build()
            .expect("type builds");

        let instance = point
            .instantiate(CallArgs::from_positional([json!(7)]))
            .expect("init succeeds");
        assert_eq!(instance.extension_data().get("x"), Some(&json!(7)));
    }

    #[test]
    fn instantiate_without_init_ignores_arguments() {
        let point = TypeBuilder::new("Point").build().expect("type builds");
        let instance = point
            .instantiate(CallArgs::from_positional([json!(7)]))
            .expect("instantiation without init succeeds");
        assert!(instance.extension_data().is_empty());
    }
}
