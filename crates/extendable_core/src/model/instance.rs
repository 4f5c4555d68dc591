//! Instances of object types.
//!
//! # Invariants
//! - Lookups resolve own members first, then the type's members.
//! - Writing an inherited attribute copies it into the instance table; the
//!   shared type is never written through an instance.

use crate::error::{ExtensionError, ExtensionResult};
use crate::extension::contract::ExtensionSet;
use crate::extension::extendable::Extendable;
use crate::model::member::{Member, Operation};
use crate::model::object_type::ObjectType;
use crate::model::value::{CallArgs, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct Instance {
    object_type: Arc<ObjectType>,
    members: BTreeMap<String, Member>,
    extension_data: BTreeMap<String, Value>,
}

impl Instance {
    pub(crate) fn new(object_type: Arc<ObjectType>) -> Self {
        Self {
            object_type,
            members: BTreeMap::new(),
            extension_data: BTreeMap::new(),
        }
    }

    pub fn object_type(&self) -> &Arc<ObjectType> {
        &self.object_type
    }

    /// Extensions carried by this instance's type.
    pub fn extensions(&self) -> &ExtensionSet {
        self.object_type.extensions()
    }

    /// Scratch metadata that extensions may share per instance.
    pub fn extension_data(&self) -> &BTreeMap<String, Value> {
        &self.extension_data
    }

    pub fn extension_data_mut(&mut self) -> &mut BTreeMap<String, Value> {
        &mut self.extension_data
    }

    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members
            .get(name)
            .or_else(|| self.object_type.member(name))
    }

    pub fn has_member(&self, name: &str) -> bool {
        self.member(name).is_some()
    }

    /// Reads an attribute, own or inherited.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.member(name).and_then(Member::as_attribute)
    }

    /// Mutable access to an existing attribute.
    ///
    /// # Errors
    /// - `MemberNotFound` when `name` does not resolve.
    /// - `NotAnAttribute` when `name` resolves to an operation.
    pub fn attribute_mut(&mut self, name: &str) -> ExtensionResult<&mut Value> {
        if !self.members.contains_key(name) {
            let inherited = match self.object_type.member(name) {
                Some(Member::Attribute(value)) => value.clone(),
                Some(Member::Operation(_)) => return Err(self.not_an_attribute(name)),
                None => return Err(self.not_found(name)),
            };
            self.members
                .insert(name.to_string(), Member::Attribute(inherited));
        }

        let not_an_attribute = self.not_an_attribute(name);
        match self.members.get_mut(name) {
            Some(Member::Attribute(value)) => Ok(value),
            _ => Err(not_an_attribute),
        }
    }

    /// Replaces the value of an existing attribute.
    ///
    /// Unlike `guard::set`, this never introduces a new name.
    pub fn assign(&mut self, name: &str, value: impl Into<Value>) -> ExtensionResult<()> {
        *self.attribute_mut(name)? = value.into();
        Ok(())
    }

    /// Calls an operation with this instance as receiver.
    pub fn call(&mut self, name: &str, args: CallArgs) -> ExtensionResult<Value> {
        let operation = self.resolve_operation(name)?;
        operation.invoke(self, &args)
    }

    pub(crate) fn describe(&self) -> String {
        format!("instance of `{}`", self.object_type.name())
    }

    pub(crate) fn insert_member(&mut self, name: String, member: Member) {
        self.members.insert(name, member);
    }

    fn resolve_operation(&self, name: &str) -> ExtensionResult<Operation> {
        match self.member(name) {
            Some(Member::Operation(operation)) => Ok(operation.clone()),
            Some(Member::Attribute(_)) => Err(ExtensionError::NotAnOperation {
                target: self.describe(),
                name: name.to_string(),
            }),
            None => Err(self.not_found(name)),
        }
    }

    fn not_found(&self, name: &str) -> ExtensionError {
        ExtensionError::MemberNotFound {
            target: self.describe(),
            name: name.to_string(),
        }
    }

    fn not_an_attribute(&self, name: &str) -> ExtensionError {
        ExtensionError::NotAnAttribute {
            target: self.describe(),
            name: name.to_string(),
        }
    }
}
