//! Extension unit contract and the frozen record of applied units.

use crate::error::{ExtensionError, ExtensionResult};
use crate::model::member::Member;
use crate::model::object_type::{ObjectType, TypeBuilder};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

static EXTENSION_ID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9]+(?:[._-][a-z0-9]+)*$").expect("valid extension id regex")
});

/// Capability contract every extension unit implements.
///
/// Units are stateless descriptors. Within `extend` the only sanctioned
/// mutations are `guard::set` and `intercept::wrap` (or its conveniences).
pub trait Extension: Send + Sync {
    /// Stable identifier, e.g. `builtin.listener`.
    fn id(&self) -> &str;

    /// Pure applicability check against the base type.
    fn can_extend(&self, base: &ObjectType) -> bool;

    /// Applies this unit's modifications to a derived type.
    ///
    /// Applying to two different derived types is always valid; applying
    /// twice to the same one fails with `NameCollision`.
    fn extend(&self, target: &mut ExtensionTarget<'_>) -> ExtensionResult<()>;
}

/// Narrow handle on a type under construction, handed to `Extension::extend`.
///
/// Offers read access plus the two guarded writes (`guard::set` and
/// `intercept::wrap`). The handle only borrows the definition: replacing
/// it redirects later writes but never reaches the borrowed definition.
pub struct ExtensionTarget<'a> {
    builder: &'a mut TypeBuilder,
}

impl<'a> ExtensionTarget<'a> {
    pub fn new(builder: &'a mut TypeBuilder) -> Self {
        Self { builder }
    }

    pub fn name(&self) -> &str {
        self.builder.name()
    }

    pub fn member(&self, name: &str) -> Option<&Member> {
        self.builder.member(name)
    }

    pub fn has_member(&self, name: &str) -> bool {
        self.builder.has_member(name)
    }

    pub fn member_names(&self) -> impl Iterator<Item = &str> {
        self.builder.member_names()
    }

    /// Units applied to the definition before this one.
    pub fn extensions(&self) -> &ExtensionSet {
        self.builder.extensions()
    }

    pub(crate) fn describe(&self) -> String {
        self.builder.describe()
    }

    pub(crate) fn insert_member(&mut self, name: String, member: Member) {
        self.builder.insert_member(name, member);
    }
}

/// Validates an extension id.
///
/// Ids are lowercase ascii alphanumerics split by single `.`, `_` or `-`
/// separators, and never start or end with a separator.
pub fn validate_extension_id(id: &str) -> ExtensionResult<()> {
    if EXTENSION_ID_RE.is_match(id) {
        Ok(())
    } else {
        Err(ExtensionError::InvalidExtensionId(id.to_string()))
    }
}

/// Frozen record of the units applied to a type.
///
/// Iterates in application order; equality is set equality over ids.
#[derive(Clone, Default)]
pub struct ExtensionSet {
    entries: Vec<Arc<dyn Extension>>,
}

impl ExtensionSet {
    pub fn ids(&self) -> BTreeSet<&str> {
        self.entries.iter().map(|entry| entry.id()).collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|entry| entry.id() == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Extension>> {
        self.entries.iter()
    }

    /// Ids in the order the units were applied.
    pub fn application_order(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.id()).collect()
    }

    pub(crate) fn push(&mut self, extension: Arc<dyn Extension>) {
        self.entries.push(extension);
    }
}

impl PartialEq for ExtensionSet {
    fn eq(&self, other: &Self) -> bool {
        self.ids() == other.ids()
    }
}

impl Eq for ExtensionSet {}

impl Debug for ExtensionSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_set()
            .entries(self.entries.iter().map(|entry| entry.id()))
            .finish()
    }
}
