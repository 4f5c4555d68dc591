//! Collision-guarded member injection.
//!
//! # Invariants
//! - A name is injected at most once per target.
//! - A failed `set` leaves the target untouched.

use crate::error::{ExtensionError, ExtensionResult};
use crate::extension::contract::ExtensionTarget;
use crate::model::instance::Instance;
use crate::model::member::{is_reserved_member_name, validate_member_name, Member};
use crate::model::object_type::TypeBuilder;
use log::{trace, warn};
use private::Sealed;

mod private {
    use crate::model::member::Member;

    pub trait Sealed {
        fn insert_unchecked(&mut self, name: String, member: Member);
    }
}

/// Something members can be injected into: a type under construction (a
/// standalone builder or the handle given to `Extension::extend`) or a live
/// instance.
pub trait MemberTarget: private::Sealed {
    /// Human-readable target label used in errors and logs.
    fn describe(&self) -> String;

    /// Whether `name` already resolves on this target, including members
    /// reachable through its type.
    fn resolves(&self, name: &str) -> bool;
}

impl private::Sealed for TypeBuilder {
    fn insert_unchecked(&mut self, name: String, member: Member) {
        self.insert_member(name, member);
    }
}

impl MemberTarget for TypeBuilder {
    fn describe(&self) -> String {
        TypeBuilder::describe(self)
    }

    fn resolves(&self, name: &str) -> bool {
        is_reserved_member_name(name) || self.has_member(name)
    }
}

impl private::Sealed for ExtensionTarget<'_> {
    fn insert_unchecked(&mut self, name: String, member: Member) {
        self.insert_member(name, member);
    }
}

impl MemberTarget for ExtensionTarget<'_> {
    fn describe(&self) -> String {
        ExtensionTarget::describe(self)
    }

    fn resolves(&self, name: &str) -> bool {
        is_reserved_member_name(name) || self.has_member(name)
    }
}

impl private::Sealed for Instance {
    fn insert_unchecked(&mut self, name: String, member: Member) {
        self.insert_member(name, member);
    }
}

impl MemberTarget for Instance {
    fn describe(&self) -> String {
        Instance::describe(self)
    }

    fn resolves(&self, name: &str) -> bool {
        is_reserved_member_name(name) || self.has_member(name)
    }
}

/// Injects `member` under `name` only if the name is unused on `target`.
///
/// # Errors
/// - `InvalidMemberName` when `name` is not an identifier.
/// - `NameCollision` when `name` already resolves on `target`.
pub fn set<T>(target: &mut T, name: &str, member: impl Into<Member>) -> ExtensionResult<()>
where
    T: MemberTarget + ?Sized,
{
    validate_member_name(name)?;
    if target.resolves(name) {
        let target = target.describe();
        warn!(
            "event=member_set module=guard status=collision target={} name={}",
            target, name
        );
        return Err(ExtensionError::NameCollision {
            target,
            name: name.to_string(),
        });
    }

    target.insert_unchecked(name.to_string(), member.into());
    trace!(
        "event=member_set module=guard status=ok target={} name={}",
        target.describe(),
        name
    );
    Ok(())
}
