//! Dynamic object model that extensions operate on.
//!
//! # Responsibility
//! - Represent a type as a value: a name, a stable id and a member table of
//!   attributes and operations.
//! - Represent instances that dispatch calls through their type.
//!
//! # Invariants
//! - A frozen `ObjectType` is never mutated; derivation always copies.
//! - A member name resolves to at most one member per table.

pub mod instance;
pub mod member;
pub mod object_type;
pub mod value;
