//! Extension composition.
//!
//! This module defines the contract extension units implement, the two
//! mutation primitives they may use (`guard::set` and `intercept::wrap`),
//! and the engine that composes a base type with an ordered list of units.

pub mod compose;
pub mod contract;
pub mod extendable;
pub mod guard;
pub mod intercept;
