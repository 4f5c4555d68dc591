//! Call interception around existing operations.
//!
//! # Responsibility
//! - Replace an operation with a wrapper that runs a hook around the
//!   pre-wrap implementation.
//! - Enforce the continuation contract: a hook proceeds exactly once.
//!
//! # Invariants
//! - Wrapping the same operation twice layers like an onion; the later wrap
//!   is the outer one.
//! - The original implementation sees the arguments as the hook left them
//!   at `proceed`, and the caller sees the value the hook returns.
//! - The original never runs twice for one call.

use crate::error::{ExtensionError, ExtensionResult};
use crate::extension::contract::ExtensionTarget;
use crate::model::instance::Instance;
use crate::model::member::{Member, Operation};
use crate::model::value::{CallArgs, Value};
use log::{debug, warn};
use serde::Serialize;
use std::collections::BTreeMap;

/// One in-flight call of a wrapped operation, as seen by its hook.
pub struct Invocation<'a> {
    operation: &'a str,
    receiver: &'a mut Instance,
    args: CallArgs,
    original: &'a Operation,
    proceeded: u8,
}

impl Invocation<'_> {
    /// Name of the wrapped operation.
    pub fn operation(&self) -> &str {
        self.operation
    }

    pub fn receiver(&self) -> &Instance {
        &*self.receiver
    }

    pub fn receiver_mut(&mut self) -> &mut Instance {
        &mut *self.receiver
    }

    pub fn args(&self) -> &CallArgs {
        &self.args
    }

    /// Arguments handed to the original at `proceed`.
    pub fn args_mut(&mut self) -> &mut CallArgs {
        &mut self.args
    }

    /// Runs the wrapped implementation and returns its result.
    ///
    /// # Errors
    /// - `ContractViolation` when called a second time; the original is not
    ///   run again.
    /// - Any error of the wrapped implementation.
    pub fn proceed(&mut self) -> ExtensionResult<Value> {
        if self.proceeded > 0 {
            self.proceeded = self.proceeded.saturating_add(1);
            return Err(self.contract_violation());
        }
        self.proceeded = 1;
        self.original.invoke(&mut *self.receiver, &self.args)
    }

    fn contract_violation(&self) -> ExtensionError {
        ExtensionError::ContractViolation {
            operation: self.operation.to_string(),
            proceeded: self.proceeded,
        }
    }
}

/// Wraps `name` on `target` so that `hook` runs around the current
/// implementation.
///
/// The hook runs its "before" logic, calls `Invocation::proceed` exactly
/// once, runs its "after" logic and returns the value the caller observes.
///
/// # Errors
/// - `MemberNotFound` when `name` does not resolve on `target`.
/// - `NotAnOperation` when `name` is an attribute.
///
/// Calls of the wrapped operation fail with `ContractViolation` when the
/// hook returns without proceeding or proceeds twice.
pub fn wrap<F>(target: &mut ExtensionTarget<'_>, name: &str, hook: F) -> ExtensionResult<()>
where
    F: Fn(&mut Invocation<'_>) -> ExtensionResult<Value> + Send + Sync + 'static,
{
    let original = match target.member(name) {
        Some(Member::Operation(operation)) => operation.clone(),
        Some(Member::Attribute(_)) => {
            return Err(ExtensionError::NotAnOperation {
                target: target.describe(),
                name: name.to_string(),
            })
        }
        None => {
            return Err(ExtensionError::MemberNotFound {
                target: target.describe(),
                name: name.to_string(),
            })
        }
    };

    let operation_name = name.to_string();
    let wrapped = Operation::new(move |receiver, args| {
        let mut invocation = Invocation {
            operation: &operation_name,
            receiver,
            args: args.clone(),
            original: &original,
            proceeded: 0,
        };
        let result = hook(&mut invocation)?;
        if invocation.proceeded != 1 {
            warn!(
                "event=intercept module=intercept status=contract_violation operation={} proceeded={}",
                operation_name, invocation.proceeded
            );
            return Err(invocation.contract_violation());
        }
        Ok(result)
    });

    target.insert_member(name.to_string(), Member::Operation(wrapped));
    debug!(
        "event=wrap module=intercept status=ok type={} operation={}",
        target.name(),
        name
    );
    Ok(())
}

/// Two-callback form of `wrap`.
///
/// `before` may rewrite the arguments; `after` receives the original's
/// result and returns the value the caller observes.
pub fn wrap_before_after<B, A>(
    target: &mut ExtensionTarget<'_>,
    name: &str,
    before: B,
    after: A,
) -> ExtensionResult<()>
where
    B: Fn(&mut Instance, &mut CallArgs) -> ExtensionResult<()> + Send + Sync + 'static,
    A: Fn(&mut Instance, &CallArgs, Value) -> ExtensionResult<Value> + Send + Sync + 'static,
{
    wrap(target, name, move |invocation| {
        before(&mut *invocation.receiver, &mut invocation.args)?;
        let result = invocation.proceed()?;
        after(&mut *invocation.receiver, &invocation.args, result)
    })
}

/// Copy of one call's state handed to `observe` callbacks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallSnapshot {
    pub operation: String,
    pub args: CallArgs,
    /// `extension_data` of the receiver before the call ran.
    pub extension_data: BTreeMap<String, Value>,
    /// Present only for the `after` callback.
    pub result: Option<Value>,
}

/// Read-only interception: callbacks get copies and cannot change the
/// arguments, the receiver or the result.
pub fn observe<B, A>(
    target: &mut ExtensionTarget<'_>,
    name: &str,
    before: B,
    after: A,
) -> ExtensionResult<()>
where
    B: Fn(&CallSnapshot) + Send + Sync + 'static,
    A: Fn(&CallSnapshot) + Send + Sync + 'static,
{
    wrap(target, name, move |invocation| {
        let mut snapshot = CallSnapshot {
            operation: invocation.operation.to_string(),
            args: invocation.args.clone(),
            extension_data: invocation.receiver.extension_data().clone(),
            result: None,
        };
        before(&snapshot);
        let result = invocation.proceed()?;
        snapshot.result = Some(result.clone());
        after(&snapshot);
        Ok(result)
    })
}
