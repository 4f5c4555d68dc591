//! Composition engine: base type + ordered units -> extended type.
//!
//! # Invariants
//! - Validation (ids, duplicates, `can_extend`) finishes for every unit
//!   before anything is derived; a rejected unit leaves no trace.
//! - Units are applied in caller order on one fresh derived builder. Units
//!   only see it through an `ExtensionTarget`, so the builder itself can
//!   never be replaced from inside `extend`.
//! - A failing `extend` drops the builder; it is never returned.
//! - Every call returns a new type, never a cached one.

use crate::error::{ExtensionError, ExtensionResult};
use crate::extension::contract::{validate_extension_id, Extension, ExtensionTarget};
use crate::model::object_type::ObjectType;
use log::{debug, info, warn};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Composes `base` with `units`, applied in order.
///
/// # Errors
/// - `InvalidExtensionId` for a malformed unit id.
/// - `DuplicateExtension` when an id repeats in `units` or is already
///   carried by `base`.
/// - `IncompatibleExtension` when a unit's `can_extend` rejects `base`.
/// - Any error raised by a unit's `extend` (`NameCollision`,
///   `MemberNotFound`, ...), propagated unchanged.
pub fn compose(
    base: &ObjectType,
    units: &[Arc<dyn Extension>],
) -> ExtensionResult<Arc<ObjectType>> {
    validate_units(base, units)?;

    let mut derived = base.derive();
    for unit in units {
        if let Err(err) = unit.extend(&mut ExtensionTarget::new(&mut derived)) {
            warn!(
                "event=compose module=compose status=error stage=extend base={} extension={} error={}",
                base.name(),
                unit.id(),
                err
            );
            return Err(err);
        }
        derived.record_extension(Arc::clone(unit));
        debug!(
            "event=extension_applied module=compose status=ok base={} extension={}",
            base.name(),
            unit.id()
        );
    }

    let extended = Arc::new(derived.freeze());
    info!(
        "event=compose module=compose status=ok base={} base_id={} type_id={} extensions={}",
        base.name(),
        base.id(),
        extended.id(),
        units.len()
    );
    Ok(extended)
}

fn validate_units(base: &ObjectType, units: &[Arc<dyn Extension>]) -> ExtensionResult<()> {
    let mut seen = BTreeSet::<&str>::new();
    for unit in units {
        let id = unit.id();
        let checked = validate_extension_id(id).and_then(|()| {
            if base.extensions.contains(id) || !seen.insert(id) {
                return Err(ExtensionError::DuplicateExtension(id.to_string()));
            }
            if !unit.can_extend(base) {
                return Err(ExtensionError::IncompatibleExtension {
                    extension: id.to_string(),
                    base: base.name().to_string(),
                });
            }
            Ok(())
        });

        if let Err(err) = checked {
            warn!(
                "event=compose module=compose status=error stage=validate base={} extension={} error={}",
                base.name(),
                id,
                err
            );
            return Err(err);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::compose;
    use crate::error::{ExtensionError, ExtensionResult};
    use crate::extension::contract::{Extension, ExtensionTarget};
    use crate::extension::guard::set;
    use crate::model::object_type::{ObjectType, TypeBuilder};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Flag {
        id: &'static str,
        compatible: bool,
        applied: Arc<AtomicUsize>,
    }

    impl Flag {
        fn unit(
            id: &'static str,
            compatible: bool,
            applied: &Arc<AtomicUsize>,
        ) -> Arc<dyn Extension> {
            Arc::new(Self {
                id,
                compatible,
                applied: Arc::clone(applied),
            })
        }
    }

    impl Extension for Flag {
        fn id(&self) -> &str {
            self.id
        }

        fn can_extend(&self, _base: &ObjectType) -> bool {
            self.compatible
        }

        fn extend(&self, target: &mut ExtensionTarget<'_>) -> ExtensionResult<()> {
            self.applied.fetch_add(1, Ordering::SeqCst);
            set(target, "flag", json!(self.id))
        }
    }

    fn base() -> Arc<ObjectType> {
        TypeBuilder::new("Plain").build().expect("base builds")
    }

    #[test]
    fn rejects_incompatible_unit_before_applying_any() {
        let applied = Arc::new(AtomicUsize::new(0));
        let base = base();
        let units = [
            Flag::unit("ok", true, &applied),
            Flag::unit("nope", false, &applied),
        ];

        let err = compose(&base, &units).expect_err("incompatible unit");
        assert_eq!(
            err,
            ExtensionError::IncompatibleExtension {
                extension: "nope".to_string(),
                base: "Plain".to_string(),
            }
        );
        assert_eq!(applied.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn rejects_repeated_and_malformed_ids() {
        let applied = Arc::new(AtomicUsize::new(0));
        let base = base();

        let unit = Flag::unit("ok", true, &applied);
        let err = compose(&base, &[Arc::clone(&unit), unit]).expect_err("repeated id");
        assert_eq!(err, ExtensionError::DuplicateExtension("ok".to_string()));

        let err = compose(&base, &[Flag::unit("Bad Id", true, &applied)])
            .expect_err("malformed id");
        assert!(matches!(err, ExtensionError::InvalidExtensionId(_)));
        assert_eq!(applied.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn rejects_unit_already_carried_by_base() {
        let applied = Arc::new(AtomicUsize::new(0));
        let once = compose(&base(), &[Flag::unit("ok", true, &applied)]).expect("first compose");

        let err = compose(&once, &[Flag::unit("ok", true, &applied)]).expect_err("re-applied");
        assert_eq!(err, ExtensionError::DuplicateExtension("ok".to_string()));
    }

    #[test]
    fn extend_failure_aborts_composition() {
        let applied = Arc::new(AtomicUsize::new(0));
        let units = [
            Flag::unit("first", true, &applied),
            Flag::unit("second", true, &applied),
        ];

        let err = compose(&base(), &units).expect_err("second flag collides");
        assert!(matches!(err, ExtensionError::NameCollision { .. }));
        assert_eq!(applied.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn empty_unit_list_still_derives_a_fresh_type() {
        let base = base();
        let derived = compose(&base, &[]).expect("empty composition");

        assert_ne!(derived.id(), base.id());
        assert_eq!(derived.base_id(), Some(base.id()));
        assert!(derived.extensions.is_empty());
    }

    #[test]
    fn recomposition_sees_members_of_earlier_extensions() {
        let applied = Arc::new(AtomicUsize::new(0));
        let once = compose(&base(), &[Flag::unit("first", true, &applied)]).expect("first");
        let twice = compose(&once, &[Flag::unit("other", true, &applied)]);

        // `other` also injects `flag`, which `first` already owns.
        assert!(matches!(twice, Err(ExtensionError::NameCollision { .. })));
        assert_eq!(once.extensions.application_order(), vec!["first"]);
    }
}
