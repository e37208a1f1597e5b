//! Constructor emulation: initialized instances without real constructor bodies.
//!
//! A constructor-fields replacement does not compute a return value; it computes a
//! bag of field assignments applied to a not-yet-initialized instance. This module
//! provides the [`FieldBag`] the initializer populates, the three-tier resolution
//! policy that maps bag names onto instance storage, and the [`emulate`] entry point
//! that ties allocation, initialization and application together.
//!
//! # Resolution Policy
//!
//! Each bag name is resolved against the instance's shape using, in order:
//!
//! 1. an exact storage slot with that name, of any visibility;
//! 2. the compiler-synthesized backing slot of a property with that name
//!    (`<Name>k__BackingField`);
//! 3. the storage of a writable property with that name.
//!
//! The first match wins. A name matching none of the three fails with
//! [`crate::Error::FieldResolution`].
//!
//! # Side Effects
//!
//! The real constructor body never executes: counters it would increment, validation
//! it would run and calls it would make all stay absent. The same emulation is used
//! for every intercepted `new` call site, so each construction yields a fresh
//! instance built exactly this way.

use std::sync::Arc;

use crate::{
    provider::InterceptionProvider,
    registry::FieldInitFn,
    typesystem::{Instance, TypeShapeRc, Value},
    Result,
};

/// One slot assignment produced by a constructor-fields initializer.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldAssignment {
    /// The slot (or property) name to resolve
    pub slot: String,
    /// The value to store
    pub value: Value,
}

/// Ordered collection of slot assignments an initializer populates.
///
/// Users fill the bag instead of assigning instance storage directly; assignments
/// are applied in insertion order, so a repeated name ends up with its last value.
///
/// # Examples
///
/// ```rust
/// use dotmock::emulator::FieldBag;
/// use dotmock::typesystem::Value;
///
/// let mut bag = FieldBag::new();
/// bag.set("_name", Value::from("X"));
/// bag.set("Age", Value::I4(7));
/// assert_eq!(bag.len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct FieldBag {
    assignments: Vec<FieldAssignment>,
}

impl FieldBag {
    /// Creates an empty bag.
    #[must_use]
    pub fn new() -> Self {
        FieldBag::default()
    }

    /// Appends an assignment for `slot`.
    pub fn set(&mut self, slot: impl Into<String>, value: Value) {
        self.assignments.push(FieldAssignment {
            slot: slot.into(),
            value,
        });
    }

    /// Returns the number of assignments in the bag
    #[must_use]
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    /// Returns true if the bag holds no assignments
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Iterates the assignments in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldAssignment> {
        self.assignments.iter()
    }
}

/// Applies a populated bag to an instance using the three-tier resolution policy.
///
/// # Errors
/// Returns [`crate::Error::FieldResolution`] for the first name that matches no
/// tier; assignments before it have already been applied.
pub fn apply(instance: &Instance, bag: &FieldBag) -> Result<()> {
    let shape = instance.shape().clone();

    for assignment in bag.iter() {
        let target = resolve_slot(&shape, &assignment.slot).ok_or_else(|| {
            crate::Error::FieldResolution {
                slot: assignment.slot.clone(),
                type_name: shape.name().to_string(),
            }
        })?;

        instance.set_slot(&target, assignment.value.clone());
    }

    Ok(())
}

/// Resolves a bag name to the storage slot it addresses, or `None`.
fn resolve_slot(shape: &TypeShapeRc, name: &str) -> Option<String> {
    // Tier one: exact slot, any visibility.
    if shape.slot(name).is_some() {
        return Some(name.to_string());
    }

    if let Some(property) = shape.find_property(name) {
        // Tier two: synthesized backing slot of an auto-property.
        if let Some(backing) = &property.backing_slot {
            return Some(backing.clone());
        }

        // Tier three: storage of a writable property.
        if property.has_setter {
            if let Some(setter_slot) = &property.setter_slot {
                return Some(setter_slot.clone());
            }
        }
    }

    None
}

/// Runs an initializer against an already-allocated instance and applies the bag.
///
/// This is the shared core between eager emulation and intercepted `new` call
/// sites: the caller supplies the allocation, this function supplies the empty bag,
/// the initializer call and the application.
///
/// # Errors
/// Propagates initializer failures unchanged and bag application failures as
/// [`crate::Error::FieldResolution`].
pub fn initialize(instance: &Instance, initializer: &FieldInitFn, args: &[Value]) -> Result<()> {
    let mut bag = FieldBag::new();
    initializer(instance, &mut bag, args)?;
    apply(instance, &bag)
}

/// Builds one emulated instance: allocate uninitialized, initialize, apply.
///
/// The real constructor body is never invoked; the provider's allocation primitive
/// produces the zero-filled instance the initializer decorates.
///
/// # Errors
/// Propagates allocation, initializer and field-resolution failures.
pub fn emulate(
    provider: &Arc<dyn InterceptionProvider>,
    shape: &TypeShapeRc,
    initializer: &FieldInitFn,
    args: &[Value],
) -> Result<Instance> {
    let instance = provider.allocate_uninitialized(shape)?;
    initialize(&instance, initializer, args)?;
    Ok(instance)
}
