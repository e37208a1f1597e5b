//! Allocated object instances with named slot storage.
//!
//! An [`Instance`] is a cheap-clone handle to one allocated object: its
//! [`crate::typesystem::TypeShape`] plus a concurrent map of named storage slots.
//! Instances are produced either by the interception provider
//! (uninitialized allocation, default construction) or by constructor emulation.
//!
//! Slot storage is concurrent because intercepted members run on arbitrary test
//! threads; two threads reading and writing different slots of one instance must not
//! block each other.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;

use crate::typesystem::{TypeShapeRc, Value};

struct InstanceInner {
    shape: TypeShapeRc,
    slots: DashMap<String, Value>,
}

/// A handle to one allocated object.
///
/// Cloning an `Instance` clones the handle, not the object; all clones observe the
/// same slot storage. Equality between instances (and between `Value::Object`s) is
/// referential, via [`Instance::same_as`].
///
/// # Examples
///
/// ```rust
/// use dotmock::typesystem::{Instance, TypeShapeBuilder, Value, ValueKind};
///
/// let shape = TypeShapeBuilder::new("Person")
///     .slot("_name", ValueKind::String)
///     .build();
///
/// let person = Instance::uninitialized(&shape);
/// assert_eq!(person.slot("_name"), Some(Value::String(String::new())));
///
/// assert!(person.set_slot("_name", Value::from("X")));
/// assert_eq!(person.slot("_name"), Some(Value::from("X")));
///
/// let alias = person.clone();
/// assert!(alias.same_as(&person));
/// ```
#[derive(Clone)]
pub struct Instance {
    inner: Arc<InstanceInner>,
}

impl Instance {
    /// Allocates an instance without running any constructor.
    ///
    /// Every declared slot is zero-filled with [`Value::default_of`] for its kind.
    /// This is the allocation primitive behind
    /// [`crate::InterceptionProvider::allocate_uninitialized`].
    #[must_use]
    pub fn uninitialized(shape: &TypeShapeRc) -> Self {
        let slots = DashMap::new();
        for slot in shape.slots() {
            slots.insert(slot.name.clone(), Value::default_of(slot.kind));
        }

        Instance {
            inner: Arc::new(InstanceInner {
                shape: shape.clone(),
                slots,
            }),
        }
    }

    /// Returns the shape this instance was allocated from
    #[must_use]
    pub fn shape(&self) -> &TypeShapeRc {
        &self.inner.shape
    }

    /// Reads a slot by name. Returns `None` for undeclared slots.
    #[must_use]
    pub fn slot(&self, name: &str) -> Option<Value> {
        self.inner.slots.get(name).map(|entry| entry.value().clone())
    }

    /// Writes a slot by name. Returns false (and writes nothing) for undeclared slots.
    pub fn set_slot(&self, name: &str, value: Value) -> bool {
        match self.inner.slots.get_mut(name) {
            Some(mut entry) => {
                *entry.value_mut() = value;
                true
            }
            None => false,
        }
    }

    /// Returns true if both handles refer to the same allocation.
    #[must_use]
    pub fn same_as(&self, other: &Instance) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Instance({} @ {:p})",
            self.inner.shape.name(),
            Arc::as_ptr(&self.inner)
        )
    }
}
