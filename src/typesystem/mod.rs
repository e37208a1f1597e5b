//! Explicit model of host types, values and instances.
//!
//! The interception core cannot reflect over the host runtime, so everything it needs
//! to know about a type is captured up front in this module:
//!
//! - [`ValueKind`] / [`Value`] - the CIL-flavored primitive set exchanged with
//!   intercepted members
//! - [`TypeShape`] / [`TypeShapeRc`] - immutable type descriptions (slots,
//!   properties, methods, constructors) built via [`TypeShapeBuilder`]
//! - [`Instance`] - an allocated object with concurrent named-slot storage
//!
//! # Architecture
//!
//! Shapes are immutable and shared (`Arc`); instances carry their shape plus mutable
//! slot storage. Member resolution and [`crate::MemberKey`] derivation live on the
//! shape so that every component (engine, registry, emulator, host) derives
//! identical keys for the same member.

mod builder;
mod instance;
mod shape;
mod value;

pub use builder::{backing_slot_name, TypeShapeBuilder};
pub use instance::Instance;
pub use shape::{
    CtorShape, MethodShape, PropertyShape, SlotShape, SlotVisibility, TypeAttributes, TypeShape,
    TypeShapeRc,
};
pub use value::{Value, ValueKind};
