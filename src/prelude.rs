//! # dotmock Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the dotmock library. Import this module to get quick access to the essential
//! types for setting up and dispatching member replacements.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all dotmock operations
pub use crate::Error;

/// The result type used throughout dotmock
pub use crate::Result;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// Scoped mocking façade
pub use crate::engine::{classify, MemberSetup, MockEngine, MockStrategy, ProxyMockAdapter};

/// Reference interception provider
pub use crate::host::{CtorBody, InMemoryHost, MemberBody};

// ================================================================================================
// Member Identity
// ================================================================================================

/// Structural member identity and setup-time descriptors
pub use crate::member::{MemberDescriptor, MemberKey, MemberKind};

// ================================================================================================
// Type System
// ================================================================================================

/// Type shapes, runtime values and allocated instances
pub use crate::typesystem::{
    Instance, TypeShape, TypeShapeBuilder, TypeShapeRc, Value, ValueKind,
};

// ================================================================================================
// Registry and Dispatch
// ================================================================================================

/// The shared replacement registry and its entry types
pub use crate::registry::{
    FieldInitFn, ReplacementEntry, ReplacementKind, ReplacementRegistry, ValueFn, VoidFn,
};

/// The provider-facing dispatch protocol
pub use crate::dispatch::DispatchHook;

// ================================================================================================
// Interception Capability
// ================================================================================================

/// The provider contract and hook handle
pub use crate::provider::{HookHandle, InterceptionProvider};

/// Constructor-emulation field bag
pub use crate::emulator::FieldBag;
