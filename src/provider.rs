//! The external interception capability boundary.
//!
//! The physical mechanism that redirects a concrete member's execution into the
//! [`crate::DispatchHook`] lives entirely outside this crate: bytecode rewriting,
//! compile-time trampolines, an injected indirection layer, or function-pointer
//! substitution are all valid providers. This module specifies only the contract:
//! install/uninstall a hook per member, allocate an instance without running any
//! constructor, and construct through the real default path.
//!
//! # Dispatch Contract
//!
//! Before running a hooked member's real body, a provider must call the matching
//! [`crate::DispatchHook`] entry point. If the call signals "suppress", the provider
//! must skip the real body and, for value-returning members, surface the supplied
//! result as the call's return value. Members without an installed hook are never
//! dispatched.
//!
//! The crate ships one reference provider, [`crate::host::InMemoryHost`], which
//! realizes the contract as an injected indirection layer.

use std::fmt;

use crate::{
    typesystem::{Instance, TypeShapeRc},
    MemberKey, Result,
};

/// Opaque handle to one installed hook.
///
/// Returned by [`InterceptionProvider::install_hook`] and passed back verbatim to
/// [`InterceptionProvider::uninstall_hook`]. The registry stores the handle for the
/// lifetime of the member's outer registry entry and never inspects its value.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookHandle(pub u64);

impl HookHandle {
    /// Returns the raw handle value
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for HookHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HookHandle({})", self.0)
    }
}

impl fmt::Display for HookHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Capability contract for the low-level call-redirection mechanism.
///
/// All methods are synchronous and must be safe to call from concurrent test
/// threads. Failures are fatal to the triggering registry operation and propagate
/// unchanged; the core never retries.
pub trait InterceptionProvider: Send + Sync {
    /// Installs a hook on the given member so its execution is routed through the
    /// dispatch protocol.
    ///
    /// Must be idempotent: installing a hook for a member that already carries one
    /// returns the existing handle without a second physical install. The registry
    /// additionally serializes install calls per member, so a conforming provider
    /// will never observe two racing installs for one key.
    ///
    /// # Errors
    /// Returns [`crate::Error::Provider`] when the member cannot be hooked.
    fn install_hook(&self, key: &MemberKey) -> Result<HookHandle>;

    /// Removes a previously installed hook.
    ///
    /// # Errors
    /// Returns [`crate::Error::Provider`] when the handle is unknown or removal fails.
    fn uninstall_hook(&self, handle: HookHandle) -> Result<()>;

    /// Produces a live instance of the type without executing any constructor.
    ///
    /// Every declared slot holds its zero value afterwards. Constructor emulation
    /// builds on this primitive.
    ///
    /// # Errors
    /// Returns [`crate::Error::Provider`] when allocation fails, or
    /// [`crate::Error::TypeNotFound`] when the provider does not know the type.
    fn allocate_uninitialized(&self, shape: &TypeShapeRc) -> Result<Instance>;

    /// Constructs an instance through the type's real default-construction path.
    ///
    /// This is the plain-instance fallback used by `object()` when no constructor
    /// setup exists. If a constructor hook is installed for the type, construction
    /// is dispatched like any other intercepted `new` call site.
    ///
    /// # Errors
    /// Returns [`crate::Error::UnsupportedSetup`] when the type has no accessible
    /// parameterless constructor, or a provider/host error when construction fails.
    fn construct_default(&self, shape: &TypeShapeRc) -> Result<Instance>;
}
