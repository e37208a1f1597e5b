//! The proxy-strategy seam for interface and abstract types.
//!
//! Proxyable types do not need interception at all: an ordinary dynamic proxy can
//! satisfy the [`crate::MemberSetup`] contract without touching the replacement
//! registry or the provider. That strategy is an independent, already-solved concern
//! and lives outside this crate; [`ProxyMockAdapter`] is the seam it plugs into.
//!
//! An engine without a configured adapter refuses proxyable types with
//! [`crate::Error::UnsupportedSetup`] rather than silently falling back to
//! interception.

use crate::{
    engine::MemberSetup,
    typesystem::TypeShapeRc,
    Result,
};

/// External factory producing proxy-backed setups for proxyable types.
///
/// Implementations must never register anything in the
/// [`crate::ReplacementRegistry`]; the proxy path and the interception path stay
/// disjoint.
pub trait ProxyMockAdapter: Send + Sync {
    /// Creates a proxy-backed setup for an interface or abstract shape.
    ///
    /// # Errors
    /// Returns [`crate::Error::UnsupportedSetup`] when the adapter cannot proxy the
    /// shape.
    fn mock(&self, shape: &TypeShapeRc) -> Result<Box<dyn MemberSetup>>;
}
