//! The setup contract shared by both mocking strategies.
//!
//! [`MemberSetup`] is the object-safe surface a test author programs against once a
//! type has been mocked, independent of whether the calls will be served by the
//! interception path or by an external proxy adapter. The engine's classification
//! (or an explicit strategy override) decides which implementation is handed out;
//! the contract is identical.

use crate::{
    registry::{FieldInitFn, ValueFn, VoidFn},
    typesystem::{Instance, Value},
    MemberDescriptor, Result,
};

/// Fluent setup surface for one mocked type within one scope.
///
/// All methods resolve members eagerly and raise resolution failures synchronously;
/// nothing is deferred to call time except the replacement behavior itself.
pub trait MemberSetup: Send + Sync {
    /// Replaces a void instance method: `action` runs for side effect, the real
    /// body is suppressed.
    ///
    /// # Errors
    /// [`crate::Error::MemberNotFound`] when the descriptor resolves no instance
    /// method.
    fn setup_void(&self, member: &MemberDescriptor, action: VoidFn) -> Result<()>;

    /// Replaces a value-returning instance method: `func` computes the result, the
    /// real body is suppressed.
    ///
    /// # Errors
    /// [`crate::Error::MemberNotFound`] when the descriptor resolves no instance
    /// method.
    fn setup_value(&self, member: &MemberDescriptor, func: ValueFn) -> Result<()>;

    /// Redirects the property's setter to a no-op.
    ///
    /// On the interception path only the setter is redirected: reads keep going
    /// through the real getter and reflect whatever the backing storage actually
    /// holds, not necessarily `value`. Proxy adapters may honor `value` as a stored
    /// property instead.
    ///
    /// # Errors
    /// [`crate::Error::MemberNotFound`] when no such property exists,
    /// [`crate::Error::UnsupportedSetup`] when it has no setter.
    fn setup_property(&self, property: &str, value: Value) -> Result<()>;

    /// Registers a constructor-fields replacement on the type's primary
    /// constructor and eagerly builds the emulated instance returned by
    /// [`MemberSetup::object`].
    ///
    /// # Errors
    /// [`crate::Error::MemberNotFound`] when the type has no public constructor.
    fn setup_constructor(&self, initializer: FieldInitFn) -> Result<()>;

    /// Returns the mocked object: the emulated instance when a constructor setup
    /// exists, otherwise a plain default-constructed instance.
    ///
    /// # Errors
    /// Propagates provider construction failures.
    fn object(&self) -> Result<Instance>;
}
