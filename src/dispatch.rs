//! The dispatch protocol between the interception provider and the registry.
//!
//! [`DispatchHook`] is the single entry point a provider calls when an intercepted
//! member is about to execute. The hook consults the [`crate::ReplacementRegistry`]
//! and answers one question: run the real body, or suppress it (and with what
//! result)?
//!
//! # Call Shapes
//!
//! - [`DispatchHook::on_void_call`] - void members; returns whether to suppress
//! - [`DispatchHook::on_value_call`] - value-returning members; `None` means proceed,
//!   `Some(result)` means suppress and return `result`
//! - [`DispatchHook::on_constructor_call`] - intercepted `new` call sites; applies
//!   constructor-fields entries to the freshly allocated instance
//!
//! # Multi-Scope Semantics
//!
//! Every active entry in the snapshot is invoked. For value calls each entry's
//! result overwrites the pending one, so the last-visited entry wins - and because
//! the snapshot's cross-scope iteration order is unspecified (see
//! [`crate::ReplacementRegistry::lookup`]), the winner between two live scopes is
//! deliberately nondeterministic: one of the registered values, never the real one.
//!
//! # Error Propagation
//!
//! A failing replacement callable aborts the dispatch immediately and the error
//! reaches the original call site unchanged, exactly as if the real body had raised
//! it.

use std::sync::Arc;

use crate::{
    emulator,
    registry::{ReplacementKind, ReplacementRegistry},
    typesystem::{Instance, Value},
    MemberKey, Result,
};

/// Decides, per intercepted call, whether the real member body runs.
///
/// One hook instance is shared by the provider across all intercepted members; the
/// member identity arrives as the [`MemberKey`] of each call.
///
/// # Examples
///
/// ```rust
/// use dotmock::prelude::*;
/// use std::sync::Arc;
///
/// let host = InMemoryHost::new();
/// let registry = Arc::new(ReplacementRegistry::new(Arc::new(host)));
/// let hook = DispatchHook::new(registry.clone());
///
/// let key = MemberKey::new("Calculator", MemberKind::Method, "Add", vec![]);
///
/// // No replacements: proceed with the real body.
/// assert!(hook.on_value_call(&key, &[])?.is_none());
///
/// registry.register(
///     &key,
///     ReplacementEntry::value("scope-1", Arc::new(|args| {
///         Ok(Value::I4(args[0].as_i4().unwrap() * args[1].as_i4().unwrap()))
///     })),
/// )?;
///
/// let result = hook.on_value_call(&key, &[Value::I4(2), Value::I4(3)])?;
/// assert_eq!(result, Some(Value::I4(6)));
/// # Ok::<(), dotmock::Error>(())
/// ```
pub struct DispatchHook {
    registry: Arc<ReplacementRegistry>,
}

impl DispatchHook {
    /// Creates a hook consulting the given registry.
    #[must_use]
    pub fn new(registry: Arc<ReplacementRegistry>) -> Self {
        DispatchHook { registry }
    }

    /// Returns the registry this hook consults
    #[must_use]
    pub fn registry(&self) -> &Arc<ReplacementRegistry> {
        &self.registry
    }

    /// Dispatches a void member call.
    ///
    /// Returns `false` (run the real body) when no replacements are active.
    /// Otherwise invokes every active entry's callable with `args` for side effect
    /// and returns `true` (suppress the real body). Value-kind callables are invoked
    /// too, their results discarded; constructor-fields entries are skipped.
    ///
    /// # Errors
    /// Propagates the first failing callable unchanged.
    pub fn on_void_call(&self, key: &MemberKey, args: &[Value]) -> Result<bool> {
        let snapshot = self.registry.lookup(key);
        if snapshot.is_empty() {
            return Ok(false);
        }

        for entry in &snapshot {
            match entry.kind() {
                ReplacementKind::Void(action) => action(args)?,
                ReplacementKind::Value(func) => {
                    func(args)?;
                }
                ReplacementKind::ConstructorFields(_) => {}
            }
        }

        Ok(true)
    }

    /// Dispatches a value-returning member call.
    ///
    /// Returns `None` (run the real body) when no replacements are active. Otherwise
    /// invokes every active entry; each value callable's result overwrites the
    /// pending one and the last-visited entry in snapshot order wins. Void entries
    /// run for side effect without touching the pending result, which starts at
    /// [`Value::Null`].
    ///
    /// The winner across multiple live scopes is unspecified; see the module docs.
    ///
    /// # Errors
    /// Propagates the first failing callable unchanged.
    pub fn on_value_call(&self, key: &MemberKey, args: &[Value]) -> Result<Option<Value>> {
        let snapshot = self.registry.lookup(key);
        if snapshot.is_empty() {
            return Ok(None);
        }

        let mut pending = Value::Null;
        for entry in &snapshot {
            match entry.kind() {
                ReplacementKind::Value(func) => pending = func(args)?,
                ReplacementKind::Void(action) => action(args)?,
                ReplacementKind::ConstructorFields(_) => {}
            }
        }

        Ok(Some(pending))
    }

    /// Dispatches an intercepted constructor call.
    ///
    /// The provider allocates `instance` uninitialized before dispatching. When
    /// constructor-fields entries are active for `key`, each is run through the
    /// constructor emulator against `instance` and the real constructor body must be
    /// skipped (`true`). With no active entries the real constructor runs (`false`).
    ///
    /// Every intercepted `new` call site passes a fresh allocation here, so each
    /// construction during the scope's lifetime yields its own emulated instance.
    ///
    /// # Errors
    /// Propagates initializer failures and
    /// [`crate::Error::FieldResolution`] from bag application.
    pub fn on_constructor_call(
        &self,
        key: &MemberKey,
        instance: &Instance,
        args: &[Value],
    ) -> Result<bool> {
        let snapshot = self.registry.lookup(key);
        if snapshot.is_empty() {
            return Ok(false);
        }

        let mut suppress = false;
        for entry in &snapshot {
            if let ReplacementKind::ConstructorFields(initializer) = entry.kind() {
                emulator::initialize(instance, initializer, args)?;
                suppress = true;
            }
        }

        Ok(suppress)
    }
}
