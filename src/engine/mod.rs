//! Per-test-scope mocking façade.
//!
//! This module provides the [`MockEngine`], the scoped entry point test authors
//! hold: it classifies target types into a [`MockStrategy`], hands out
//! [`MemberSetup`] implementations for either strategy, registers replacement
//! entries under its own scope identity, and tears down exactly those entries on
//! disposal.
//!
//! # Scope Lifetime
//!
//! Every engine instance is one scope, identified by a unique scope id. All
//! registrations made through the engine (or through setups it handed out) are
//! recorded against that id; [`MockEngine::dispose`] removes them and nothing else,
//! exactly once, and `Drop` performs a best-effort disposal for scopes that are
//! never disposed explicitly. Members still held by other live scopes keep their
//! replacements; members whose last scope leaves revert to real-body execution and
//! lose their provider hook.
//!
//! # Strategy Selection
//!
//! [`classify`] is a plain capability classification function: interfaces and
//! abstract types are *proxyable* and delegate to the configured
//! [`ProxyMockAdapter`], bypassing the registry entirely; every other type takes
//! the interception path. An explicit strategy passed to [`MockEngine::mock_with`]
//! overrides the classification verbatim.
//!
//! # Examples
//!
//! ```rust
//! use dotmock::prelude::*;
//! use std::sync::Arc;
//!
//! let host = InMemoryHost::new();
//! let registry = Arc::new(ReplacementRegistry::new(Arc::new(host.clone())));
//! host.bind_dispatch(DispatchHook::new(registry.clone()));
//!
//! let calculator = TypeShapeBuilder::new("Calculator")
//!     .method("Add", &[ValueKind::I4, ValueKind::I4], ValueKind::I4)
//!     .constructor(&[])
//!     .build();
//! host.define(calculator.clone());
//! host.implement_method(&calculator, "Add", Arc::new(|_, args| {
//!     Ok(Value::I4(args[0].as_i4().unwrap() + args[1].as_i4().unwrap()))
//! }))?;
//!
//! let engine = MockEngine::new("com.example.calculator.mock", registry);
//! let setup = engine.mock(&calculator)?;
//! setup.setup_value(&MemberDescriptor::named("Add"), Arc::new(|args| {
//!     Ok(Value::I4(args[0].as_i4().unwrap() * args[1].as_i4().unwrap()))
//! }))?;
//!
//! let instance = host.construct(&calculator, &[])?;
//! let result = host.invoke(&instance, "Add", &[Value::I4(2), Value::I4(3)])?;
//! assert_eq!(result, Value::I4(6)); // 2 * 3 because of the mock
//!
//! engine.dispose()?;
//! let result = host.invoke(&instance, "Add", &[Value::I4(2), Value::I4(3)])?;
//! assert_eq!(result, Value::I4(5)); // real addition again
//! # Ok::<(), dotmock::Error>(())
//! ```

mod intercept;
mod proxy;
mod setup;

pub use intercept::InterceptSetup;
pub use proxy::ProxyMockAdapter;
pub use setup::MemberSetup;

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crossbeam_skiplist::SkipMap;

use crate::{
    registry::{ReplacementEntry, ReplacementRegistry, ValueFn},
    typesystem::{TypeShape, TypeShapeRc},
    MemberKey, Result,
};

/// Which path serves a mocked type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum MockStrategy {
    /// Dynamic proxying via the configured [`ProxyMockAdapter`]; no registry traffic
    Proxy,
    /// Interception through the registry, dispatch hook and provider
    Intercept,
}

/// Classifies a type into the strategy that can mock it.
///
/// Interfaces and abstract types are proxyable; everything else - including sealed
/// and otherwise non-subclassable types - needs interception.
#[must_use]
pub fn classify(shape: &TypeShape) -> MockStrategy {
    if shape.is_proxyable() {
        MockStrategy::Proxy
    } else {
        MockStrategy::Intercept
    }
}

/// Per-type bookkeeping for static-method setups.
///
/// The first static setup on a type creates this entry; later static setups on the
/// same type append to it instead of creating new bookkeeping.
#[derive(Default)]
struct StaticBookkeeping {
    keys: boxcar::Vec<MemberKey>,
}

/// Shared scope state: identity, registrations and the disposed flag.
///
/// Shared between the engine and every [`InterceptSetup`] it hands out, so setups
/// outliving the borrow of the engine still record their keys against the right
/// scope.
pub(crate) struct ScopeState {
    scope_id: String,
    registry: Arc<ReplacementRegistry>,
    registered: boxcar::Vec<MemberKey>,
    statics: SkipMap<String, StaticBookkeeping>,
    disposed: AtomicBool,
}

impl ScopeState {
    pub(crate) fn scope_id(&self) -> &str {
        &self.scope_id
    }

    pub(crate) fn registry(&self) -> &Arc<ReplacementRegistry> {
        &self.registry
    }

    pub(crate) fn record(&self, key: MemberKey) {
        self.registered.push(key);
    }

    pub(crate) fn guard_not_disposed(&self) -> Result<()> {
        if self.disposed.load(Ordering::SeqCst) {
            return Err(crate::Error::UnsupportedSetup(format!(
                "scope '{}' is disposed",
                self.scope_id
            )));
        }
        Ok(())
    }
}

/// One mocking scope: façade over classification, setup and teardown.
///
/// See the module docs for the full lifecycle; the registry is injected so several
/// engines (nested or parallel test scopes) share one process-wide registry while
/// keeping their registrations separate.
pub struct MockEngine {
    state: Arc<ScopeState>,
    proxy_adapter: Option<Arc<dyn ProxyMockAdapter>>,
}

impl MockEngine {
    /// Creates a scope with the given unique id over a shared registry.
    #[must_use]
    pub fn new(scope_id: impl Into<String>, registry: Arc<ReplacementRegistry>) -> Self {
        MockEngine {
            state: Arc::new(ScopeState {
                scope_id: scope_id.into(),
                registry,
                registered: boxcar::Vec::new(),
                statics: SkipMap::new(),
                disposed: AtomicBool::new(false),
            }),
            proxy_adapter: None,
        }
    }

    /// Configures the adapter serving proxyable types.
    #[must_use]
    pub fn with_proxy_adapter(mut self, adapter: Arc<dyn ProxyMockAdapter>) -> Self {
        self.proxy_adapter = Some(adapter);
        self
    }

    /// Returns this scope's id
    #[must_use]
    pub fn scope_id(&self) -> &str {
        self.state.scope_id()
    }

    /// Returns the shared registry
    #[must_use]
    pub fn registry(&self) -> &Arc<ReplacementRegistry> {
        self.state.registry()
    }

    /// Mocks a type using its classified strategy.
    ///
    /// # Errors
    /// [`crate::Error::UnsupportedSetup`] for a proxyable type without a configured
    /// adapter, or whatever the adapter raises.
    pub fn mock(&self, shape: &TypeShapeRc) -> Result<Box<dyn MemberSetup>> {
        self.mock_with(shape, None)
    }

    /// Mocks a type, optionally overriding the classified strategy verbatim.
    ///
    /// # Errors
    /// As [`MockEngine::mock`].
    pub fn mock_with(
        &self,
        shape: &TypeShapeRc,
        strategy: Option<MockStrategy>,
    ) -> Result<Box<dyn MemberSetup>> {
        self.state.guard_not_disposed()?;

        let strategy = strategy.unwrap_or_else(|| classify(shape));
        match strategy {
            MockStrategy::Proxy => match &self.proxy_adapter {
                Some(adapter) => adapter.mock(shape),
                None => Err(crate::Error::UnsupportedSetup(format!(
                    "type '{}' is proxyable but no proxy adapter is configured",
                    shape.name()
                ))),
            },
            MockStrategy::Intercept => Ok(Box::new(InterceptSetup::new(
                self.state.clone(),
                shape.clone(),
            ))),
        }
    }

    /// Replaces a static method, resolved by name against the type's static members.
    ///
    /// Static setups keep one bookkeeping entry per type: the first setup on a type
    /// creates it, later setups on the same type reuse it. Each individual method
    /// still gets its own registry entry and hook.
    ///
    /// # Errors
    /// [`crate::Error::MemberNotFound`] when no static method carries the name.
    pub fn setup_static_method(
        &self,
        shape: &TypeShapeRc,
        name: &str,
        func: ValueFn,
    ) -> Result<()> {
        self.state.guard_not_disposed()?;

        let method = shape
            .find_method(name, None, true)
            .ok_or_else(|| member_not_found!(name, shape.name()))?;
        let key = shape.method_key(method);

        self.state.registry().register(
            &key,
            ReplacementEntry::value(self.state.scope_id(), func),
        )?;

        self.state
            .statics
            .get_or_insert_with(shape.name().to_string(), StaticBookkeeping::default)
            .value()
            .keys
            .push(key);

        Ok(())
    }

    /// Unregisters every member key this scope registered, exactly once.
    ///
    /// Idempotent: later calls (and the `Drop` fallback) are no-ops. Safe to call
    /// concurrently with in-flight dispatches; a dispatch that captured its snapshot
    /// before disposal may complete against the old entries, but no lookup after
    /// `dispose` returns observes this scope.
    ///
    /// # Errors
    /// Propagates provider uninstall failures.
    pub fn dispose(&self) -> Result<()> {
        if self.state.disposed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        for (_, key) in self.state.registered.iter() {
            self.state
                .registry
                .unregister(key, &self.state.scope_id)?;
        }

        for entry in self.state.statics.iter() {
            for (_, key) in entry.value().keys.iter() {
                self.state
                    .registry
                    .unregister(key, &self.state.scope_id)?;
            }
        }

        Ok(())
    }
}

impl Drop for MockEngine {
    fn drop(&mut self) {
        // Best effort; explicit dispose() is the place where failures surface.
        let _ = self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        member::MemberKind,
        provider::{HookHandle, InterceptionProvider},
        typesystem::{Instance, TypeShapeBuilder, Value, ValueKind},
        MemberDescriptor,
    };
    use std::sync::atomic::AtomicUsize;

    struct NullProvider;

    impl InterceptionProvider for NullProvider {
        fn install_hook(&self, _key: &MemberKey) -> Result<HookHandle> {
            Ok(HookHandle(0))
        }

        fn uninstall_hook(&self, _handle: HookHandle) -> Result<()> {
            Ok(())
        }

        fn allocate_uninitialized(&self, shape: &TypeShapeRc) -> Result<Instance> {
            Ok(Instance::uninitialized(shape))
        }

        fn construct_default(&self, shape: &TypeShapeRc) -> Result<Instance> {
            Ok(Instance::uninitialized(shape))
        }
    }

    struct RecordingProxyAdapter {
        mocked: AtomicUsize,
    }

    struct NoopProxySetup;

    impl MemberSetup for NoopProxySetup {
        fn setup_void(
            &self,
            _member: &MemberDescriptor,
            _action: crate::registry::VoidFn,
        ) -> Result<()> {
            Ok(())
        }

        fn setup_value(&self, _member: &MemberDescriptor, _func: ValueFn) -> Result<()> {
            Ok(())
        }

        fn setup_property(&self, _property: &str, _value: Value) -> Result<()> {
            Ok(())
        }

        fn setup_constructor(&self, _initializer: crate::registry::FieldInitFn) -> Result<()> {
            Ok(())
        }

        fn object(&self) -> Result<Instance> {
            Err(crate::Error::UnsupportedSetup("proxy stub".to_string()))
        }
    }

    impl ProxyMockAdapter for RecordingProxyAdapter {
        fn mock(&self, _shape: &TypeShapeRc) -> Result<Box<dyn MemberSetup>> {
            self.mocked.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(NoopProxySetup))
        }
    }

    fn registry() -> Arc<ReplacementRegistry> {
        Arc::new(ReplacementRegistry::new(Arc::new(NullProvider)))
    }

    fn calculator() -> TypeShapeRc {
        TypeShapeBuilder::new("Calculator")
            .method("Add", &[ValueKind::I4, ValueKind::I4], ValueKind::I4)
            .static_method("Origin", &[], ValueKind::I4)
            .constructor(&[])
            .build()
    }

    #[test]
    fn test_classification() {
        let concrete = TypeShapeBuilder::new("Calculator").build();
        assert_eq!(classify(&concrete), MockStrategy::Intercept);

        let interface = TypeShapeBuilder::new("IService").interface().build();
        assert_eq!(classify(&interface), MockStrategy::Proxy);
    }

    #[test]
    fn test_proxyable_type_uses_adapter() {
        let adapter = Arc::new(RecordingProxyAdapter {
            mocked: AtomicUsize::new(0),
        });
        let engine =
            MockEngine::new("s1", registry()).with_proxy_adapter(adapter.clone());

        let interface = TypeShapeBuilder::new("IService").interface().build();
        engine.mock(&interface).unwrap();
        assert_eq!(adapter.mocked.load(Ordering::SeqCst), 1);

        // Concrete types never reach the adapter.
        engine.mock(&calculator()).unwrap();
        assert_eq!(adapter.mocked.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_strategy_override_is_adopted_verbatim() {
        let adapter = Arc::new(RecordingProxyAdapter {
            mocked: AtomicUsize::new(0),
        });
        let engine =
            MockEngine::new("s1", registry()).with_proxy_adapter(adapter.clone());

        // Force a proxyable type down the interception path.
        let interface = TypeShapeBuilder::new("IService").interface().build();
        engine
            .mock_with(&interface, Some(MockStrategy::Intercept))
            .unwrap();
        assert_eq!(adapter.mocked.load(Ordering::SeqCst), 0);

        // Force a concrete type to the adapter.
        engine
            .mock_with(&calculator(), Some(MockStrategy::Proxy))
            .unwrap();
        assert_eq!(adapter.mocked.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_proxyable_without_adapter_is_rejected() {
        let engine = MockEngine::new("s1", registry());
        let interface = TypeShapeBuilder::new("IService").interface().build();

        let result = engine.mock(&interface);
        assert!(matches!(result, Err(crate::Error::UnsupportedSetup(_))));
    }

    #[test]
    fn test_dispose_removes_only_own_scope() {
        let registry = registry();
        let shape = calculator();
        let add = MemberDescriptor::named("Add");

        let engine1 = MockEngine::new("s1", registry.clone());
        let engine2 = MockEngine::new("s2", registry.clone());

        let setup1 = engine1.mock(&shape).unwrap();
        setup1
            .setup_value(&add, Arc::new(|_| Ok(Value::I4(1))))
            .unwrap();
        let setup2 = engine2.mock(&shape).unwrap();
        setup2
            .setup_value(&add, Arc::new(|_| Ok(Value::I4(2))))
            .unwrap();

        let key = MemberKey::new(
            "Calculator",
            MemberKind::Method,
            "Add",
            vec![ValueKind::I4, ValueKind::I4],
        );
        assert_eq!(registry.lookup(&key).len(), 2);

        engine1.dispose().unwrap();
        let remaining = registry.lookup(&key);
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].scope_id(), "s2");

        engine2.dispose().unwrap();
        assert!(!registry.is_active(&key));
    }

    #[test]
    fn test_dispose_is_idempotent() {
        let registry = registry();
        let engine = MockEngine::new("s1", registry.clone());
        let setup = engine.mock(&calculator()).unwrap();
        setup
            .setup_value(&MemberDescriptor::named("Add"), Arc::new(|_| Ok(Value::I4(1))))
            .unwrap();

        engine.dispose().unwrap();
        engine.dispose().unwrap();
        assert_eq!(registry.active_members(), 0);
    }

    #[test]
    fn test_setup_after_dispose_is_rejected() {
        let engine = MockEngine::new("s1", registry());
        let setup = engine.mock(&calculator()).unwrap();
        engine.dispose().unwrap();

        let result = setup.setup_value(
            &MemberDescriptor::named("Add"),
            Arc::new(|_| Ok(Value::I4(1))),
        );
        assert!(matches!(result, Err(crate::Error::UnsupportedSetup(_))));

        assert!(matches!(
            engine.mock(&calculator()),
            Err(crate::Error::UnsupportedSetup(_))
        ));
    }

    #[test]
    fn test_static_setup_reuses_type_bookkeeping() {
        let registry = registry();
        let shape = TypeShapeBuilder::new("MathUtil")
            .static_method("Origin", &[], ValueKind::I4)
            .static_method("Unit", &[], ValueKind::I4)
            .build();

        let engine = MockEngine::new("s1", registry.clone());
        engine
            .setup_static_method(&shape, "Origin", Arc::new(|_| Ok(Value::I4(0))))
            .unwrap();
        engine
            .setup_static_method(&shape, "Unit", Arc::new(|_| Ok(Value::I4(1))))
            .unwrap();

        assert_eq!(engine.state.statics.len(), 1);
        assert_eq!(registry.active_members(), 2);

        engine.dispose().unwrap();
        assert_eq!(registry.active_members(), 0);
    }

    #[test]
    fn test_static_setup_unknown_method_fails() {
        let engine = MockEngine::new("s1", registry());
        let shape = TypeShapeBuilder::new("MathUtil").build();

        let result = engine.setup_static_method(&shape, "Missing", Arc::new(|_| Ok(Value::Null)));
        assert!(matches!(result, Err(crate::Error::MemberNotFound { .. })));
    }
}
