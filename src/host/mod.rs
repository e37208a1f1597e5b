//! In-memory reference provider: an injected indirection layer.
//!
//! Interception needs *some* mechanism that physically routes a member's execution
//! through the [`crate::DispatchHook`]. This module supplies the simplest conforming
//! one: an [`InMemoryHost`] that owns the "real" member bodies as registered
//! closures and routes every call through the dispatch protocol before running
//! them. Runtimes with bytecode rewriting replace this with their own
//! [`crate::InterceptionProvider`]; the core never knows the difference.
//!
//! The host doubles as the test fixture layer: integration suites define type
//! shapes, implement their real bodies, and then exercise mocks end-to-end against
//! it.
//!
//! # Dispatch Contract
//!
//! The host honors the provider contract exactly: a member is dispatched if and
//! only if a hook is currently installed for it; suppressed calls skip the real
//! body; value results supplied by the hook become the call's return value; and
//! intercepted constructions hand the hook a fresh uninitialized allocation per
//! `new` call site.
//!
//! # Examples
//!
//! ```rust
//! use dotmock::prelude::*;
//! use std::sync::Arc;
//!
//! let host = InMemoryHost::new();
//! let registry = Arc::new(ReplacementRegistry::new(Arc::new(host.clone())));
//! host.bind_dispatch(DispatchHook::new(registry));
//!
//! let calculator = TypeShapeBuilder::new("Calculator")
//!     .method("Add", &[ValueKind::I4, ValueKind::I4], ValueKind::I4)
//!     .auto_property("Value", ValueKind::I4)
//!     .constructor(&[])
//!     .build();
//! host.define(calculator.clone());
//! host.implement_method(&calculator, "Add", Arc::new(|_, args| {
//!     Ok(Value::I4(args[0].as_i4().unwrap() + args[1].as_i4().unwrap()))
//! }))?;
//!
//! let calc = host.construct(&calculator, &[])?;
//! assert_eq!(host.invoke(&calc, "Add", &[Value::I4(2), Value::I4(3)])?, Value::I4(5));
//!
//! // Auto-property accessors are wired automatically.
//! host.set_property(&calc, "Value", Value::I4(9))?;
//! assert_eq!(host.get_property(&calc, "Value")?, Value::I4(9));
//! # Ok::<(), dotmock::Error>(())
//! ```

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, OnceLock,
};

use dashmap::{mapref::entry::Entry, DashMap};

use crate::{
    dispatch::DispatchHook,
    provider::{HookHandle, InterceptionProvider},
    typesystem::{Instance, TypeShapeRc, Value},
    MemberKey, Result,
};

/// The real implementation of a method or accessor.
///
/// The receiver is `None` for static members. Bodies may fail; their errors reach
/// the call site unchanged.
pub type MemberBody = Arc<dyn Fn(Option<&Instance>, &[Value]) -> Result<Value> + Send + Sync>;

/// The real implementation of a constructor body, run against an allocated
/// instance.
pub type CtorBody = Arc<dyn Fn(&Instance, &[Value]) -> Result<()> + Send + Sync>;

struct HostInner {
    shapes: DashMap<String, TypeShapeRc>,
    bodies: DashMap<MemberKey, MemberBody>,
    ctors: DashMap<MemberKey, CtorBody>,
    hooks: DashMap<MemberKey, HookHandle>,
    handles: DashMap<u64, MemberKey>,
    next_handle: AtomicU64,
    dispatch: OnceLock<DispatchHook>,
}

/// Reference [`InterceptionProvider`] with scripted real member bodies.
///
/// Cloning the host clones a handle; all clones share the same tables, so the
/// instance handed to the registry as provider and the instance the test drives
/// calls through are the same host.
#[derive(Clone)]
pub struct InMemoryHost {
    inner: Arc<HostInner>,
}

impl InMemoryHost {
    /// Creates an empty host.
    #[must_use]
    pub fn new() -> Self {
        InMemoryHost {
            inner: Arc::new(HostInner {
                shapes: DashMap::new(),
                bodies: DashMap::new(),
                ctors: DashMap::new(),
                hooks: DashMap::new(),
                handles: DashMap::new(),
                next_handle: AtomicU64::new(1),
                dispatch: OnceLock::new(),
            }),
        }
    }

    /// Wires the dispatch hook this host consults before hooked real bodies.
    ///
    /// Binding is one-shot; later calls are ignored. Until a hook is bound,
    /// installed hooks have no effect and real bodies always run.
    pub fn bind_dispatch(&self, hook: DispatchHook) {
        let _ = self.inner.dispatch.set(hook);
    }

    /// Registers a type shape and auto-wires accessor bodies for its
    /// auto-properties (getter reads the backing slot, setter writes it).
    pub fn define(&self, shape: TypeShapeRc) {
        for property in shape.properties() {
            let Some(backing) = property.backing_slot.clone() else {
                continue;
            };

            if property.has_getter {
                let slot = backing.clone();
                let body: MemberBody = Arc::new(move |receiver, _args| {
                    let instance = expect_receiver(receiver)?;
                    instance.slot(&slot).ok_or_else(|| {
                        crate::Error::Provider(format!("backing slot '{slot}' missing"))
                    })
                });
                self.inner.bodies.insert(shape.getter_key(property), body);
            }

            if property.has_setter {
                let slot = backing.clone();
                let body: MemberBody = Arc::new(move |receiver, args| {
                    let instance = expect_receiver(receiver)?;
                    let value = args.first().cloned().unwrap_or(Value::Null);
                    instance.set_slot(&slot, value);
                    Ok(Value::Null)
                });
                self.inner.bodies.insert(shape.setter_key(property), body);
            }
        }

        self.inner.shapes.insert(shape.name().to_string(), shape);
    }

    /// Returns a previously defined shape by type name.
    #[must_use]
    pub fn shape(&self, name: &str) -> Option<TypeShapeRc> {
        self.inner.shapes.get(name).map(|entry| entry.value().clone())
    }

    /// Supplies the real body of an instance method.
    ///
    /// # Errors
    /// [`crate::Error::MemberNotFound`] when the shape declares no such method.
    pub fn implement_method(
        &self,
        shape: &TypeShapeRc,
        name: &str,
        body: MemberBody,
    ) -> Result<()> {
        let method = shape
            .find_method(name, None, false)
            .ok_or_else(|| member_not_found!(name, shape.name()))?;
        self.inner.bodies.insert(shape.method_key(method), body);
        Ok(())
    }

    /// Supplies the real body of a static method.
    ///
    /// # Errors
    /// [`crate::Error::MemberNotFound`] when the shape declares no such method.
    pub fn implement_static(
        &self,
        shape: &TypeShapeRc,
        name: &str,
        body: MemberBody,
    ) -> Result<()> {
        let method = shape
            .find_method(name, None, true)
            .ok_or_else(|| member_not_found!(name, shape.name()))?;
        self.inner.bodies.insert(shape.method_key(method), body);
        Ok(())
    }

    /// Supplies the real body of a manually-implemented property getter.
    ///
    /// # Errors
    /// [`crate::Error::MemberNotFound`] when the shape declares no such property.
    pub fn implement_getter(
        &self,
        shape: &TypeShapeRc,
        property: &str,
        body: MemberBody,
    ) -> Result<()> {
        let property = shape
            .find_property(property)
            .ok_or_else(|| member_not_found!(property, shape.name()))?;
        self.inner.bodies.insert(shape.getter_key(property), body);
        Ok(())
    }

    /// Supplies the real body of a manually-implemented property setter.
    ///
    /// # Errors
    /// [`crate::Error::MemberNotFound`] when the shape declares no such property.
    pub fn implement_setter(
        &self,
        shape: &TypeShapeRc,
        property: &str,
        body: MemberBody,
    ) -> Result<()> {
        let property = shape
            .find_property(property)
            .ok_or_else(|| member_not_found!(property, shape.name()))?;
        self.inner.bodies.insert(shape.setter_key(property), body);
        Ok(())
    }

    /// Supplies the real body of the constructor with the given arity.
    ///
    /// Constructors without a supplied body construct as zero-initialization only.
    ///
    /// # Errors
    /// [`crate::Error::MemberNotFound`] when no constructor has that arity.
    pub fn implement_constructor(
        &self,
        shape: &TypeShapeRc,
        arity: usize,
        body: CtorBody,
    ) -> Result<()> {
        let ctor = shape
            .find_constructor(arity)
            .ok_or_else(|| member_not_found!(".ctor", shape.name()))?;
        self.inner.ctors.insert(shape.constructor_key(ctor), body);
        Ok(())
    }

    /// Calls an instance method, honoring the dispatch contract.
    ///
    /// Void methods return [`Value::Null`].
    ///
    /// # Errors
    /// [`crate::Error::MemberNotFound`] for unknown methods,
    /// [`crate::Error::TypeNotFound`] when the method has no real body and no
    /// replacement suppressed it, plus whatever body or replacement raises.
    pub fn invoke(&self, instance: &Instance, name: &str, args: &[Value]) -> Result<Value> {
        let shape = instance.shape().clone();
        let method = shape
            .find_method(name, None, false)
            .ok_or_else(|| member_not_found!(name, shape.name()))?;
        let key = shape.method_key(method);

        if method.is_void() {
            self.route_void(&key, Some(instance), args)?;
            Ok(Value::Null)
        } else {
            self.route_value(&key, Some(instance), args)
        }
    }

    /// Calls a static method, honoring the dispatch contract.
    ///
    /// # Errors
    /// As [`InMemoryHost::invoke`].
    pub fn invoke_static(&self, shape: &TypeShapeRc, name: &str, args: &[Value]) -> Result<Value> {
        let method = shape
            .find_method(name, None, true)
            .ok_or_else(|| member_not_found!(name, shape.name()))?;
        let key = shape.method_key(method);

        if method.is_void() {
            self.route_void(&key, None, args)?;
            Ok(Value::Null)
        } else {
            self.route_value(&key, None, args)
        }
    }

    /// Reads a property through its getter accessor.
    ///
    /// # Errors
    /// [`crate::Error::MemberNotFound`] for unknown properties,
    /// [`crate::Error::UnsupportedSetup`] for properties without a getter.
    pub fn get_property(&self, instance: &Instance, name: &str) -> Result<Value> {
        let shape = instance.shape().clone();
        let property = shape
            .find_property(name)
            .ok_or_else(|| member_not_found!(name, shape.name()))?;

        if !property.has_getter {
            return Err(crate::Error::UnsupportedSetup(format!(
                "property '{}' on type '{}' has no getter",
                name,
                shape.name()
            )));
        }

        self.route_value(&shape.getter_key(property), Some(instance), &[])
    }

    /// Writes a property through its setter accessor.
    ///
    /// # Errors
    /// [`crate::Error::MemberNotFound`] for unknown properties,
    /// [`crate::Error::UnsupportedSetup`] for properties without a setter.
    pub fn set_property(&self, instance: &Instance, name: &str, value: Value) -> Result<()> {
        let shape = instance.shape().clone();
        let property = shape
            .find_property(name)
            .ok_or_else(|| member_not_found!(name, shape.name()))?;

        if !property.has_setter {
            return Err(crate::Error::UnsupportedSetup(format!(
                "property '{}' on type '{}' has no setter",
                name,
                shape.name()
            )));
        }

        self.route_void(&shape.setter_key(property), Some(instance), &[value])
    }

    /// Constructs an instance: allocate, dispatch the constructor when hooked, and
    /// run the real constructor body unless suppressed.
    ///
    /// Every call allocates fresh, so intercepted `new` call sites each receive
    /// their own emulated instance.
    ///
    /// # Errors
    /// [`crate::Error::MemberNotFound`] when no constructor matches the argument
    /// count, plus whatever the dispatch path or real body raises.
    pub fn construct(&self, shape: &TypeShapeRc, args: &[Value]) -> Result<Instance> {
        let ctor = shape
            .find_constructor(args.len())
            .ok_or_else(|| member_not_found!(".ctor", shape.name()))?;
        let key = shape.constructor_key(ctor);

        let instance = Instance::uninitialized(shape);

        if self.inner.hooks.contains_key(&key) {
            if let Some(dispatch) = self.inner.dispatch.get() {
                if dispatch.on_constructor_call(&key, &instance, args)? {
                    return Ok(instance);
                }
            }
        }

        // Clone out of the map before invoking; bodies may re-enter the host.
        let body = self.inner.ctors.get(&key).map(|entry| entry.value().clone());
        if let Some(body) = body {
            body(&instance, args)?;
        }

        Ok(instance)
    }

    fn route_value(
        &self,
        key: &MemberKey,
        receiver: Option<&Instance>,
        args: &[Value],
    ) -> Result<Value> {
        if self.inner.hooks.contains_key(key) {
            if let Some(dispatch) = self.inner.dispatch.get() {
                if let Some(result) = dispatch.on_value_call(key, args)? {
                    return Ok(result);
                }
            }
        }

        let body = self
            .inner
            .bodies
            .get(key)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| crate::Error::TypeNotFound(format!("no real body for {key}")))?;
        body(receiver, args)
    }

    fn route_void(
        &self,
        key: &MemberKey,
        receiver: Option<&Instance>,
        args: &[Value],
    ) -> Result<()> {
        if self.inner.hooks.contains_key(key) {
            if let Some(dispatch) = self.inner.dispatch.get() {
                if dispatch.on_void_call(key, args)? {
                    return Ok(());
                }
            }
        }

        let body = self
            .inner
            .bodies
            .get(key)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| crate::Error::TypeNotFound(format!("no real body for {key}")))?;
        body(receiver, args)?;
        Ok(())
    }
}

impl Default for InMemoryHost {
    fn default() -> Self {
        InMemoryHost::new()
    }
}

fn expect_receiver<'a>(receiver: Option<&'a Instance>) -> Result<&'a Instance> {
    receiver.ok_or_else(|| {
        crate::Error::Provider("instance member invoked without a receiver".to_string())
    })
}

impl InterceptionProvider for InMemoryHost {
    fn install_hook(&self, key: &MemberKey) -> Result<HookHandle> {
        match self.inner.hooks.entry(key.clone()) {
            Entry::Occupied(occupied) => Ok(*occupied.get()),
            Entry::Vacant(vacant) => {
                let handle = HookHandle(self.inner.next_handle.fetch_add(1, Ordering::SeqCst));
                self.inner.handles.insert(handle.value(), key.clone());
                vacant.insert(handle);
                Ok(handle)
            }
        }
    }

    fn uninstall_hook(&self, handle: HookHandle) -> Result<()> {
        let (_, key) = self
            .inner
            .handles
            .remove(&handle.value())
            .ok_or_else(|| crate::Error::Provider(format!("unknown hook handle {handle}")))?;
        self.inner.hooks.remove(&key);
        Ok(())
    }

    fn allocate_uninitialized(&self, shape: &TypeShapeRc) -> Result<Instance> {
        Ok(Instance::uninitialized(shape))
    }

    fn construct_default(&self, shape: &TypeShapeRc) -> Result<Instance> {
        if shape.find_constructor(0).is_none() {
            return Err(crate::Error::UnsupportedSetup(format!(
                "type '{}' has no parameterless constructor",
                shape.name()
            )));
        }
        self.construct(shape, &[])
    }
}
