//! The interception-backed setup for concrete types.
//!
//! [`InterceptSetup`] is the concrete-path implementation of
//! [`crate::MemberSetup`]: it resolves members against the target
//! [`crate::typesystem::TypeShape`], registers replacement entries in the shared
//! [`crate::ReplacementRegistry`] under its scope's identity, and records every
//! registered key so the owning scope's disposal can remove exactly them.
//!
//! Constructor setups eagerly build one emulated instance and cache it for
//! [`InterceptSetup::object`]; intercepted `new` call sites are served independently
//! by the dispatch path and always yield fresh instances.

use std::sync::{Arc, Mutex};

use crate::{
    emulator,
    engine::{MemberSetup, ScopeState},
    registry::{FieldInitFn, ReplacementEntry, ValueFn, VoidFn},
    typesystem::{Instance, TypeShapeRc, Value},
    MemberDescriptor, MemberKey, Result,
};

/// Concrete-path setup: registry entries under the owning scope's identity.
pub struct InterceptSetup {
    state: Arc<ScopeState>,
    shape: TypeShapeRc,
    emulated: Mutex<Option<Instance>>,
}

impl InterceptSetup {
    pub(crate) fn new(state: Arc<ScopeState>, shape: TypeShapeRc) -> Self {
        InterceptSetup {
            state,
            shape,
            emulated: Mutex::new(None),
        }
    }

    /// Resolves a descriptor against the shape's instance methods.
    fn resolve_method(&self, member: &MemberDescriptor) -> Result<MemberKey> {
        let method = self
            .shape
            .find_method(member.name(), member.params(), false)
            .ok_or_else(|| member_not_found!(member, self.shape.name()))?;
        Ok(self.shape.method_key(method))
    }

    /// Registers under the scope and records the key for disposal.
    fn register(&self, key: MemberKey, entry: ReplacementEntry) -> Result<()> {
        self.state.guard_not_disposed()?;
        self.state.registry().register(&key, entry)?;
        self.state.record(key);
        Ok(())
    }
}

impl MemberSetup for InterceptSetup {
    fn setup_void(&self, member: &MemberDescriptor, action: VoidFn) -> Result<()> {
        let key = self.resolve_method(member)?;
        self.register(key, ReplacementEntry::void(self.state.scope_id(), action))
    }

    fn setup_value(&self, member: &MemberDescriptor, func: ValueFn) -> Result<()> {
        let key = self.resolve_method(member)?;
        self.register(key, ReplacementEntry::value(self.state.scope_id(), func))
    }

    fn setup_property(&self, property: &str, _value: Value) -> Result<()> {
        let shape = self
            .shape
            .find_property(property)
            .ok_or_else(|| member_not_found!(property, self.shape.name()))?;

        if !shape.has_setter {
            return Err(crate::Error::UnsupportedSetup(format!(
                "property '{}' on type '{}' has no setter",
                property,
                self.shape.name()
            )));
        }

        // Setter-only redirection: the getter keeps running its real body, so reads
        // reflect whatever the backing storage holds. The value argument is unused
        // on this path.
        let key = self.shape.setter_key(shape);
        self.register(
            key,
            ReplacementEntry::void(self.state.scope_id(), Arc::new(|_| Ok(()))),
        )
    }

    fn setup_constructor(&self, initializer: FieldInitFn) -> Result<()> {
        let ctor = self
            .shape
            .primary_constructor()
            .ok_or_else(|| member_not_found!(".ctor", self.shape.name()))?;
        let key = self.shape.constructor_key(ctor);

        // Register first so an intercepted `new` racing this setup already sees the
        // entry, then build the cached instance through the same emulation.
        self.register(
            key,
            ReplacementEntry::constructor_fields(self.state.scope_id(), initializer.clone()),
        )?;

        let instance = emulator::emulate(
            self.state.registry().provider(),
            &self.shape,
            &initializer,
            &[],
        )?;

        *lock!(self.emulated) = Some(instance);
        Ok(())
    }

    fn object(&self) -> Result<Instance> {
        let cached = lock!(self.emulated).clone();

        match cached {
            Some(instance) => Ok(instance),
            None => self.state.registry().provider().construct_default(&self.shape),
        }
    }
}
