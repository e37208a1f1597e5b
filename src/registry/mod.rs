//! Process-wide registry of active member replacements.
//!
//! This module provides the [`ReplacementRegistry`], the single shared mutable
//! resource of the interception core: a concurrent map from [`crate::MemberKey`] to
//! the set of replacements currently active for that member, keyed by owning scope.
//!
//! # Registry Architecture
//!
//! The registry is a [`DashMap`] whose values pair the per-scope entry map with the
//! provider's [`crate::HookHandle`]:
//!
//! - **Outer map**: `MemberKey -> ActiveMember`, sharded and lock-free for readers
//! - **Inner map**: `scope id -> Arc<ReplacementEntry>`, plain `HashMap` mutated only
//!   under the outer entry's shard lock
//! - **Hook lifetime**: the provider hook is installed when a key's first entry
//!   arrives and uninstalled when its last entry leaves; the handle travels with the
//!   outer entry
//!
//! # Thread Safety
//!
//! All mutations go through the DashMap entry API, so operations on one member
//! serialize while operations on different members proceed in parallel. This is the
//! synchronization point that guarantees exactly one physical hook install when two
//! scopes race to register the first replacement for a member, and symmetrically
//! exactly one uninstall when the last scope leaves while a new one arrives.
//!
//! [`ReplacementRegistry::lookup`] returns a snapshot: it never observes a partially
//! mutated inner map, and in-flight dispatches that captured a snapshot before a
//! scope's disposal may complete against the old entries.
//!
//! # Iteration Order
//!
//! The inner map is a `HashMap`; its iteration order is unspecified. When several
//! live scopes hold a value replacement for the same member, the dispatched result
//! is one of the registered values, deliberately unspecified which. Callers must not
//! rely on first- or last-registered ordering across scopes.
//!
//! # Examples
//!
//! ```rust
//! use dotmock::prelude::*;
//! use std::sync::Arc;
//!
//! let host = InMemoryHost::new();
//! let registry = ReplacementRegistry::new(Arc::new(host));
//!
//! let key = MemberKey::new("Calculator", MemberKind::Method, "Add", vec![]);
//! let entry = ReplacementEntry::value("scope-1", Arc::new(|_args| Ok(Value::I4(6))));
//!
//! registry.register(&key, entry)?;
//! assert!(registry.is_active(&key));
//! assert_eq!(registry.lookup(&key).len(), 1);
//!
//! registry.unregister(&key, "scope-1")?;
//! assert!(!registry.is_active(&key));
//! # Ok::<(), dotmock::Error>(())
//! ```

use std::{collections::HashMap, fmt, sync::Arc};

use dashmap::{mapref::entry::Entry, DashMap};

use crate::{
    emulator::FieldBag,
    provider::{HookHandle, InterceptionProvider},
    typesystem::{Instance, Value},
    MemberKey, Result,
};

/// Callable computing the result of a value-returning replacement
pub type ValueFn = Arc<dyn Fn(&[Value]) -> Result<Value> + Send + Sync>;

/// Callable run for side effect by a void replacement
pub type VoidFn = Arc<dyn Fn(&[Value]) -> Result<()> + Send + Sync>;

/// Callable populating a [`FieldBag`] for a constructor-fields replacement.
///
/// Invoked with the uninitialized instance, an empty bag and the constructor
/// arguments; the user fills the bag instead of assigning slots directly.
pub type FieldInitFn = Arc<dyn Fn(&Instance, &mut FieldBag, &[Value]) -> Result<()> + Send + Sync>;

/// The behavior a [`ReplacementEntry`] substitutes for the real member body.
#[derive(Clone)]
pub enum ReplacementKind {
    /// Computes the member's return value; the real body is suppressed
    Value(ValueFn),
    /// Runs for side effect only; the real body is suppressed
    Void(VoidFn),
    /// Computes field assignments applied to a not-yet-initialized instance
    ConstructorFields(FieldInitFn),
}

impl fmt::Debug for ReplacementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplacementKind::Value(_) => write!(f, "Value"),
            ReplacementKind::Void(_) => write!(f, "Void"),
            ReplacementKind::ConstructorFields(_) => write!(f, "ConstructorFields"),
        }
    }
}

/// One scope's active replacement for one member.
///
/// Immutable once registered; re-registering the same (member, scope) pair replaces
/// the whole entry.
pub struct ReplacementEntry {
    scope_id: String,
    kind: ReplacementKind,
}

impl ReplacementEntry {
    /// Creates a value-returning replacement entry.
    #[must_use]
    pub fn value(scope_id: impl Into<String>, func: ValueFn) -> Self {
        ReplacementEntry {
            scope_id: scope_id.into(),
            kind: ReplacementKind::Value(func),
        }
    }

    /// Creates a void replacement entry.
    #[must_use]
    pub fn void(scope_id: impl Into<String>, action: VoidFn) -> Self {
        ReplacementEntry {
            scope_id: scope_id.into(),
            kind: ReplacementKind::Void(action),
        }
    }

    /// Creates a constructor-fields replacement entry.
    #[must_use]
    pub fn constructor_fields(scope_id: impl Into<String>, initializer: FieldInitFn) -> Self {
        ReplacementEntry {
            scope_id: scope_id.into(),
            kind: ReplacementKind::ConstructorFields(initializer),
        }
    }

    /// Returns the id of the scope that registered this entry
    #[must_use]
    pub fn scope_id(&self) -> &str {
        &self.scope_id
    }

    /// Returns the replacement behavior
    #[must_use]
    pub fn kind(&self) -> &ReplacementKind {
        &self.kind
    }
}

impl fmt::Debug for ReplacementEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ReplacementEntry(scope: {}, kind: {:?})",
            self.scope_id, self.kind
        )
    }
}

/// Inner registry value: the per-scope entries plus the provider hook handle.
struct ActiveMember {
    entries: HashMap<String, Arc<ReplacementEntry>>,
    hook: HookHandle,
}

/// Concurrent map from member identity to active replacements.
///
/// One registry instance is shared by every [`crate::MockEngine`] scope in the
/// process; it is injected rather than global so it stays testable in isolation.
/// The registry owns the provider handshake: hooks are installed on a member's
/// first registration and uninstalled when its last registration leaves.
///
/// A member has an outer entry here if and only if at least one scope currently
/// holds a replacement for it.
pub struct ReplacementRegistry {
    members: DashMap<MemberKey, ActiveMember>,
    provider: Arc<dyn InterceptionProvider>,
}

impl ReplacementRegistry {
    /// Creates an empty registry bound to an interception provider.
    #[must_use]
    pub fn new(provider: Arc<dyn InterceptionProvider>) -> Self {
        ReplacementRegistry {
            members: DashMap::new(),
            provider,
        }
    }

    /// Returns the provider this registry installs hooks through
    #[must_use]
    pub fn provider(&self) -> &Arc<dyn InterceptionProvider> {
        &self.provider
    }

    /// Inserts or overwrites the entry for `(key, entry.scope_id())`.
    ///
    /// The first entry for a key installs the provider hook while the key's shard
    /// lock is held, so two scopes racing to register the same previously-unpatched
    /// member produce exactly one physical install. Provider callbacks must not
    /// re-enter the registry for the same key.
    ///
    /// # Errors
    /// Propagates the provider's install failure; no entry is left behind in that
    /// case.
    pub fn register(&self, key: &MemberKey, entry: ReplacementEntry) -> Result<()> {
        match self.members.entry(key.clone()) {
            Entry::Occupied(mut occupied) => {
                occupied
                    .get_mut()
                    .entries
                    .insert(entry.scope_id.clone(), Arc::new(entry));
            }
            Entry::Vacant(vacant) => {
                let hook = self.provider.install_hook(key)?;

                let mut entries = HashMap::new();
                entries.insert(entry.scope_id.clone(), Arc::new(entry));
                vacant.insert(ActiveMember { entries, hook });
            }
        }

        Ok(())
    }

    /// Removes the entry for `(key, scope_id)`.
    ///
    /// When the removal empties the inner map, the provider hook is uninstalled and
    /// the outer entry removed under the same shard lock, so a last-leaving
    /// unregister racing a fresh register stays ordered: the newcomer either lands
    /// before the uninstall (and keeps the hook alive) or after the removal (and
    /// triggers a fresh install).
    ///
    /// Returns `true` if an entry was removed, `false` if none existed.
    ///
    /// # Errors
    /// Propagates the provider's uninstall failure.
    pub fn unregister(&self, key: &MemberKey, scope_id: &str) -> Result<bool> {
        match self.members.entry(key.clone()) {
            Entry::Occupied(mut occupied) => {
                let removed = occupied.get_mut().entries.remove(scope_id).is_some();
                if removed && occupied.get().entries.is_empty() {
                    let hook = occupied.get().hook;
                    self.provider.uninstall_hook(hook)?;
                    occupied.remove();
                }
                Ok(removed)
            }
            Entry::Vacant(_) => Ok(false),
        }
    }

    /// Returns a snapshot of the active entries for `key`.
    ///
    /// The snapshot is consistent (never a partially mutated inner map), but its
    /// iteration order across scopes is unspecified. An empty vector means the
    /// member currently has no replacements and its real body should run.
    #[must_use]
    pub fn lookup(&self, key: &MemberKey) -> Vec<Arc<ReplacementEntry>> {
        match self.members.get(key) {
            Some(member) => member.entries.values().cloned().collect(),
            None => Vec::new(),
        }
    }

    /// Returns true if at least one scope holds a replacement for `key`
    #[must_use]
    pub fn is_active(&self, key: &MemberKey) -> bool {
        self.members.contains_key(key)
    }

    /// Returns the number of members with at least one active replacement
    #[must_use]
    pub fn active_members(&self) -> usize {
        self.members.len()
    }
}

impl fmt::Debug for ReplacementRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ReplacementRegistry({} active members)", self.members.len())
    }
}
