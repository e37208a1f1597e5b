//! Stable member identity for the replacement registry.
//!
//! This module provides [`MemberKey`], the structural identity of a method, property
//! accessor or constructor, together with [`MemberKind`] and the caller-supplied
//! [`MemberDescriptor`] used to resolve a member against a
//! [`crate::typesystem::TypeShape`].
//!
//! # Key Identity
//!
//! A [`MemberKey`] is built from the declaring type name, the member kind, the member
//! name and the declared parameter kinds. Structurally equal members always yield
//! equal keys, which is what allows the [`crate::ReplacementRegistry`] to use the key
//! as its primary index: two scopes resolving "the same member" independently end up
//! in the same registry bucket.
//!
//! # Descriptor Resolution
//!
//! The original reflection-based resolution from lambda expressions is replaced by an
//! explicit descriptor: callers name the member (and optionally its parameter kinds)
//! and the type shape resolves it. `params: None` matches by name alone, taking the
//! first declared member with that name; `params: Some(..)` requires an exact
//! parameter-kind match.

use std::fmt;

use crate::typesystem::ValueKind;

/// Classification of the member a [`MemberKey`] refers to.
///
/// Property accessors are first-class members here: a getter and a setter of the same
/// property have distinct keys, which is what makes setter-only redirection possible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display)]
pub enum MemberKind {
    /// An instance method
    Method,
    /// A static method, resolved by name against the type's static members
    StaticMethod,
    /// A property getter accessor
    Getter,
    /// A property setter accessor
    Setter,
    /// An instance constructor
    Constructor,
}

/// Stable identity of a method, property accessor or constructor.
///
/// Serves as the primary key of the [`crate::ReplacementRegistry`] and as the member
/// identity exchanged with the [`crate::InterceptionProvider`]. Keys are cheap to
/// clone and hash, ordered (so they can live in ordered concurrent maps), and render
/// human-readable via [`fmt::Display`].
///
/// # Examples
///
/// ```rust
/// use dotmock::{MemberKey, MemberKind};
/// use dotmock::typesystem::ValueKind;
///
/// let key = MemberKey::new(
///     "Calculator",
///     MemberKind::Method,
///     "Add",
///     vec![ValueKind::I4, ValueKind::I4],
/// );
/// assert_eq!(key.to_string(), "Calculator::Add(I4, I4)");
///
/// let same = MemberKey::new(
///     "Calculator",
///     MemberKind::Method,
///     "Add",
///     vec![ValueKind::I4, ValueKind::I4],
/// );
/// assert_eq!(key, same);
/// ```
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MemberKey {
    /// Name of the declaring type
    type_name: String,
    /// What kind of member this key refers to
    kind: MemberKind,
    /// Member name; accessors use the property name, constructors use `.ctor`
    name: String,
    /// Declared parameter kinds, in declaration order
    params: Vec<ValueKind>,
}

impl MemberKey {
    /// Creates a new key from its structural parts.
    #[must_use]
    pub fn new(
        type_name: impl Into<String>,
        kind: MemberKind,
        name: impl Into<String>,
        params: Vec<ValueKind>,
    ) -> Self {
        MemberKey {
            type_name: type_name.into(),
            kind,
            name: name.into(),
            params,
        }
    }

    /// Returns the name of the declaring type
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Returns the member kind
    #[must_use]
    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    /// Returns the member name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared parameter kinds
    #[must_use]
    pub fn params(&self) -> &[ValueKind] {
        &self.params
    }
}

impl fmt::Display for MemberKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = match self.kind {
            MemberKind::Getter => format!("get_{}", self.name),
            MemberKind::Setter => format!("set_{}", self.name),
            MemberKind::Constructor => ".ctor".to_string(),
            _ => self.name.clone(),
        };

        write!(f, "{}::{}(", self.type_name, rendered)?;
        for (index, param) in self.params.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{param}")?;
        }
        write!(f, ")")
    }
}

impl fmt::Debug for MemberKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MemberKey({}, kind: {})", self, self.kind)
    }
}

/// Explicit, caller-supplied description of a member to resolve.
///
/// Replaces expression-tree introspection: instead of deriving the target member from
/// a lambda, callers state the member name and optionally the exact parameter kinds.
///
/// # Examples
///
/// ```rust
/// use dotmock::MemberDescriptor;
/// use dotmock::typesystem::ValueKind;
///
/// // Match by name alone; first declared member with that name wins.
/// let by_name = MemberDescriptor::named("Add");
///
/// // Match by name and exact parameter kinds.
/// let exact = MemberDescriptor::with_params("Add", vec![ValueKind::I4, ValueKind::I4]);
/// assert_eq!(by_name.name(), exact.name());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberDescriptor {
    name: String,
    params: Option<Vec<ValueKind>>,
}

impl MemberDescriptor {
    /// Creates a descriptor matching by name alone.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        MemberDescriptor {
            name: name.into(),
            params: None,
        }
    }

    /// Creates a descriptor matching by name and exact parameter kinds.
    #[must_use]
    pub fn with_params(name: impl Into<String>, params: Vec<ValueKind>) -> Self {
        MemberDescriptor {
            name: name.into(),
            params: Some(params),
        }
    }

    /// Returns the member name this descriptor resolves
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the exact parameter kinds, if the descriptor constrains them
    #[must_use]
    pub fn params(&self) -> Option<&[ValueKind]> {
        self.params.as_deref()
    }
}

impl fmt::Display for MemberDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.params {
            None => write!(f, "{}", self.name),
            Some(params) => {
                write!(f, "{}(", self.name)?;
                for (index, param) in params.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{param}")?;
                }
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn add_key() -> MemberKey {
        MemberKey::new(
            "Calculator",
            MemberKind::Method,
            "Add",
            vec![ValueKind::I4, ValueKind::I4],
        )
    }

    #[test]
    fn test_structural_equality() {
        assert_eq!(add_key(), add_key());

        let other_params = MemberKey::new(
            "Calculator",
            MemberKind::Method,
            "Add",
            vec![ValueKind::I8, ValueKind::I8],
        );
        assert_ne!(add_key(), other_params);

        let other_kind = MemberKey::new(
            "Calculator",
            MemberKind::StaticMethod,
            "Add",
            vec![ValueKind::I4, ValueKind::I4],
        );
        assert_ne!(add_key(), other_kind);
    }

    #[test]
    fn test_key_as_map_key() {
        let mut map = HashMap::new();
        map.insert(add_key(), "multiply instead");

        assert_eq!(map.get(&add_key()), Some(&"multiply instead"));
        assert_eq!(map.len(), 1);

        map.insert(add_key(), "overwritten");
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&add_key()), Some(&"overwritten"));
    }

    #[test]
    fn test_display() {
        assert_eq!(add_key().to_string(), "Calculator::Add(I4, I4)");

        let getter = MemberKey::new("Person", MemberKind::Getter, "Age", vec![]);
        assert_eq!(getter.to_string(), "Person::get_Age()");

        let setter = MemberKey::new(
            "Calculator",
            MemberKind::Setter,
            "Value",
            vec![ValueKind::I4],
        );
        assert_eq!(setter.to_string(), "Calculator::set_Value(I4)");

        let ctor = MemberKey::new(
            "Person",
            MemberKind::Constructor,
            ".ctor",
            vec![ValueKind::String, ValueKind::I4],
        );
        assert_eq!(ctor.to_string(), "Person::.ctor(String, I4)");
    }

    #[test]
    fn test_ordering() {
        let a = MemberKey::new("A", MemberKind::Method, "M", vec![]);
        let b = MemberKey::new("B", MemberKind::Method, "M", vec![]);
        assert!(a < b);
    }

    #[test]
    fn test_descriptor_display() {
        assert_eq!(MemberDescriptor::named("Add").to_string(), "Add");
        assert_eq!(
            MemberDescriptor::with_params("Add", vec![ValueKind::I4, ValueKind::I4]).to_string(),
            "Add(I4, I4)"
        );
    }
}
