//! Immutable descriptions of host types.
//!
//! This module provides [`TypeShape`], the explicit model of a host type that the
//! mocking core resolves members against. Rust has no runtime reflection, so the
//! introspection capability the core needs (member signatures, storage slot names,
//! property backing slots, constructor declaration order) is supplied up front as an
//! immutable shape, typically built once per test fixture via
//! [`crate::typesystem::TypeShapeBuilder`] and shared as a [`TypeShapeRc`].
//!
//! # Shape Contents
//!
//! - **Slots** ([`SlotShape`]) - named storage locations, including the hidden
//!   compiler-synthesized backing slots of auto-properties
//! - **Properties** ([`PropertyShape`]) - accessor pairs with optional backing or
//!   setter storage slots
//! - **Methods** ([`MethodShape`]) - instance and static methods with parameter and
//!   return kinds
//! - **Constructors** ([`CtorShape`]) - kept in declaration order; the first declared
//!   public constructor is the *primary* constructor used by constructor emulation
//!
//! # Strategy Classification
//!
//! [`TypeShape::is_proxyable`] reports whether a type can be mocked by ordinary
//! proxying (interfaces and abstract types) or needs the interception path
//! (everything else, including sealed types).

use std::sync::Arc;

use bitflags::bitflags;

use crate::{
    member::{MemberKey, MemberKind},
    typesystem::ValueKind,
};

/// Reference-counted handle to a [`TypeShape`]
pub type TypeShapeRc = Arc<TypeShape>;

bitflags! {
    /// Attribute flags describing a type's shape-level capabilities.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TypeAttributes: u32 {
        /// The type is an interface
        const INTERFACE = 0x0001;
        /// The type is abstract
        const ABSTRACT = 0x0002;
        /// The type is sealed; no subclassing, proxying is impossible
        const SEALED = 0x0004;
    }
}

/// Visibility of a storage slot.
///
/// Constructor emulation resolves slots of any visibility; the distinction exists so
/// shapes can faithfully describe their host types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum SlotVisibility {
    /// Accessible from outside the type
    Public,
    /// Accessible only from within the type (includes synthesized backing slots)
    Private,
}

/// A named instance storage slot.
#[derive(Debug, Clone)]
pub struct SlotShape {
    /// Slot name, e.g. `_name` or `<Age>k__BackingField`
    pub name: String,
    /// Kind of value the slot stores
    pub kind: ValueKind,
    /// Declared visibility
    pub visibility: SlotVisibility,
}

/// A property with up to two accessors and optional known storage.
///
/// `backing_slot` is set for auto-properties and names the compiler-synthesized
/// hidden slot. `setter_slot` names the storage a manually-implemented setter writes,
/// when that storage is a single known slot; it is `None` for setters with no single
/// storage location (and for properties without a setter).
#[derive(Debug, Clone)]
pub struct PropertyShape {
    /// Property name
    pub name: String,
    /// Kind of value the property exposes
    pub kind: ValueKind,
    /// Synthesized backing slot name, for auto-properties
    pub backing_slot: Option<String>,
    /// Storage slot the real setter writes, for manual properties
    pub setter_slot: Option<String>,
    /// Whether the property declares a getter
    pub has_getter: bool,
    /// Whether the property declares a setter
    pub has_setter: bool,
}

/// A method signature.
#[derive(Debug, Clone)]
pub struct MethodShape {
    /// Method name
    pub name: String,
    /// Parameter kinds in declaration order
    pub params: Vec<ValueKind>,
    /// Return kind; `Void` for methods without a result
    pub returns: ValueKind,
    /// Whether the method is static
    pub is_static: bool,
}

impl MethodShape {
    /// Returns true if the method produces no value
    #[must_use]
    pub fn is_void(&self) -> bool {
        self.returns == ValueKind::Void
    }
}

/// A constructor signature.
#[derive(Debug, Clone)]
pub struct CtorShape {
    /// Parameter kinds in declaration order
    pub params: Vec<ValueKind>,
    /// Whether the constructor is public
    pub is_public: bool,
}

/// Immutable description of a host type.
///
/// Shapes are constructed via [`crate::typesystem::TypeShapeBuilder`] and shared as
/// [`TypeShapeRc`]. All resolution methods operate on declaration order, which the
/// builder preserves.
///
/// # Examples
///
/// ```rust
/// use dotmock::typesystem::{TypeShapeBuilder, ValueKind};
///
/// let shape = TypeShapeBuilder::new("Calculator")
///     .method("Add", &[ValueKind::I4, ValueKind::I4], ValueKind::I4)
///     .auto_property("Value", ValueKind::I4)
///     .constructor(&[])
///     .build();
///
/// assert!(!shape.is_proxyable());
/// assert!(shape.find_method("Add", None, false).is_some());
/// assert_eq!(
///     shape.find_property("Value").unwrap().backing_slot.as_deref(),
///     Some("<Value>k__BackingField"),
/// );
/// ```
#[derive(Debug)]
pub struct TypeShape {
    pub(crate) name: String,
    pub(crate) attributes: TypeAttributes,
    pub(crate) slots: Vec<SlotShape>,
    pub(crate) properties: Vec<PropertyShape>,
    pub(crate) methods: Vec<MethodShape>,
    pub(crate) constructors: Vec<CtorShape>,
}

impl TypeShape {
    /// Returns the type name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the attribute flags
    #[must_use]
    pub fn attributes(&self) -> TypeAttributes {
        self.attributes
    }

    /// Returns true if the type can be mocked by ordinary proxying.
    ///
    /// Interfaces and abstract types are proxyable; every other type (including
    /// sealed ones) needs the interception path.
    #[must_use]
    pub fn is_proxyable(&self) -> bool {
        self.attributes
            .intersects(TypeAttributes::INTERFACE | TypeAttributes::ABSTRACT)
    }

    /// Returns the declared storage slots
    #[must_use]
    pub fn slots(&self) -> &[SlotShape] {
        &self.slots
    }

    /// Looks up a storage slot by exact name, any visibility.
    #[must_use]
    pub fn slot(&self, name: &str) -> Option<&SlotShape> {
        self.slots.iter().find(|slot| slot.name == name)
    }

    /// Returns the declared properties
    #[must_use]
    pub fn properties(&self) -> &[PropertyShape] {
        &self.properties
    }

    /// Returns the declared methods
    #[must_use]
    pub fn methods(&self) -> &[MethodShape] {
        &self.methods
    }

    /// Returns the declared constructors, in declaration order
    #[must_use]
    pub fn constructors(&self) -> &[CtorShape] {
        &self.constructors
    }

    /// Looks up a property by name.
    #[must_use]
    pub fn find_property(&self, name: &str) -> Option<&PropertyShape> {
        self.properties.iter().find(|property| property.name == name)
    }

    /// Looks up a method by name, optional exact parameter kinds, and staticness.
    ///
    /// With `params: None` the first declared method with a matching name and
    /// staticness wins; `params: Some(..)` additionally requires an exact
    /// parameter-kind match.
    #[must_use]
    pub fn find_method(
        &self,
        name: &str,
        params: Option<&[ValueKind]>,
        is_static: bool,
    ) -> Option<&MethodShape> {
        self.methods.iter().find(|method| {
            method.name == name
                && method.is_static == is_static
                && params.map_or(true, |expected| method.params == expected)
        })
    }

    /// Returns the primary constructor: the first declared public one.
    ///
    /// There is deliberately no overload selection beyond declaration order.
    #[must_use]
    pub fn primary_constructor(&self) -> Option<&CtorShape> {
        self.constructors.iter().find(|ctor| ctor.is_public)
    }

    /// Looks up a constructor by arity, preferring earlier declarations.
    #[must_use]
    pub fn find_constructor(&self, arity: usize) -> Option<&CtorShape> {
        self.constructors.iter().find(|ctor| ctor.params.len() == arity)
    }

    /// Builds the [`MemberKey`] of a method declared on this type.
    #[must_use]
    pub fn method_key(&self, method: &MethodShape) -> MemberKey {
        let kind = if method.is_static {
            MemberKind::StaticMethod
        } else {
            MemberKind::Method
        };
        MemberKey::new(&self.name, kind, &method.name, method.params.clone())
    }

    /// Builds the [`MemberKey`] of a property's getter accessor.
    #[must_use]
    pub fn getter_key(&self, property: &PropertyShape) -> MemberKey {
        MemberKey::new(&self.name, MemberKind::Getter, &property.name, vec![])
    }

    /// Builds the [`MemberKey`] of a property's setter accessor.
    #[must_use]
    pub fn setter_key(&self, property: &PropertyShape) -> MemberKey {
        MemberKey::new(
            &self.name,
            MemberKind::Setter,
            &property.name,
            vec![property.kind],
        )
    }

    /// Builds the [`MemberKey`] of a constructor declared on this type.
    #[must_use]
    pub fn constructor_key(&self, ctor: &CtorShape) -> MemberKey {
        MemberKey::new(
            &self.name,
            MemberKind::Constructor,
            ".ctor",
            ctor.params.clone(),
        )
    }
}
