//! Fluent construction of [`crate::typesystem::TypeShape`] instances.
//!
//! Shapes are immutable once built, so all structure is assembled through
//! [`TypeShapeBuilder`]. The builder preserves declaration order for every member
//! category, which matters for primary-constructor selection and name-only method
//! resolution.
//!
//! # Auto-Properties
//!
//! [`TypeShapeBuilder::auto_property`] synthesizes the hidden backing slot the same
//! way the compiler does, as `<Name>k__BackingField`, and declares both accessors.
//! [`TypeShapeBuilder::readonly_auto_property`] declares only the getter but still
//! synthesizes the backing slot, so constructor emulation can assign through tier two
//! even when there is no setter at all.

use crate::typesystem::{
    CtorShape, MethodShape, PropertyShape, SlotShape, SlotVisibility, TypeAttributes, TypeShape,
    TypeShapeRc, ValueKind,
};

/// Returns the compiler-synthesized backing slot name for an auto-property.
#[must_use]
pub fn backing_slot_name(property: &str) -> String {
    format!("<{property}>k__BackingField")
}

/// Fluent builder for [`TypeShape`].
///
/// # Examples
///
/// ```rust
/// use dotmock::typesystem::{TypeShapeBuilder, ValueKind};
///
/// let person = TypeShapeBuilder::new("Person")
///     .slot("_name", ValueKind::String)
///     .readonly_auto_property("Age", ValueKind::I4)
///     .constructor(&[ValueKind::String, ValueKind::I4])
///     .build();
///
/// assert_eq!(person.name(), "Person");
/// assert!(person.slot("_name").is_some());
/// assert!(person.slot("<Age>k__BackingField").is_some());
/// ```
pub struct TypeShapeBuilder {
    name: String,
    attributes: TypeAttributes,
    slots: Vec<SlotShape>,
    properties: Vec<PropertyShape>,
    methods: Vec<MethodShape>,
    constructors: Vec<CtorShape>,
}

impl TypeShapeBuilder {
    /// Starts a new builder for a concrete type with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        TypeShapeBuilder {
            name: name.into(),
            attributes: TypeAttributes::empty(),
            slots: Vec::new(),
            properties: Vec::new(),
            methods: Vec::new(),
            constructors: Vec::new(),
        }
    }

    /// Marks the type as an interface (proxyable).
    #[must_use]
    pub fn interface(mut self) -> Self {
        self.attributes |= TypeAttributes::INTERFACE;
        self
    }

    /// Marks the type as abstract (proxyable).
    #[must_use]
    pub fn abstract_type(mut self) -> Self {
        self.attributes |= TypeAttributes::ABSTRACT;
        self
    }

    /// Marks the type as sealed.
    #[must_use]
    pub fn sealed(mut self) -> Self {
        self.attributes |= TypeAttributes::SEALED;
        self
    }

    /// Declares a private storage slot.
    #[must_use]
    pub fn slot(self, name: impl Into<String>, kind: ValueKind) -> Self {
        self.slot_with_visibility(name, kind, SlotVisibility::Private)
    }

    /// Declares a public storage slot.
    #[must_use]
    pub fn public_slot(self, name: impl Into<String>, kind: ValueKind) -> Self {
        self.slot_with_visibility(name, kind, SlotVisibility::Public)
    }

    /// Declares a storage slot with explicit visibility.
    #[must_use]
    pub fn slot_with_visibility(
        mut self,
        name: impl Into<String>,
        kind: ValueKind,
        visibility: SlotVisibility,
    ) -> Self {
        self.slots.push(SlotShape {
            name: name.into(),
            kind,
            visibility,
        });
        self
    }

    /// Declares an auto-property with both accessors and a synthesized backing slot.
    #[must_use]
    pub fn auto_property(mut self, name: impl Into<String>, kind: ValueKind) -> Self {
        let name = name.into();
        let backing = backing_slot_name(&name);
        self.slots.push(SlotShape {
            name: backing.clone(),
            kind,
            visibility: SlotVisibility::Private,
        });
        self.properties.push(PropertyShape {
            name,
            kind,
            backing_slot: Some(backing),
            setter_slot: None,
            has_getter: true,
            has_setter: true,
        });
        self
    }

    /// Declares a getter-only auto-property; the backing slot is still synthesized.
    #[must_use]
    pub fn readonly_auto_property(mut self, name: impl Into<String>, kind: ValueKind) -> Self {
        let name = name.into();
        let backing = backing_slot_name(&name);
        self.slots.push(SlotShape {
            name: backing.clone(),
            kind,
            visibility: SlotVisibility::Private,
        });
        self.properties.push(PropertyShape {
            name,
            kind,
            backing_slot: Some(backing),
            setter_slot: None,
            has_getter: true,
            has_setter: false,
        });
        self
    }

    /// Declares a manually-implemented property.
    ///
    /// The caller states the accessor surface and, when the real setter writes a
    /// single known slot, names that slot so tier-three field resolution can reach
    /// it. The slot itself must be declared separately.
    #[must_use]
    pub fn property(mut self, property: PropertyShape) -> Self {
        self.properties.push(property);
        self
    }

    /// Declares an instance method.
    #[must_use]
    pub fn method(
        mut self,
        name: impl Into<String>,
        params: &[ValueKind],
        returns: ValueKind,
    ) -> Self {
        self.methods.push(MethodShape {
            name: name.into(),
            params: params.to_vec(),
            returns,
            is_static: false,
        });
        self
    }

    /// Declares a static method.
    #[must_use]
    pub fn static_method(
        mut self,
        name: impl Into<String>,
        params: &[ValueKind],
        returns: ValueKind,
    ) -> Self {
        self.methods.push(MethodShape {
            name: name.into(),
            params: params.to_vec(),
            returns,
            is_static: true,
        });
        self
    }

    /// Declares a public constructor.
    #[must_use]
    pub fn constructor(mut self, params: &[ValueKind]) -> Self {
        self.constructors.push(CtorShape {
            params: params.to_vec(),
            is_public: true,
        });
        self
    }

    /// Declares a private constructor.
    #[must_use]
    pub fn private_constructor(mut self, params: &[ValueKind]) -> Self {
        self.constructors.push(CtorShape {
            params: params.to_vec(),
            is_public: false,
        });
        self
    }

    /// Finishes the shape and wraps it in a shared handle.
    #[must_use]
    pub fn build(self) -> TypeShapeRc {
        TypeShapeRc::new(TypeShape {
            name: self.name,
            attributes: self.attributes,
            slots: self.slots,
            properties: self.properties,
            methods: self.methods,
            constructors: self.constructors,
        })
    }
}
