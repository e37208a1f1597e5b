use thiserror::Error;

macro_rules! member_not_found {
    // Member and type name version
    ($member:expr, $type_name:expr) => {
        crate::Error::MemberNotFound {
            member: $member.to_string(),
            type_name: $type_name.to_string(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// This enum covers all possible error conditions that can occur during member resolution,
/// replacement registration, dispatch, and constructor emulation. Each variant provides
/// specific context about the failure mode to enable appropriate error handling.
///
/// # Error Categories
///
/// ## Resolution Errors
/// - [`Error::MemberNotFound`] - The named method, property or constructor does not exist
/// - [`Error::TypeNotFound`] - A type (or its real member body) is not known to the host
/// - [`Error::UnsupportedSetup`] - The requested setup cannot be expressed on the target member
///
/// ## Emulation Errors
/// - [`Error::FieldResolution`] - A constructor-emulation slot name matched no resolution tier
///
/// ## Dispatch Errors
/// - [`Error::ReplacementInvocation`] - A registered replacement callable failed
///
/// ## Provider Errors
/// - [`Error::Provider`] - Hook installation, removal or allocation failed
///
/// # Propagation Policy
///
/// Every error is raised synchronously at the point of the offending call: `setup_*`
/// operations fail immediately on resolution errors, while callable failures surface at
/// the original (intercepted) call site. Nothing in this crate retries.
///
/// # Examples
///
/// ```rust
/// use dotmock::prelude::*;
/// use std::sync::Arc;
///
/// let host = InMemoryHost::new();
/// let registry = Arc::new(ReplacementRegistry::new(Arc::new(host.clone())));
/// let shape = TypeShapeBuilder::new("Widget").constructor(&[]).build();
/// host.define(shape.clone());
///
/// let engine = MockEngine::new("scope-1", registry);
/// let setup = engine.mock(&shape).unwrap();
///
/// let missing = MemberDescriptor::named("DoesNotExist");
/// match setup.setup_value(&missing, Arc::new(|_| Ok(Value::Null))) {
///     Err(Error::MemberNotFound { member, type_name }) => {
///         eprintln!("no member {member} on {type_name}");
///     }
///     other => panic!("expected MemberNotFound, got {other:?}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    // Resolution Errors
    /// The named method, property accessor or constructor does not exist on the target type.
    ///
    /// This error occurs when a [`crate::MemberDescriptor`] (or a member name passed to a
    /// `setup_*` operation) cannot be resolved against the target
    /// [`crate::typesystem::TypeShape`], either because no member carries that name or
    /// because the supplied parameter kinds match no declared overload.
    ///
    /// # Fields
    ///
    /// * `member` - The member name (or rendered descriptor) that failed to resolve
    /// * `type_name` - The type the resolution ran against
    #[error("Member '{member}' not found on type '{type_name}'")]
    MemberNotFound {
        /// The member name that failed to resolve
        member: String,
        /// The type the resolution ran against
        type_name: String,
    },

    /// The type (or a real member body) is not known to the host.
    ///
    /// Raised by host-side operations when a call is routed to a type that was never
    /// registered, or to a member whose real implementation was never supplied.
    #[error("Type or member body not known to the host - {0}")]
    TypeNotFound(String),

    /// The requested setup cannot be expressed on the target member.
    ///
    /// Typical causes: a property without an accessible setter passed to a property
    /// setup, or a proxyable type mocked on an engine with no proxy adapter configured.
    #[error("Unsupported setup: {0}")]
    UnsupportedSetup(String),

    // Emulation Errors
    /// A constructor-emulation slot name matched none of the three resolution tiers.
    ///
    /// During constructor emulation every field-bag entry must resolve against the
    /// instance as (in order) an exact storage slot of any visibility, the synthesized
    /// backing slot of a property with that name, or the storage of a writable property
    /// with that name. A name matching none of the three fails with this error.
    ///
    /// # Fields
    ///
    /// * `slot` - The slot name that failed to resolve
    /// * `type_name` - The type of the instance being emulated
    #[error("Field or property '{slot}' not found on type '{type_name}'")]
    FieldResolution {
        /// The slot name that failed to resolve
        slot: String,
        /// The type of the instance being emulated
        type_name: String,
    },

    // Dispatch Errors
    /// A registered replacement callable failed.
    ///
    /// The failure propagates unchanged to the original call site, exactly as if the
    /// real member body had raised it. Nothing along the dispatch path swallows or
    /// transforms the error.
    #[error("Replacement invocation failed: {0}")]
    ReplacementInvocation(String),

    // Provider Errors
    /// Hook installation, removal or instance allocation failed in the interception provider.
    ///
    /// Provider failures are fatal to the triggering registry operation and propagate
    /// synchronously to the caller; the registry never retries and never leaves a
    /// half-registered member behind.
    #[error("Interception provider failure: {0}")]
    Provider(String),
}
