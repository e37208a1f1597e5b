//! Integration tests for end-to-end scoped mocking.
//!
//! These tests wire the full stack together - the in-memory host as interception
//! provider, the shared replacement registry, the dispatch hook and one or more
//! mock engines - and exercise realistic test-author scenarios: replacing methods
//! for a scope, property redirection, static methods, and disposal semantics.

use dotmock::{prelude::*, Result};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

struct Fixture {
    host: InMemoryHost,
    registry: Arc<ReplacementRegistry>,
    calculator: TypeShapeRc,
    add_calls: Arc<AtomicUsize>,
}

/// A Calculator with a real `Add` that counts its invocations, a void `Reset`, an
/// auto-property `Value` and a static `Origin`.
fn fixture() -> Result<Fixture> {
    let host = InMemoryHost::new();
    let registry = Arc::new(ReplacementRegistry::new(Arc::new(host.clone())));
    host.bind_dispatch(DispatchHook::new(registry.clone()));

    let calculator = TypeShapeBuilder::new("Calculator")
        .method("Add", &[ValueKind::I4, ValueKind::I4], ValueKind::I4)
        .method("Reset", &[], ValueKind::Void)
        .static_method("Origin", &[], ValueKind::I4)
        .auto_property("Value", ValueKind::I4)
        .constructor(&[])
        .build();
    host.define(calculator.clone());

    let add_calls = Arc::new(AtomicUsize::new(0));
    let counter = add_calls.clone();
    host.implement_method(
        &calculator,
        "Add",
        Arc::new(move |_, args| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Value::I4(
                args[0].as_i4().unwrap() + args[1].as_i4().unwrap(),
            ))
        }),
    )?;
    host.implement_method(&calculator, "Reset", Arc::new(|_, _| Ok(Value::Null)))?;
    host.implement_static(&calculator, "Origin", Arc::new(|_, _| Ok(Value::I4(0))))?;

    Ok(Fixture {
        host,
        registry,
        calculator,
        add_calls,
    })
}

/// Mock a method for one scope, observe the mocked result, dispose, observe the
/// real behavior again. The real body must never run while the mock is active.
#[test]
fn test_method_replacement_lifecycle() -> Result<()> {
    let fx = fixture()?;
    let calc = fx.host.construct(&fx.calculator, &[])?;

    let engine = MockEngine::new("engine.lifecycle", fx.registry.clone());
    let setup = engine.mock(&fx.calculator)?;
    setup.setup_value(
        &MemberDescriptor::named("Add"),
        Arc::new(|args| {
            Ok(Value::I4(
                args[0].as_i4().unwrap() * args[1].as_i4().unwrap(),
            ))
        }),
    )?;

    let mocked = fx.host.invoke(&calc, "Add", &[Value::I4(2), Value::I4(3)])?;
    assert_eq!(mocked, Value::I4(6));
    assert_eq!(fx.add_calls.load(Ordering::SeqCst), 0);

    engine.dispose()?;

    let real = fx.host.invoke(&calc, "Add", &[Value::I4(2), Value::I4(3)])?;
    assert_eq!(real, Value::I4(5));
    assert_eq!(fx.add_calls.load(Ordering::SeqCst), 1);
    Ok(())
}

/// A void setup suppresses the real body and runs the replacement for side effect.
#[test]
fn test_void_replacement_runs_for_side_effect() -> Result<()> {
    let fx = fixture()?;
    let calc = fx.host.construct(&fx.calculator, &[])?;

    let observed = Arc::new(AtomicUsize::new(0));
    let probe = observed.clone();

    let engine = MockEngine::new("engine.void", fx.registry.clone());
    let setup = engine.mock(&fx.calculator)?;
    setup.setup_void(
        &MemberDescriptor::named("Reset"),
        Arc::new(move |_| {
            probe.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }),
    )?;

    fx.host.invoke(&calc, "Reset", &[])?;
    assert_eq!(observed.load(Ordering::SeqCst), 1);
    Ok(())
}

/// Two live scopes replacing the same member: the dispatched result is one of the
/// registered values, and disposing one scope leaves the other's in force.
#[test]
fn test_two_scopes_on_one_member() -> Result<()> {
    let fx = fixture()?;
    let calc = fx.host.construct(&fx.calculator, &[])?;
    let add = MemberDescriptor::named("Add");

    let engine1 = MockEngine::new("engine.multi.1", fx.registry.clone());
    let engine2 = MockEngine::new("engine.multi.2", fx.registry.clone());
    engine1
        .mock(&fx.calculator)?
        .setup_value(&add, Arc::new(|_| Ok(Value::I4(100))))?;
    engine2
        .mock(&fx.calculator)?
        .setup_value(&add, Arc::new(|_| Ok(Value::I4(200))))?;

    let result = fx.host.invoke(&calc, "Add", &[Value::I4(1), Value::I4(1)])?;
    assert!(
        result == Value::I4(100) || result == Value::I4(200),
        "expected a registered value, got {result:?}"
    );
    assert_eq!(fx.add_calls.load(Ordering::SeqCst), 0);

    engine1.dispose()?;
    let result = fx.host.invoke(&calc, "Add", &[Value::I4(1), Value::I4(1)])?;
    assert_eq!(result, Value::I4(200));

    engine2.dispose()?;
    let result = fx.host.invoke(&calc, "Add", &[Value::I4(1), Value::I4(1)])?;
    assert_eq!(result, Value::I4(2));
    Ok(())
}

/// Re-running a setup for the same member in the same scope replaces the previous
/// replacement rather than stacking a second one.
#[test]
fn test_reregistration_overwrites_within_scope() -> Result<()> {
    let fx = fixture()?;
    let calc = fx.host.construct(&fx.calculator, &[])?;
    let add = MemberDescriptor::named("Add");

    let engine = MockEngine::new("engine.overwrite", fx.registry.clone());
    let setup = engine.mock(&fx.calculator)?;
    setup.setup_value(&add, Arc::new(|_| Ok(Value::I4(1))))?;
    setup.setup_value(&add, Arc::new(|_| Ok(Value::I4(2))))?;

    let result = fx.host.invoke(&calc, "Add", &[Value::I4(0), Value::I4(0)])?;
    assert_eq!(result, Value::I4(2));
    Ok(())
}

/// Property setup redirects the setter to a no-op while the getter keeps reading
/// the backing storage, so reads reflect whatever the storage holds.
#[test]
fn test_property_setup_suppresses_setter_only() -> Result<()> {
    let fx = fixture()?;
    let calc = fx.host.construct(&fx.calculator, &[])?;

    // Establish real state before mocking.
    fx.host.set_property(&calc, "Value", Value::I4(7))?;

    let engine = MockEngine::new("engine.property", fx.registry.clone());
    let setup = engine.mock(&fx.calculator)?;
    setup.setup_property("Value", Value::I4(99))?;

    // Writes are swallowed; reads still see the pre-mock storage.
    fx.host.set_property(&calc, "Value", Value::I4(50))?;
    assert_eq!(fx.host.get_property(&calc, "Value")?, Value::I4(7));

    engine.dispose()?;
    fx.host.set_property(&calc, "Value", Value::I4(50))?;
    assert_eq!(fx.host.get_property(&calc, "Value")?, Value::I4(50));
    Ok(())
}

/// Static methods are replaced through the engine directly and revert on disposal.
#[test]
fn test_static_method_replacement() -> Result<()> {
    let fx = fixture()?;

    let engine = MockEngine::new("engine.static", fx.registry.clone());
    engine.setup_static_method(&fx.calculator, "Origin", Arc::new(|_| Ok(Value::I4(42))))?;

    assert_eq!(
        fx.host.invoke_static(&fx.calculator, "Origin", &[])?,
        Value::I4(42)
    );

    engine.dispose()?;
    assert_eq!(
        fx.host.invoke_static(&fx.calculator, "Origin", &[])?,
        Value::I4(0)
    );
    Ok(())
}

/// Dropping an engine without an explicit dispose still tears its scope down.
#[test]
fn test_drop_disposes_scope() -> Result<()> {
    let fx = fixture()?;
    let calc = fx.host.construct(&fx.calculator, &[])?;

    {
        let engine = MockEngine::new("engine.drop", fx.registry.clone());
        engine
            .mock(&fx.calculator)?
            .setup_value(&MemberDescriptor::named("Add"), Arc::new(|_| Ok(Value::I4(9))))?;

        let result = fx.host.invoke(&calc, "Add", &[Value::I4(1), Value::I4(1)])?;
        assert_eq!(result, Value::I4(9));
    }

    let result = fx.host.invoke(&calc, "Add", &[Value::I4(1), Value::I4(1)])?;
    assert_eq!(result, Value::I4(2));
    assert_eq!(fx.registry.active_members(), 0);
    Ok(())
}

/// Overload resolution: a descriptor with explicit parameter kinds selects the
/// matching overload rather than the first declared one.
#[test]
fn test_overload_selection_by_parameter_kinds() -> Result<()> {
    let host = InMemoryHost::new();
    let registry = Arc::new(ReplacementRegistry::new(Arc::new(host.clone())));
    host.bind_dispatch(DispatchHook::new(registry.clone()));

    let shape = TypeShapeBuilder::new("Widening")
        .method("Add", &[ValueKind::I4, ValueKind::I4], ValueKind::I4)
        .method("Add", &[ValueKind::I8, ValueKind::I8], ValueKind::I8)
        .constructor(&[])
        .build();
    host.define(shape.clone());
    host.implement_method(&shape, "Add", Arc::new(|_, _| Ok(Value::I4(0))))?;

    let engine = MockEngine::new("engine.overload", registry.clone());
    let setup = engine.mock(&shape)?;
    setup.setup_value(
        &MemberDescriptor::with_params("Add", vec![ValueKind::I8, ValueKind::I8]),
        Arc::new(|_| Ok(Value::I8(7))),
    )?;

    // Only the wide overload is intercepted.
    let wide = shape
        .find_method("Add", Some(&[ValueKind::I8, ValueKind::I8]), false)
        .unwrap();
    assert!(registry.is_active(&shape.method_key(wide)));
    let narrow = shape
        .find_method("Add", Some(&[ValueKind::I4, ValueKind::I4]), false)
        .unwrap();
    assert!(!registry.is_active(&shape.method_key(narrow)));
    Ok(())
}

/// Unknown members fail the setup synchronously with the member and type names.
#[test]
fn test_unknown_member_setup_fails() -> Result<()> {
    let fx = fixture()?;
    let engine = MockEngine::new("engine.unknown", fx.registry.clone());
    let setup = engine.mock(&fx.calculator)?;

    match setup.setup_value(&MemberDescriptor::named("Subtract"), Arc::new(|_| Ok(Value::Null))) {
        Err(Error::MemberNotFound { member, type_name }) => {
            assert_eq!(member, "Subtract");
            assert_eq!(type_name, "Calculator");
        }
        other => panic!("expected MemberNotFound, got {other:?}"),
    }
    Ok(())
}

/// A failing replacement callable surfaces at the original call site unchanged.
#[test]
fn test_replacement_failure_reaches_call_site() -> Result<()> {
    let fx = fixture()?;
    let calc = fx.host.construct(&fx.calculator, &[])?;

    let engine = MockEngine::new("engine.failure", fx.registry.clone());
    engine.mock(&fx.calculator)?.setup_value(
        &MemberDescriptor::named("Add"),
        Arc::new(|_| Err(Error::ReplacementInvocation("scripted failure".to_string()))),
    )?;

    let error = fx
        .host
        .invoke(&calc, "Add", &[Value::I4(1), Value::I4(1)])
        .unwrap_err();
    assert!(matches!(error, Error::ReplacementInvocation(_)));
    assert_eq!(fx.add_calls.load(Ordering::SeqCst), 0);
    Ok(())
}
