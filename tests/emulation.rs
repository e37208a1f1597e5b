//! Integration tests for constructor emulation through the full stack.
//!
//! These tests cover the scenario constructor emulation exists for: a type whose
//! real constructor has side effects (a call counter here, I/O or validation in
//! the wild) gets constructed during a mock scope without any of them happening,
//! its fields populated from the initializer's bag instead.

use dotmock::{prelude::*, Result};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

struct Fixture {
    host: InMemoryHost,
    registry: Arc<ReplacementRegistry>,
    person: TypeShapeRc,
    ctor_calls: Arc<AtomicUsize>,
}

/// A Person with a private `_name` slot, a readonly auto-property `Age`, and a
/// real constructor that counts its executions and fills both fields.
fn fixture() -> Result<Fixture> {
    let host = InMemoryHost::new();
    let registry = Arc::new(ReplacementRegistry::new(Arc::new(host.clone())));
    host.bind_dispatch(DispatchHook::new(registry.clone()));

    let person = TypeShapeBuilder::new("Person")
        .slot("_name", ValueKind::String)
        .readonly_auto_property("Age", ValueKind::I4)
        .constructor(&[])
        .build();
    host.define(person.clone());

    let ctor_calls = Arc::new(AtomicUsize::new(0));
    let counter = ctor_calls.clone();
    host.implement_constructor(
        &person,
        0,
        Arc::new(move |instance, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            instance.set_slot("_name", Value::from("real"));
            instance.set_slot("<Age>k__BackingField", Value::I4(30));
            Ok(())
        }),
    )?;

    Ok(Fixture {
        host,
        registry,
        person,
        ctor_calls,
    })
}

/// The canonical emulation scenario: private slot plus readonly auto-property,
/// real constructor side effects absent.
#[test]
fn test_emulated_construction_skips_real_body() -> Result<()> {
    let fx = fixture()?;

    let engine = MockEngine::new("emulation.basic", fx.registry.clone());
    let setup = engine.mock(&fx.person)?;
    setup.setup_constructor(Arc::new(|_, bag, _| {
        bag.set("_name", Value::from("X"));
        bag.set("Age", Value::I4(7));
        Ok(())
    }))?;

    let person = setup.object()?;
    assert_eq!(person.slot("_name"), Some(Value::from("X")));
    assert_eq!(person.slot("<Age>k__BackingField"), Some(Value::I4(7)));
    assert_eq!(fx.ctor_calls.load(Ordering::SeqCst), 0);
    Ok(())
}

/// Every intercepted `new` call site yields its own fresh emulated instance; none
/// of them runs the real constructor while the scope is live.
#[test]
fn test_intercepted_new_yields_fresh_instances() -> Result<()> {
    let fx = fixture()?;

    let engine = MockEngine::new("emulation.new", fx.registry.clone());
    let setup = engine.mock(&fx.person)?;
    setup.setup_constructor(Arc::new(|_, bag, _| {
        bag.set("_name", Value::from("X"));
        Ok(())
    }))?;

    let first = fx.host.construct(&fx.person, &[])?;
    let second = fx.host.construct(&fx.person, &[])?;

    assert!(!first.same_as(&second));
    assert_eq!(first.slot("_name"), Some(Value::from("X")));
    assert_eq!(second.slot("_name"), Some(Value::from("X")));
    assert_eq!(fx.ctor_calls.load(Ordering::SeqCst), 0);

    engine.dispose()?;

    // After disposal the real constructor runs again.
    let real = fx.host.construct(&fx.person, &[])?;
    assert_eq!(real.slot("_name"), Some(Value::from("real")));
    assert_eq!(fx.ctor_calls.load(Ordering::SeqCst), 1);
    Ok(())
}

/// Without a constructor setup, `object()` falls back to real default
/// construction, side effects included.
#[test]
fn test_object_without_setup_constructs_for_real() -> Result<()> {
    let fx = fixture()?;

    let engine = MockEngine::new("emulation.fallback", fx.registry.clone());
    let setup = engine.mock(&fx.person)?;

    let person = setup.object()?;
    assert_eq!(person.slot("_name"), Some(Value::from("real")));
    assert_eq!(person.slot("<Age>k__BackingField"), Some(Value::I4(30)));
    assert_eq!(fx.ctor_calls.load(Ordering::SeqCst), 1);
    Ok(())
}

/// `object()` after a constructor setup returns the one eagerly emulated
/// instance, not a new one per call.
#[test]
fn test_object_returns_cached_emulated_instance() -> Result<()> {
    let fx = fixture()?;

    let engine = MockEngine::new("emulation.cached", fx.registry.clone());
    let setup = engine.mock(&fx.person)?;
    setup.setup_constructor(Arc::new(|_, bag, _| {
        bag.set("Age", Value::I4(7));
        Ok(())
    }))?;

    let first = setup.object()?;
    let second = setup.object()?;
    assert!(first.same_as(&second));
    Ok(())
}

/// An initializer naming an unresolvable field fails the setup synchronously with
/// the slot and type names.
#[test]
fn test_unresolvable_field_fails_setup() -> Result<()> {
    let fx = fixture()?;

    let engine = MockEngine::new("emulation.unresolved", fx.registry.clone());
    let setup = engine.mock(&fx.person)?;
    let result = setup.setup_constructor(Arc::new(|_, bag, _| {
        bag.set("_salary", Value::I4(1));
        Ok(())
    }));

    match result {
        Err(Error::FieldResolution { slot, type_name }) => {
            assert_eq!(slot, "_salary");
            assert_eq!(type_name, "Person");
        }
        other => panic!("expected FieldResolution, got {other:?}"),
    }
    Ok(())
}

/// The initializer sees the uninitialized instance and may branch on it.
#[test]
fn test_initializer_observes_uninitialized_instance() -> Result<()> {
    let fx = fixture()?;

    let engine = MockEngine::new("emulation.observe", fx.registry.clone());
    let setup = engine.mock(&fx.person)?;
    setup.setup_constructor(Arc::new(|instance, bag, _| {
        // Zero-filled allocation: string slots start empty.
        assert_eq!(instance.slot("_name"), Some(Value::String(String::new())));
        bag.set("_name", Value::from("checked"));
        Ok(())
    }))?;

    let person = setup.object()?;
    assert_eq!(person.slot("_name"), Some(Value::from("checked")));
    Ok(())
}
