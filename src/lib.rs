// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # dotmock
//!
//! A mocking core for concrete and sealed types, built in pure Rust. Where
//! conventional mocking stops at interfaces and virtual members, `dotmock` routes
//! member execution through an interception layer: real member bodies are
//! suppressed per call, replacement callables supply results, and constructors are
//! emulated field-by-field - all scoped to the lifetime of the test that asked
//! for it.
//!
//! ## Features
//!
//! - **Concrete-type mocking** - sealed and non-subclassable types are first-class
//!   targets; proxyable types delegate to a pluggable adapter
//! - **Scoped replacements** - every mock scope tears down exactly its own
//!   registrations, even with scopes nested or running in parallel
//! - **Constructor emulation** - intercepted `new` call sites yield instances
//!   initialized from a field bag, without running the real constructor
//! - **Pluggable interception** - the physical redirection mechanism is a trait;
//!   a reference in-memory host ships with the crate
//! - **Thread safe** - one shared registry serves concurrent test threads with
//!   lock-free reads and per-member write serialization
//!
//! ## Quick Start
//!
//! Add `dotmock` to your `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! dotmock = "0.1"
//! ```
//!
//! ### Using the Prelude
//!
//! ```rust
//! use dotmock::prelude::*;
//! use std::sync::Arc;
//!
//! // Wire the reference host to a shared registry.
//! let host = InMemoryHost::new();
//! let registry = Arc::new(ReplacementRegistry::new(Arc::new(host.clone())));
//! host.bind_dispatch(DispatchHook::new(registry.clone()));
//!
//! // Describe and implement a concrete (non-proxyable) type.
//! let calculator = TypeShapeBuilder::new("Calculator")
//!     .method("Add", &[ValueKind::I4, ValueKind::I4], ValueKind::I4)
//!     .constructor(&[])
//!     .build();
//! host.define(calculator.clone());
//! host.implement_method(&calculator, "Add", Arc::new(|_, args| {
//!     Ok(Value::I4(args[0].as_i4().unwrap() + args[1].as_i4().unwrap()))
//! }))?;
//!
//! // Mock it for the lifetime of one scope.
//! let engine = MockEngine::new("readme.scope", registry);
//! let setup = engine.mock(&calculator)?;
//! setup.setup_value(&MemberDescriptor::named("Add"), Arc::new(|args| {
//!     Ok(Value::I4(args[0].as_i4().unwrap() * args[1].as_i4().unwrap()))
//! }))?;
//!
//! let calc = host.construct(&calculator, &[])?;
//! assert_eq!(host.invoke(&calc, "Add", &[Value::I4(2), Value::I4(3)])?, Value::I4(6));
//!
//! engine.dispose()?;
//! assert_eq!(host.invoke(&calc, "Add", &[Value::I4(2), Value::I4(3)])?, Value::I4(5));
//! # Ok::<(), dotmock::Error>(())
//! ```
//!
//! ## Architecture
//!
//! `dotmock` is organized into several key modules:
//!
//! - [`prelude`] - Convenient re-exports of commonly used types and traits
//! - [`typesystem`] - Explicit type shapes, runtime values and allocated instances
//! - [`registry`] - The process-wide map of active member replacements
//! - [`dispatch`] - The protocol deciding, per intercepted call, whether the real
//!   body runs
//! - [`emulator`] - Constructor emulation with three-tier field resolution
//! - [`engine`] - Scoped mocking façade with strategy classification and disposal
//! - [`host`] - Reference [`InterceptionProvider`] realized as an in-memory
//!   indirection layer
//! - [`Error`] and [`Result`] - Comprehensive error handling
//!
//! ### Interception Flow
//!
//! A `setup_*` call resolves the target member to a [`MemberKey`], registers a
//! replacement entry in the [`ReplacementRegistry`] under the calling scope's
//! identity, and installs a provider hook the first time any scope touches that
//! member. Every later execution of the member reaches the [`DispatchHook`],
//! which consults the registry snapshot: no entries means the real body runs,
//! otherwise the entries run instead. Disposing the scope removes its entries and
//! uninstalls the hook when the last scope leaves, restoring real-body execution.

#[macro_use]
pub(crate) mod macros;

#[macro_use]
pub(crate) mod error;

/// Convenient re-exports of the most commonly used types and traits.
///
/// This module provides a curated selection of the most frequently used types
/// from across the dotmock library, allowing for convenient glob imports.
///
/// # Example
///
/// ```rust
/// use dotmock::prelude::*;
/// use std::sync::Arc;
///
/// let host = InMemoryHost::new();
/// let registry = Arc::new(ReplacementRegistry::new(Arc::new(host)));
/// let engine = MockEngine::new("scope-1", registry);
/// assert_eq!(engine.scope_id(), "scope-1");
/// ```
pub mod prelude;

/// Structural member identity and setup-time member descriptors.
///
/// Members are identified by [`member::MemberKey`]: declaring type name, member
/// kind, member name and parameter kinds. Identity is structural, so every layer
/// of the crate (registry, dispatch, provider) agrees on which member a call
/// refers to without sharing object references.
pub mod member;

/// Explicit model of host types, runtime values and allocated instances.
///
/// Rust has no runtime reflection, so the type facts the mocking core needs
/// (member signatures, storage slot names, backing slots, constructor order) are
/// supplied up front as immutable [`typesystem::TypeShape`]s built via
/// [`typesystem::TypeShapeBuilder`].
pub mod typesystem;

/// Process-wide registry of active member replacements.
///
/// One [`registry::ReplacementRegistry`] is shared by every mock scope. It maps
/// member identity to per-scope replacement entries and owns the provider
/// handshake: hooks are installed on a member's first registration and
/// uninstalled when its last registration leaves.
pub mod registry;

/// The dispatch protocol between the interception provider and the registry.
///
/// [`dispatch::DispatchHook`] answers one question per intercepted call: run the
/// real body, or suppress it and with what result.
pub mod dispatch;

/// Constructor emulation: field bags and three-tier slot resolution.
///
/// Builds initialized instances without executing real constructor bodies. Each
/// requested field resolves as an exact storage slot, an auto-property backing
/// slot, or the storage of a writable property, in that order.
pub mod emulator;

/// Per-test-scope mocking façade: strategy classification, setups and disposal.
pub mod engine;

/// The external interception capability boundary.
///
/// [`provider::InterceptionProvider`] is the contract for the physical mechanism
/// that redirects member execution into the dispatch protocol.
pub mod provider;

/// Reference interception provider backed by in-memory member bodies.
pub mod host;

/// The result type used throughout dotmock
pub type Result<T> = std::result::Result<T, Error>;

pub use error::Error;

pub use dispatch::DispatchHook;
pub use engine::{classify, InterceptSetup, MemberSetup, MockEngine, MockStrategy, ProxyMockAdapter};
pub use host::InMemoryHost;
pub use member::{MemberDescriptor, MemberKey, MemberKind};
pub use provider::{HookHandle, InterceptionProvider};
pub use registry::{
    FieldInitFn, ReplacementEntry, ReplacementKind, ReplacementRegistry, ValueFn, VoidFn,
};
