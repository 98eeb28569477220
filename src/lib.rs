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
#![allow(dead_code)]

//! # cilforge
//!
//! [![Crates.io](https://img.shields.io/crates/v/cilforge.svg)](https://crates.io/crates/cilforge)
//! [![Documentation](https://docs.rs/cilforge/badge.svg)](https://docs.rs/cilforge)
//! [![License](https://img.shields.io/badge/license-Apache--2.0-blue.svg)](https://github.com/BinFlip/cilforge/blob/main/LICENSE-APACHE)
//!
//! A compiler-side engine for the attributes a .NET language compiler reserves for itself.
//! Built in pure Rust, `cilforge` recognizes user definitions of reserved marker attributes,
//! synthesizes the ones a compilation needs but cannot resolve, guards explicit uses in
//! source, decides `StructLayout` for every type, and produces the ECMA-335 table rows
//! that carry all of it into an assembly.
//!
//! ## Features
//!
//! - **🧩 Reserved attribute registry** - Static descriptors for every marker attribute the compiler owns
//! - **✅ Shape validation** - User definitions on reserved names checked once and recognized or listed in a single diagnostic
//! - **⚙️ Lazy synthesis** - Missing attributes materialized as embedded definitions, memoized per kind
//! - **🛡️ Explicit-use guard** - Reserved names rejected wherever source applies them directly
//! - **📐 Layout decisions** - `StructLayout`, `Pack`, `Size` and `FieldOffset` validated and folded into `ClassLayout`/`FieldLayout` rows
//! - **⚡ Parallel checking** - Per-type passes run on rayon with diagnostics kept in declaration order
//! - **🛡️ Memory safe** - Built in Rust with comprehensive error handling
//!
//! ## Quick Start
//!
//! Add `cilforge` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! cilforge = "0.1"
//! ```
//!
//! ### Using the Prelude
//!
//! For convenient access to the most commonly used types, import the prelude:
//!
//! ```rust
//! use cilforge::prelude::*;
//!
//! // Build the declaration graph the host compiler hands over
//! let assembly = Assembly::new(AssemblyIdentity::new("Interop"));
//! TypeDeclBuilder::value_type(&assembly, "Interop", "Handle")
//!     .ref_like()
//!     .build()?;
//!
//! // Check and emit; the ref struct forces marker synthesis
//! let compilation = Compilation::new(assembly, CompilationOptions::default());
//! let metadata = compilation.emit()?;
//! println!("Synthesized {} support types", metadata.synthesized_types.len());
//! # Ok::<(), cilforge::Error>(())
//! ```
//!
//! ### Basic Usage
//!
//! ```rust
//! use cilforge::metadata::{
//!     compilation::Compilation,
//!     identity::AssemblyIdentity,
//!     options::CompilationOptions,
//!     symbols::{assembly::Assembly, builder::TypeDeclBuilder},
//! };
//!
//! let assembly = Assembly::new(AssemblyIdentity::new("Native"));
//!
//! // A readonly struct triggers an IsReadOnly marker on its definition
//! TypeDeclBuilder::value_type(&assembly, "Native", "Header")
//!     .readonly()
//!     .build()?;
//!
//! let compilation = Compilation::new(assembly, CompilationOptions::default());
//! compilation.check();
//! assert!(!compilation.diagnostics().has_errors());
//!
//! let metadata = compilation.emit()?;
//! assert!(metadata
//!     .custom_attributes
//!     .iter()
//!     .any(|row| row.name == "IsReadOnlyAttribute"));
//! # Ok::<(), cilforge::Error>(())
//! ```
//!
//! ## Architecture
//!
//! `cilforge` is organized into several key modules:
//!
//! - [`prelude`] - Convenient re-exports of commonly used types and traits
//! - [`metadata`] - Declaration model, checking passes, and emitted table rows
//! - [`Error`] and [`Result`] - Comprehensive error handling
//!
//! ### Checking and Emission
//!
//! The [`metadata::compilation::Compilation`] is the main entry point. It drives:
//!
//! - **Recognition**: user definitions on reserved names validated and latched
//! - **Guarding**: explicit applications of reserved attributes reported
//! - **Layout**: one `StructLayout` decision per type, cached on the declaration
//! - **Synthesis**: reserved attributes the triggers demand, resolved or embedded
//! - **Emission**: `ClassLayout`, `FieldLayout` and `CustomAttribute` rows
//!
//! ### Declaration Model
//!
//! The [`metadata::symbols`] module holds the graph the host compiler builds:
//!
//! - [`metadata::symbols::assembly::Assembly`] - Token allocation, type registry, friends, forwarders
//! - [`metadata::symbols::builder::TypeDeclBuilder`] - Fluent construction of type declarations
//! - [`metadata::symbols::shape::TypeShape`] - Field and signature shapes with nullability and tuple names
//!
//! ## Standards Compliance
//!
//! `cilforge` follows the **ECMA-335 specification** (6th edition) for the Common Language
//! Infrastructure. Emitted rows and custom-attribute blobs conform to partition II.
//!
//! ### References
//!
//! - [ECMA-335 Standard](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf) - Official CLI specification
//! - [.NET Compiler Platform](https://github.com/dotnet/roslyn) - Reference behavior for reserved attributes
//!
//! ## Performance
//!
//! `cilforge` is designed for use inside a compiler hot path:
//!
//! - **Lock-free registry** of attribute descriptors resolved by name
//! - **Write-once memoization** so each attribute kind is synthesized at most once
//! - **Parallel type checking** through rayon, with deterministic diagnostic order
//! - **Append-only sinks** that never block reporting threads
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, Error>`](Result) with comprehensive error information:
//!
//! ```rust
//! use cilforge::{Error, metadata::compilation::Compilation};
//! use cilforge::metadata::{
//!     identity::AssemblyIdentity, options::CompilationOptions, symbols::assembly::Assembly,
//! };
//!
//! let assembly = Assembly::new(AssemblyIdentity::new("Lib"));
//! let compilation = Compilation::new(assembly, CompilationOptions::default());
//!
//! match compilation.emit() {
//!     Ok(metadata) => println!("Emitted {} attribute rows", metadata.custom_attributes.len()),
//!     Err(Error::EmitBlocked { errors }) => println!("Emission blocked by {} errors", errors),
//!     Err(Error::AttributeUnavailable(name)) => println!("Cannot synthesize: {}", name),
//!     Err(e) => println!("Other error: {}", e),
//! }
//! ```
//!
//! ## Development and Testing
//!
//! The test suite exercises recognition, synthesis, guarding, layout and emission
//! against the behavior of the reference compiler:
//!
//! ```bash
//! cargo test
//! cargo bench  # Synthesis and emission benchmarks
//! ```

#[macro_use]
pub(crate) mod error;

/// Convenient re-exports of the most commonly used types and traits.
///
/// This module provides a curated selection of the most frequently used types
/// from across the cilforge library, allowing for convenient glob imports.
///
/// # Example
///
/// ```rust
/// use cilforge::prelude::*;
///
/// let assembly = Assembly::new(AssemblyIdentity::new("Lib"));
/// let compilation = Compilation::new(assembly, CompilationOptions::default());
/// let metadata = compilation.emit()?;
/// # Ok::<(), cilforge::Error>(())
/// ```
pub mod prelude;

/// Declaration model, checking passes, and emitted rows for ECMA-335 metadata
///
/// This module implements the reserved-attribute machinery a compiler runs
/// between binding and emission, plus the type-layout decision procedure and
/// the table rows both produce.
///
/// # Key Components
///
/// ## Checking and Emission
/// - [`metadata::compilation`] - The [`Compilation`] facade driving every pass
/// - [`metadata::options`] - Output kind, target runtime, parallelism switches
/// - [`metadata::diagnostics`] - Compiler diagnostic codes and the shared sink
///
/// ## Reserved Attributes
/// - [`metadata::wellknown`] - Registry of reserved attribute descriptors
/// - Shape validation of user definitions occupying reserved names
/// - Lazy synthesis of missing attributes as embedded definitions
/// - The guard rejecting explicit applications in source
///
/// ## Declaration Model
/// - [`metadata::symbols`] - Assemblies, types, fields, members, attributes
/// - [`metadata::identity`] - Assembly identity and friend-assembly grants
/// - [`metadata::token`] - Metadata tokens for cross-references
///
/// ## Layout and Rows
/// - [`metadata::layout`] - The `StructLayout` decision procedure
/// - [`metadata::emit`] - `ClassLayout`, `FieldLayout` and `CustomAttribute` rows
///
/// # Examples
///
/// ```rust
/// use cilforge::Compilation;
/// use cilforge::metadata::{
///     identity::AssemblyIdentity, options::CompilationOptions, symbols::assembly::Assembly,
/// };
///
/// let assembly = Assembly::new(AssemblyIdentity::new("Lib"));
/// let compilation = Compilation::new(assembly, CompilationOptions::default());
///
/// // Checking is idempotent; emission folds every decision into rows
/// compilation.check();
/// let metadata = compilation.emit()?;
/// println!("Layout rows: {}", metadata.class_layouts.len());
/// # Ok::<(), cilforge::Error>(())
/// ```
pub mod metadata;

/// `cilforge` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
/// This is used consistently throughout the crate for all fallible operations.
///
/// # Examples
///
/// ```rust
/// use cilforge::{Compilation, EmittedMetadata, Result};
///
/// fn produce(compilation: &Compilation) -> Result<EmittedMetadata> {
///     compilation.emit()
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// `cilforge` Error type
///
/// The main error type for all operations in this crate. Provides detailed error
/// information for declaration registration, synthesis, and emission.
///
/// # Examples
///
/// ```rust
/// use cilforge::{Error, metadata::compilation::Compilation};
/// use cilforge::metadata::{
///     identity::AssemblyIdentity, options::CompilationOptions, symbols::assembly::Assembly,
/// };
///
/// let assembly = Assembly::new(AssemblyIdentity::new("Lib"));
/// let compilation = Compilation::new(assembly, CompilationOptions::default());
///
/// match compilation.emit() {
///     Ok(_) => println!("Emitted successfully"),
///     Err(Error::EmitBlocked { errors, .. }) => println!("Blocked by {} errors", errors),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
pub use error::Error;

/// Main entry point for checking declarations and emitting reserved metadata.
///
/// See [`metadata::compilation::Compilation`] for the pass pipeline and
/// [`metadata::compilation::EmittedMetadata`] for the produced rows.
///
/// # Example
///
/// ```rust
/// use cilforge::Compilation;
/// use cilforge::metadata::{
///     identity::AssemblyIdentity, options::CompilationOptions, symbols::assembly::Assembly,
/// };
///
/// let assembly = Assembly::new(AssemblyIdentity::new("Lib"));
/// let compilation = Compilation::new(assembly, CompilationOptions::default());
/// let metadata = compilation.emit()?;
/// println!("Synthesized {} types", metadata.synthesized_types.len());
/// # Ok::<(), cilforge::Error>(())
/// ```
pub use metadata::compilation::{Compilation, EmittedMetadata};

/// Metadata table rows produced by emission.
///
/// These types carry the numeric content of the ECMA-335 tables the checking
/// passes feed:
/// - [`ClassLayoutRow`] - Packing and size for types with numeric layout
/// - [`FieldLayoutRow`] - Explicit field offsets
/// - [`CustomAttributeRow`] - Attribute applications with encoded blobs
/// - [`SynthesizedTypeRow`] - Definitions the synthesis engine injected
///
/// # Example
///
/// ```rust
/// use cilforge::Compilation;
/// use cilforge::metadata::{
///     identity::AssemblyIdentity,
///     options::CompilationOptions,
///     symbols::{assembly::Assembly, builder::TypeDeclBuilder},
/// };
///
/// let assembly = Assembly::new(AssemblyIdentity::new("Interop"));
/// TypeDeclBuilder::value_type(&assembly, "Interop", "Empty").build()?;
///
/// let compilation = Compilation::new(assembly, CompilationOptions::default());
/// let metadata = compilation.emit()?;
///
/// // A struct with no instance fields gets a stabilized one-byte layout
/// assert_eq!(metadata.class_layouts[0].packing_size, 0);
/// assert_eq!(metadata.class_layouts[0].class_size, 1);
/// # Ok::<(), cilforge::Error>(())
/// ```
pub use metadata::emit::{ClassLayoutRow, CustomAttributeRow, FieldLayoutRow, SynthesizedTypeRow};

/// Compiler diagnostics and the shared reporting sink.
///
/// Checking never aborts on a finding: every pass reports into a
/// [`Diagnostics`] sink and the caller decides what blocks emission.
///
/// # Example
///
/// ```rust
/// use cilforge::{Compilation, DiagnosticCode};
/// use cilforge::metadata::{
///     identity::AssemblyIdentity, options::CompilationOptions, symbols::assembly::Assembly,
/// };
///
/// let assembly = Assembly::new(AssemblyIdentity::new("Lib"));
/// let compilation = Compilation::new(assembly, CompilationOptions::default());
/// compilation.check();
///
/// for diagnostic in compilation.diagnostics().iter() {
///     println!("{}: {}", diagnostic.code.as_str(), diagnostic.message);
/// }
/// assert!(!compilation.diagnostics().contains(DiagnosticCode::InvalidWellKnownAttributeShape));
/// # Ok::<(), cilforge::Error>(())
/// ```
pub use metadata::diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSeverity, Diagnostics};
