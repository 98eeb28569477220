//! Compiler-reserved metadata handling for .NET assemblies.
//!
//! This module contains the declaration model and the passes a compiler runs
//! over it to recognize, validate, synthesize, and apply the attributes it
//! reserves for itself, plus the type-layout decision procedure and the
//! metadata table rows both produce according to the ECMA-335 standard.
//!
//! # Key Components
//!
//! - [`compilation`] - Main entry point tying the passes together
//! - [`symbols`] - Declaration graph: assemblies, types, fields, members
//! - [`wellknown`] - Reserved attribute registry, validation, synthesis, guard
//! - [`layout`] - `StructLayout`/`ExtendedLayout` decision procedure
//! - [`emit`] - Table rows and custom-attribute blob encoding
//! - [`diagnostics`] - Compiler diagnostic codes and the append-only sink
//! - [`token`] - Metadata table row references used throughout .NET
//!
//! # Examples
//!
//! ```rust
//! use cilforge::metadata::{
//!     compilation::Compilation,
//!     identity::AssemblyIdentity,
//!     options::CompilationOptions,
//!     symbols::{assembly::Assembly, builder::TypeDeclBuilder},
//! };
//!
//! let assembly = Assembly::new(AssemblyIdentity::new("Lib"));
//! TypeDeclBuilder::value_type(&assembly, "Interop", "Handle")
//!     .readonly()
//!     .build()?;
//!
//! let compilation = Compilation::new(assembly, CompilationOptions::default());
//! let metadata = compilation.emit()?;
//! println!("Synthesized types: {}", metadata.synthesized_types.len());
//! println!("Attribute rows: {}", metadata.custom_attributes.len());
//! # Ok::<(), cilforge::Error>(())
//! ```

/// Implementation of the compilation facade driving all passes
pub mod compilation;
/// Implementation of compiler diagnostics and the reporting sink
pub mod diagnostics;
/// Implementation of emitted table rows and attribute blob encoding
pub mod emit;
/// Implementation of assembly identity and friend-assembly grants
pub mod identity;
/// Implementation of the type-layout decision procedure
pub mod layout;
/// Compilation options consumed by checking and synthesis
pub mod options;
/// Implementation of the declaration graph handed in by the host
pub mod symbols;
/// Commonly used metadata token type
pub mod token;
/// Implementation of the reserved well-known attribute machinery
pub mod wellknown;
