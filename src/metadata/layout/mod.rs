//! Type layout decisions.
//!
//! C# exposes physical layout control through `StructLayout`, `FieldOffset`,
//! and (on new runtimes) `ExtendedLayout`. This module turns those attribute
//! applications into a single [`LayoutDescriptor`] per type declaration,
//! validating every argument and reporting violations through the shared
//! diagnostics channel:
//!
//! - [`kind`] - The layout kinds, charsets, and the descriptor itself
//! - [`checks`] - Range validators for packing, size, and offsets
//! - [`decision`] - The decision procedure, [`compute_layout`]
//!
//! A descriptor later maps onto the `ClassLayout` (0x0F) and `FieldLayout`
//! (0x10) metadata tables; extended layout instead travels as a custom
//! attribute for the runtime to interpret.
//!
//! # Usage Examples
//!
//! ```rust
//! use cilforge::metadata::layout::compute_layout;
//! use cilforge::metadata::diagnostics::Diagnostics;
//! use cilforge::metadata::options::CompilationOptions;
//! # use cilforge::metadata::identity::AssemblyIdentity;
//! # use cilforge::metadata::symbols::{assembly::Assembly, builder::TypeDeclBuilder};
//!
//! # let assembly = Assembly::new(AssemblyIdentity::new("Lib"));
//! # let decl = TypeDeclBuilder::value_type(&assembly, "N", "Point").build().unwrap();
//! let diagnostics = Diagnostics::new();
//! let descriptor = compute_layout(&decl, &CompilationOptions::default(), &diagnostics);
//! if descriptor.has_class_layout_row() {
//!     println!("pack {} size {}", descriptor.pack, descriptor.size);
//! }
//! ```

pub mod checks;
pub mod decision;
pub mod kind;

pub use checks::LayoutChecks;
pub use decision::{compute_layout, INTEROP_SERVICES_NAMESPACE};
pub use kind::{CharSet, ExtendedLayoutKind, LayoutDescriptor, LayoutKind, TypeLayout};
