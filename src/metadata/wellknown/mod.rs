//! Well-known attribute recognition, validation, synthesis, and guarding.
//!
//! The compiler reserves a small set of attributes it applies itself: nullability
//! metadata, tuple element names, readonly/byref-like markers, and the embedded
//! marker that hides generated types from referencing compilations. This module
//! owns the whole lifecycle of that set:
//!
//! - [`descriptor`] - the static registry, one descriptor per kind
//! - [`validator`] - accepts or rejects user declarations of a reserved name
//! - [`synthesis`] - resolves one definition per kind, generating it on demand
//! - [`guard`] - rejects explicit application of reserved attributes in source
//!
//! # Example
//!
//! ```rust
//! use cilforge::metadata::wellknown::WellKnownAttribute;
//!
//! let kind = WellKnownAttribute::from_full_name(
//!     "System.Runtime.CompilerServices",
//!     "NullableAttribute",
//! );
//! assert_eq!(kind, Some(WellKnownAttribute::Nullable));
//! assert!(kind.unwrap().is_guarded());
//! ```

pub mod descriptor;
pub mod guard;
pub mod synthesis;
pub mod validator;

pub use descriptor::{
    CtorShape, WellKnownAttribute, WellKnownDescriptor, COMPILER_SERVICES_NAMESPACE,
    EMBEDDED_NAMESPACE,
};
pub use guard::{check_application, scan_assembly};
pub use synthesis::{ResolvedAttributeIdentity, SynthesisContext, SynthesisEngine};
pub use validator::validate_definition;
