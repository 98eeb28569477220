//! # cilforge Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the cilforge library. Import this module to get quick access to the essential
//! types for reserved-attribute checking and metadata emission.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all cilforge operations
pub use crate::Error;

/// The result type used throughout cilforge
pub use crate::Result;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// Main entry point driving checking, synthesis, and emission
pub use crate::{Compilation, EmittedMetadata};

/// Compilation options consumed by the checking passes
pub use crate::metadata::options::{CompilationOptions, OutputKind, TargetRuntime};

// ================================================================================================
// Metadata System - Core Types
// ================================================================================================

/// Metadata token type for referencing table entries
pub use crate::metadata::token::Token;

/// Assembly identity, public-key tokens, and friend-assembly grants
pub use crate::metadata::identity::{AssemblyHashAlgorithm, AssemblyIdentity, FriendAssembly, Identity};

// ================================================================================================
// Declaration Model
// ================================================================================================

/// The assembly under compilation and the assemblies it references
pub use crate::metadata::symbols::{Assembly, ReferencedAssembly, ReferencedType, TypeForwarder};

/// Type declarations, their parts, and their latches
pub use crate::metadata::symbols::{
    Accessibility, BaseTypeRef, CtorDecl, TypeDecl, TypeDeclList, TypeDeclRc, TypeKind, TypePart,
};

/// Fields and members of a type declaration
pub use crate::metadata::symbols::{
    FieldDecl, FieldDeclList, FieldDeclRc, MemberDecl, MemberDeclList, MemberDeclRc, MemberKind,
    ParamDecl, RefKind,
};

/// Structural type shapes carrying nullability and tuple names
pub use crate::metadata::symbols::{NullableAnnotation, PrimitiveKind, TupleElement, TypeShape};

/// Attribute applications as they appear in source
pub use crate::metadata::symbols::{
    ArgValue, AttrArg, AttributeApplication, AttributeList, AttributeSite, AttributeTargets,
    AttributeUsageInfo,
};

/// Fluent construction of type declarations
pub use crate::metadata::symbols::TypeDeclBuilder;

// ================================================================================================
// Reserved Well-Known Attributes
// ================================================================================================

/// The registry of attributes the compiler reserves for itself
pub use crate::metadata::wellknown::{
    CtorShape, WellKnownAttribute, WellKnownDescriptor, COMPILER_SERVICES_NAMESPACE,
    EMBEDDED_NAMESPACE,
};

/// Validation of user definitions occupying reserved names
pub use crate::metadata::wellknown::validate_definition;

/// The guard against explicit application of reserved attributes
pub use crate::metadata::wellknown::{check_application, scan_assembly};

/// Lazy resolution and synthesis of reserved attribute definitions
pub use crate::metadata::wellknown::{ResolvedAttributeIdentity, SynthesisContext, SynthesisEngine};

// ================================================================================================
// Type Layout
// ================================================================================================

/// The layout decision procedure and its checks
pub use crate::metadata::layout::{compute_layout, LayoutChecks, INTEROP_SERVICES_NAMESPACE};

/// Layout kinds and the per-type decision record
pub use crate::metadata::layout::{
    CharSet, ExtendedLayoutKind, LayoutDescriptor, LayoutKind, TypeLayout,
};

// ================================================================================================
// Emitted Rows and Blobs
// ================================================================================================

/// Metadata table rows produced by emission
pub use crate::{ClassLayoutRow, CustomAttributeRow, FieldLayoutRow, SynthesizedTypeRow};

/// Custom-attribute blob encoding per ECMA-335 §II.23.3
pub use crate::metadata::emit::{encode_attribute_blob, CaValue};

/// TypeDef flag computation for synthesized and laid-out types
pub use crate::metadata::emit::type_flags;

// ================================================================================================
// Diagnostics
// ================================================================================================

/// Compiler diagnostics, their codes, and the shared sink
pub use crate::{Diagnostic, DiagnosticCode, DiagnosticSeverity, Diagnostics};

/// Source locations attached to declarations and diagnostics
pub use crate::metadata::diagnostics::Location;
