//! Declaration model for the assembly being compiled.
//!
//! This module owns the symbol graph the attribute and layout machinery runs
//! over: an [`Assembly`] containing merged [`TypeDecl`] nodes, their fields,
//! members, constructors, and attribute applications. Declarations are built
//! once (via [`TypeDeclBuilder`]) and then only read, so all lists are
//! lock-free append-only vectors and all late-computed facts are write-once
//! latches on the declaration itself.
//!
//! # Components
//!
//! - [`shape`] - structural type shapes with nullability annotations
//! - [`attrs`] - attribute applications and usage constraints
//! - [`fields`] / [`members`] - field catalogs and member signatures
//! - [`types`] - the merged type declaration and its latches
//! - [`assembly`] - token allocation, name lookup, friends, forwarders
//! - [`builder`] - fluent construction API

use std::sync::Arc;

pub mod assembly;
pub mod attrs;
pub mod builder;
pub mod fields;
pub mod members;
pub mod shape;
pub mod types;

pub use assembly::{Assembly, ReferencedAssembly, ReferencedType, TypeForwarder};
pub use attrs::{
    ArgValue, AttrArg, AttributeApplication, AttributeSite, AttributeTargets, AttributeUsageInfo,
};
pub use builder::TypeDeclBuilder;
pub use fields::{FieldDecl, FieldDeclList, FieldDeclRc};
pub use members::{MemberDecl, MemberDeclList, MemberDeclRc, MemberKind, ParamDecl, RefKind};
pub use shape::{NullableAnnotation, PrimitiveKind, TupleElement, TypeShape};
pub use types::{
    Accessibility, BaseTypeRef, CtorDecl, TypeDecl, TypeDeclList, TypeDeclRc, TypeKind, TypePart,
};

/// A vector that holds a list of attribute applications
pub type AttributeList = Arc<boxcar::Vec<attrs::AttributeApplication>>;
