//! Emitted metadata table rows.
//!
//! The crate does not write a PE file; it hands the host compiler ready-made
//! rows for the tables this subsystem owns:
//!
//! - [`ClassLayoutRow`] - ClassLayout table (0x0F): packing and size per owner
//! - [`FieldLayoutRow`] - FieldLayout table (0x10): explicit field offsets
//! - [`CustomAttributeRow`] - CustomAttribute table (0x0C): attribute records
//!   with pre-encoded blobs
//! - [`SynthesizedTypeRow`] - TypeDef rows the synthesis engine added
//!
//! Row construction from a [`LayoutDescriptor`] lives here so the mapping
//! rules (no ClassLayout row for extended layout, FieldLayout only under
//! explicit layout) sit next to the rows they produce.

use crate::metadata::{
    emit::flags::TypeAttributes,
    layout::{CharSet, LayoutDescriptor, TypeLayout},
    symbols::types::{Accessibility, TypeDecl},
    token::Token,
};

/// One ClassLayout table row (table 0x0F).
///
/// Emitted iff the descriptor carries a non-zero packing or size, so the
/// stabilized zero-field value type produces a `(pack 0, size 1)` row while
/// plain auto-layout types produce none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassLayoutRow {
    /// TypeDef token of the type the layout applies to
    pub owner: Token,
    /// Field alignment, 0 for the runtime default
    pub packing_size: u16,
    /// Total size of the type, 0 when computed by the runtime
    pub class_size: u32,
}

impl ClassLayoutRow {
    /// Builds the row for a layout decision, when the decision requires one.
    #[must_use]
    pub fn from_descriptor(owner: Token, descriptor: &LayoutDescriptor) -> Option<Self> {
        descriptor.has_class_layout_row().then(|| ClassLayoutRow {
            owner,
            packing_size: descriptor.pack,
            class_size: descriptor.size,
        })
    }
}

/// One FieldLayout table row (table 0x10).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLayoutRow {
    /// Field token the offset applies to
    pub field: Token,
    /// Byte offset of the field within its type
    pub offset: u32,
}

impl FieldLayoutRow {
    /// Builds the rows for a layout decision.
    ///
    /// Offsets are only present on explicit-layout descriptors; every other
    /// layout yields no rows.
    #[must_use]
    pub fn rows_from_descriptor(descriptor: &LayoutDescriptor) -> Vec<Self> {
        descriptor
            .field_offsets
            .iter()
            .map(|(field, offset)| FieldLayoutRow {
                field: *field,
                offset: *offset,
            })
            .collect()
    }
}

/// One CustomAttribute table row (table 0x0C) with a pre-encoded value blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomAttributeRow {
    /// Token of the declaration the attribute is applied to
    pub parent: Token,
    /// Namespace of the attribute type
    pub namespace: String,
    /// Simple name of the attribute type
    pub name: String,
    /// The encoded custom-attribute blob
    pub blob: Vec<u8>,
}

impl CustomAttributeRow {
    /// Creates a row.
    #[must_use]
    pub fn new(
        parent: Token,
        namespace: impl Into<String>,
        name: impl Into<String>,
        blob: Vec<u8>,
    ) -> Self {
        Self {
            parent,
            namespace: namespace.into(),
            name: name.into(),
            blob,
        }
    }

    /// Returns the fully-qualified name of the attribute type
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.namespace, self.name)
    }
}

/// One TypeDef row added by the synthesis engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedTypeRow {
    /// Token of the synthesized definition
    pub token: Token,
    /// Namespace of the synthesized definition
    pub namespace: String,
    /// Simple name of the synthesized definition
    pub name: String,
    /// TypeDef attribute flags
    pub flags: u32,
}

/// Computes the TypeDef attribute flags for a declaration and its layout.
///
/// Sequential and explicit layouts set their layout bits; auto and extended
/// layouts emit the auto bits (extended travels as a custom attribute
/// instead). The `CharSet` decision maps onto the string-format group.
#[must_use]
pub fn type_flags(decl: &TypeDecl, descriptor: &LayoutDescriptor) -> u32 {
    let mut flags = match decl.access {
        Accessibility::Public => TypeAttributes::PUBLIC,
        _ => TypeAttributes::NOT_PUBLIC,
    };

    flags |= match descriptor.layout {
        TypeLayout::Sequential => TypeAttributes::SEQUENTIAL_LAYOUT,
        TypeLayout::Explicit => TypeAttributes::EXPLICIT_LAYOUT,
        TypeLayout::Auto | TypeLayout::Extended(_) => TypeAttributes::AUTO_LAYOUT,
    };

    flags |= match descriptor.charset {
        CharSet::Ansi => TypeAttributes::ANSI_CLASS,
        CharSet::Unicode => TypeAttributes::UNICODE_CLASS,
        CharSet::Auto => TypeAttributes::AUTO_CLASS,
    };

    if decl.is_sealed {
        flags |= TypeAttributes::SEALED;
    }
    if decl.is_static {
        flags |= TypeAttributes::ABSTRACT | TypeAttributes::SEALED;
    }

    flags
}
