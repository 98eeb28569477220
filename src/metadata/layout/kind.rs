//! Layout kinds and the computed layout descriptor.
//!
//! Numeric values mirror `System.Runtime.InteropServices.LayoutKind` and
//! `CharSet` so attribute arguments can be decoded directly.

use crate::metadata::token::Token;

/// Value of the `StructLayout` positional argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum LayoutKind {
    /// Fields laid out in declaration order
    Sequential = 0,
    /// Every field carries an explicit offset
    Explicit = 2,
    /// The runtime chooses the layout
    Auto = 3,
}

impl LayoutKind {
    /// Decodes the positional argument value.
    #[must_use]
    pub fn from_value(value: i32) -> Option<LayoutKind> {
        match value {
            0 => Some(LayoutKind::Sequential),
            2 => Some(LayoutKind::Explicit),
            3 => Some(LayoutKind::Auto),
            _ => None,
        }
    }
}

/// Value of the `ExtendedLayout` positional argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExtendedLayoutKind {
    /// C struct semantics; the consumer computes offsets sequentially
    CStruct = 0,
    /// C union semantics; all fields share offset zero
    CUnion = 1,
}

impl ExtendedLayoutKind {
    /// Decodes the positional argument value.
    #[must_use]
    pub fn from_value(value: i32) -> Option<ExtendedLayoutKind> {
        match value {
            0 => Some(ExtendedLayoutKind::CStruct),
            1 => Some(ExtendedLayoutKind::CUnion),
            _ => None,
        }
    }

    /// The argument value recorded in the emitted attribute blob
    #[must_use]
    pub fn as_i32(&self) -> i32 {
        *self as i32
    }
}

/// Value of the `CharSet` named argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum CharSet {
    /// Platform ANSI encoding; the metadata default
    Ansi = 2,
    /// UTF-16 encoding
    Unicode = 3,
    /// Chosen by the platform
    Auto = 4,
}

impl CharSet {
    /// Decodes the named argument value.
    ///
    /// `CharSet.None` (1) is a legal member of the source enum but not a legal
    /// named argument value, so it decodes to `None` here like any other
    /// out-of-range value.
    #[must_use]
    pub fn from_named_value(value: i32) -> Option<CharSet> {
        match value {
            2 => Some(CharSet::Ansi),
            3 => Some(CharSet::Unicode),
            4 => Some(CharSet::Auto),
            _ => None,
        }
    }
}

/// The computed layout form of one type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeLayout {
    /// Runtime-chosen layout; the metadata default
    Auto,
    /// Declaration-order layout
    Sequential,
    /// Offset-per-field layout
    Explicit,
    /// Consumer-computed C-compatible layout
    Extended(ExtendedLayoutKind),
}

impl TypeLayout {
    /// Returns true for extended layout
    #[must_use]
    pub fn is_extended(&self) -> bool {
        matches!(self, TypeLayout::Extended(_))
    }

    /// Returns true when fields may (and must) carry explicit offsets
    #[must_use]
    pub fn allows_field_offsets(&self) -> bool {
        matches!(self, TypeLayout::Explicit)
    }
}

/// The final layout decision for one type, latched on its declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutDescriptor {
    /// Computed layout form
    pub layout: TypeLayout,
    /// Declared packing; 0 means unspecified
    pub pack: u16,
    /// Declared size; 0 means unspecified
    pub size: u32,
    /// Declared character set
    pub charset: CharSet,
    /// Explicit field offsets in field declaration order; empty unless the
    /// layout is explicit
    pub field_offsets: Vec<(Token, u32)>,
}

impl LayoutDescriptor {
    /// The metadata default: auto layout, nothing declared.
    #[must_use]
    pub fn auto() -> Self {
        LayoutDescriptor {
            layout: TypeLayout::Auto,
            pack: 0,
            size: 0,
            charset: CharSet::Ansi,
            field_offsets: Vec::new(),
        }
    }

    /// The stabilized form for a value type with no instance fields.
    #[must_use]
    pub fn empty_value_type() -> Self {
        LayoutDescriptor {
            layout: TypeLayout::Sequential,
            pack: 0,
            size: 1,
            charset: CharSet::Ansi,
            field_offsets: Vec::new(),
        }
    }

    /// Whether a ClassLayout row is recorded for this descriptor.
    ///
    /// Extended layout never records numeric layout; otherwise a row exists
    /// iff packing or size was declared nonzero.
    #[must_use]
    pub fn has_class_layout_row(&self) -> bool {
        !self.layout.is_extended() && (self.pack != 0 || self.size != 0)
    }
}
