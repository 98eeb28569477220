//! Attribute flag constants for emitted table rows.
//!
//! These are the ECMA-335 bitmask values the emission mapping writes into
//! TypeDef rows. Only the groups this crate actually sets are carried:
//! visibility, layout, inheritance modifiers, and the string-format bits the
//! `CharSet` named argument maps onto.

#[allow(non_snake_case)]
/// Type attribute flag constants for TypeDef rows.
///
/// The layout group is the output of the layout decision procedure:
/// [`TypeAttributes::AUTO_LAYOUT`] (also used for extended layout, which
/// travels as a custom attribute instead), [`TypeAttributes::SEQUENTIAL_LAYOUT`],
/// and [`TypeAttributes::EXPLICIT_LAYOUT`].
pub mod TypeAttributes {
    /// Mask for extracting type visibility information.
    pub const VISIBILITY_MASK: u32 = 0x0000_0007;

    /// Type has no public scope (internal to the assembly).
    pub const NOT_PUBLIC: u32 = 0x0000_0000;

    /// Type has public scope (visible outside the assembly).
    pub const PUBLIC: u32 = 0x0000_0001;

    /// Mask for extracting class layout information.
    pub const LAYOUT_MASK: u32 = 0x0000_0018;

    /// Fields are automatically laid out by the runtime (default).
    pub const AUTO_LAYOUT: u32 = 0x0000_0000;

    /// Fields are laid out sequentially in declaration order.
    pub const SEQUENTIAL_LAYOUT: u32 = 0x0000_0008;

    /// Field positions are explicitly specified via FieldLayout rows.
    pub const EXPLICIT_LAYOUT: u32 = 0x0000_0010;

    /// Type is abstract and cannot be instantiated.
    pub const ABSTRACT: u32 = 0x0000_0080;

    /// Type is sealed and cannot be inherited from.
    ///
    /// A C# `static` class emits as `ABSTRACT | SEALED`.
    pub const SEALED: u32 = 0x0000_0100;

    /// Mask for extracting string format information for native interop.
    pub const STRING_FORMAT_MASK: u32 = 0x0003_0000;

    /// Strings are marshalled as ANSI (default, `CharSet.Ansi`).
    pub const ANSI_CLASS: u32 = 0x0000_0000;

    /// Strings are marshalled as UTF-16 (`CharSet.Unicode`).
    pub const UNICODE_CLASS: u32 = 0x0001_0000;

    /// String marshalling is platform-dependent (`CharSet.Auto`).
    pub const AUTO_CLASS: u32 = 0x0002_0000;

    /// Fields are initialized lazily, before first static field access.
    pub const BEFORE_FIELD_INIT: u32 = 0x0010_0000;
}
