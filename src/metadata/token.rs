use std::fmt;
use std::hash::{Hash, Hasher};

/// A metadata token referencing a metadata table row.
///
/// Tokens in .NET metadata consist of a 32-bit value where:
/// - The high byte (bits 24-31) indicates the table type
/// - The low 24 bits (bits 0-23) indicate the row index within that table
///
/// The emission side of this crate allocates fresh tokens for synthesized type
/// definitions and uses tokens handed in by the host compiler for everything else,
/// so the type carries constructors for the handful of tables declarations live in.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Token(pub u32);

impl Token {
    /// Creates a new token from a raw 32-bit value
    #[must_use]
    pub fn new(value: u32) -> Self {
        Token(value)
    }

    /// Creates a token from a table id and a row index.
    ///
    /// The row is masked to 24 bits; callers allocate rows well below that bound.
    #[must_use]
    pub fn from_parts(table: u8, row: u32) -> Self {
        Token((u32::from(table) << 24) | (row & 0x00FF_FFFF))
    }

    /// Creates a `TypeDef` token (table 0x02) for the given row
    #[must_use]
    pub fn typedef(row: u32) -> Self {
        Self::from_parts(0x02, row)
    }

    /// Creates a `TypeRef` token (table 0x01) for the given row
    #[must_use]
    pub fn typeref(row: u32) -> Self {
        Self::from_parts(0x01, row)
    }

    /// Creates a `Field` token (table 0x04) for the given row
    #[must_use]
    pub fn field(row: u32) -> Self {
        Self::from_parts(0x04, row)
    }

    /// Creates a `MethodDef` token (table 0x06) for the given row
    #[must_use]
    pub fn methoddef(row: u32) -> Self {
        Self::from_parts(0x06, row)
    }

    /// Creates a `Param` token (table 0x08) for the given row
    #[must_use]
    pub fn param(row: u32) -> Self {
        Self::from_parts(0x08, row)
    }

    /// The token of the sole `Module` row (table 0x00, row 1)
    #[must_use]
    pub fn module() -> Self {
        Self::from_parts(0x00, 1)
    }

    /// The token of the sole `Assembly` row (table 0x20, row 1)
    #[must_use]
    pub fn assembly() -> Self {
        Self::from_parts(0x20, 1)
    }

    /// Returns the raw token value
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Extracts the table type from the token (high byte)
    #[must_use]
    pub fn table(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Extracts the row index from the token (low 24 bits)
    #[must_use]
    pub fn row(&self) -> u32 {
        self.0 & 0x00FF_FFFF
    }

    /// Returns true if this is a null token (value 0)
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

impl From<u32> for Token {
    fn from(value: u32) -> Self {
        Token(value)
    }
}

impl From<Token> for u32 {
    fn from(token: Token) -> Self {
        token.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Token(0x{:08x}, table: 0x{:02x}, row: {})",
            self.0,
            self.table(),
            self.row()
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}
