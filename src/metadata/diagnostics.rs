//! Diagnostics collection for attribute binding and metadata emission.
//!
//! This module provides the user-facing diagnostic channel of the crate. Shape
//! violations, reserved-attribute misuse, and layout inconsistencies are reported
//! here with their compiler code and source location; binding always runs to
//! completion so every problem in a compilation is reported in one pass. Only
//! [`crate::metadata::compilation::Compilation::emit`] turns accumulated errors
//! into a hard failure.
//!
//! # Architecture
//!
//! The diagnostics system is shared across the binding and emission pipeline:
//! - **Shape validation**: Reports malformed well-known attribute definitions
//! - **Explicit-use guarding**: Reports reserved attributes applied in source
//! - **Layout decisions**: Reports bad Pack/Size/CharSet/offset arguments
//! - **Synthesis**: Reports missing members, netmodule gaps, and identity conflicts
//!
//! The [`Diagnostics`] container uses `boxcar::Vec` for thread-safe, lock-free
//! append operations, allowing diagnostics to be collected from parallel checking
//! without synchronization overhead.
//!
//! # Key Components
//!
//! - [`Diagnostics`] - Thread-safe container for diagnostic entries
//! - [`Diagnostic`] - Individual entry with code, severity, message, and location
//! - [`DiagnosticCode`] - Stable numeric code (`CS....`) for each condition
//! - [`DiagnosticSeverity`] - Severity level (Info, Warning, Error)
//! - [`Location`] - Source position a diagnostic points at
//!
//! # Usage Examples
//!
//! ```rust,no_run
//! use cilforge::metadata::diagnostics::{Diagnostics, DiagnosticCode, Location};
//! use std::sync::Arc;
//!
//! let diagnostics = Arc::new(Diagnostics::new());
//!
//! diagnostics.report(
//!     DiagnosticCode::InvalidNamedArgument,
//!     Location::new("Point.cs", 3, 38),
//!     "Invalid value for named attribute argument 'Pack'",
//! );
//!
//! if diagnostics.has_errors() {
//!     println!("{}", diagnostics.summary());
//! }
//! ```
//!
//! # Thread Safety
//!
//! All types in this module are [`Send`] and [`Sync`]. Multiple threads can add
//! diagnostics simultaneously without coordination; callers that need a stable
//! order collect per-declaration and flush sequentially.

use std::fmt::{self, Write};
use std::sync::Arc;

use strum::{EnumCount, EnumIter};

/// Severity level of a diagnostic entry.
///
/// Determines how the diagnostic is treated when emission is requested:
/// a compilation holding any [`DiagnosticSeverity::Error`] entry produces
/// no metadata records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticSeverity {
    /// Informational message, not indicating a problem.
    Info,

    /// Warning about a construct that is legal but likely unintended.
    ///
    /// Emission proceeds; the construct keeps its declared behavior.
    Warning,

    /// Error in the source declarations.
    ///
    /// Binding continues so further problems are still reported, but
    /// emission is blocked for the whole compilation.
    Error,
}

impl fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticSeverity::Info => write!(f, "info"),
            DiagnosticSeverity::Warning => write!(f, "warning"),
            DiagnosticSeverity::Error => write!(f, "error"),
        }
    }
}

/// Stable numeric codes for every condition this crate diagnoses.
///
/// Discriminants are the compiler's published diagnostic numbers and render as
/// `CS0625`-style strings via [`DiagnosticCode::as_str`]. Codes in the 9xxx
/// range belong to the extended-layout feature family and have no legacy
/// numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount)]
#[repr(u32)]
pub enum DiagnosticCode {
    /// A Sequential- or Extended-layout type has instance fields spread across
    /// multiple partial declarations; field order across parts is unspecified.
    SequentialOnPartialType = 282,

    /// A predefined/required type is not defined or imported; raised when a
    /// needed well-known attribute can neither be reused nor synthesized
    /// (netmodule output).
    PredefinedTypeNotFound = 518,

    /// Invalid value for a positional attribute argument (bad `LayoutKind`
    /// value, negative field offset).
    InvalidAttributeArgument = 591,

    /// The attribute is not valid on this kind of declaration
    /// (layout control on an interface, enum, delegate, or static class).
    AttributeNotValidOnDeclaration = 592,

    /// Invalid value for a named attribute argument (`Pack`, `Size`, `CharSet`).
    InvalidNamedArgument = 599,

    /// An instance field of an Explicit-layout type carries no
    /// `FieldOffset`; reported once per missing field.
    MissingFieldOffset = 625,

    /// `FieldOffset` used on a field of a type that is not declared with
    /// Explicit layout.
    FieldOffsetRequiresExplicitLayout = 636,

    /// `FieldOffset` placed on a static or const field.
    FieldOffsetOnStaticOrConst = 637,

    /// A definition selected for reuse lacks a member the compiler must call
    /// (the kind's emission constructor).
    MissingCompilerRequiredMember = 656,

    /// A forwarded type conflicts with a declaration the compilation must
    /// host internally; fatal at assembly level.
    ForwardedTypeConflict = 8006,

    /// A reserved attribute was applied explicitly in source.
    ExplicitReservedAttributeUse = 8335,

    /// `StructLayout` and `ExtendedLayout` applied to the same type.
    ConflictingLayoutAttributes = 9540,

    /// Extended layout used while targeting a runtime without support for it;
    /// fatal at the type declaration.
    ExtendedLayoutNotSupported = 9541,

    /// A user definition of a well-known attribute violates the required
    /// pattern; one entry naming every violated condition.
    InvalidWellKnownAttributeShape = 9542,

    /// Extended layout applied to an inline fixed-size buffer type.
    ExtendedLayoutOnFixedBuffer = 9543,
}

impl DiagnosticCode {
    /// Returns the numeric code value
    #[must_use]
    pub fn number(&self) -> u32 {
        *self as u32
    }

    /// Returns the `CSnnnn` string form of the code
    #[must_use]
    pub fn as_str(&self) -> String {
        format!("CS{:04}", self.number())
    }

    /// Returns the severity this code is reported with
    #[must_use]
    pub fn severity(&self) -> DiagnosticSeverity {
        match self {
            DiagnosticCode::SequentialOnPartialType => DiagnosticSeverity::Warning,
            _ => DiagnosticSeverity::Error,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A source position attached to a diagnostic.
///
/// Locations are supplied by the host compiler when it builds the declaration
/// graph; line and column are 1-based. Assembly-level findings that have no
/// syntax to point at use [`Location::none`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    /// Path of the source file, empty for assembly-level findings.
    pub file: Arc<str>,

    /// 1-based line, 0 when no location is available.
    pub line: u32,

    /// 1-based column, 0 when no location is available.
    pub column: u32,
}

impl Location {
    /// Creates a location from a file path and 1-based line/column.
    #[must_use]
    pub fn new(file: impl Into<Arc<str>>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }

    /// The fallback location for findings without any syntax to point at.
    #[must_use]
    pub fn none() -> Self {
        Self {
            file: Arc::from(""),
            line: 0,
            column: 0,
        }
    }

    /// Returns true when this is the fallback no-location value
    #[must_use]
    pub fn is_none(&self) -> bool {
        self.file.is_empty() && self.line == 0 && self.column == 0
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            write!(f, "<no location>")
        } else {
            write!(f, "{}({},{})", self.file, self.line, self.column)
        }
    }
}

/// A single diagnostic entry.
///
/// Carries the code, the severity derived from it, the formatted message, the
/// source location, and optionally the metadata token of the declaration the
/// finding is about.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Numeric code of this diagnostic.
    pub code: DiagnosticCode,

    /// Severity level, derived from the code at construction.
    pub severity: DiagnosticSeverity,

    /// Human-readable description of the finding.
    pub message: String,

    /// Source position the finding points at.
    pub location: Location,

    /// Optional metadata token of the declaration involved.
    pub token: Option<crate::metadata::token::Token>,
}

impl Diagnostic {
    /// Creates a new diagnostic entry.
    ///
    /// # Arguments
    ///
    /// * `code` - Diagnostic code; determines the severity
    /// * `location` - Source position of the finding
    /// * `message` - Human-readable description
    pub fn new(code: DiagnosticCode, location: Location, message: impl Into<String>) -> Self {
        Self {
            code,
            severity: code.severity(),
            message: message.into(),
            location,
            token: None,
        }
    }

    /// Adds the metadata token of the involved declaration.
    #[must_use]
    pub fn with_token(mut self, token: crate::metadata::token::Token) -> Self {
        self.token = Some(token);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.location.is_none() {
            write!(f, "{} {}: {}", self.severity, self.code, self.message)?;
        } else {
            write!(
                f,
                "{}: {} {}: {}",
                self.location, self.severity, self.code, self.message
            )?;
        }

        if let Some(token) = self.token {
            write!(f, " (token: {token})")?;
        }

        Ok(())
    }
}

/// Thread-safe container for collecting diagnostic entries.
///
/// Uses `boxcar::Vec` internally for lock-free concurrent append operations.
/// Entries keep insertion order; callers that check declarations in parallel
/// collect per-declaration findings locally and flush them in declaration
/// order to keep output deterministic.
///
/// # Example
///
/// ```rust,no_run
/// use cilforge::metadata::diagnostics::{Diagnostics, DiagnosticCode, Location};
/// use std::sync::Arc;
///
/// let diagnostics = Arc::new(Diagnostics::new());
///
/// let clone = Arc::clone(&diagnostics);
/// std::thread::spawn(move || {
///     clone.report(
///         DiagnosticCode::MissingFieldOffset,
///         Location::none(),
///         "'S.x' requires a FieldOffset",
///     );
/// });
/// ```
#[derive(Debug)]
pub struct Diagnostics {
    entries: boxcar::Vec<Diagnostic>,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new()
    }
}

impl Diagnostics {
    /// Creates a new empty diagnostics container.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: boxcar::Vec::new(),
        }
    }

    /// Reports a finding under the given code.
    ///
    /// The severity is taken from the code.
    ///
    /// # Arguments
    ///
    /// * `code` - Diagnostic code
    /// * `location` - Source position of the finding
    /// * `message` - Description of the finding
    pub fn report(&self, code: DiagnosticCode, location: Location, message: impl Into<String>) {
        self.push(Diagnostic::new(code, location, message));
    }

    /// Adds a diagnostic entry directly.
    ///
    /// Use this for diagnostics that need additional context like the
    /// declaration token.
    pub fn push(&self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    /// Returns true if any diagnostics have been collected.
    pub fn has_any(&self) -> bool {
        self.entries.count() > 0
    }

    /// Returns true if any error-level diagnostics have been collected.
    pub fn has_errors(&self) -> bool {
        self.entries
            .iter()
            .any(|(_, d)| d.severity == DiagnosticSeverity::Error)
    }

    /// Returns true if any warning-level diagnostics have been collected.
    pub fn has_warnings(&self) -> bool {
        self.entries
            .iter()
            .any(|(_, d)| d.severity == DiagnosticSeverity::Warning)
    }

    /// Returns the total number of diagnostics.
    pub fn count(&self) -> usize {
        self.entries.count()
    }

    /// Returns the number of error-level diagnostics.
    pub fn error_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, d)| d.severity == DiagnosticSeverity::Error)
            .count()
    }

    /// Returns the number of warning-level diagnostics.
    pub fn warning_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, d)| d.severity == DiagnosticSeverity::Warning)
            .count()
    }

    /// Returns an iterator over all diagnostics in insertion order.
    ///
    /// Note: Uses boxcar's iterator which yields `(index, &Diagnostic)` tuples.
    /// The index is dropped here.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().map(|(_, d)| d)
    }

    /// Returns all errors as a vector.
    pub fn errors(&self) -> Vec<&Diagnostic> {
        self.entries
            .iter()
            .filter(|(_, d)| d.severity == DiagnosticSeverity::Error)
            .map(|(_, d)| d)
            .collect()
    }

    /// Returns all warnings as a vector.
    pub fn warnings(&self) -> Vec<&Diagnostic> {
        self.entries
            .iter()
            .filter(|(_, d)| d.severity == DiagnosticSeverity::Warning)
            .map(|(_, d)| d)
            .collect()
    }

    /// Returns diagnostics filtered by code.
    pub fn by_code(&self, code: DiagnosticCode) -> Vec<&Diagnostic> {
        self.entries
            .iter()
            .filter(|(_, d)| d.code == code)
            .map(|(_, d)| d)
            .collect()
    }

    /// Returns true if at least one diagnostic with the given code is present
    pub fn contains(&self, code: DiagnosticCode) -> bool {
        self.entries.iter().any(|(_, d)| d.code == code)
    }

    /// Formats a summary of all diagnostics for display.
    ///
    /// Groups diagnostics by severity for readable output.
    pub fn summary(&self) -> String {
        let mut output = String::new();

        let _ = writeln!(
            output,
            "Diagnostics: {} error(s), {} warning(s)",
            self.error_count(),
            self.warning_count()
        );

        if self.has_errors() {
            output.push_str("\nErrors:\n");
            for diag in self.errors() {
                let _ = writeln!(output, "  {diag}");
            }
        }

        if self.has_warnings() {
            output.push_str("\nWarnings:\n");
            for diag in self.warnings() {
                let _ = writeln!(output, "  {diag}");
            }
        }

        output
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary())
    }
}
