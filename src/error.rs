use thiserror::Error;

use crate::metadata::token::Token;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// This enum covers the programmatic failure modes of declaration-graph construction,
/// well-known attribute resolution, and metadata record emission. User-facing compiler
/// diagnostics are NOT errors — they accumulate in
/// [`crate::metadata::diagnostics::Diagnostics`] and only surface here as
/// [`Error::EmitBlocked`] once emission is requested.
///
/// # Error Categories
///
/// ## Declaration Graph Errors
/// - [`Error::Malformed`] - Inconsistent declaration graph handed in by the host
/// - [`Error::DuplicateToken`] - Two declarations registered under one metadata token
/// - [`Error::TypeNotFound`] - Token lookup failed against the assembly's type list
///
/// ## Resolution and Emission Errors
/// - [`Error::AttributeUnavailable`] - A required well-known attribute cannot be
///   reused or synthesized in this compilation
/// - [`Error::EmitBlocked`] - Emission refused because error diagnostics are present
///
/// # Examples
///
/// ```rust
/// use cilforge::{Error, metadata::compilation::Compilation};
///
/// # fn check(compilation: Compilation) {
/// match compilation.emit() {
///     Ok(metadata) => {
///         println!("Emitted {} synthesized types", metadata.synthesized_types.len());
///     }
///     Err(Error::EmitBlocked { errors }) => {
///         eprintln!("Emission blocked by {errors} error diagnostic(s)");
///     }
///     Err(e) => {
///         eprintln!("Other error: {}", e);
///     }
/// }
/// # }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    // Declaration graph errors
    /// The declaration graph is inconsistent and could not be processed.
    ///
    /// This error indicates that the host compiler handed in declarations that
    /// violate structural invariants (a partial part pointing at a foreign type,
    /// a field owned by no type, an attribute application with a dangling target).
    /// The error includes the source location where the inconsistency was
    /// detected for debugging purposes.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// A declaration was registered under a metadata token that is already taken.
    ///
    /// Tokens identify declarations throughout the crate; registering two types
    /// or two fields under the same token would corrupt every downstream index.
    ///
    /// The associated [`Token`] identifies the colliding registration.
    #[error("A declaration is already registered under token {0}")]
    DuplicateToken(Token),

    /// Failed to find a declaration for the given token.
    ///
    /// This error occurs when looking up a type or field by token that was
    /// never registered with the owning assembly.
    ///
    /// The associated [`Token`] identifies which declaration was not found.
    #[error("Failed to find a declaration for token {0}")]
    TypeNotFound(Token),

    /// A required well-known attribute is neither reusable nor synthesizable.
    ///
    /// Raised by the synthesis engine when resolution lands in a terminal
    /// unavailable state: a forwarded-type conflict occupies the name, or the
    /// output kind cannot host a synthesized definition. The corresponding
    /// diagnostic has already been reported to the sink before this is returned.
    #[error("Well-known attribute '{0}' is unavailable in this compilation")]
    AttributeUnavailable(String),

    /// Emission was requested while error diagnostics are present.
    ///
    /// Binding and checking always run to completion so every problem is
    /// reported, but no metadata records are produced for a compilation that
    /// holds at least one error-severity diagnostic.
    ///
    /// # Fields
    ///
    /// * `errors` - Number of error-severity diagnostics in the sink
    #[error("Emission blocked by {errors} error diagnostic(s)")]
    EmitBlocked {
        /// Number of error-severity diagnostics that blocked emission
        errors: usize,
    },

    /// Generic error for miscellaneous failures.
    ///
    /// Used for errors that don't fit into other categories or for
    /// wrapping external failures with additional context.
    #[error("{0}")]
    Error(String),
}
