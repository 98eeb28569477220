//! Attribute applications as bound from source syntax.
//!
//! An [`AttributeApplication`] records one `[Attr(...)]` occurrence: the
//! attribute's qualified name, the syntactic position it sits on, and its
//! positional and named arguments with their individual source locations. The
//! explicit-use guard, the layout decision procedure, and the trigger scan all
//! consume these records; nothing in this crate re-binds syntax.

use bitflags::bitflags;

use crate::metadata::diagnostics::Location;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    /// Declaration positions an attribute may be applied to, matching the
    /// platform's `AttributeTargets` numbering
    pub struct AttributeTargets : u32 {
        /// Assembly-level application
        const ASSEMBLY = 0x0001;
        /// Module-level application
        const MODULE = 0x0002;
        /// Classes
        const CLASS = 0x0004;
        /// Structs
        const STRUCT = 0x0008;
        /// Enums
        const ENUM = 0x0010;
        /// Constructors
        const CONSTRUCTOR = 0x0020;
        /// Methods
        const METHOD = 0x0040;
        /// Properties
        const PROPERTY = 0x0080;
        /// Fields
        const FIELD = 0x0100;
        /// Events
        const EVENT = 0x0200;
        /// Interfaces
        const INTERFACE = 0x0400;
        /// Parameters
        const PARAMETER = 0x0800;
        /// Delegates
        const DELEGATE = 0x1000;
        /// Return values
        const RETURN_VALUE = 0x2000;
        /// Generic type parameters
        const GENERIC_PARAMETER = 0x4000;
        /// Every position
        const ALL = 0x7FFF;
    }
}

/// The syntactic position an attribute application sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeSite {
    /// On a type declaration
    Type,
    /// On a field
    Field,
    /// On a property or indexer
    Property,
    /// On a method or accessor
    Method,
    /// On a parameter, including indexer parameters
    Parameter,
    /// On a return value (`[return: ...]`)
    Return,
    /// Assembly level (`[assembly: ...]`)
    Assembly,
    /// Module level (`[module: ...]`)
    Module,
}

impl AttributeSite {
    /// Human-readable position name used in diagnostics
    #[must_use]
    pub fn describe(&self) -> &'static str {
        match self {
            AttributeSite::Type => "type",
            AttributeSite::Field => "field",
            AttributeSite::Property => "property",
            AttributeSite::Method => "method",
            AttributeSite::Parameter => "parameter",
            AttributeSite::Return => "return value",
            AttributeSite::Assembly => "assembly",
            AttributeSite::Module => "module",
        }
    }
}

/// A constant argument value as bound from source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    /// 32-bit integer constant, also used for enum values
    Int(i32),
    /// Boolean constant
    Bool(bool),
    /// String constant
    Str(String),
}

impl ArgValue {
    /// The integer value, if this argument is one
    #[must_use]
    pub fn as_int(&self) -> Option<i32> {
        match self {
            ArgValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// The string value, if this argument is one
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArgValue::Str(value) => Some(value),
            _ => None,
        }
    }
}

/// One attribute argument with its own source span.
///
/// Argument-level spans matter: bad `Pack`/`Size` values are diagnosed at the
/// argument, not at the attribute or the declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrArg {
    /// The constant value
    pub value: ArgValue,
    /// Span of the argument expression
    pub location: Location,
}

impl AttrArg {
    /// Creates an argument with a location.
    #[must_use]
    pub fn new(value: ArgValue, location: Location) -> Self {
        Self { value, location }
    }

    /// Creates an integer argument without a location.
    #[must_use]
    pub fn int(value: i32) -> Self {
        Self {
            value: ArgValue::Int(value),
            location: Location::none(),
        }
    }

    /// Creates a string argument without a location.
    #[must_use]
    pub fn str(value: impl Into<String>) -> Self {
        Self {
            value: ArgValue::Str(value.into()),
            location: Location::none(),
        }
    }
}

/// One bound attribute application.
#[derive(Debug, Clone)]
pub struct AttributeApplication {
    /// Namespace of the attribute type
    pub namespace: String,
    /// Simple name of the attribute type, with the `Attribute` suffix
    pub name: String,
    /// Position the application sits on
    pub site: AttributeSite,
    /// Positional constructor arguments
    pub args: Vec<AttrArg>,
    /// Named arguments (`Pack = 8`)
    pub named: Vec<(String, AttrArg)>,
    /// Span of the whole application
    pub location: Location,
}

impl AttributeApplication {
    /// Creates an application with no arguments.
    #[must_use]
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        site: AttributeSite,
        location: Location,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            site,
            args: Vec::new(),
            named: Vec::new(),
            location,
        }
    }

    /// Appends a positional argument.
    #[must_use]
    pub fn with_arg(mut self, arg: AttrArg) -> Self {
        self.args.push(arg);
        self
    }

    /// Appends a named argument.
    #[must_use]
    pub fn with_named(mut self, name: impl Into<String>, arg: AttrArg) -> Self {
        self.named.push((name.into(), arg));
        self
    }

    /// Returns the fully-qualified name of the attribute type
    #[must_use]
    pub fn full_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }

    /// The positional argument at `index`, if present
    #[must_use]
    pub fn positional(&self, index: usize) -> Option<&AttrArg> {
        self.args.get(index)
    }

    /// The named argument called `name`, if present
    #[must_use]
    pub fn named_arg(&self, name: &str) -> Option<&AttrArg> {
        self.named
            .iter()
            .find(|(candidate, _)| candidate == name)
            .map(|(_, arg)| arg)
    }
}

/// The `AttributeUsage` declared on an attribute type, when present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeUsageInfo {
    /// Positions the attribute admits
    pub valid_on: AttributeTargets,
    /// Whether multiple applications on one target are allowed
    pub allow_multiple: bool,
}

impl AttributeUsageInfo {
    /// Creates a usage restricted to the given targets.
    #[must_use]
    pub fn new(valid_on: AttributeTargets) -> Self {
        Self {
            valid_on,
            allow_multiple: false,
        }
    }

    /// Returns true when the usage covers every target in `needed`
    #[must_use]
    pub fn covers(&self, needed: AttributeTargets) -> bool {
        self.valid_on.contains(needed)
    }
}
