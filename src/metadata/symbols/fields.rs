//! Field declarations.

use std::sync::Arc;

use crate::metadata::{
    diagnostics::Location,
    symbols::{
        attrs::AttributeApplication, shape::TypeShape, types::Accessibility, AttributeList,
    },
    token::Token,
};

/// A vector that holds a list of `FieldDecl`
pub type FieldDeclList = Arc<boxcar::Vec<FieldDeclRc>>;
/// Reference to a `FieldDecl`
pub type FieldDeclRc = Arc<FieldDecl>;

/// A field declaration inside a type.
///
/// Fields carry the attribute applications bound on them (`FieldOffset`,
/// reserved-attribute misuse) and remember which partial part of the owning
/// type declared them, which is what the partial-layout warning keys on.
#[derive(Debug)]
pub struct FieldDecl {
    /// Field token (table 0x04)
    pub token: Token,
    /// Field name
    pub name: String,
    /// Declared type of the field
    pub shape: TypeShape,
    /// Declared accessibility
    pub access: Accessibility,
    /// `static` field
    pub is_static: bool,
    /// `const` field
    pub is_const: bool,
    /// Index of the partial part that declared this field (0 for non-partial types)
    pub part_index: u32,
    /// Attribute applications on this field
    pub attributes: AttributeList,
    /// Span of the field declarator
    pub location: Location,
}

impl FieldDecl {
    /// Creates an instance field with internal accessibility.
    #[must_use]
    pub fn new(token: Token, name: impl Into<String>, shape: TypeShape) -> Self {
        Self {
            token,
            name: name.into(),
            shape,
            access: Accessibility::Internal,
            is_static: false,
            is_const: false,
            part_index: 0,
            attributes: Arc::new(boxcar::Vec::new()),
            location: Location::none(),
        }
    }

    /// Sets the accessibility.
    #[must_use]
    pub fn with_access(mut self, access: Accessibility) -> Self {
        self.access = access;
        self
    }

    /// Marks the field `static`.
    #[must_use]
    pub fn with_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Marks the field `const`.
    #[must_use]
    pub fn with_const(mut self) -> Self {
        self.is_const = true;
        self
    }

    /// Records which partial part declared the field.
    #[must_use]
    pub fn with_part_index(mut self, part_index: u32) -> Self {
        self.part_index = part_index;
        self
    }

    /// Sets the declaration span.
    #[must_use]
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    /// Appends an attribute application to this field.
    pub fn add_attribute(&self, application: AttributeApplication) {
        self.attributes.push(application);
    }

    /// Appends an attribute application, builder style.
    #[must_use]
    pub fn with_attribute(self, application: AttributeApplication) -> Self {
        self.attributes.push(application);
        self
    }

    /// Returns true for fields that occupy instance storage.
    ///
    /// Const fields are compile-time values and never occupy storage.
    #[must_use]
    pub fn is_instance(&self) -> bool {
        !self.is_static && !self.is_const
    }

    /// Finds the first attribute application with the given qualified name.
    #[must_use]
    pub fn find_attribute(&self, namespace: &str, name: &str) -> Option<&AttributeApplication> {
        self.attributes
            .iter()
            .map(|(_, app)| app)
            .find(|app| app.namespace == namespace && app.name == name)
    }
}
