//! Type declarations.
//!
//! [`TypeDecl`] is the central node of the declaration graph: one merged type
//! per metadata token, with all partial parts folded in. The well-known
//! attribute machinery latches recognition and embedding marks onto it, and the
//! layout decision procedure latches the computed [`LayoutDescriptor`]; both
//! latches are write-once so repeated checking stays idempotent.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, OnceLock, Weak,
};

use crate::metadata::{
    diagnostics::Location,
    layout::LayoutDescriptor,
    symbols::{
        attrs::{AttributeApplication, AttributeUsageInfo},
        fields::{FieldDeclList, FieldDeclRc},
        members::MemberDeclList,
        shape::TypeShape,
        AttributeList,
    },
    token::Token,
};

/// A vector that holds a list of `TypeDecl`
pub type TypeDeclList = Arc<boxcar::Vec<TypeDeclRc>>;
/// Reference to a `TypeDecl`
pub type TypeDeclRc = Arc<TypeDecl>;

/// Base-chain walks stop after this many links to stay safe against
/// malformed cyclic graphs.
const MAX_BASE_DEPTH: usize = 64;

/// Declared accessibility of a type or member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accessibility {
    /// Visible everywhere
    Public,
    /// Visible within the declaring assembly and its friends
    Internal,
    /// Visible to derived types
    Protected,
    /// Visible within the declaring type
    Private,
}

impl Accessibility {
    /// Returns true for positions that are part of an assembly's public surface
    #[must_use]
    pub fn is_public_surface(&self) -> bool {
        matches!(self, Accessibility::Public | Accessibility::Protected)
    }
}

/// The kind of a type declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    /// A class
    Class,
    /// A struct
    Struct,
    /// An interface
    Interface,
    /// An enum
    Enum,
    /// A delegate
    Delegate,
}

impl TypeKind {
    /// Returns true for value types
    #[must_use]
    pub fn is_value_type(&self) -> bool {
        matches!(self, TypeKind::Struct | TypeKind::Enum)
    }

    /// Returns true for kinds whose field layout can be controlled.
    ///
    /// Interfaces, enums, and delegates have no controllable layout.
    #[must_use]
    pub fn admits_layout(&self) -> bool {
        matches!(self, TypeKind::Class | TypeKind::Struct)
    }
}

/// One partial part of a type declaration.
#[derive(Debug, Clone)]
pub struct TypePart {
    /// Source file the part lives in
    pub file: Arc<str>,
    /// Span of the part's declaration keyword
    pub location: Location,
}

impl TypePart {
    /// Creates a part from a file and span.
    #[must_use]
    pub fn new(file: impl Into<Arc<str>>, location: Location) -> Self {
        Self {
            file: file.into(),
            location,
        }
    }
}

/// Reference to a type's base, by name with an optional in-graph declaration.
///
/// Bases from referenced assemblies exist only as names; bases declared in the
/// same compilation also carry a weak link so inheritance chains can be walked.
#[derive(Debug, Clone)]
pub struct BaseTypeRef {
    /// Namespace of the base type
    pub namespace: String,
    /// Simple name of the base type
    pub name: String,
    decl: Weak<TypeDecl>,
}

impl BaseTypeRef {
    /// A base known only by name (referenced assembly).
    #[must_use]
    pub fn named(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            decl: Weak::new(),
        }
    }

    /// A base declared in the same compilation.
    #[must_use]
    pub fn to_decl(decl: &TypeDeclRc) -> Self {
        Self {
            namespace: decl.namespace.clone(),
            name: decl.name.clone(),
            decl: Arc::downgrade(decl),
        }
    }

    /// Returns the in-graph declaration, when the base is local and alive
    #[must_use]
    pub fn upgrade(&self) -> Option<TypeDeclRc> {
        self.decl.upgrade()
    }

    /// Returns the full name (Namespace.Name) of the base
    #[must_use]
    pub fn full_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }
}

/// A constructor declaration.
#[derive(Debug, Clone)]
pub struct CtorDecl {
    /// Declared accessibility
    pub access: Accessibility,
    /// Parameter type shapes, in order
    pub params: Vec<TypeShape>,
    /// Span of the constructor declaration
    pub location: Location,
}

impl CtorDecl {
    /// A parameterless constructor.
    #[must_use]
    pub fn parameterless(access: Accessibility) -> Self {
        Self {
            access,
            params: Vec::new(),
            location: Location::none(),
        }
    }

    /// A constructor with the given parameter shapes.
    #[must_use]
    pub fn new(access: Accessibility, params: Vec<TypeShape>) -> Self {
        Self {
            access,
            params,
            location: Location::none(),
        }
    }
}

/// A type declaration, merged across all of its partial parts.
#[derive(Debug)]
pub struct TypeDecl {
    /// TypeDef token
    pub token: Token,
    /// `TypeNamespace` (can be empty for the global namespace)
    pub namespace: String,
    /// `TypeName`, without an arity suffix
    pub name: String,
    /// Number of generic type parameters, 0 for non-generic types
    pub arity: u16,
    /// Kind of declaration
    pub kind: TypeKind,
    /// Declared accessibility
    pub access: Accessibility,
    /// `sealed` modifier
    pub is_sealed: bool,
    /// `static` modifier
    pub is_static: bool,
    /// File-scoped (`file class`) declaration
    pub is_file_local: bool,
    /// `readonly struct` modifier
    pub is_readonly: bool,
    /// `ref struct` declaration
    pub is_ref_like: bool,
    /// Inline fixed-size buffer type
    pub is_fixed_buffer: bool,
    /// At least one generic type parameter carries an `unmanaged` constraint
    pub has_unmanaged_constraint: bool,
    /// This type's base aka 'extends'
    base: OnceLock<BaseTypeRef>,
    /// `AttributeUsage` declared on this type, when it is an attribute type
    pub attribute_usage: OnceLock<AttributeUsageInfo>,
    /// All partial parts; exactly one for non-partial declarations
    pub parts: Arc<boxcar::Vec<TypePart>>,
    /// All fields this type has, in declaration order per part
    pub fields: FieldDeclList,
    /// All members this type has
    pub members: MemberDeclList,
    /// All constructors this type declares
    pub ctors: Arc<boxcar::Vec<CtorDecl>>,
    /// Attribute applications on this type
    pub attributes: AttributeList,
    /// The computed layout, latched by the layout decision procedure
    pub layout: OnceLock<LayoutDescriptor>,
    recognized: AtomicBool,
    embedded: AtomicBool,
}

impl TypeDecl {
    /// Creates an internal, non-sealed declaration with no parts.
    pub fn new(
        token: Token,
        kind: TypeKind,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        TypeDecl {
            token,
            namespace: namespace.into(),
            name: name.into(),
            arity: 0,
            kind,
            access: Accessibility::Internal,
            is_sealed: false,
            is_static: false,
            is_file_local: false,
            is_readonly: false,
            is_ref_like: false,
            is_fixed_buffer: false,
            has_unmanaged_constraint: false,
            base: OnceLock::new(),
            attribute_usage: OnceLock::new(),
            parts: Arc::new(boxcar::Vec::new()),
            fields: Arc::new(boxcar::Vec::new()),
            members: Arc::new(boxcar::Vec::new()),
            ctors: Arc::new(boxcar::Vec::new()),
            attributes: Arc::new(boxcar::Vec::new()),
            layout: OnceLock::new(),
            recognized: AtomicBool::new(false),
            embedded: AtomicBool::new(false),
        }
    }

    /// Returns the full name (Namespace.Name) of the entity
    #[must_use]
    pub fn fullname(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{0}.{1}", self.namespace, self.name)
        }
    }

    /// Returns true for generic declarations
    #[must_use]
    pub fn is_generic(&self) -> bool {
        self.arity > 0
    }

    /// Sets the base type; later calls are ignored.
    pub fn set_base(&self, base: BaseTypeRef) {
        self.base.set(base).ok();
    }

    /// Access the base type of this type, if it exists
    #[must_use]
    pub fn base(&self) -> Option<&BaseTypeRef> {
        self.base.get()
    }

    /// The primary location: the span of the first declared part.
    #[must_use]
    pub fn location(&self) -> Location {
        match self.parts.iter().next() {
            Some((_, part)) => part.location.clone(),
            None => Location::none(),
        }
    }

    /// Appends a partial part and returns its index.
    pub fn add_part(&self, part: TypePart) -> u32 {
        u32::try_from(self.parts.push(part)).unwrap_or(u32::MAX)
    }

    /// Appends a field.
    pub fn add_field(&self, field: FieldDeclRc) {
        self.fields.push(field);
    }

    /// Appends a constructor.
    pub fn add_ctor(&self, ctor: CtorDecl) {
        self.ctors.push(ctor);
    }

    /// Appends an attribute application on this type.
    pub fn add_attribute(&self, application: AttributeApplication) {
        self.attributes.push(application);
    }

    /// Finds the first attribute application with the given qualified name.
    #[must_use]
    pub fn find_attribute(&self, namespace: &str, name: &str) -> Option<&AttributeApplication> {
        self.attributes
            .iter()
            .map(|(_, app)| app)
            .find(|app| app.namespace == namespace && app.name == name)
    }

    /// Walks the base chain looking for `System.Attribute`.
    ///
    /// Bases from referenced assemblies terminate the walk at their name; a
    /// chain longer than [`MAX_BASE_DEPTH`] is treated as not deriving.
    #[must_use]
    pub fn derives_from_attribute(&self) -> bool {
        let mut current = self.base().cloned();
        for _ in 0..MAX_BASE_DEPTH {
            let Some(base) = current else {
                return false;
            };
            if base.namespace == "System" && base.name == "Attribute" {
                return true;
            }
            current = match base.upgrade() {
                Some(decl) => decl.base().cloned(),
                None => None,
            };
        }
        false
    }

    /// Returns true when the type has a constructor callable without arguments
    /// from within its own assembly.
    ///
    /// A type declaring no constructor at all gets the implicit public
    /// parameterless one; a declared private parameterless constructor does
    /// not qualify.
    #[must_use]
    pub fn has_accessible_parameterless_ctor(&self) -> bool {
        if self.ctors.count() == 0 {
            return !self.is_static;
        }
        self.ctors
            .iter()
            .any(|(_, ctor)| ctor.params.is_empty() && ctor.access != Accessibility::Private)
    }

    /// Returns all constructor parameter lists, for signature matching.
    pub fn ctor_signatures(&self) -> impl Iterator<Item = &CtorDecl> {
        self.ctors.iter().map(|(_, ctor)| ctor)
    }

    /// Instance fields in deterministic emission order.
    ///
    /// Order is (part file path, part index, declaration order within the
    /// part). For non-partial types this is plain declaration order.
    #[must_use]
    pub fn instance_fields_ordered(&self) -> Vec<FieldDeclRc> {
        let part_files: Vec<Arc<str>> = self
            .parts
            .iter()
            .map(|(_, part)| Arc::clone(&part.file))
            .collect();

        let mut fields: Vec<(usize, FieldDeclRc)> = self
            .fields
            .iter()
            .filter(|(_, field)| field.is_instance())
            .map(|(index, field)| (index, Arc::clone(field)))
            .collect();

        fields.sort_by(|(left_idx, left), (right_idx, right)| {
            let left_file = part_files.get(left.part_index as usize);
            let right_file = part_files.get(right.part_index as usize);
            left_file
                .cmp(&right_file)
                .then(left.part_index.cmp(&right.part_index))
                .then(left_idx.cmp(right_idx))
        });

        fields.into_iter().map(|(_, field)| field).collect()
    }

    /// Number of distinct partial parts contributing instance fields.
    #[must_use]
    pub fn parts_with_instance_fields(&self) -> usize {
        let mut parts: Vec<u32> = self
            .fields
            .iter()
            .filter(|(_, field)| field.is_instance())
            .map(|(_, field)| field.part_index)
            .collect();
        parts.sort_unstable();
        parts.dedup();
        parts.len()
    }

    /// Marks this declaration as a recognized well-known attribute definition.
    pub fn mark_recognized(&self) {
        self.recognized.store(true, Ordering::Release);
    }

    /// Returns true when shape validation accepted this declaration
    #[must_use]
    pub fn is_recognized(&self) -> bool {
        self.recognized.load(Ordering::Acquire)
    }

    /// Marks this declaration as embedded: invisible across assembly boundaries.
    pub fn mark_embedded(&self) {
        self.embedded.store(true, Ordering::Release);
    }

    /// Returns true when the type is embedded
    #[must_use]
    pub fn is_embedded(&self) -> bool {
        self.embedded.load(Ordering::Acquire)
    }
}
