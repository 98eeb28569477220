//! Builder for type declarations.
//!
//! This module provides the [`TypeDeclBuilder`] struct, which offers a fluent API for
//! constructing [`TypeDecl`] instances and registering them with an [`Assembly`]. Tokens
//! for the type and its fields are allocated from the assembly, and fields are tagged
//! with the partial part they were declared in.
//!
//! # Example
//!
//! ```rust
//! use cilforge::metadata::{
//!     identity::AssemblyIdentity,
//!     symbols::{Assembly, TypeDeclBuilder},
//! };
//!
//! let assembly = Assembly::new(AssemblyIdentity::new("Lib"));
//! let decl = TypeDeclBuilder::class(&assembly, "N", "C")
//!     .public()
//!     .sealed()
//!     .build()?;
//! assert_eq!(decl.fullname(), "N.C");
//! # Ok::<(), cilforge::Error>(())
//! ```

use std::sync::Arc;

use crate::{
    metadata::{
        diagnostics::Location,
        symbols::{
            assembly::Assembly,
            attrs::{AttributeApplication, AttributeUsageInfo},
            fields::FieldDecl,
            members::MemberDecl,
            shape::TypeShape,
            types::{Accessibility, BaseTypeRef, CtorDecl, TypeDecl, TypeDeclRc, TypeKind, TypePart},
        },
    },
    Result,
};

/// Provides a fluent API for building and registering type declarations
pub struct TypeDeclBuilder<'a> {
    /// Assembly the declaration is registered with
    assembly: &'a Assembly,
    /// Declaration being built
    decl: TypeDecl,
    /// Part index new fields are tagged with
    current_part: u32,
}

impl<'a> TypeDeclBuilder<'a> {
    fn start(assembly: &'a Assembly, kind: TypeKind, namespace: &str, name: &str) -> Self {
        let token = assembly.alloc_typedef_token();
        TypeDeclBuilder {
            assembly,
            decl: TypeDecl::new(token, kind, namespace, name),
            current_part: 0,
        }
    }

    /// Start building a class
    ///
    /// ## Arguments
    /// * 'assembly'  - The assembly to register with
    /// * 'namespace' - Namespace for the class
    /// * 'name'      - Name for the class
    pub fn class(assembly: &'a Assembly, namespace: &str, name: &str) -> Self {
        Self::start(assembly, TypeKind::Class, namespace, name)
    }

    /// Start building a struct
    ///
    /// ## Arguments
    /// * 'assembly'  - The assembly to register with
    /// * 'namespace' - Namespace for the struct
    /// * 'name'      - Name for the struct
    pub fn value_type(assembly: &'a Assembly, namespace: &str, name: &str) -> Self {
        Self::start(assembly, TypeKind::Struct, namespace, name)
    }

    /// Start building an interface
    ///
    /// ## Arguments
    /// * 'assembly'  - The assembly to register with
    /// * 'namespace' - Namespace for the interface
    /// * 'name'      - Name for the interface
    pub fn interface(assembly: &'a Assembly, namespace: &str, name: &str) -> Self {
        Self::start(assembly, TypeKind::Interface, namespace, name)
    }

    /// Start building an enum
    ///
    /// ## Arguments
    /// * 'assembly'  - The assembly to register with
    /// * 'namespace' - Namespace for the enum
    /// * 'name'      - Name for the enum
    pub fn enum_type(assembly: &'a Assembly, namespace: &str, name: &str) -> Self {
        Self::start(assembly, TypeKind::Enum, namespace, name)
    }

    /// Start building a delegate
    ///
    /// ## Arguments
    /// * 'assembly'  - The assembly to register with
    /// * 'namespace' - Namespace for the delegate
    /// * 'name'      - Name for the delegate
    pub fn delegate(assembly: &'a Assembly, namespace: &str, name: &str) -> Self {
        Self::start(assembly, TypeKind::Delegate, namespace, name)
    }

    /// Set the declared accessibility
    #[must_use]
    pub fn access(mut self, access: Accessibility) -> Self {
        self.decl.access = access;
        self
    }

    /// Declare the type `public`
    #[must_use]
    pub fn public(mut self) -> Self {
        self.decl.access = Accessibility::Public;
        self
    }

    /// Declare the type `sealed`
    #[must_use]
    pub fn sealed(mut self) -> Self {
        self.decl.is_sealed = true;
        self
    }

    /// Declare the type `static`
    #[must_use]
    pub fn static_type(mut self) -> Self {
        self.decl.is_static = true;
        self
    }

    /// Declare the type `readonly`
    #[must_use]
    pub fn readonly(mut self) -> Self {
        self.decl.is_readonly = true;
        self
    }

    /// Declare the type as a `ref struct`
    #[must_use]
    pub fn ref_like(mut self) -> Self {
        self.decl.is_ref_like = true;
        self
    }

    /// Declare the type file-scoped (`file class`)
    #[must_use]
    pub fn file_local(mut self) -> Self {
        self.decl.is_file_local = true;
        self
    }

    /// Mark the type as a compiler fixed-size buffer type
    #[must_use]
    pub fn fixed_buffer(mut self) -> Self {
        self.decl.is_fixed_buffer = true;
        self
    }

    /// Record an `unmanaged` constraint on a generic type parameter
    #[must_use]
    pub fn unmanaged_constraint(mut self) -> Self {
        self.decl.has_unmanaged_constraint = true;
        self
    }

    /// Set the number of generic type parameters
    ///
    /// ## Arguments
    /// * 'arity' - Number of generic parameters
    #[must_use]
    pub fn arity(mut self, arity: u16) -> Self {
        self.decl.arity = arity;
        self
    }

    /// Set the base type by name
    ///
    /// ## Arguments
    /// * 'namespace' - Namespace of the base type
    /// * 'name'      - Name of the base type
    #[must_use]
    pub fn base(self, namespace: &str, name: &str) -> Self {
        self.decl.set_base(BaseTypeRef::named(namespace, name));
        self
    }

    /// Set the base type to a declaration in the same assembly
    ///
    /// ## Arguments
    /// * 'decl' - The base declaration
    #[must_use]
    pub fn base_decl(self, decl: &TypeDeclRc) -> Self {
        self.decl.set_base(BaseTypeRef::to_decl(decl));
        self
    }

    /// Add a partial part; later fields are tagged with this part
    ///
    /// ## Arguments
    /// * 'file'     - Source file of the part
    /// * 'location' - Span of the part declaration
    #[must_use]
    pub fn part(mut self, file: &str, location: Location) -> Self {
        self.current_part = self.decl.add_part(TypePart::new(file, location));
        self
    }

    /// Add an instance field with a freshly allocated token
    ///
    /// ## Arguments
    /// * 'name'  - Field name
    /// * 'shape' - Field type shape
    #[must_use]
    pub fn field(self, name: &str, shape: TypeShape) -> Self {
        let token = self.assembly.alloc_field_token();
        let field = FieldDecl::new(token, name, shape).with_part_index(self.current_part);
        self.decl.add_field(Arc::new(field));
        self
    }

    /// Add a pre-built field declaration, tagged with the current part
    ///
    /// ## Arguments
    /// * 'field' - The field to add
    #[must_use]
    pub fn field_decl(self, field: FieldDecl) -> Self {
        let part = self.current_part;
        self.decl.add_field(Arc::new(field.with_part_index(part)));
        self
    }

    /// Add a constructor
    ///
    /// ## Arguments
    /// * 'access' - Declared accessibility of the constructor
    /// * 'params' - Parameter type shapes
    #[must_use]
    pub fn ctor(self, access: Accessibility, params: Vec<TypeShape>) -> Self {
        self.decl.add_ctor(CtorDecl::new(access, params));
        self
    }

    /// Add a member declaration
    ///
    /// ## Arguments
    /// * 'member' - The member to add
    #[must_use]
    pub fn member(self, member: MemberDecl) -> Self {
        self.decl.members.push(Arc::new(member));
        self
    }

    /// Add an attribute application on the type
    ///
    /// ## Arguments
    /// * 'application' - The attribute application
    #[must_use]
    pub fn attribute(self, application: AttributeApplication) -> Self {
        self.decl.add_attribute(application);
        self
    }

    /// Declare the `AttributeUsage` of an attribute type
    ///
    /// ## Arguments
    /// * 'usage' - Valid targets and multiplicity
    #[must_use]
    pub fn usage(self, usage: AttributeUsageInfo) -> Self {
        self.decl.attribute_usage.set(usage).ok();
        self
    }

    /// Register the declaration with the assembly
    ///
    /// A declaration built without an explicit part gets one synthetic part so
    /// every type has a primary location.
    ///
    /// # Errors
    /// Returns an error if a type with the same token is already registered.
    pub fn build(self) -> Result<TypeDeclRc> {
        if self.decl.parts.count() == 0 {
            self.decl
                .add_part(TypePart::new("<unknown>", Location::none()));
        }
        self.assembly.register_type(self.decl)
    }
}
