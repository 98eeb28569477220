//! Assembly-level declaration container.
//!
//! [`Assembly`] owns every [`TypeDecl`] of a compilation, keyed by token with a
//! secondary full-name index, plus the assembly facts the attribute machinery
//! consults: `InternalsVisibleTo` friend grants, type forwarders, and
//! assembly/module level attribute applications.
//!
//! Token allocation is atomic so synthesis can mint fresh `TypeDef` and
//! `MethodDef` tokens while other work is in flight.

use std::sync::{atomic::AtomicU32, atomic::Ordering, Arc};

use crossbeam_skiplist::SkipMap;
use dashmap::DashMap;

use crate::{
    metadata::{
        diagnostics::Location,
        identity::{AssemblyIdentity, FriendAssembly},
        symbols::{
            types::{Accessibility, TypeDecl, TypeDeclRc},
            AttributeList,
        },
        token::Token,
    },
    Result,
};

/// A type forwarder: an `ExportedType` row pointing at another assembly.
#[derive(Debug, Clone)]
pub struct TypeForwarder {
    /// Namespace of the forwarded type
    pub namespace: String,
    /// Simple name of the forwarded type
    pub name: String,
    /// Name of the assembly the type is forwarded to
    pub destination: String,
    /// Span of the forwarding declaration
    pub location: Location,
}

impl TypeForwarder {
    /// Creates a forwarder entry.
    #[must_use]
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        destination: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            destination: destination.into(),
            location: Location::none(),
        }
    }

    /// Attaches the span of the forwarding declaration.
    #[must_use]
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = location;
        self
    }
}

/// The assembly being compiled, with all declared types and assembly facts.
pub struct Assembly {
    /// Identity (name, version, public key) of this assembly
    pub identity: AssemblyIdentity,
    /// All types, keyed by their `TypeDef` token
    types: SkipMap<Token, TypeDeclRc>,
    /// Secondary index: (full name, arity) to token
    fullname_index: DashMap<(String, u16), Token>,
    /// Parsed `InternalsVisibleTo` grants
    friends: boxcar::Vec<FriendAssembly>,
    /// Declared type forwarders
    forwarders: boxcar::Vec<TypeForwarder>,
    /// Assembly-level attribute applications
    pub assembly_attributes: AttributeList,
    /// Module-level attribute applications
    pub module_attributes: AttributeList,
    next_typedef_rid: AtomicU32,
    next_field_rid: AtomicU32,
    next_methoddef_rid: AtomicU32,
}

impl Assembly {
    /// Creates an empty assembly with the given identity.
    #[must_use]
    pub fn new(identity: AssemblyIdentity) -> Self {
        Assembly {
            identity,
            types: SkipMap::new(),
            fullname_index: DashMap::new(),
            friends: boxcar::Vec::new(),
            forwarders: boxcar::Vec::new(),
            assembly_attributes: Arc::new(boxcar::Vec::new()),
            module_attributes: Arc::new(boxcar::Vec::new()),
            next_typedef_rid: AtomicU32::new(1),
            next_field_rid: AtomicU32::new(1),
            next_methoddef_rid: AtomicU32::new(1),
        }
    }

    /// Allocates a fresh `TypeDef` token.
    pub fn alloc_typedef_token(&self) -> Token {
        Token::typedef(self.next_typedef_rid.fetch_add(1, Ordering::Relaxed))
    }

    /// Allocates a fresh `Field` token.
    pub fn alloc_field_token(&self) -> Token {
        Token::field(self.next_field_rid.fetch_add(1, Ordering::Relaxed))
    }

    /// Allocates a fresh `MethodDef` token.
    pub fn alloc_methoddef_token(&self) -> Token {
        Token::methoddef(self.next_methoddef_rid.fetch_add(1, Ordering::Relaxed))
    }

    /// Registers a type declaration.
    ///
    /// # Errors
    /// Returns [`crate::Error::DuplicateToken`] when a type with the same
    /// token is already registered.
    pub fn register_type(&self, decl: TypeDecl) -> Result<TypeDeclRc> {
        let token = decl.token;
        if self.types.contains_key(&token) {
            return Err(crate::Error::DuplicateToken(token));
        }
        let rc = Arc::new(decl);
        self.fullname_index
            .insert((rc.fullname(), rc.arity), token);
        self.types.insert(token, Arc::clone(&rc));
        Ok(rc)
    }

    /// Looks a type up by token.
    #[must_use]
    pub fn get(&self, token: &Token) -> Option<TypeDeclRc> {
        self.types.get(token).map(|entry| Arc::clone(entry.value()))
    }

    /// Looks a type up by full name and arity.
    #[must_use]
    pub fn get_by_name(&self, fullname: &str, arity: u16) -> Option<TypeDeclRc> {
        let token = *self.fullname_index.get(&(fullname.to_string(), arity))?;
        self.get(&token)
    }

    /// All registered types in token order.
    pub fn types(&self) -> impl Iterator<Item = TypeDeclRc> + '_ {
        self.types.iter().map(|entry| Arc::clone(entry.value()))
    }

    /// Number of registered types.
    #[must_use]
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// Records an `InternalsVisibleTo` grant from its attribute argument.
    ///
    /// # Errors
    /// Returns an error when the friend specification cannot be parsed.
    pub fn add_internals_visible_to(&self, spec: &str) -> Result<()> {
        let friend = FriendAssembly::parse(spec)?;
        self.friends.push(friend);
        Ok(())
    }

    /// Returns true when at least one `InternalsVisibleTo` grant exists
    #[must_use]
    pub fn has_friends(&self) -> bool {
        self.friends.count() > 0
    }

    /// Returns true when the candidate assembly is granted friend access
    #[must_use]
    pub fn grants_friend_access(&self, candidate: &AssemblyIdentity) -> bool {
        self.friends
            .iter()
            .any(|(_, friend)| friend.grants(candidate))
    }

    /// Records a type forwarder.
    pub fn add_forwarder(&self, forwarder: TypeForwarder) {
        self.forwarders.push(forwarder);
    }

    /// Finds a forwarder for the given namespace and name.
    #[must_use]
    pub fn forwarder_for(&self, namespace: &str, name: &str) -> Option<&TypeForwarder> {
        self.forwarders
            .iter()
            .map(|(_, fw)| fw)
            .find(|fw| fw.namespace == namespace && fw.name == name)
    }

    /// Resolves a type as a referencing assembly would see it.
    ///
    /// Embedded types never resolve across an assembly boundary. Public types
    /// always resolve; internal types resolve only for assemblies holding an
    /// `InternalsVisibleTo` grant.
    #[must_use]
    pub fn lookup_visible(
        &self,
        fullname: &str,
        arity: u16,
        requestor: &AssemblyIdentity,
    ) -> Option<TypeDeclRc> {
        let decl = self.get_by_name(fullname, arity)?;
        if decl.is_embedded() || decl.is_file_local {
            return None;
        }
        match decl.access {
            Accessibility::Public => Some(decl),
            _ => self.grants_friend_access(requestor).then_some(decl),
        }
    }
}

impl std::fmt::Debug for Assembly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Assembly")
            .field("identity", &self.identity)
            .field("types", &self.types.len())
            .field("friends", &self.friends.count())
            .field("forwarders", &self.forwarders.count())
            .finish()
    }
}

/// A type exported by a referenced assembly, reduced to what reuse decisions
/// need: its identity and the constructor signatures it exposes.
#[derive(Debug, Clone)]
pub struct ReferencedType {
    /// Namespace of the type
    pub namespace: String,
    /// Simple name of the type
    pub name: String,
    /// Number of generic parameters
    pub arity: u16,
    /// Parameter shapes of each accessible constructor
    pub ctor_shapes: Vec<Vec<crate::metadata::symbols::shape::TypeShape>>,
}

impl ReferencedType {
    /// Creates a non-generic referenced type with no constructors recorded.
    #[must_use]
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            arity: 0,
            ctor_shapes: Vec::new(),
        }
    }

    /// Records an accessible constructor by its parameter shapes.
    #[must_use]
    pub fn with_ctor(mut self, params: Vec<crate::metadata::symbols::shape::TypeShape>) -> Self {
        self.ctor_shapes.push(params);
        self
    }

    /// Returns the full name (Namespace.Name) of the type
    #[must_use]
    pub fn full_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }
}

/// A referenced assembly, reduced to the types this compilation can see.
///
/// Callers add only the types visible to the compilation; accessibility
/// filtering against the reference happened when the reference was read.
#[derive(Debug)]
pub struct ReferencedAssembly {
    /// Identity of the referenced assembly
    pub identity: AssemblyIdentity,
    types: DashMap<(String, u16), ReferencedType>,
}

impl ReferencedAssembly {
    /// Creates an empty reference with the given identity.
    #[must_use]
    pub fn new(identity: AssemblyIdentity) -> Self {
        Self {
            identity,
            types: DashMap::new(),
        }
    }

    /// Adds a visible exported type.
    pub fn add_type(&self, ty: ReferencedType) {
        self.types.insert((ty.full_name(), ty.arity), ty);
    }

    /// Looks a visible type up by full name and arity.
    #[must_use]
    pub fn find(&self, fullname: &str, arity: u16) -> Option<ReferencedType> {
        self.types
            .get(&(fullname.to_string(), arity))
            .map(|entry| entry.clone())
    }
}
