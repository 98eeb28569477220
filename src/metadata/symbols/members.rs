//! Member declarations: methods, properties, and their parameters.
//!
//! Members exist in this crate for one purpose: emission-time trigger
//! scanning. An `in` parameter raises a read-only marker need, a tuple-typed
//! signature raises a tuple-names need, and a nullable-annotated signature on
//! the public surface raises nullable metadata needs. Bodies, overloads, and
//! binding state stay with the host compiler.

use std::sync::Arc;

use crate::metadata::{
    diagnostics::Location,
    symbols::{shape::TypeShape, types::Accessibility, AttributeList},
    token::Token,
};

/// A vector that holds a list of `MemberDecl`
pub type MemberDeclList = Arc<boxcar::Vec<MemberDeclRc>>;
/// Reference to a `MemberDecl`
pub type MemberDeclRc = Arc<MemberDecl>;

/// What kind of member a declaration is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    /// An ordinary method
    Method,
    /// A property accessor pair
    Property,
    /// An indexer (property with parameters)
    Indexer,
}

/// Passing mode of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefKind {
    /// By value
    #[default]
    None,
    /// `ref`
    Ref,
    /// `out`
    Out,
    /// `in` (read-only reference)
    In,
}

/// A parameter of a member.
#[derive(Debug, Clone)]
pub struct ParamDecl {
    /// Param token (table 0x08)
    pub token: Token,
    /// Parameter name
    pub name: String,
    /// Passing mode
    pub ref_kind: RefKind,
    /// Declared type
    pub shape: TypeShape,
    /// Span of the parameter declaration
    pub location: Location,
}

impl ParamDecl {
    /// Creates a by-value parameter.
    #[must_use]
    pub fn new(token: Token, name: impl Into<String>, shape: TypeShape) -> Self {
        Self {
            token,
            name: name.into(),
            ref_kind: RefKind::None,
            shape,
            location: Location::none(),
        }
    }

    /// Sets the passing mode.
    #[must_use]
    pub fn with_ref_kind(mut self, ref_kind: RefKind) -> Self {
        self.ref_kind = ref_kind;
        self
    }

    /// Sets the declaration span.
    #[must_use]
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = location;
        self
    }
}

/// A method, property, or indexer declaration.
#[derive(Debug)]
pub struct MemberDecl {
    /// Member token (table 0x06)
    pub token: Token,
    /// Member name
    pub name: String,
    /// Kind of member
    pub kind: MemberKind,
    /// Declared accessibility
    pub access: Accessibility,
    /// `readonly` member of a struct
    pub is_readonly: bool,
    /// At least one generic method parameter carries an `unmanaged` constraint
    pub has_unmanaged_constraint: bool,
    /// Parameters, empty for parameterless members
    pub params: Vec<ParamDecl>,
    /// Return or property type, `None` for `void`
    pub return_shape: Option<TypeShape>,
    /// Attribute applications on the member itself
    pub attributes: AttributeList,
    /// Span of the member declaration
    pub location: Location,
}

impl MemberDecl {
    /// Creates a `void` method with internal accessibility and no parameters.
    #[must_use]
    pub fn new(token: Token, name: impl Into<String>, kind: MemberKind) -> Self {
        Self {
            token,
            name: name.into(),
            kind,
            access: Accessibility::Internal,
            is_readonly: false,
            has_unmanaged_constraint: false,
            params: Vec::new(),
            return_shape: None,
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

    /// Marks the member `readonly`.
    #[must_use]
    pub fn with_readonly(mut self) -> Self {
        self.is_readonly = true;
        self
    }

    /// Records an `unmanaged` constraint on a generic method parameter.
    #[must_use]
    pub fn with_unmanaged_constraint(mut self) -> Self {
        self.has_unmanaged_constraint = true;
        self
    }

    /// Appends a parameter.
    #[must_use]
    pub fn with_param(mut self, param: ParamDecl) -> Self {
        self.params.push(param);
        self
    }

    /// Sets the return or property type.
    #[must_use]
    pub fn with_return(mut self, shape: TypeShape) -> Self {
        self.return_shape = Some(shape);
        self
    }

    /// Sets the declaration span.
    #[must_use]
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    /// Iterates the shapes of the full signature: parameters first, then the
    /// return position.
    pub fn signature_shapes(&self) -> impl Iterator<Item = &TypeShape> {
        self.params
            .iter()
            .map(|param| &param.shape)
            .chain(self.return_shape.iter())
    }

    /// Returns true when any parameter is passed `in`.
    #[must_use]
    pub fn has_in_params(&self) -> bool {
        self.params
            .iter()
            .any(|param| param.ref_kind == RefKind::In)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::symbols::shape::{PrimitiveKind, TupleElement};

    #[test]
    fn test_in_parameter_detection() {
        let plain = MemberDecl::new(Token::methoddef(1), "M", MemberKind::Method).with_param(
            ParamDecl::new(
                Token::param(1),
                "x",
                TypeShape::primitive(PrimitiveKind::Int32),
            ),
        );
        assert!(!plain.has_in_params());

        let with_in = MemberDecl::new(Token::methoddef(2), "N", MemberKind::Method).with_param(
            ParamDecl::new(
                Token::param(2),
                "x",
                TypeShape::primitive(PrimitiveKind::Int32),
            )
            .with_ref_kind(RefKind::In),
        );
        assert!(with_in.has_in_params());
    }

    #[test]
    fn test_signature_shapes_order() {
        let member = MemberDecl::new(Token::methoddef(1), "M", MemberKind::Method)
            .with_param(ParamDecl::new(
                Token::param(1),
                "x",
                TypeShape::primitive(PrimitiveKind::Int32),
            ))
            .with_param(ParamDecl::new(
                Token::param(2),
                "y",
                TypeShape::primitive(PrimitiveKind::Bool),
            ))
            .with_return(TypeShape::primitive(PrimitiveKind::String));

        let shapes: Vec<_> = member.signature_shapes().collect();
        assert_eq!(shapes.len(), 3);
        assert_eq!(*shapes[0], TypeShape::primitive(PrimitiveKind::Int32));
        assert_eq!(*shapes[2], TypeShape::primitive(PrimitiveKind::String));
    }

    #[test]
    fn test_tuple_signature_scanning() {
        let member = MemberDecl::new(Token::methoddef(1), "P", MemberKind::Property).with_return(
            TypeShape::tuple(vec![
                TupleElement::named("a", TypeShape::primitive(PrimitiveKind::Int32)),
                TupleElement::unnamed(TypeShape::primitive(PrimitiveKind::Int32)),
            ]),
        );

        assert!(member
            .signature_shapes()
            .any(super::super::shape::TypeShape::has_tuple_names));
    }
}
