//! Structural type references for signature scanning.
//!
//! [`TypeShape`] is the lightweight type representation attached to fields,
//! parameters, and return positions of the declaration graph. It carries exactly
//! what emission-time trigger scanning needs: tuple element names (for the
//! tuple-names metadata walk) and per-node nullable annotations (for the
//! nullable metadata walk). It is not a full type system; named types are
//! recorded by name and value-ness only.
//!
//! Both walks are depth-first pre-order over the shape tree, matching the
//! order consumers reconstruct the flags in.

/// Nullable annotation state of a single shape node.
///
/// Value-type nodes always read as oblivious regardless of the stored
/// annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NullableAnnotation {
    /// No nullable context applies (legacy code or value type).
    #[default]
    Oblivious,
    /// Declared not-nullable under an enabled nullable context (`string`).
    NotAnnotated,
    /// Declared nullable under an enabled nullable context (`string?`).
    Annotated,
}

impl NullableAnnotation {
    /// The metadata flag byte for this annotation (0, 1, or 2)
    #[must_use]
    pub fn as_flag(&self) -> u8 {
        match self {
            NullableAnnotation::Oblivious => 0,
            NullableAnnotation::NotAnnotated => 1,
            NullableAnnotation::Annotated => 2,
        }
    }
}

/// Built-in primitive kinds that appear in scanned signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    /// `bool`
    Bool,
    /// `byte`
    Byte,
    /// `sbyte`
    SByte,
    /// `char`
    Char,
    /// `short`
    Int16,
    /// `ushort`
    UInt16,
    /// `int`
    Int32,
    /// `uint`
    UInt32,
    /// `long`
    Int64,
    /// `ulong`
    UInt64,
    /// `float`
    Float32,
    /// `double`
    Float64,
    /// `string`
    String,
    /// `object`
    Object,
}

impl PrimitiveKind {
    /// Returns true for reference-type primitives (`string`, `object`)
    #[must_use]
    pub fn is_reference(&self) -> bool {
        matches!(self, PrimitiveKind::String | PrimitiveKind::Object)
    }
}

/// One element of a tuple shape: an optional source name plus the element shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TupleElement {
    /// Element name as written in source, `None` for positional elements
    pub name: Option<String>,
    /// Shape of the element type
    pub shape: TypeShape,
}

impl TupleElement {
    /// Creates a named element.
    #[must_use]
    pub fn named(name: impl Into<String>, shape: TypeShape) -> Self {
        Self {
            name: Some(name.into()),
            shape,
        }
    }

    /// Creates an unnamed (positional) element.
    #[must_use]
    pub fn unnamed(shape: TypeShape) -> Self {
        Self { name: None, shape }
    }
}

/// A structural type reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeShape {
    /// A built-in primitive
    Primitive {
        /// Which primitive
        kind: PrimitiveKind,
        /// Nullable annotation, meaningful for reference primitives only
        annotation: NullableAnnotation,
    },
    /// A named type, possibly generic
    Named {
        /// Namespace of the type, empty for the global namespace
        namespace: String,
        /// Simple name of the type
        name: String,
        /// Whether the named type is a value type
        is_value_type: bool,
        /// Generic arguments, empty for non-generic types
        args: Vec<TypeShape>,
        /// Nullable annotation of this node
        annotation: NullableAnnotation,
    },
    /// A single-dimensional array
    Array {
        /// Element shape
        element: Box<TypeShape>,
        /// Nullable annotation of the array reference itself
        annotation: NullableAnnotation,
    },
    /// A tuple type with optionally named elements
    Tuple {
        /// The tuple's elements, two or more
        elements: Vec<TupleElement>,
    },
}

impl TypeShape {
    /// Shorthand for an oblivious primitive shape.
    #[must_use]
    pub fn primitive(kind: PrimitiveKind) -> Self {
        TypeShape::Primitive {
            kind,
            annotation: NullableAnnotation::Oblivious,
        }
    }

    /// Shorthand for an annotated primitive shape.
    #[must_use]
    pub fn primitive_with(kind: PrimitiveKind, annotation: NullableAnnotation) -> Self {
        TypeShape::Primitive { kind, annotation }
    }

    /// Shorthand for a non-generic named reference type.
    #[must_use]
    pub fn named(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        TypeShape::Named {
            namespace: namespace.into(),
            name: name.into(),
            is_value_type: false,
            args: Vec::new(),
            annotation: NullableAnnotation::Oblivious,
        }
    }

    /// Shorthand for a tuple shape.
    #[must_use]
    pub fn tuple(elements: Vec<TupleElement>) -> Self {
        TypeShape::Tuple { elements }
    }

    /// Returns true when this node is a value type.
    #[must_use]
    pub fn is_value_type(&self) -> bool {
        match self {
            TypeShape::Primitive { kind, .. } => !kind.is_reference(),
            TypeShape::Named { is_value_type, .. } => *is_value_type,
            TypeShape::Array { .. } => false,
            // tuples lower to ValueTuple
            TypeShape::Tuple { .. } => true,
        }
    }

    /// The nullable annotation of this node, oblivious for value types.
    #[must_use]
    pub fn annotation(&self) -> NullableAnnotation {
        if self.is_value_type() {
            return NullableAnnotation::Oblivious;
        }
        match self {
            TypeShape::Primitive { annotation, .. }
            | TypeShape::Named { annotation, .. }
            | TypeShape::Array { annotation, .. } => *annotation,
            TypeShape::Tuple { .. } => NullableAnnotation::Oblivious,
        }
    }

    /// Collects tuple element names in depth-first pre-order.
    ///
    /// Every tuple element contributes one entry — `None` for positional
    /// elements — before its own shape is walked, so nested names land after
    /// the enclosing element's slot. Returns true when at least one name is
    /// present; when false the collected list carries no information and
    /// callers skip tuple-names emission entirely.
    pub fn collect_tuple_names(&self, names: &mut Vec<Option<String>>) -> bool {
        match self {
            TypeShape::Primitive { .. } => false,
            TypeShape::Named { args, .. } => {
                let mut found = false;
                for arg in args {
                    found |= arg.collect_tuple_names(names);
                }
                found
            }
            TypeShape::Array { element, .. } => element.collect_tuple_names(names),
            TypeShape::Tuple { elements } => {
                let mut found = false;
                for element in elements {
                    found |= element.name.is_some();
                    names.push(element.name.clone());
                    found |= element.shape.collect_tuple_names(names);
                }
                found
            }
        }
    }

    /// Collects nullable flag bytes in depth-first pre-order, one byte per node.
    ///
    /// Value-type nodes contribute 0; reference nodes contribute their
    /// annotation flag. The byte stream matches what consumers decode from
    /// nullable metadata.
    pub fn collect_nullable_flags(&self, flags: &mut Vec<u8>) {
        flags.push(self.annotation().as_flag());
        match self {
            TypeShape::Primitive { .. } => {}
            TypeShape::Named { args, .. } => {
                for arg in args {
                    arg.collect_nullable_flags(flags);
                }
            }
            TypeShape::Array { element, .. } => element.collect_nullable_flags(flags),
            TypeShape::Tuple { elements } => {
                for element in elements {
                    element.shape.collect_nullable_flags(flags);
                }
            }
        }
    }

    /// Returns true when any node in the shape carries a non-oblivious
    /// annotation.
    #[must_use]
    pub fn has_nullable_annotations(&self) -> bool {
        let mut flags = Vec::new();
        self.collect_nullable_flags(&mut flags);
        flags.iter().any(|flag| *flag != 0)
    }

    /// Returns true when any tuple anywhere in the shape has a named element.
    #[must_use]
    pub fn has_tuple_names(&self) -> bool {
        let mut names = Vec::new();
        self.collect_tuple_names(&mut names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int() -> TypeShape {
        TypeShape::primitive(PrimitiveKind::Int32)
    }

    fn string_annotated(annotation: NullableAnnotation) -> TypeShape {
        TypeShape::primitive_with(PrimitiveKind::String, annotation)
    }

    #[test]
    fn test_tuple_names_depth_first() {
        // (int a, (bool, string c) b)
        let inner = TypeShape::tuple(vec![
            TupleElement::unnamed(TypeShape::primitive(PrimitiveKind::Bool)),
            TupleElement::named("c", TypeShape::primitive(PrimitiveKind::String)),
        ]);
        let outer = TypeShape::tuple(vec![
            TupleElement::named("a", int()),
            TupleElement::named("b", inner),
        ]);

        let mut names = Vec::new();
        assert!(outer.collect_tuple_names(&mut names));
        assert_eq!(
            names,
            vec![
                Some("a".to_string()),
                Some("b".to_string()),
                None,
                Some("c".to_string()),
            ]
        );
    }

    #[test]
    fn test_tuple_inside_generic_argument() {
        // List<(int x, int y)>
        let shape = TypeShape::Named {
            namespace: "System.Collections.Generic".to_string(),
            name: "List".to_string(),
            is_value_type: false,
            args: vec![TypeShape::tuple(vec![
                TupleElement::named("x", int()),
                TupleElement::named("y", int()),
            ])],
            annotation: NullableAnnotation::Oblivious,
        };

        let mut names = Vec::new();
        assert!(shape.collect_tuple_names(&mut names));
        assert_eq!(names, vec![Some("x".to_string()), Some("y".to_string())]);
    }

    #[test]
    fn test_unnamed_tuple_has_no_names() {
        let shape = TypeShape::tuple(vec![
            TupleElement::unnamed(int()),
            TupleElement::unnamed(int()),
        ]);
        let mut names = Vec::new();
        assert!(!shape.collect_tuple_names(&mut names));
        // slots are still collected, they are just all empty
        assert_eq!(names, vec![None, None]);
        assert!(!shape.has_tuple_names());
    }

    #[test]
    fn test_nullable_flags_pre_order() {
        // Dictionary<string!, string?> with the dictionary itself not-annotated
        let shape = TypeShape::Named {
            namespace: "System.Collections.Generic".to_string(),
            name: "Dictionary".to_string(),
            is_value_type: false,
            args: vec![
                string_annotated(NullableAnnotation::NotAnnotated),
                string_annotated(NullableAnnotation::Annotated),
            ],
            annotation: NullableAnnotation::NotAnnotated,
        };

        let mut flags = Vec::new();
        shape.collect_nullable_flags(&mut flags);
        assert_eq!(flags, vec![1, 1, 2]);
        assert!(shape.has_nullable_annotations());
    }

    #[test]
    fn test_value_types_flag_as_oblivious() {
        let shape = TypeShape::tuple(vec![
            TupleElement::unnamed(int()),
            TupleElement::unnamed(string_annotated(NullableAnnotation::Annotated)),
        ]);

        let mut flags = Vec::new();
        shape.collect_nullable_flags(&mut flags);
        // tuple node, int node, string node
        assert_eq!(flags, vec![0, 0, 2]);
    }

    #[test]
    fn test_array_walks_element() {
        let shape = TypeShape::Array {
            element: Box::new(string_annotated(NullableAnnotation::Annotated)),
            annotation: NullableAnnotation::NotAnnotated,
        };

        let mut flags = Vec::new();
        shape.collect_nullable_flags(&mut flags);
        assert_eq!(flags, vec![1, 2]);
    }

    #[test]
    fn test_oblivious_shape_has_no_annotations() {
        let shape = TypeShape::Array {
            element: Box::new(int()),
            annotation: NullableAnnotation::Oblivious,
        };
        assert!(!shape.has_nullable_annotations());
    }

    #[test]
    fn test_value_ness() {
        assert!(int().is_value_type());
        assert!(!TypeShape::primitive(PrimitiveKind::String).is_value_type());
        assert!(!TypeShape::named("System", "Exception").is_value_type());
        assert!(TypeShape::tuple(vec![
            TupleElement::unnamed(int()),
            TupleElement::unnamed(int())
        ])
        .is_value_type());
    }
}
