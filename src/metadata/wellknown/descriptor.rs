//! Static registry of compiler-reserved attribute kinds.
//!
//! The registry is a fixed, process-wide table: every kind the compiler may
//! recognize, reuse, or synthesize is listed here with its qualified name,
//! accessibility requirement, the targets the compiler decorates, and the
//! constructor shapes the emitter calls. Lookup is pure and lock-free; nothing
//! in this module mutates.

use strum::IntoEnumIterator;

use crate::metadata::symbols::{attrs::AttributeTargets, shape::{PrimitiveKind, TypeShape}};

/// The namespace most reserved attributes live in
pub const COMPILER_SERVICES_NAMESPACE: &str = "System.Runtime.CompilerServices";
/// The namespace of the embedded marker attribute
pub const EMBEDDED_NAMESPACE: &str = "Microsoft.CodeAnalysis";

/// The attribute kinds the compiler recognizes and can synthesize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumCount, strum::EnumIter)]
pub enum WellKnownAttribute {
    /// `Microsoft.CodeAnalysis.EmbeddedAttribute` - marks compiler-private types
    Embedded,
    /// `System.Runtime.CompilerServices.IsReadOnlyAttribute`
    IsReadOnly,
    /// `System.Runtime.CompilerServices.IsUnmanagedAttribute`
    IsUnmanaged,
    /// `System.Runtime.CompilerServices.IsByRefLikeAttribute`
    IsByRefLike,
    /// `System.Runtime.CompilerServices.NullablePublicOnlyAttribute`
    NullablePublicOnly,
    /// `System.Runtime.CompilerServices.NullableAttribute`
    Nullable,
    /// `System.Runtime.CompilerServices.NullableContextAttribute`
    NullableContext,
    /// `System.Runtime.CompilerServices.TupleElementNamesAttribute`
    TupleElementNames,
    /// `System.Runtime.CompilerServices.RefSafetyRulesAttribute`
    RefSafetyRules,
}

/// Constructor shapes the emitter instantiates reserved attributes with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CtorShape {
    /// `()`
    Parameterless,
    /// `(bool)`
    Bool,
    /// `(byte)`
    Byte,
    /// `(byte[])`
    ByteArray,
    /// `(int)`
    Int32,
    /// `(string[])`
    StringArray,
}

impl CtorShape {
    /// Returns true when the given parameter shapes match this constructor
    #[must_use]
    pub fn matches(&self, params: &[TypeShape]) -> bool {
        match self {
            CtorShape::Parameterless => params.is_empty(),
            CtorShape::Bool => Self::single_primitive(params, PrimitiveKind::Bool),
            CtorShape::Byte => Self::single_primitive(params, PrimitiveKind::Byte),
            CtorShape::Int32 => Self::single_primitive(params, PrimitiveKind::Int32),
            CtorShape::ByteArray => Self::single_array_of(params, PrimitiveKind::Byte),
            CtorShape::StringArray => Self::single_array_of(params, PrimitiveKind::String),
        }
    }

    fn single_primitive(params: &[TypeShape], kind: PrimitiveKind) -> bool {
        matches!(params, [TypeShape::Primitive { kind: k, .. }] if *k == kind)
    }

    fn single_array_of(params: &[TypeShape], kind: PrimitiveKind) -> bool {
        match params {
            [TypeShape::Array { element, .. }] => {
                matches!(element.as_ref(), TypeShape::Primitive { kind: k, .. } if *k == kind)
            }
            _ => false,
        }
    }

    /// The parameter shapes of this constructor, for synthesis.
    #[must_use]
    pub fn param_shapes(&self) -> Vec<TypeShape> {
        match self {
            CtorShape::Parameterless => Vec::new(),
            CtorShape::Bool => vec![TypeShape::primitive(PrimitiveKind::Bool)],
            CtorShape::Byte => vec![TypeShape::primitive(PrimitiveKind::Byte)],
            CtorShape::Int32 => vec![TypeShape::primitive(PrimitiveKind::Int32)],
            CtorShape::ByteArray => vec![TypeShape::Array {
                element: Box::new(TypeShape::primitive(PrimitiveKind::Byte)),
                annotation: crate::metadata::symbols::shape::NullableAnnotation::Oblivious,
            }],
            CtorShape::StringArray => vec![TypeShape::Array {
                element: Box::new(TypeShape::primitive(PrimitiveKind::String)),
                annotation: crate::metadata::symbols::shape::NullableAnnotation::Oblivious,
            }],
        }
    }

    /// Human-readable signature, used in diagnostics and tests
    #[must_use]
    pub fn describe(&self) -> &'static str {
        match self {
            CtorShape::Parameterless => "()",
            CtorShape::Bool => "(bool)",
            CtorShape::Byte => "(byte)",
            CtorShape::ByteArray => "(byte[])",
            CtorShape::Int32 => "(int)",
            CtorShape::StringArray => "(string[])",
        }
    }
}

/// Everything the compiler knows about one reserved attribute kind.
#[derive(Debug)]
pub struct WellKnownDescriptor {
    /// The kind this descriptor belongs to
    pub kind: WellKnownAttribute,
    /// Namespace of the attribute type
    pub namespace: &'static str,
    /// Simple name of the attribute type
    pub name: &'static str,
    /// Whether a public user definition is acceptable
    pub allows_public: bool,
    /// Whether explicit application in source is rejected
    pub guarded: bool,
    /// Targets the compiler decorates with this attribute
    pub targets: AttributeTargets,
    /// Constructor shapes the emitter calls, all of which a synthesized
    /// definition declares
    pub ctors: &'static [CtorShape],
}

static EMBEDDED: WellKnownDescriptor = WellKnownDescriptor {
    kind: WellKnownAttribute::Embedded,
    namespace: EMBEDDED_NAMESPACE,
    name: "EmbeddedAttribute",
    allows_public: false,
    guarded: false,
    targets: AttributeTargets::CLASS,
    ctors: &[CtorShape::Parameterless],
};

static IS_READ_ONLY: WellKnownDescriptor = WellKnownDescriptor {
    kind: WellKnownAttribute::IsReadOnly,
    namespace: COMPILER_SERVICES_NAMESPACE,
    name: "IsReadOnlyAttribute",
    allows_public: true,
    guarded: true,
    targets: AttributeTargets::STRUCT
        .union(AttributeTargets::METHOD)
        .union(AttributeTargets::PROPERTY)
        .union(AttributeTargets::PARAMETER)
        .union(AttributeTargets::RETURN_VALUE),
    ctors: &[CtorShape::Parameterless],
};

static IS_UNMANAGED: WellKnownDescriptor = WellKnownDescriptor {
    kind: WellKnownAttribute::IsUnmanaged,
    namespace: COMPILER_SERVICES_NAMESPACE,
    name: "IsUnmanagedAttribute",
    allows_public: true,
    guarded: true,
    targets: AttributeTargets::GENERIC_PARAMETER,
    ctors: &[CtorShape::Parameterless],
};

static IS_BY_REF_LIKE: WellKnownDescriptor = WellKnownDescriptor {
    kind: WellKnownAttribute::IsByRefLike,
    namespace: COMPILER_SERVICES_NAMESPACE,
    name: "IsByRefLikeAttribute",
    allows_public: true,
    guarded: true,
    targets: AttributeTargets::STRUCT,
    ctors: &[CtorShape::Parameterless],
};

static NULLABLE_PUBLIC_ONLY: WellKnownDescriptor = WellKnownDescriptor {
    kind: WellKnownAttribute::NullablePublicOnly,
    namespace: COMPILER_SERVICES_NAMESPACE,
    name: "NullablePublicOnlyAttribute",
    allows_public: true,
    guarded: true,
    targets: AttributeTargets::MODULE,
    ctors: &[CtorShape::Bool],
};

static NULLABLE: WellKnownDescriptor = WellKnownDescriptor {
    kind: WellKnownAttribute::Nullable,
    namespace: COMPILER_SERVICES_NAMESPACE,
    name: "NullableAttribute",
    allows_public: true,
    guarded: true,
    targets: AttributeTargets::CLASS
        .union(AttributeTargets::EVENT)
        .union(AttributeTargets::FIELD)
        .union(AttributeTargets::GENERIC_PARAMETER)
        .union(AttributeTargets::PARAMETER)
        .union(AttributeTargets::PROPERTY)
        .union(AttributeTargets::RETURN_VALUE),
    ctors: &[CtorShape::Byte, CtorShape::ByteArray],
};

static NULLABLE_CONTEXT: WellKnownDescriptor = WellKnownDescriptor {
    kind: WellKnownAttribute::NullableContext,
    namespace: COMPILER_SERVICES_NAMESPACE,
    name: "NullableContextAttribute",
    allows_public: true,
    guarded: true,
    targets: AttributeTargets::MODULE
        .union(AttributeTargets::CLASS)
        .union(AttributeTargets::DELEGATE)
        .union(AttributeTargets::INTERFACE)
        .union(AttributeTargets::METHOD)
        .union(AttributeTargets::STRUCT),
    ctors: &[CtorShape::Byte],
};

static TUPLE_ELEMENT_NAMES: WellKnownDescriptor = WellKnownDescriptor {
    kind: WellKnownAttribute::TupleElementNames,
    namespace: COMPILER_SERVICES_NAMESPACE,
    name: "TupleElementNamesAttribute",
    allows_public: true,
    guarded: true,
    targets: AttributeTargets::CLASS
        .union(AttributeTargets::STRUCT)
        .union(AttributeTargets::EVENT)
        .union(AttributeTargets::FIELD)
        .union(AttributeTargets::PARAMETER)
        .union(AttributeTargets::PROPERTY)
        .union(AttributeTargets::RETURN_VALUE),
    ctors: &[CtorShape::StringArray],
};

static REF_SAFETY_RULES: WellKnownDescriptor = WellKnownDescriptor {
    kind: WellKnownAttribute::RefSafetyRules,
    namespace: COMPILER_SERVICES_NAMESPACE,
    name: "RefSafetyRulesAttribute",
    allows_public: true,
    guarded: true,
    targets: AttributeTargets::MODULE,
    ctors: &[CtorShape::Int32],
};

impl WellKnownAttribute {
    /// Returns the static descriptor for this kind.
    #[must_use]
    pub fn descriptor(&self) -> &'static WellKnownDescriptor {
        match self {
            WellKnownAttribute::Embedded => &EMBEDDED,
            WellKnownAttribute::IsReadOnly => &IS_READ_ONLY,
            WellKnownAttribute::IsUnmanaged => &IS_UNMANAGED,
            WellKnownAttribute::IsByRefLike => &IS_BY_REF_LIKE,
            WellKnownAttribute::NullablePublicOnly => &NULLABLE_PUBLIC_ONLY,
            WellKnownAttribute::Nullable => &NULLABLE,
            WellKnownAttribute::NullableContext => &NULLABLE_CONTEXT,
            WellKnownAttribute::TupleElementNames => &TUPLE_ELEMENT_NAMES,
            WellKnownAttribute::RefSafetyRules => &REF_SAFETY_RULES,
        }
    }

    /// Looks a kind up by namespace and simple name.
    ///
    /// Returns `None` for any name outside the registry; matching is
    /// case-sensitive, as type identity in metadata is.
    #[must_use]
    pub fn from_full_name(namespace: &str, name: &str) -> Option<WellKnownAttribute> {
        Self::iter().find(|kind| {
            let descriptor = kind.descriptor();
            descriptor.namespace == namespace && descriptor.name == name
        })
    }

    /// Namespace of this kind's attribute type
    #[must_use]
    pub fn namespace(&self) -> &'static str {
        self.descriptor().namespace
    }

    /// Simple name of this kind's attribute type
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.descriptor().name
    }

    /// Full name of this kind's attribute type
    #[must_use]
    pub fn full_name(&self) -> String {
        let descriptor = self.descriptor();
        format!("{}.{}", descriptor.namespace, descriptor.name)
    }

    /// Returns true when explicit application in source is rejected
    #[must_use]
    pub fn is_guarded(&self) -> bool {
        self.descriptor().guarded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use strum::EnumCount;

    #[test]
    fn test_registry_is_complete() {
        assert_eq!(WellKnownAttribute::COUNT, 9);
        let names: HashSet<String> = WellKnownAttribute::iter()
            .map(|kind| kind.full_name())
            .collect();
        assert_eq!(names.len(), WellKnownAttribute::COUNT);
    }

    #[test]
    fn test_descriptor_kind_matches() {
        for kind in WellKnownAttribute::iter() {
            assert_eq!(kind.descriptor().kind, kind);
            assert!(!kind.descriptor().ctors.is_empty());
        }
    }

    #[test]
    fn test_lookup_by_full_name() {
        assert_eq!(
            WellKnownAttribute::from_full_name(
                "System.Runtime.CompilerServices",
                "NullableAttribute"
            ),
            Some(WellKnownAttribute::Nullable)
        );
        assert_eq!(
            WellKnownAttribute::from_full_name("Microsoft.CodeAnalysis", "EmbeddedAttribute"),
            Some(WellKnownAttribute::Embedded)
        );
        assert_eq!(
            WellKnownAttribute::from_full_name("System", "ObsoleteAttribute"),
            None
        );
        // matching is case-sensitive
        assert_eq!(
            WellKnownAttribute::from_full_name(
                "System.Runtime.CompilerServices",
                "nullableattribute"
            ),
            None
        );
    }

    #[test]
    fn test_guard_exemption() {
        assert!(!WellKnownAttribute::Embedded.is_guarded());
        for kind in WellKnownAttribute::iter().filter(|k| *k != WellKnownAttribute::Embedded) {
            assert!(kind.is_guarded(), "{} must be guarded", kind.full_name());
        }
    }

    #[test]
    fn test_ctor_shape_matching() {
        use crate::metadata::symbols::shape::{NullableAnnotation, PrimitiveKind, TypeShape};

        assert!(CtorShape::Parameterless.matches(&[]));
        assert!(!CtorShape::Parameterless.matches(&[TypeShape::primitive(PrimitiveKind::Bool)]));

        assert!(CtorShape::Byte.matches(&[TypeShape::primitive(PrimitiveKind::Byte)]));
        assert!(!CtorShape::Byte.matches(&[TypeShape::primitive(PrimitiveKind::Int32)]));

        let byte_array = TypeShape::Array {
            element: Box::new(TypeShape::primitive(PrimitiveKind::Byte)),
            annotation: NullableAnnotation::Oblivious,
        };
        assert!(CtorShape::ByteArray.matches(std::slice::from_ref(&byte_array)));
        assert!(!CtorShape::StringArray.matches(&[byte_array]));

        let string_array = TypeShape::Array {
            element: Box::new(TypeShape::primitive(PrimitiveKind::String)),
            annotation: NullableAnnotation::Oblivious,
        };
        assert!(CtorShape::StringArray.matches(&[string_array]));
    }

    #[test]
    fn test_ctor_shapes_round_trip_through_param_shapes() {
        for shape in [
            CtorShape::Parameterless,
            CtorShape::Bool,
            CtorShape::Byte,
            CtorShape::ByteArray,
            CtorShape::Int32,
            CtorShape::StringArray,
        ] {
            assert!(shape.matches(&shape.param_shapes()), "{}", shape.describe());
        }
    }

    #[test]
    fn test_nullable_has_both_emission_ctors() {
        let ctors = WellKnownAttribute::Nullable.descriptor().ctors;
        assert!(ctors.contains(&CtorShape::Byte));
        assert!(ctors.contains(&CtorShape::ByteArray));
    }
}
