//! Lazy synthesis of reserved attribute definitions.
//!
//! When emission needs a reserved attribute the engine resolves one definition
//! per (assembly, kind) and memoizes the outcome, so any number of uses share a
//! single type. Resolution prefers a recognized source declaration, then a
//! definition exported by a referenced assembly, and only then generates a
//! minimal internal definition of its own. Generated definitions are embedded:
//! sealed, internal, marked with `EmbeddedAttribute` and
//! `CompilerGeneratedAttribute`, and invisible to referencing compilations.
//! The embedded marker type marks itself.
//!
//! Two situations are unrecoverable: a type forwarder for the same name (the
//! primary module cannot also declare the type) and a netmodule output (which
//! cannot host definitions of its own).

use std::sync::OnceLock;

use strum::{EnumCount, IntoEnumIterator};

use crate::{
    metadata::{
        diagnostics::{DiagnosticCode, Diagnostics, Location},
        options::CompilationOptions,
        symbols::{
            assembly::{Assembly, ReferencedAssembly, ReferencedType},
            attrs::{AttributeApplication, AttributeSite},
            types::{Accessibility, BaseTypeRef, CtorDecl, TypeDecl, TypeDeclRc, TypeKind, TypePart},
        },
        wellknown::descriptor::{
            CtorShape, WellKnownAttribute, COMPILER_SERVICES_NAMESPACE, EMBEDDED_NAMESPACE,
        },
    },
    Result,
};

/// The resolved identity of one reserved attribute kind within a compilation.
#[derive(Debug, Clone)]
pub enum ResolvedAttributeIdentity {
    /// A recognized source declaration is reused
    UserDefined(TypeDeclRc),
    /// A definition exported by a referenced assembly is reused
    Referenced {
        /// Simple name of the providing assembly
        assembly: String,
        /// Full name of the attribute type
        fullname: String,
    },
    /// The engine generated an embedded definition
    Synthesized(TypeDeclRc),
    /// No definition can be produced; the code that blocked it was reported
    Unavailable(DiagnosticCode),
}

impl ResolvedAttributeIdentity {
    /// Returns true when a definition exists to instantiate
    #[must_use]
    pub fn is_usable(&self) -> bool {
        !matches!(self, ResolvedAttributeIdentity::Unavailable(_))
    }

    /// The in-assembly declaration, when one exists
    #[must_use]
    pub fn definition(&self) -> Option<&TypeDeclRc> {
        match self {
            ResolvedAttributeIdentity::UserDefined(decl)
            | ResolvedAttributeIdentity::Synthesized(decl) => Some(decl),
            _ => None,
        }
    }
}

/// Everything resolution consults, borrowed from the compilation.
pub struct SynthesisContext<'a> {
    /// The assembly being compiled
    pub assembly: &'a Assembly,
    /// Referenced assemblies, in reference order
    pub references: &'a [ReferencedAssembly],
    /// Compilation options (output kind gates synthesis)
    pub options: &'a CompilationOptions,
    /// Diagnostic sink
    pub diagnostics: &'a Diagnostics,
}

/// Memoized resolver for reserved attribute definitions.
///
/// One engine lives per compilation. Outcomes are latched per kind, so
/// repeated queries are idempotent and N uses of an attribute reference one
/// definition. Queries run on the emission path, which walks declarations
/// sequentially; the latches make later concurrent reads safe.
pub struct SynthesisEngine {
    memo: [OnceLock<ResolvedAttributeIdentity>; WellKnownAttribute::COUNT],
}

impl SynthesisEngine {
    /// Creates an engine with no resolutions latched.
    #[must_use]
    pub fn new() -> Self {
        SynthesisEngine {
            memo: std::array::from_fn(|_| OnceLock::new()),
        }
    }

    /// Resolves the definition for a kind, synthesizing it on first need.
    ///
    /// User-facing failures (missing constructors, forwarder conflicts, the
    /// netmodule gate) latch [`ResolvedAttributeIdentity::Unavailable`] and
    /// report through the context's sink.
    ///
    /// # Errors
    /// Returns an error only for malformed declaration graphs, such as a token
    /// collision while registering a generated type.
    pub fn get_or_synthesize(
        &self,
        kind: WellKnownAttribute,
        ctx: &SynthesisContext<'_>,
    ) -> Result<ResolvedAttributeIdentity> {
        if let Some(resolved) = self.memo[kind as usize].get() {
            return Ok(resolved.clone());
        }
        let resolved = self.resolve(kind, ctx)?;
        Ok(self.memo[kind as usize]
            .get_or_init(|| resolved)
            .clone())
    }

    /// The latched resolution for a kind, if any query ran.
    #[must_use]
    pub fn resolved(&self, kind: WellKnownAttribute) -> Option<ResolvedAttributeIdentity> {
        self.memo[kind as usize].get().cloned()
    }

    /// All definitions generated by this engine, in registry order.
    #[must_use]
    pub fn synthesized_types(&self) -> Vec<TypeDeclRc> {
        WellKnownAttribute::iter()
            .filter_map(|kind| match self.memo[kind as usize].get() {
                Some(ResolvedAttributeIdentity::Synthesized(decl)) => Some(decl.clone()),
                _ => None,
            })
            .collect()
    }

    fn resolve(
        &self,
        kind: WellKnownAttribute,
        ctx: &SynthesisContext<'_>,
    ) -> Result<ResolvedAttributeIdentity> {
        let fullname = kind.full_name();

        if let Some(decl) = ctx.assembly.get_by_name(&fullname, 0) {
            if decl.is_recognized() {
                return Ok(Self::reuse_source(kind, &decl, ctx));
            }
            if decl.access == Accessibility::Public {
                // an exported identity cannot be shadowed by a generated copy
                ctx.diagnostics.report(
                    DiagnosticCode::MissingCompilerRequiredMember,
                    decl.location(),
                    format!("Missing compiler required member '{fullname}..ctor'"),
                );
                return Ok(ResolvedAttributeIdentity::Unavailable(
                    DiagnosticCode::MissingCompilerRequiredMember,
                ));
            }
            // an unrecognized internal declaration stays a plain type; the
            // compiler emits its own copy alongside it
        }

        for reference in ctx.references {
            if let Some(exported) = reference.find(&fullname, 0) {
                return Ok(Self::reuse_reference(kind, reference, &exported, ctx));
            }
        }

        self.synthesize(kind, ctx)
    }

    fn reuse_source(
        kind: WellKnownAttribute,
        decl: &TypeDeclRc,
        ctx: &SynthesisContext<'_>,
    ) -> ResolvedAttributeIdentity {
        for shape in kind.descriptor().ctors {
            let satisfied = match shape {
                CtorShape::Parameterless => decl.has_accessible_parameterless_ctor(),
                _ => decl.ctor_signatures().any(|ctor| {
                    ctor.access != Accessibility::Private && shape.matches(&ctor.params)
                }),
            };
            if !satisfied {
                ctx.diagnostics.report(
                    DiagnosticCode::MissingCompilerRequiredMember,
                    decl.location(),
                    format!("Missing compiler required member '{}..ctor'", decl.fullname()),
                );
                return ResolvedAttributeIdentity::Unavailable(
                    DiagnosticCode::MissingCompilerRequiredMember,
                );
            }
        }
        ResolvedAttributeIdentity::UserDefined(decl.clone())
    }

    fn reuse_reference(
        kind: WellKnownAttribute,
        reference: &ReferencedAssembly,
        exported: &ReferencedType,
        ctx: &SynthesisContext<'_>,
    ) -> ResolvedAttributeIdentity {
        for shape in kind.descriptor().ctors {
            let satisfied = exported
                .ctor_shapes
                .iter()
                .any(|params| shape.matches(params));
            if !satisfied {
                ctx.diagnostics.report(
                    DiagnosticCode::MissingCompilerRequiredMember,
                    Location::none(),
                    format!(
                        "Missing compiler required member '{}..ctor'",
                        exported.full_name()
                    ),
                );
                return ResolvedAttributeIdentity::Unavailable(
                    DiagnosticCode::MissingCompilerRequiredMember,
                );
            }
        }
        ResolvedAttributeIdentity::Referenced {
            assembly: reference.identity.name.clone(),
            fullname: exported.full_name(),
        }
    }

    fn synthesize(
        &self,
        kind: WellKnownAttribute,
        ctx: &SynthesisContext<'_>,
    ) -> Result<ResolvedAttributeIdentity> {
        let fullname = kind.full_name();

        if let Some(forwarder) = ctx.assembly.forwarder_for(kind.namespace(), kind.name()) {
            ctx.diagnostics.report(
                DiagnosticCode::ForwardedTypeConflict,
                forwarder.location.clone(),
                format!(
                    "Forwarded type '{fullname}' conflicts with type declared in primary module of this assembly."
                ),
            );
            return Ok(ResolvedAttributeIdentity::Unavailable(
                DiagnosticCode::ForwardedTypeConflict,
            ));
        }

        if ctx.options.output_kind.is_netmodule() {
            ctx.diagnostics.report(
                DiagnosticCode::PredefinedTypeNotFound,
                Location::none(),
                format!("Predefined type '{fullname}' is not defined or imported"),
            );
            return Ok(ResolvedAttributeIdentity::Unavailable(
                DiagnosticCode::PredefinedTypeNotFound,
            ));
        }

        // every generated definition is marked with the embedded marker, so
        // the marker itself must resolve first
        if kind != WellKnownAttribute::Embedded {
            if let ResolvedAttributeIdentity::Unavailable(code) =
                self.get_or_synthesize(WellKnownAttribute::Embedded, ctx)?
            {
                return Ok(ResolvedAttributeIdentity::Unavailable(code));
            }
        }

        let mut decl = TypeDecl::new(
            ctx.assembly.alloc_typedef_token(),
            TypeKind::Class,
            kind.namespace(),
            kind.name(),
        );
        decl.is_sealed = true;
        decl.set_base(BaseTypeRef::named("System", "Attribute"));
        decl.add_part(TypePart::new("<synthesized>", Location::none()));

        decl.add_ctor(CtorDecl::parameterless(Accessibility::Public));
        for shape in kind.descriptor().ctors {
            if *shape != CtorShape::Parameterless {
                decl.add_ctor(CtorDecl::new(Accessibility::Public, shape.param_shapes()));
            }
        }

        decl.add_attribute(AttributeApplication::new(
            EMBEDDED_NAMESPACE,
            "EmbeddedAttribute",
            AttributeSite::Type,
            Location::none(),
        ));
        decl.add_attribute(AttributeApplication::new(
            COMPILER_SERVICES_NAMESPACE,
            "CompilerGeneratedAttribute",
            AttributeSite::Type,
            Location::none(),
        ));

        let rc = ctx.assembly.register_type(decl)?;
        rc.mark_embedded();
        Ok(ResolvedAttributeIdentity::Synthesized(rc))
    }
}

impl Default for SynthesisEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{
        identity::AssemblyIdentity,
        options::OutputKind,
        symbols::{
            assembly::TypeForwarder,
            builder::TypeDeclBuilder,
            shape::{NullableAnnotation, PrimitiveKind, TypeShape},
        },
        wellknown::validator,
    };

    struct Fixture {
        assembly: Assembly,
        references: Vec<ReferencedAssembly>,
        options: CompilationOptions,
        diagnostics: Diagnostics,
    }

    impl Fixture {
        fn new() -> Self {
            Fixture {
                assembly: Assembly::new(AssemblyIdentity::new("Lib")),
                references: Vec::new(),
                options: CompilationOptions::default(),
                diagnostics: Diagnostics::new(),
            }
        }

        fn ctx(&self) -> SynthesisContext<'_> {
            SynthesisContext {
                assembly: &self.assembly,
                references: &self.references,
                options: &self.options,
                diagnostics: &self.diagnostics,
            }
        }
    }

    fn byte_array() -> TypeShape {
        TypeShape::Array {
            element: Box::new(TypeShape::primitive(PrimitiveKind::Byte)),
            annotation: NullableAnnotation::Oblivious,
        }
    }

    #[test]
    fn test_synthesis_from_nothing() {
        let fixture = Fixture::new();
        let engine = SynthesisEngine::new();

        let resolved = engine
            .get_or_synthesize(WellKnownAttribute::IsReadOnly, &fixture.ctx())
            .unwrap();

        let decl = match resolved {
            ResolvedAttributeIdentity::Synthesized(decl) => decl,
            other => panic!("expected synthesis, got {other:?}"),
        };
        assert_eq!(
            decl.fullname(),
            "System.Runtime.CompilerServices.IsReadOnlyAttribute"
        );
        assert_eq!(decl.access, Accessibility::Internal);
        assert!(decl.is_sealed);
        assert!(decl.is_embedded());
        assert!(decl.derives_from_attribute());
        assert!(decl.has_accessible_parameterless_ctor());
        assert!(decl
            .find_attribute("Microsoft.CodeAnalysis", "EmbeddedAttribute")
            .is_some());
        assert!(decl
            .find_attribute(
                "System.Runtime.CompilerServices",
                "CompilerGeneratedAttribute"
            )
            .is_some());

        // the embedded marker was pulled in as a dependency
        assert_eq!(fixture.assembly.type_count(), 2);
        assert!(fixture
            .assembly
            .get_by_name("Microsoft.CodeAnalysis.EmbeddedAttribute", 0)
            .is_some());
        assert_eq!(fixture.diagnostics.count(), 0);
    }

    #[test]
    fn test_embedded_marker_marks_itself() {
        let fixture = Fixture::new();
        let engine = SynthesisEngine::new();

        let resolved = engine
            .get_or_synthesize(WellKnownAttribute::Embedded, &fixture.ctx())
            .unwrap();

        let decl = resolved.definition().unwrap();
        assert!(decl.is_embedded());
        assert!(decl
            .find_attribute("Microsoft.CodeAnalysis", "EmbeddedAttribute")
            .is_some());
        assert_eq!(fixture.assembly.type_count(), 1);
    }

    #[test]
    fn test_memoization_yields_one_definition() {
        let fixture = Fixture::new();
        let engine = SynthesisEngine::new();

        let first = engine
            .get_or_synthesize(WellKnownAttribute::Nullable, &fixture.ctx())
            .unwrap();
        let second = engine
            .get_or_synthesize(WellKnownAttribute::Nullable, &fixture.ctx())
            .unwrap();

        let (first, second) = (first.definition().unwrap().clone(), second.definition().unwrap().clone());
        assert!(std::sync::Arc::ptr_eq(&first, &second));
        // Nullable + Embedded, nothing more on the repeat call
        assert_eq!(fixture.assembly.type_count(), 2);
    }

    #[test]
    fn test_synthesized_nullable_declares_both_ctors() {
        let fixture = Fixture::new();
        let engine = SynthesisEngine::new();

        let resolved = engine
            .get_or_synthesize(WellKnownAttribute::Nullable, &fixture.ctx())
            .unwrap();
        let decl = resolved.definition().unwrap().clone();

        assert!(decl
            .ctor_signatures()
            .any(|ctor| CtorShape::Byte.matches(&ctor.params)));
        assert!(decl
            .ctor_signatures()
            .any(|ctor| CtorShape::ByteArray.matches(&ctor.params)));
    }

    #[test]
    fn test_reuse_recognized_source_definition() {
        let fixture = Fixture::new();
        let decl = TypeDeclBuilder::class(
            &fixture.assembly,
            "System.Runtime.CompilerServices",
            "IsReadOnlyAttribute",
        )
        .sealed()
        .base("System", "Attribute")
        .build()
        .unwrap();
        assert!(validator::validate_definition(
            &decl,
            WellKnownAttribute::IsReadOnly,
            &fixture.diagnostics
        ));

        let engine = SynthesisEngine::new();
        let resolved = engine
            .get_or_synthesize(WellKnownAttribute::IsReadOnly, &fixture.ctx())
            .unwrap();

        match resolved {
            ResolvedAttributeIdentity::UserDefined(reused) => {
                assert!(std::sync::Arc::ptr_eq(&reused, &decl));
            }
            other => panic!("expected reuse, got {other:?}"),
        }
        // nothing synthesized, not even the embedded marker
        assert_eq!(fixture.assembly.type_count(), 1);
        assert!(engine.synthesized_types().is_empty());
    }

    #[test]
    fn test_reuse_missing_emission_ctor_blocks() {
        use crate::metadata::symbols::types::CtorDecl;

        let fixture = Fixture::new();
        let decl = TypeDeclBuilder::class(
            &fixture.assembly,
            "System.Runtime.CompilerServices",
            "NullableAttribute",
        )
        .sealed()
        .base("System", "Attribute")
        .ctor(Accessibility::Public, Vec::new())
        .build()
        .unwrap();
        // declares (byte) but not (byte[])
        decl.add_ctor(CtorDecl::new(
            Accessibility::Public,
            vec![TypeShape::primitive(PrimitiveKind::Byte)],
        ));
        assert!(validator::validate_definition(
            &decl,
            WellKnownAttribute::Nullable,
            &fixture.diagnostics
        ));

        let engine = SynthesisEngine::new();
        let resolved = engine
            .get_or_synthesize(WellKnownAttribute::Nullable, &fixture.ctx())
            .unwrap();

        assert!(matches!(
            resolved,
            ResolvedAttributeIdentity::Unavailable(DiagnosticCode::MissingCompilerRequiredMember)
        ));
        let entry = fixture.diagnostics.iter().next().unwrap();
        assert_eq!(entry.code, DiagnosticCode::MissingCompilerRequiredMember);
        assert!(entry.message.contains("NullableAttribute..ctor"));
    }

    #[test]
    fn test_reuse_from_reference() {
        let mut fixture = Fixture::new();
        let reference = ReferencedAssembly::new(AssemblyIdentity::new("System.Runtime"));
        reference.add_type(
            ReferencedType::new("System.Runtime.CompilerServices", "NullableAttribute")
                .with_ctor(vec![TypeShape::primitive(PrimitiveKind::Byte)])
                .with_ctor(vec![byte_array()]),
        );
        fixture.references.push(reference);

        let engine = SynthesisEngine::new();
        let resolved = engine
            .get_or_synthesize(WellKnownAttribute::Nullable, &fixture.ctx())
            .unwrap();

        match resolved {
            ResolvedAttributeIdentity::Referenced { assembly, fullname } => {
                assert_eq!(assembly, "System.Runtime");
                assert_eq!(fullname, "System.Runtime.CompilerServices.NullableAttribute");
            }
            other => panic!("expected referenced reuse, got {other:?}"),
        }
        assert_eq!(fixture.assembly.type_count(), 0);
    }

    #[test]
    fn test_reference_missing_ctor_blocks() {
        let mut fixture = Fixture::new();
        let reference = ReferencedAssembly::new(AssemblyIdentity::new("System.Runtime"));
        reference.add_type(
            ReferencedType::new("System.Runtime.CompilerServices", "NullableAttribute")
                .with_ctor(vec![TypeShape::primitive(PrimitiveKind::Byte)]),
        );
        fixture.references.push(reference);

        let engine = SynthesisEngine::new();
        let resolved = engine
            .get_or_synthesize(WellKnownAttribute::Nullable, &fixture.ctx())
            .unwrap();

        assert!(matches!(
            resolved,
            ResolvedAttributeIdentity::Unavailable(DiagnosticCode::MissingCompilerRequiredMember)
        ));
    }

    #[test]
    fn test_netmodule_cannot_synthesize() {
        let mut fixture = Fixture::new();
        fixture.options = CompilationOptions::netmodule();

        let engine = SynthesisEngine::new();
        let resolved = engine
            .get_or_synthesize(WellKnownAttribute::IsUnmanaged, &fixture.ctx())
            .unwrap();

        assert!(matches!(
            resolved,
            ResolvedAttributeIdentity::Unavailable(DiagnosticCode::PredefinedTypeNotFound)
        ));
        assert_eq!(fixture.assembly.type_count(), 0);
        let entry = fixture.diagnostics.iter().next().unwrap();
        assert_eq!(entry.code, DiagnosticCode::PredefinedTypeNotFound);
        assert!(entry
            .message
            .contains("System.Runtime.CompilerServices.IsUnmanagedAttribute"));
    }

    #[test]
    fn test_netmodule_reuses_reference() {
        let mut fixture = Fixture::new();
        fixture.options = CompilationOptions::netmodule();
        let reference = ReferencedAssembly::new(AssemblyIdentity::new("System.Runtime"));
        reference.add_type(
            ReferencedType::new("System.Runtime.CompilerServices", "IsUnmanagedAttribute")
                .with_ctor(Vec::new()),
        );
        fixture.references.push(reference);

        let engine = SynthesisEngine::new();
        let resolved = engine
            .get_or_synthesize(WellKnownAttribute::IsUnmanaged, &fixture.ctx())
            .unwrap();

        assert!(matches!(
            resolved,
            ResolvedAttributeIdentity::Referenced { .. }
        ));
        assert_eq!(fixture.diagnostics.count(), 0);
    }

    #[test]
    fn test_forwarder_conflict_is_fatal() {
        let fixture = Fixture::new();
        fixture.assembly.add_forwarder(TypeForwarder::new(
            "System.Runtime.CompilerServices",
            "IsReadOnlyAttribute",
            "System.Runtime",
        ));

        let engine = SynthesisEngine::new();
        let resolved = engine
            .get_or_synthesize(WellKnownAttribute::IsReadOnly, &fixture.ctx())
            .unwrap();

        assert!(matches!(
            resolved,
            ResolvedAttributeIdentity::Unavailable(DiagnosticCode::ForwardedTypeConflict)
        ));
        let entry = fixture.diagnostics.iter().next().unwrap();
        assert_eq!(entry.code, DiagnosticCode::ForwardedTypeConflict);
        assert!(entry.message.contains("conflicts with type declared"));
        assert_eq!(fixture.assembly.type_count(), 0);
    }

    #[test]
    fn test_public_invalid_definition_blocks() {
        let fixture = Fixture::new();
        // public and not sealed: fails validation, and being public it cannot
        // be shadowed by a generated copy
        TypeDeclBuilder::class(
            &fixture.assembly,
            "System.Runtime.CompilerServices",
            "IsReadOnlyAttribute",
        )
        .public()
        .base("System", "Attribute")
        .build()
        .unwrap();

        let engine = SynthesisEngine::new();
        let resolved = engine
            .get_or_synthesize(WellKnownAttribute::IsReadOnly, &fixture.ctx())
            .unwrap();

        assert!(matches!(
            resolved,
            ResolvedAttributeIdentity::Unavailable(DiagnosticCode::MissingCompilerRequiredMember)
        ));
        assert_eq!(fixture.assembly.type_count(), 1);
    }

    #[test]
    fn test_internal_invalid_definition_is_shadowed() {
        let fixture = Fixture::new();
        // internal and not sealed: fails validation, compiler emits its own
        TypeDeclBuilder::class(
            &fixture.assembly,
            "System.Runtime.CompilerServices",
            "IsReadOnlyAttribute",
        )
        .base("System", "Attribute")
        .build()
        .unwrap();

        let engine = SynthesisEngine::new();
        let resolved = engine
            .get_or_synthesize(WellKnownAttribute::IsReadOnly, &fixture.ctx())
            .unwrap();

        assert!(matches!(
            resolved,
            ResolvedAttributeIdentity::Synthesized(_)
        ));
        // user type + synthesized copy + embedded marker
        assert_eq!(fixture.assembly.type_count(), 3);
    }

    #[test]
    fn test_generic_homonym_coexists() {
        let fixture = Fixture::new();
        TypeDeclBuilder::class(
            &fixture.assembly,
            "System.Runtime.CompilerServices",
            "IsReadOnlyAttribute",
        )
        .arity(1)
        .build()
        .unwrap();

        let engine = SynthesisEngine::new();
        let resolved = engine
            .get_or_synthesize(WellKnownAttribute::IsReadOnly, &fixture.ctx())
            .unwrap();

        assert!(matches!(
            resolved,
            ResolvedAttributeIdentity::Synthesized(_)
        ));
        // the generic user type is untouched
        assert_eq!(
            fixture
                .assembly
                .get_by_name("System.Runtime.CompilerServices.IsReadOnlyAttribute", 1)
                .unwrap()
                .arity,
            1
        );
    }
}
