//! Compilation facade: checking passes and metadata record production.
//!
//! This module provides [`Compilation`], the entry point that ties the
//! subsystems of this crate together. A host compiler builds an [`Assembly`]
//! from its bound declarations, wraps it in a `Compilation`, and receives
//! back the metadata records this crate owns: layout table rows, reserved
//! attribute applications, and any attribute definitions that had to be
//! generated along the way.
//!
//! # Architecture
//!
//! Work happens in two phases, both idempotent:
//!
//! - [`Compilation::check`] runs the declaration-side passes once: shape
//!   validation of user declarations occupying reserved attribute names,
//!   the guard over explicit reserved-attribute applications, and the layout
//!   decision for every type. All findings accumulate in the diagnostic sink;
//!   nothing stops at the first problem.
//! - [`Compilation::emit`] scans declarations for the facts that must be
//!   expressed as reserved attributes (`in` parameters, `ref` structs, tuple
//!   element names, nullable annotations on the public surface), resolves one
//!   definition per needed attribute kind through the [`SynthesisEngine`],
//!   and produces the table rows. Emission refuses to produce records while
//!   error diagnostics are present.
//!
//! # Usage Examples
//!
//! ```rust
//! use cilforge::metadata::{
//!     compilation::Compilation,
//!     identity::AssemblyIdentity,
//!     options::CompilationOptions,
//!     symbols::{assembly::Assembly, builder::TypeDeclBuilder},
//! };
//!
//! # fn main() -> cilforge::Result<()> {
//! let assembly = Assembly::new(AssemblyIdentity::new("Lib"));
//! TypeDeclBuilder::value_type(&assembly, "Interop", "Handle")
//!     .ref_like()
//!     .build()?;
//!
//! let compilation = Compilation::new(assembly, CompilationOptions::default());
//! let metadata = compilation.emit()?;
//!
//! // the ref struct forced the by-ref-like marker into existence
//! assert!(!metadata.synthesized_types.is_empty());
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! `Compilation` shares itself by reference once construction is done: every
//! pass takes `&self`, outcomes latch onto the declarations, and the
//! diagnostic sink is append-only. The layout pass distributes independent
//! per-type decisions across cores with [`rayon`] when
//! [`CompilationOptions::parallel_checks`] is set, collecting findings locally
//! so the shared sink keeps declaration order.

use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;

use crate::{
    metadata::{
        diagnostics::Diagnostics,
        emit::{
            blob::{encode_attribute_blob, CaValue},
            tables::{
                type_flags, ClassLayoutRow, CustomAttributeRow, FieldLayoutRow,
                SynthesizedTypeRow,
            },
        },
        layout::{compute_layout, TypeLayout},
        options::CompilationOptions,
        symbols::{
            assembly::{Assembly, ReferencedAssembly},
            members::RefKind,
            shape::TypeShape,
            types::TypeDeclRc,
        },
        token::Token,
        wellknown::{
            scan_assembly, validate_definition, ResolvedAttributeIdentity, SynthesisContext,
            SynthesisEngine, WellKnownAttribute, COMPILER_SERVICES_NAMESPACE,
        },
    },
    Result,
};

/// Rule-set version recorded in `RefSafetyRulesAttribute`; 11 is the revision
/// that introduced `ref` fields and the current lifetime defaults.
const REF_SAFETY_RULES_VERSION: i32 = 11;

/// The metadata records this crate contributes to the emitted module.
///
/// Everything is expressed as ready-made table rows; the host compiler merges
/// them into the tables it writes. Token references point at the host's own
/// declarations except for [`EmittedMetadata::synthesized_types`], whose
/// tokens were freshly allocated during synthesis.
#[derive(Debug, Default)]
pub struct EmittedMetadata {
    /// TypeDef rows for attribute definitions the synthesis engine generated
    pub synthesized_types: Vec<SynthesizedTypeRow>,
    /// ClassLayout rows (table 0x0F), one per type with declared packing or size
    pub class_layouts: Vec<ClassLayoutRow>,
    /// FieldLayout rows (table 0x10) for fields of explicit-layout types
    pub field_layouts: Vec<FieldLayoutRow>,
    /// CustomAttribute rows (table 0x0C) applied by the compiler
    pub custom_attributes: Vec<CustomAttributeRow>,
}

/// One compilation of an assembly, from checked declarations to table rows.
///
/// The struct owns the assembly under compilation, the resolved references,
/// the diagnostic sink, and the synthesis engine whose latches guarantee one
/// definition per reserved attribute kind no matter how many uses appear.
pub struct Compilation {
    /// The assembly being compiled
    pub assembly: Assembly,
    references: Vec<ReferencedAssembly>,
    options: CompilationOptions,
    diagnostics: Diagnostics,
    engine: SynthesisEngine,
    checked: AtomicBool,
}

impl Compilation {
    /// Creates a compilation over an assembly with the given options.
    #[must_use]
    pub fn new(assembly: Assembly, options: CompilationOptions) -> Self {
        Compilation {
            assembly,
            references: Vec::new(),
            options,
            diagnostics: Diagnostics::new(),
            engine: SynthesisEngine::new(),
            checked: AtomicBool::new(false),
        }
    }

    /// Adds a referenced assembly; reference order is probe order during
    /// attribute reuse.
    pub fn add_reference(&mut self, reference: ReferencedAssembly) {
        self.references.push(reference);
    }

    /// The diagnostic sink of this compilation
    #[must_use]
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// The options this compilation runs under
    #[must_use]
    pub fn options(&self) -> &CompilationOptions {
        &self.options
    }

    /// The synthesis engine, for inspecting latched resolutions
    #[must_use]
    pub fn synthesis(&self) -> &SynthesisEngine {
        &self.engine
    }

    /// Runs the declaration-side checking passes.
    ///
    /// The first call validates reserved-name declarations, guards explicit
    /// reserved-attribute applications, and decides every type's layout.
    /// Later calls return immediately; all outcomes latched on the first run.
    pub fn check(&self) {
        if self.checked.swap(true, Ordering::AcqRel) {
            return;
        }
        self.recognize_reserved_definitions();
        scan_assembly(&self.assembly, &self.diagnostics);
        self.decide_layouts();
    }

    /// Resolves the definition for a reserved attribute kind, failing hard
    /// when this compilation cannot provide one.
    ///
    /// Unlike the emission path, which skips applications of unavailable
    /// kinds and reports through diagnostics, this surfaces unavailability to
    /// the caller directly.
    ///
    /// # Errors
    /// Returns [`crate::Error::AttributeUnavailable`] when resolution landed
    /// in a terminal unavailable state; the blocking diagnostic is already in
    /// the sink. Graph-level failures propagate as their own errors.
    pub fn require(&self, kind: WellKnownAttribute) -> Result<ResolvedAttributeIdentity> {
        let resolved = self.engine.get_or_synthesize(kind, &self.context())?;
        if resolved.is_usable() {
            Ok(resolved)
        } else {
            Err(crate::Error::AttributeUnavailable(kind.full_name()))
        }
    }

    /// Produces the metadata records for this compilation.
    ///
    /// Runs [`Compilation::check`] first if the caller has not. The scan and
    /// all resolutions run to completion even when problems surface, so the
    /// sink ends up with the full picture before the error gate.
    ///
    /// # Errors
    /// Returns [`crate::Error::EmitBlocked`] when the sink holds any
    /// error-severity diagnostic once all passes have run. Graph-level
    /// failures, such as a token collision while registering a generated
    /// type, propagate as their own errors.
    pub fn emit(&self) -> Result<EmittedMetadata> {
        self.check();

        let mut custom_attributes = Vec::new();
        self.apply_reserved_attributes(&mut custom_attributes)?;

        let mut class_layouts = Vec::new();
        let mut field_layouts = Vec::new();
        for decl in self.assembly.types() {
            let descriptor = compute_layout(&decl, &self.options, &self.diagnostics);
            if let Some(row) = ClassLayoutRow::from_descriptor(decl.token, &descriptor) {
                class_layouts.push(row);
            }
            field_layouts.extend(FieldLayoutRow::rows_from_descriptor(&descriptor));
            // extended layout has no numeric encoding; it travels as an
            // attribute the consuming runtime interprets
            if let TypeLayout::Extended(kind) = descriptor.layout {
                custom_attributes.push(CustomAttributeRow::new(
                    decl.token,
                    COMPILER_SERVICES_NAMESPACE,
                    "ExtendedLayoutAttribute",
                    encode_attribute_blob(&[CaValue::Int32(kind.as_i32())])?,
                ));
            }
        }

        let mut synthesized_types = Vec::new();
        for decl in self.engine.synthesized_types() {
            let descriptor = compute_layout(&decl, &self.options, &self.diagnostics);
            synthesized_types.push(SynthesizedTypeRow {
                token: decl.token,
                namespace: decl.namespace.clone(),
                name: decl.name.clone(),
                flags: type_flags(&decl, &descriptor),
            });
            // the markers recorded on a generated definition (embedded,
            // compiler-generated) are all parameterless
            for (_, application) in decl.attributes.iter() {
                custom_attributes.push(CustomAttributeRow::new(
                    decl.token,
                    application.namespace.clone(),
                    application.name.clone(),
                    encode_attribute_blob(&[])?,
                ));
            }
        }

        if self.diagnostics.has_errors() {
            return Err(crate::Error::EmitBlocked {
                errors: self.diagnostics.error_count(),
            });
        }

        Ok(EmittedMetadata {
            synthesized_types,
            class_layouts,
            field_layouts,
            custom_attributes,
        })
    }

    fn context(&self) -> SynthesisContext<'_> {
        SynthesisContext {
            assembly: &self.assembly,
            references: &self.references,
            options: &self.options,
            diagnostics: &self.diagnostics,
        }
    }

    /// Validates every user declaration whose name occupies a reserved slot.
    ///
    /// Metadata names of generic types carry an arity suffix, so only arity-0
    /// declarations occupy a reserved name; generic homonyms coexist as
    /// ordinary types.
    fn recognize_reserved_definitions(&self) {
        for decl in self.assembly.types() {
            if decl.is_generic() {
                continue;
            }
            if let Some(kind) = WellKnownAttribute::from_full_name(&decl.namespace, &decl.name) {
                validate_definition(&decl, kind, &self.diagnostics);
            }
        }
    }

    /// Decides the layout of every declared type, latching each result.
    fn decide_layouts(&self) {
        let types: Vec<TypeDeclRc> = self.assembly.types().collect();
        if self.options.parallel_checks {
            // per-type decisions are independent; findings go to local sinks
            // so the shared sink stays in declaration order
            let locals: Vec<Diagnostics> = types
                .par_iter()
                .map(|decl| {
                    let local = Diagnostics::new();
                    compute_layout(decl, &self.options, &local);
                    local
                })
                .collect();
            for local in locals {
                for diagnostic in local.iter() {
                    self.diagnostics.push(diagnostic.clone());
                }
            }
        } else {
            for decl in &types {
                compute_layout(decl, &self.options, &self.diagnostics);
            }
        }
    }

    /// Scans declarations for compiler facts and produces one attribute row
    /// per site, resolving each kind's definition on first need.
    fn apply_reserved_attributes(&self, rows: &mut Vec<CustomAttributeRow>) -> Result<()> {
        let mut nullable_sites = false;
        let mut ref_like_seen = false;

        // snapshot before synthesis starts registering new types
        let types: Vec<TypeDeclRc> = self.assembly.types().collect();
        for decl in &types {
            if decl.is_ref_like {
                ref_like_seen = true;
                self.apply(WellKnownAttribute::IsByRefLike, decl.token, &[], rows)?;
            }
            if decl.is_readonly {
                self.apply(WellKnownAttribute::IsReadOnly, decl.token, &[], rows)?;
            }
            if decl.has_unmanaged_constraint {
                self.apply(WellKnownAttribute::IsUnmanaged, decl.token, &[], rows)?;
            }

            let decl_public = decl.access.is_public_surface();
            for (_, field) in decl.fields.iter() {
                if field.shape.has_tuple_names() {
                    self.apply(
                        WellKnownAttribute::TupleElementNames,
                        field.token,
                        &[Self::tuple_names_argument(&field.shape)],
                        rows,
                    )?;
                }
                if decl_public
                    && field.access.is_public_surface()
                    && field.shape.has_nullable_annotations()
                {
                    nullable_sites = true;
                    self.apply(
                        WellKnownAttribute::Nullable,
                        field.token,
                        &[Self::nullable_argument(&field.shape)],
                        rows,
                    )?;
                }
            }

            for (_, member) in decl.members.iter() {
                if member.is_readonly {
                    self.apply(WellKnownAttribute::IsReadOnly, member.token, &[], rows)?;
                }
                if member.has_unmanaged_constraint {
                    self.apply(WellKnownAttribute::IsUnmanaged, member.token, &[], rows)?;
                }

                let member_public = decl_public && member.access.is_public_surface();
                for param in &member.params {
                    if param.ref_kind == RefKind::In {
                        self.apply(WellKnownAttribute::IsReadOnly, param.token, &[], rows)?;
                    }
                    if param.shape.has_tuple_names() {
                        self.apply(
                            WellKnownAttribute::TupleElementNames,
                            param.token,
                            &[Self::tuple_names_argument(&param.shape)],
                            rows,
                        )?;
                    }
                    if member_public && param.shape.has_nullable_annotations() {
                        nullable_sites = true;
                        self.apply(
                            WellKnownAttribute::Nullable,
                            param.token,
                            &[Self::nullable_argument(&param.shape)],
                            rows,
                        )?;
                    }
                }
                if let Some(shape) = &member.return_shape {
                    if shape.has_tuple_names() {
                        self.apply(
                            WellKnownAttribute::TupleElementNames,
                            member.token,
                            &[Self::tuple_names_argument(shape)],
                            rows,
                        )?;
                    }
                    if member_public && shape.has_nullable_annotations() {
                        nullable_sites = true;
                        self.apply(
                            WellKnownAttribute::Nullable,
                            member.token,
                            &[Self::nullable_argument(shape)],
                            rows,
                        )?;
                    }
                }
            }
        }

        if nullable_sites {
            // friend assemblies can see internal members, so the public-only
            // claim must admit the exception
            self.apply(
                WellKnownAttribute::NullablePublicOnly,
                Token::module(),
                &[CaValue::Bool(self.assembly.has_friends())],
                rows,
            )?;
        }
        if ref_like_seen {
            self.apply(
                WellKnownAttribute::RefSafetyRules,
                Token::module(),
                &[CaValue::Int32(REF_SAFETY_RULES_VERSION)],
                rows,
            )?;
        }
        Ok(())
    }

    /// Resolves a kind and records one application row when a definition
    /// exists. Unavailable kinds were already reported; their sites produce
    /// no rows.
    fn apply(
        &self,
        kind: WellKnownAttribute,
        parent: Token,
        args: &[CaValue],
        rows: &mut Vec<CustomAttributeRow>,
    ) -> Result<()> {
        let resolved = self.engine.get_or_synthesize(kind, &self.context())?;
        if resolved.is_usable() {
            rows.push(CustomAttributeRow::new(
                parent,
                kind.namespace(),
                kind.name(),
                encode_attribute_blob(args)?,
            ));
        }
        Ok(())
    }

    /// The `NullableAttribute` argument for a site: a single byte when every
    /// node in the shape carries the same flag, the full flag array otherwise.
    fn nullable_argument(shape: &TypeShape) -> CaValue {
        let mut flags = Vec::new();
        shape.collect_nullable_flags(&mut flags);
        match flags.first() {
            Some(first) if flags.iter().all(|flag| flag == first) => CaValue::Byte(*first),
            _ => CaValue::ByteArray(flags),
        }
    }

    /// The `TupleElementNamesAttribute` argument for a site: one entry per
    /// tuple position in depth-first order, null for unnamed positions.
    fn tuple_names_argument(shape: &TypeShape) -> CaValue {
        let mut names = Vec::new();
        shape.collect_tuple_names(&mut names);
        CaValue::StringArray(names)
    }
}

impl std::fmt::Debug for Compilation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compilation")
            .field("assembly", &self.assembly)
            .field("references", &self.references.len())
            .field("diagnostics", &self.diagnostics.count())
            .field("checked", &self.checked.load(Ordering::Acquire))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{
        diagnostics::{DiagnosticCode, Location},
        identity::AssemblyIdentity,
        layout::INTEROP_SERVICES_NAMESPACE,
        options::TargetRuntime,
        symbols::{
            assembly::ReferencedType,
            attrs::{ArgValue, AttrArg, AttributeApplication, AttributeSite},
            builder::TypeDeclBuilder,
            fields::FieldDecl,
            members::{MemberDecl, MemberKind, ParamDecl},
            shape::{NullableAnnotation, PrimitiveKind, TupleElement},
            types::Accessibility,
        },
    };

    fn compilation() -> Compilation {
        Compilation::new(
            Assembly::new(AssemblyIdentity::new("Lib")),
            CompilationOptions::default(),
        )
    }

    fn rows_for<'a>(
        metadata: &'a EmittedMetadata,
        name: &str,
    ) -> Vec<&'a CustomAttributeRow> {
        metadata
            .custom_attributes
            .iter()
            .filter(|row| row.name == name)
            .collect()
    }

    fn nullable_string() -> TypeShape {
        TypeShape::primitive_with(PrimitiveKind::String, NullableAnnotation::Annotated)
    }

    #[test]
    fn test_ref_struct_emits_marker_and_rules() {
        let compilation = compilation();
        let handle = TypeDeclBuilder::value_type(&compilation.assembly, "Interop", "Handle")
            .ref_like()
            .build()
            .unwrap();

        let metadata = compilation.emit().unwrap();

        let marker = rows_for(&metadata, "IsByRefLikeAttribute");
        assert_eq!(marker.len(), 1);
        assert_eq!(marker[0].parent, handle.token);
        assert_eq!(
            marker[0].blob,
            encode_attribute_blob(&[]).unwrap(),
            "parameterless application"
        );

        let rules = rows_for(&metadata, "RefSafetyRulesAttribute");
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].parent, Token::module());
        assert_eq!(
            rules[0].blob,
            encode_attribute_blob(&[CaValue::Int32(11)]).unwrap()
        );
    }

    #[test]
    fn test_synthesized_definitions_carry_markers() {
        let compilation = compilation();
        TypeDeclBuilder::value_type(&compilation.assembly, "Interop", "Handle")
            .ref_like()
            .build()
            .unwrap();

        let metadata = compilation.emit().unwrap();

        // IsByRefLike and RefSafetyRules were generated, plus their embedded
        // marker dependency
        let names: Vec<&str> = metadata
            .synthesized_types
            .iter()
            .map(|row| row.name.as_str())
            .collect();
        assert!(names.contains(&"EmbeddedAttribute"));
        assert!(names.contains(&"IsByRefLikeAttribute"));
        assert!(names.contains(&"RefSafetyRulesAttribute"));

        for row in &metadata.synthesized_types {
            let on_row: Vec<&CustomAttributeRow> = metadata
                .custom_attributes
                .iter()
                .filter(|attr| attr.parent == row.token)
                .collect();
            assert!(on_row
                .iter()
                .any(|attr| attr.full_name() == "Microsoft.CodeAnalysis.EmbeddedAttribute"));
            assert!(on_row.iter().any(|attr| attr.full_name()
                == "System.Runtime.CompilerServices.CompilerGeneratedAttribute"));
        }
    }

    #[test]
    fn test_in_parameter_marks_the_parameter() {
        let compilation = compilation();
        TypeDeclBuilder::class(&compilation.assembly, "N", "C")
            .member(
                MemberDecl::new(Token::methoddef(1), "M", MemberKind::Method).with_param(
                    ParamDecl::new(
                        Token::param(7),
                        "value",
                        TypeShape::primitive(PrimitiveKind::Int32),
                    )
                    .with_ref_kind(RefKind::In),
                ),
            )
            .build()
            .unwrap();

        let metadata = compilation.emit().unwrap();

        let rows = rows_for(&metadata, "IsReadOnlyAttribute");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].parent, Token::param(7));
    }

    #[test]
    fn test_readonly_and_unmanaged_sites() {
        let compilation = compilation();
        let frozen = TypeDeclBuilder::value_type(&compilation.assembly, "N", "Frozen")
            .readonly()
            .build()
            .unwrap();
        let holder = TypeDeclBuilder::value_type(&compilation.assembly, "N", "Holder")
            .arity(1)
            .unmanaged_constraint()
            .build()
            .unwrap();
        TypeDeclBuilder::class(&compilation.assembly, "N", "C")
            .member(
                MemberDecl::new(Token::methoddef(1), "Sum", MemberKind::Method)
                    .with_readonly()
                    .with_unmanaged_constraint(),
            )
            .build()
            .unwrap();

        let metadata = compilation.emit().unwrap();

        let readonly_parents: Vec<Token> = rows_for(&metadata, "IsReadOnlyAttribute")
            .iter()
            .map(|row| row.parent)
            .collect();
        assert!(readonly_parents.contains(&frozen.token));
        assert!(readonly_parents.contains(&Token::methoddef(1)));

        let unmanaged_parents: Vec<Token> = rows_for(&metadata, "IsUnmanagedAttribute")
            .iter()
            .map(|row| row.parent)
            .collect();
        assert!(unmanaged_parents.contains(&holder.token));
        assert!(unmanaged_parents.contains(&Token::methoddef(1)));
    }

    #[test]
    fn test_tuple_names_depth_first_with_nulls() {
        let compilation = compilation();
        // (int a, (bool, string c) b)
        let shape = TypeShape::tuple(vec![
            TupleElement::named("a", TypeShape::primitive(PrimitiveKind::Int32)),
            TupleElement::named(
                "b",
                TypeShape::tuple(vec![
                    TupleElement::unnamed(TypeShape::primitive(PrimitiveKind::Bool)),
                    TupleElement::named("c", TypeShape::primitive(PrimitiveKind::String)),
                ]),
            ),
        ]);
        TypeDeclBuilder::class(&compilation.assembly, "N", "C")
            .part("c.cs", Location::none())
            .field("pair", shape)
            .build()
            .unwrap();

        let metadata = compilation.emit().unwrap();

        let rows = rows_for(&metadata, "TupleElementNamesAttribute");
        assert_eq!(rows.len(), 1);
        let expected = encode_attribute_blob(&[CaValue::StringArray(vec![
            Some("a".to_string()),
            Some("b".to_string()),
            None,
            Some("c".to_string()),
        ])])
        .unwrap();
        assert_eq!(rows[0].blob, expected);
    }

    #[test]
    fn test_unnamed_tuples_produce_no_rows() {
        let compilation = compilation();
        TypeDeclBuilder::class(&compilation.assembly, "N", "C")
            .part("c.cs", Location::none())
            .field(
                "pair",
                TypeShape::tuple(vec![
                    TupleElement::unnamed(TypeShape::primitive(PrimitiveKind::Int32)),
                    TupleElement::unnamed(TypeShape::primitive(PrimitiveKind::Bool)),
                ]),
            )
            .build()
            .unwrap();

        let metadata = compilation.emit().unwrap();
        assert!(rows_for(&metadata, "TupleElementNamesAttribute").is_empty());
    }

    #[test]
    fn test_nullable_uniform_flags_compact_to_byte() {
        let compilation = compilation();
        TypeDeclBuilder::class(&compilation.assembly, "N", "C")
            .public()
            .part("c.cs", Location::none())
            .field_decl(
                FieldDecl::new(Token::field(1), "text", nullable_string())
                    .with_access(Accessibility::Public),
            )
            .build()
            .unwrap();

        let metadata = compilation.emit().unwrap();

        let rows = rows_for(&metadata, "NullableAttribute");
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].blob,
            encode_attribute_blob(&[CaValue::Byte(2)]).unwrap()
        );

        let public_only = rows_for(&metadata, "NullablePublicOnlyAttribute");
        assert_eq!(public_only.len(), 1);
        assert_eq!(public_only[0].parent, Token::module());
        assert_eq!(
            public_only[0].blob,
            encode_attribute_blob(&[CaValue::Bool(false)]).unwrap()
        );
    }

    #[test]
    fn test_nullable_mixed_flags_keep_the_array() {
        let compilation = compilation();
        // string?[] - the array node is not annotated, its element is
        let shape = TypeShape::Array {
            element: Box::new(nullable_string()),
            annotation: NullableAnnotation::NotAnnotated,
        };
        TypeDeclBuilder::class(&compilation.assembly, "N", "C")
            .public()
            .part("c.cs", Location::none())
            .field_decl(
                FieldDecl::new(Token::field(1), "lines", shape)
                    .with_access(Accessibility::Public),
            )
            .build()
            .unwrap();

        let metadata = compilation.emit().unwrap();

        let rows = rows_for(&metadata, "NullableAttribute");
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].blob,
            encode_attribute_blob(&[CaValue::ByteArray(vec![1, 2])]).unwrap()
        );
    }

    #[test]
    fn test_nullable_public_only_reflects_friends() {
        let compilation = compilation();
        compilation
            .assembly
            .add_internals_visible_to("Lib.Tests")
            .unwrap();
        TypeDeclBuilder::class(&compilation.assembly, "N", "C")
            .public()
            .part("c.cs", Location::none())
            .field_decl(
                FieldDecl::new(Token::field(1), "text", nullable_string())
                    .with_access(Accessibility::Public),
            )
            .build()
            .unwrap();

        let metadata = compilation.emit().unwrap();

        let public_only = rows_for(&metadata, "NullablePublicOnlyAttribute");
        assert_eq!(
            public_only[0].blob,
            encode_attribute_blob(&[CaValue::Bool(true)]).unwrap()
        );
    }

    #[test]
    fn test_internal_surface_gets_no_nullable_rows() {
        let compilation = compilation();
        // internal type with a public field: not part of the public surface
        TypeDeclBuilder::class(&compilation.assembly, "N", "C")
            .part("c.cs", Location::none())
            .field_decl(
                FieldDecl::new(Token::field(1), "text", nullable_string())
                    .with_access(Accessibility::Public),
            )
            .build()
            .unwrap();
        // public type with a private field: the field is not on the surface
        TypeDeclBuilder::class(&compilation.assembly, "N", "D")
            .public()
            .part("d.cs", Location::none())
            .field_decl(
                FieldDecl::new(Token::field(2), "text", nullable_string())
                    .with_access(Accessibility::Private),
            )
            .build()
            .unwrap();

        let metadata = compilation.emit().unwrap();

        assert!(rows_for(&metadata, "NullableAttribute").is_empty());
        assert!(rows_for(&metadata, "NullablePublicOnlyAttribute").is_empty());
    }

    #[test]
    fn test_many_uses_one_definition() {
        let compilation = compilation();
        for name in ["A", "B", "C"] {
            TypeDeclBuilder::value_type(&compilation.assembly, "N", name)
                .ref_like()
                .build()
                .unwrap();
        }

        let metadata = compilation.emit().unwrap();

        assert_eq!(rows_for(&metadata, "IsByRefLikeAttribute").len(), 3);
        let definitions = metadata
            .synthesized_types
            .iter()
            .filter(|row| row.name == "IsByRefLikeAttribute")
            .count();
        assert_eq!(definitions, 1);
    }

    #[test]
    fn test_recognized_user_definition_is_reused() {
        let compilation = compilation();
        TypeDeclBuilder::class(
            &compilation.assembly,
            COMPILER_SERVICES_NAMESPACE,
            "IsReadOnlyAttribute",
        )
        .sealed()
        .base("System", "Attribute")
        .build()
        .unwrap();
        TypeDeclBuilder::value_type(&compilation.assembly, "N", "Frozen")
            .readonly()
            .build()
            .unwrap();

        let metadata = compilation.emit().unwrap();

        assert_eq!(rows_for(&metadata, "IsReadOnlyAttribute").len(), 1);
        assert!(metadata.synthesized_types.is_empty());
        assert_eq!(compilation.diagnostics().count(), 0);
    }

    #[test]
    fn test_generic_homonym_not_validated() {
        let compilation = compilation();
        // same full name, arity 1: would fail every shape condition if it
        // were treated as a reserved declaration
        TypeDeclBuilder::class(
            &compilation.assembly,
            COMPILER_SERVICES_NAMESPACE,
            "IsReadOnlyAttribute",
        )
        .arity(1)
        .public()
        .build()
        .unwrap();

        compilation.check();
        assert!(!compilation
            .diagnostics()
            .contains(DiagnosticCode::InvalidWellKnownAttributeShape));
    }

    #[test]
    fn test_check_reports_shape_violations() {
        let compilation = compilation();
        TypeDeclBuilder::class(
            &compilation.assembly,
            COMPILER_SERVICES_NAMESPACE,
            "NullableAttribute",
        )
        .build()
        .unwrap();

        compilation.check();

        assert!(compilation
            .diagnostics()
            .contains(DiagnosticCode::InvalidWellKnownAttributeShape));
    }

    #[test]
    fn test_check_guards_explicit_application() {
        let compilation = compilation();
        TypeDeclBuilder::value_type(&compilation.assembly, "N", "S")
            .attribute(AttributeApplication::new(
                COMPILER_SERVICES_NAMESPACE,
                "IsReadOnlyAttribute",
                AttributeSite::Type,
                Location::new("s.cs", 3, 2),
            ))
            .build()
            .unwrap();

        compilation.check();

        assert!(compilation
            .diagnostics()
            .contains(DiagnosticCode::ExplicitReservedAttributeUse));
    }

    #[test]
    fn test_check_is_latched() {
        let compilation = compilation();
        TypeDeclBuilder::value_type(&compilation.assembly, "N", "S")
            .attribute(
                AttributeApplication::new(
                    INTEROP_SERVICES_NAMESPACE,
                    "StructLayoutAttribute",
                    AttributeSite::Type,
                    Location::new("a.cs", 1, 2),
                )
                .with_arg(AttrArg::new(ArgValue::Int(0), Location::new("a.cs", 1, 15))),
            )
            .part("a.cs", Location::new("a.cs", 1, 1))
            .field("a", TypeShape::primitive(PrimitiveKind::Int32))
            .part("b.cs", Location::new("b.cs", 1, 1))
            .field("b", TypeShape::primitive(PrimitiveKind::Int32))
            .build()
            .unwrap();

        compilation.check();
        compilation.check();

        // the partial-ordering warning fires once, not once per call
        assert_eq!(
            compilation
                .diagnostics()
                .by_code(DiagnosticCode::SequentialOnPartialType)
                .len(),
            1
        );
    }

    #[test]
    fn test_layout_rows_flow_through() {
        let compilation = compilation();
        let raw = TypeDeclBuilder::value_type(&compilation.assembly, "Interop", "Raw")
            .part("raw.cs", Location::none())
            .attribute(
                AttributeApplication::new(
                    INTEROP_SERVICES_NAMESPACE,
                    "StructLayoutAttribute",
                    AttributeSite::Type,
                    Location::new("raw.cs", 1, 2),
                )
                .with_arg(AttrArg::new(ArgValue::Int(2), Location::new("raw.cs", 1, 15)))
                .with_named(
                    "Size",
                    AttrArg::new(ArgValue::Int(16), Location::new("raw.cs", 1, 40)),
                ),
            )
            .field_decl(
                FieldDecl::new(
                    Token::field(1),
                    "lo",
                    TypeShape::primitive(PrimitiveKind::Int32),
                )
                .with_attribute(
                    AttributeApplication::new(
                        INTEROP_SERVICES_NAMESPACE,
                        "FieldOffsetAttribute",
                        AttributeSite::Field,
                        Location::new("raw.cs", 3, 6),
                    )
                    .with_arg(AttrArg::new(ArgValue::Int(0), Location::new("raw.cs", 3, 19))),
                ),
            )
            .field_decl(
                FieldDecl::new(
                    Token::field(2),
                    "hi",
                    TypeShape::primitive(PrimitiveKind::Int32),
                )
                .with_attribute(
                    AttributeApplication::new(
                        INTEROP_SERVICES_NAMESPACE,
                        "FieldOffsetAttribute",
                        AttributeSite::Field,
                        Location::new("raw.cs", 4, 6),
                    )
                    .with_arg(AttrArg::new(ArgValue::Int(8), Location::new("raw.cs", 4, 19))),
                ),
            )
            .build()
            .unwrap();

        let metadata = compilation.emit().unwrap();

        assert_eq!(metadata.class_layouts.len(), 1);
        assert_eq!(metadata.class_layouts[0].owner, raw.token);
        assert_eq!(metadata.class_layouts[0].packing_size, 0);
        assert_eq!(metadata.class_layouts[0].class_size, 16);

        assert_eq!(
            metadata.field_layouts,
            vec![
                FieldLayoutRow {
                    field: Token::field(1),
                    offset: 0
                },
                FieldLayoutRow {
                    field: Token::field(2),
                    offset: 8
                },
            ]
        );
    }

    #[test]
    fn test_empty_struct_stabilized_row() {
        let compilation = compilation();
        let marker = TypeDeclBuilder::value_type(&compilation.assembly, "N", "Unit")
            .build()
            .unwrap();

        let metadata = compilation.emit().unwrap();

        assert_eq!(metadata.class_layouts.len(), 1);
        assert_eq!(metadata.class_layouts[0].owner, marker.token);
        assert_eq!(metadata.class_layouts[0].packing_size, 0);
        assert_eq!(metadata.class_layouts[0].class_size, 1);
        assert!(metadata.field_layouts.is_empty());
    }

    #[test]
    fn test_extended_layout_travels_as_attribute() {
        let compilation = Compilation::new(
            Assembly::new(AssemblyIdentity::new("Lib")),
            CompilationOptions::default().with_target_runtime(TargetRuntime::Net100),
        );
        let overlay = TypeDeclBuilder::value_type(&compilation.assembly, "Interop", "Overlay")
            .part("o.cs", Location::none())
            .attribute(
                AttributeApplication::new(
                    COMPILER_SERVICES_NAMESPACE,
                    "ExtendedLayoutAttribute",
                    AttributeSite::Type,
                    Location::new("o.cs", 1, 2),
                )
                .with_arg(AttrArg::new(ArgValue::Int(1), Location::new("o.cs", 1, 18))),
            )
            .field("a", TypeShape::primitive(PrimitiveKind::Int32))
            .build()
            .unwrap();

        let metadata = compilation.emit().unwrap();

        assert!(metadata.class_layouts.is_empty());
        assert!(metadata.field_layouts.is_empty());
        let rows = rows_for(&metadata, "ExtendedLayoutAttribute");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].parent, overlay.token);
        assert_eq!(
            rows[0].blob,
            encode_attribute_blob(&[CaValue::Int32(1)]).unwrap()
        );
    }

    #[test]
    fn test_netmodule_trigger_blocks_emission() {
        let compilation = Compilation::new(
            Assembly::new(AssemblyIdentity::new("Mod")),
            CompilationOptions::netmodule(),
        );
        TypeDeclBuilder::value_type(&compilation.assembly, "N", "Handle")
            .ref_like()
            .build()
            .unwrap();

        let result = compilation.emit();

        assert!(matches!(result, Err(crate::Error::EmitBlocked { .. })));
        assert!(compilation
            .diagnostics()
            .contains(DiagnosticCode::PredefinedTypeNotFound));
    }

    #[test]
    fn test_netmodule_with_references_emits() {
        let mut compilation = Compilation::new(
            Assembly::new(AssemblyIdentity::new("Mod")),
            CompilationOptions::netmodule(),
        );
        let reference = ReferencedAssembly::new(AssemblyIdentity::new("System.Runtime"));
        reference.add_type(
            ReferencedType::new(COMPILER_SERVICES_NAMESPACE, "IsByRefLikeAttribute")
                .with_ctor(Vec::new()),
        );
        reference.add_type(
            ReferencedType::new(COMPILER_SERVICES_NAMESPACE, "RefSafetyRulesAttribute")
                .with_ctor(vec![TypeShape::primitive(PrimitiveKind::Int32)]),
        );
        compilation.add_reference(reference);
        TypeDeclBuilder::value_type(&compilation.assembly, "N", "Handle")
            .ref_like()
            .build()
            .unwrap();

        let metadata = compilation.emit().unwrap();

        assert!(metadata.synthesized_types.is_empty());
        assert_eq!(rows_for(&metadata, "IsByRefLikeAttribute").len(), 1);
        assert_eq!(rows_for(&metadata, "RefSafetyRulesAttribute").len(), 1);
    }

    #[test]
    fn test_error_diagnostics_block_emission() {
        let compilation = compilation();
        // FieldOffset outside explicit layout is an error
        TypeDeclBuilder::value_type(&compilation.assembly, "N", "S")
            .part("s.cs", Location::none())
            .field_decl(
                FieldDecl::new(
                    Token::field(1),
                    "a",
                    TypeShape::primitive(PrimitiveKind::Int32),
                )
                .with_attribute(
                    AttributeApplication::new(
                        INTEROP_SERVICES_NAMESPACE,
                        "FieldOffsetAttribute",
                        AttributeSite::Field,
                        Location::new("s.cs", 2, 6),
                    )
                    .with_arg(AttrArg::new(ArgValue::Int(0), Location::new("s.cs", 2, 19))),
                ),
            )
            .build()
            .unwrap();

        let result = compilation.emit();

        match result {
            Err(crate::Error::EmitBlocked { errors }) => assert_eq!(errors, 1),
            other => panic!("expected blocked emission, got {other:?}"),
        }
        assert!(compilation
            .diagnostics()
            .contains(DiagnosticCode::FieldOffsetRequiresExplicitLayout));
    }

    #[test]
    fn test_warnings_do_not_block_emission() {
        let compilation = compilation();
        TypeDeclBuilder::value_type(&compilation.assembly, "N", "S")
            .attribute(
                AttributeApplication::new(
                    INTEROP_SERVICES_NAMESPACE,
                    "StructLayoutAttribute",
                    AttributeSite::Type,
                    Location::new("a.cs", 1, 2),
                )
                .with_arg(AttrArg::new(ArgValue::Int(0), Location::new("a.cs", 1, 15))),
            )
            .part("a.cs", Location::new("a.cs", 1, 1))
            .field("a", TypeShape::primitive(PrimitiveKind::Int32))
            .part("b.cs", Location::new("b.cs", 1, 1))
            .field("b", TypeShape::primitive(PrimitiveKind::Int32))
            .build()
            .unwrap();

        let metadata = compilation.emit().unwrap();

        assert!(compilation.diagnostics().has_warnings());
        assert!(!compilation.diagnostics().has_errors());
        // the sequential decision itself produced no numeric layout
        assert!(metadata.class_layouts.is_empty());
    }

    #[test]
    fn test_emit_is_idempotent() {
        let compilation = compilation();
        TypeDeclBuilder::value_type(&compilation.assembly, "N", "Handle")
            .ref_like()
            .build()
            .unwrap();

        let first = compilation.emit().unwrap();
        let count_after_first = compilation.diagnostics().count();
        let second = compilation.emit().unwrap();

        assert_eq!(
            first.custom_attributes.len(),
            second.custom_attributes.len()
        );
        assert_eq!(
            first.synthesized_types.len(),
            second.synthesized_types.len()
        );
        assert_eq!(compilation.diagnostics().count(), count_after_first);
    }

    #[test]
    fn test_require_surfaces_unavailability() {
        let compilation = compilation();
        compilation
            .assembly
            .add_forwarder(crate::metadata::symbols::assembly::TypeForwarder::new(
                COMPILER_SERVICES_NAMESPACE,
                "IsReadOnlyAttribute",
                "System.Runtime",
            ));

        let result = compilation.require(WellKnownAttribute::IsReadOnly);

        match result {
            Err(crate::Error::AttributeUnavailable(name)) => {
                assert_eq!(name, "System.Runtime.CompilerServices.IsReadOnlyAttribute");
            }
            other => panic!("expected unavailable attribute, got {other:?}"),
        }
        assert!(compilation
            .diagnostics()
            .contains(DiagnosticCode::ForwardedTypeConflict));
    }

    #[test]
    fn test_require_returns_usable_identity() {
        let compilation = compilation();
        let resolved = compilation
            .require(WellKnownAttribute::TupleElementNames)
            .unwrap();
        assert!(matches!(
            resolved,
            ResolvedAttributeIdentity::Synthesized(_)
        ));
    }

    #[test]
    fn test_sequential_checking_matches_parallel() {
        for parallel in [false, true] {
            let compilation = Compilation::new(
                Assembly::new(AssemblyIdentity::new("Lib")),
                CompilationOptions::default().with_parallel_checks(parallel),
            );
            TypeDeclBuilder::value_type(&compilation.assembly, "N", "Bad")
                .part("bad.cs", Location::none())
                .attribute(
                    AttributeApplication::new(
                        INTEROP_SERVICES_NAMESPACE,
                        "StructLayoutAttribute",
                        AttributeSite::Type,
                        Location::new("bad.cs", 1, 2),
                    )
                    .with_arg(AttrArg::new(ArgValue::Int(7), Location::new("bad.cs", 1, 15))),
                )
                .build()
                .unwrap();

            compilation.check();

            assert_eq!(
                compilation
                    .diagnostics()
                    .by_code(DiagnosticCode::InvalidAttributeArgument)
                    .len(),
                1,
                "parallel={parallel}"
            );
        }
    }
}
