//! The layout decision procedure.
//!
//! [`compute_layout`] turns a type declaration plus its layout attributes into
//! one [`LayoutDescriptor`], reporting every argument violation at its source
//! site. Invalid attributes never half-apply: any bad argument makes the whole
//! declaration fall back to its default layout, which is auto except for a
//! value type with no instance fields (stabilized as sequential, size 1, so
//! the record never emits as empty and zero-sized).
//!
//! The decision is latched on the declaration, so repeated calls return the
//! same descriptor without re-reporting.

use crate::metadata::{
    diagnostics::{DiagnosticCode, Diagnostics},
    layout::{
        checks::LayoutChecks,
        kind::{CharSet, ExtendedLayoutKind, LayoutDescriptor, LayoutKind, TypeLayout},
    },
    options::CompilationOptions,
    symbols::{
        attrs::AttributeApplication,
        types::{TypeDecl, TypeKind},
    },
};

/// Namespace of `StructLayoutAttribute` and `FieldOffsetAttribute`
pub const INTEROP_SERVICES_NAMESPACE: &str = "System.Runtime.InteropServices";

/// Computes (and latches) the layout descriptor for a declaration.
///
/// The first call decides and reports diagnostics; later calls return the
/// latched descriptor unchanged.
pub fn compute_layout(
    decl: &TypeDecl,
    options: &CompilationOptions,
    diagnostics: &Diagnostics,
) -> LayoutDescriptor {
    decl.layout
        .get_or_init(|| decide(decl, options, diagnostics))
        .clone()
}

/// The layout a declaration gets when no attribute applies (or applies badly).
fn default_layout(decl: &TypeDecl) -> LayoutDescriptor {
    if decl.kind == TypeKind::Struct && decl.instance_fields_ordered().is_empty() {
        LayoutDescriptor::empty_value_type()
    } else {
        LayoutDescriptor::auto()
    }
}

fn decide(
    decl: &TypeDecl,
    options: &CompilationOptions,
    diagnostics: &Diagnostics,
) -> LayoutDescriptor {
    let struct_layout = decl.find_attribute(INTEROP_SERVICES_NAMESPACE, "StructLayoutAttribute");
    let extended = decl.find_attribute(
        "System.Runtime.CompilerServices",
        "ExtendedLayoutAttribute",
    );

    let mut descriptor = match (struct_layout, extended) {
        (Some(_), Some(_)) => {
            diagnostics.report(
                DiagnosticCode::ConflictingLayoutAttributes,
                decl.location(),
                format!(
                    "'ExtendedLayout' and 'StructLayout' cannot both be applied to type '{}'",
                    decl.fullname()
                ),
            );
            default_layout(decl)
        }
        (Some(application), None) => from_struct_layout(decl, application, diagnostics),
        (None, Some(application)) => from_extended(decl, application, options, diagnostics),
        (None, None) => default_layout(decl),
    };

    check_field_offsets(decl, &mut descriptor, diagnostics);

    if matches!(
        descriptor.layout,
        TypeLayout::Sequential | TypeLayout::Extended(_)
    ) && decl.parts_with_instance_fields() > 1
    {
        diagnostics.report(
            DiagnosticCode::SequentialOnPartialType,
            decl.location(),
            format!(
                "There is no defined ordering between fields in multiple declarations of partial type '{}'. To specify an ordering, all instance fields must be in the same declaration.",
                decl.fullname()
            ),
        );
    }

    descriptor
}

/// Checks that the declaration kind admits layout control at all.
fn admits_layout_control(
    decl: &TypeDecl,
    application: &AttributeApplication,
    attr_name: &str,
    diagnostics: &Diagnostics,
) -> bool {
    if decl.kind.admits_layout() && !decl.is_static {
        return true;
    }
    diagnostics.report(
        DiagnosticCode::AttributeNotValidOnDeclaration,
        application.location.clone(),
        format!(
            "Attribute '{attr_name}' is not valid on this declaration type. It is only valid on 'class, struct' declarations."
        ),
    );
    false
}

fn from_struct_layout(
    decl: &TypeDecl,
    application: &AttributeApplication,
    diagnostics: &Diagnostics,
) -> LayoutDescriptor {
    if !admits_layout_control(decl, application, "StructLayout", diagnostics) {
        return default_layout(decl);
    }

    let kind = application
        .positional(0)
        .and_then(|arg| arg.value.as_int())
        .and_then(LayoutKind::from_value);
    let Some(kind) = kind else {
        let location = application
            .positional(0)
            .map_or_else(|| application.location.clone(), |arg| arg.location.clone());
        diagnostics.report(
            DiagnosticCode::InvalidAttributeArgument,
            location,
            "Invalid value for argument to 'StructLayout' attribute".to_string(),
        );
        return default_layout(decl);
    };

    let mut pack: u16 = 0;
    let mut size: u32 = 0;
    let mut charset = CharSet::Ansi;
    let mut fall_back = false;

    for (name, arg) in application.named.iter() {
        let accepted = match (name.as_str(), arg.value.as_int()) {
            ("Pack", Some(value)) if LayoutChecks::packing_is_valid(value) => {
                pack = value as u16;
                true
            }
            ("Size", Some(value)) if LayoutChecks::size_is_valid(value) => {
                size = value as u32;
                true
            }
            ("CharSet", Some(value)) => match CharSet::from_named_value(value) {
                Some(decoded) => {
                    charset = decoded;
                    true
                }
                None => false,
            },
            ("Pack" | "Size" | "CharSet", _) => false,
            // named arguments outside the layout triple are not ours to judge
            _ => true,
        };
        if !accepted {
            diagnostics.report(
                DiagnosticCode::InvalidNamedArgument,
                arg.location.clone(),
                format!("Invalid value for named attribute argument '{name}'"),
            );
            fall_back = true;
        }
    }

    if fall_back {
        return default_layout(decl);
    }

    let layout = match kind {
        LayoutKind::Sequential => TypeLayout::Sequential,
        LayoutKind::Explicit => TypeLayout::Explicit,
        LayoutKind::Auto => TypeLayout::Auto,
    };
    LayoutDescriptor {
        layout,
        pack,
        size,
        charset,
        field_offsets: Vec::new(),
    }
}

fn from_extended(
    decl: &TypeDecl,
    application: &AttributeApplication,
    options: &CompilationOptions,
    diagnostics: &Diagnostics,
) -> LayoutDescriptor {
    if !admits_layout_control(decl, application, "ExtendedLayout", diagnostics) {
        return default_layout(decl);
    }

    let kind = application
        .positional(0)
        .and_then(|arg| arg.value.as_int())
        .and_then(ExtendedLayoutKind::from_value);
    let Some(kind) = kind else {
        let location = application
            .positional(0)
            .map_or_else(|| application.location.clone(), |arg| arg.location.clone());
        diagnostics.report(
            DiagnosticCode::InvalidAttributeArgument,
            location,
            "Invalid value for argument to 'ExtendedLayout' attribute".to_string(),
        );
        return default_layout(decl);
    };

    if decl.is_fixed_buffer {
        diagnostics.report(
            DiagnosticCode::ExtendedLayoutOnFixedBuffer,
            application.location.clone(),
            format!(
                "Extended layout cannot be applied to fixed-size buffer type '{}'",
                decl.fullname()
            ),
        );
        return default_layout(decl);
    }

    if !options.target_runtime.supports_extended_layout() {
        diagnostics.report(
            DiagnosticCode::ExtendedLayoutNotSupported,
            decl.location(),
            format!(
                "Extended layout is not supported by target runtime '{}'",
                options.target_runtime
            ),
        );
        return default_layout(decl);
    }

    LayoutDescriptor {
        layout: TypeLayout::Extended(kind),
        pack: 0,
        size: 0,
        charset: CharSet::Ansi,
        field_offsets: Vec::new(),
    }
}

fn check_field_offsets(
    decl: &TypeDecl,
    descriptor: &mut LayoutDescriptor,
    diagnostics: &Diagnostics,
) {
    // offsets are meaningless on fields without storage, whatever the layout
    for (_, field) in decl.fields.iter() {
        if !(field.is_static || field.is_const) {
            continue;
        }
        if let Some(application) =
            field.find_attribute(INTEROP_SERVICES_NAMESPACE, "FieldOffsetAttribute")
        {
            diagnostics.report(
                DiagnosticCode::FieldOffsetOnStaticOrConst,
                application.location.clone(),
                "The FieldOffset attribute is not allowed on static or const fields".to_string(),
            );
        }
    }

    let explicit = descriptor.layout.allows_field_offsets();
    let mut offsets: Vec<(crate::metadata::token::Token, u32)> = Vec::new();

    for field in decl.instance_fields_ordered() {
        match field.find_attribute(INTEROP_SERVICES_NAMESPACE, "FieldOffsetAttribute") {
            Some(application) => {
                if !explicit {
                    diagnostics.report(
                        DiagnosticCode::FieldOffsetRequiresExplicitLayout,
                        application.location.clone(),
                        "The FieldOffset attribute can only be placed on members of types marked with the StructLayout(LayoutKind.Explicit)".to_string(),
                    );
                    continue;
                }
                match application.positional(0).and_then(|arg| arg.value.as_int()) {
                    Some(value) if LayoutChecks::offset_is_valid(value) => {
                        offsets.push((field.token, value as u32));
                    }
                    _ => {
                        let location = application.positional(0).map_or_else(
                            || application.location.clone(),
                            |arg| arg.location.clone(),
                        );
                        diagnostics.report(
                            DiagnosticCode::InvalidAttributeArgument,
                            location,
                            "Invalid value for argument to 'FieldOffset' attribute".to_string(),
                        );
                    }
                }
            }
            None if explicit => {
                diagnostics.report(
                    DiagnosticCode::MissingFieldOffset,
                    field.location.clone(),
                    format!(
                        "'{}': instance field in a type marked with StructLayout(LayoutKind.Explicit) must have a FieldOffset attribute",
                        field.name
                    ),
                );
            }
            None => {}
        }
    }

    if explicit {
        descriptor.field_offsets = offsets;
    }
}
