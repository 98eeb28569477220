//! Rejection of explicit reserved-attribute application.
//!
//! Reserved attributes are applied by the compiler, never by source. The guard
//! fires on the attribute's qualified name alone; whether the name resolves to
//! the real definition, a user stand-in, or nothing at all is irrelevant. The
//! embedded marker is exempt, and names outside the registry (notably
//! `CompilerGeneratedAttribute`) pass through untouched.

use crate::metadata::{
    diagnostics::{DiagnosticCode, Diagnostics},
    symbols::{assembly::Assembly, attrs::AttributeApplication},
    wellknown::descriptor::WellKnownAttribute,
};

/// Checks one attribute application against the reserved set.
///
/// Returns `true` when the application is allowed. A rejected application gets
/// one [`DiagnosticCode::ExplicitReservedAttributeUse`] at its site and must
/// be ignored by later stages.
pub fn check_application(application: &AttributeApplication, diagnostics: &Diagnostics) -> bool {
    let Some(kind) = WellKnownAttribute::from_full_name(&application.namespace, &application.name)
    else {
        return true;
    };
    if !kind.is_guarded() {
        return true;
    }

    diagnostics.report(
        DiagnosticCode::ExplicitReservedAttributeUse,
        application.location.clone(),
        format!(
            "Do not use '{}'. This is reserved for compiler usage.",
            kind.full_name()
        ),
    );
    false
}

/// Runs the guard over every attribute application in the assembly.
///
/// Covers assembly- and module-level applications plus every type, field, and
/// member application; parameter and return positions are recorded on their
/// member and checked the same way.
pub fn scan_assembly(assembly: &Assembly, diagnostics: &Diagnostics) {
    for (_, application) in assembly.assembly_attributes.iter() {
        check_application(application, diagnostics);
    }
    for (_, application) in assembly.module_attributes.iter() {
        check_application(application, diagnostics);
    }
    for decl in assembly.types() {
        for (_, application) in decl.attributes.iter() {
            check_application(application, diagnostics);
        }
        for (_, field) in decl.fields.iter() {
            for (_, application) in field.attributes.iter() {
                check_application(application, diagnostics);
            }
        }
        for (_, member) in decl.members.iter() {
            for (_, application) in member.attributes.iter() {
                check_application(application, diagnostics);
            }
        }
    }
}
