//! Shape validation for user-defined reserved attribute types.
//!
//! A source declaration whose full name collides with a registry entry is
//! either a usable stand-in for the compiler's own definition or it is not.
//! The check is all-or-nothing: every condition must hold, and a failing type
//! gets exactly one diagnostic naming all violated conditions. Failing types
//! stay usable as ordinary types; the synthesis engine simply ignores them.

use crate::metadata::{
    diagnostics::{DiagnosticCode, Diagnostics},
    symbols::types::{Accessibility, TypeDecl},
    wellknown::descriptor::WellKnownAttribute,
};

/// Validates a declaration against the required well-known attribute pattern.
///
/// On success the declaration is latched as recognized and `true` is returned.
/// On failure one [`DiagnosticCode::InvalidWellKnownAttributeShape`] is
/// reported at the type's primary location, listing every violated condition,
/// and the declaration is left unrecognized.
///
/// Already-recognized declarations short-circuit so repeated validation stays
/// idempotent.
pub fn validate_definition(
    decl: &TypeDecl,
    kind: WellKnownAttribute,
    diagnostics: &Diagnostics,
) -> bool {
    if decl.is_recognized() {
        return true;
    }

    let descriptor = kind.descriptor();
    let mut violations: Vec<&'static str> = Vec::new();

    if decl.is_generic() {
        violations.push("must not be generic");
    }
    match decl.access {
        Accessibility::Internal => {}
        Accessibility::Public if descriptor.allows_public => {}
        Accessibility::Public => violations.push("must be internal"),
        Accessibility::Protected | Accessibility::Private => {
            violations.push(if descriptor.allows_public {
                "must be internal or public"
            } else {
                "must be internal"
            });
        }
    }
    if decl.is_file_local {
        violations.push("must not be file-scoped");
    }
    if !decl.is_sealed {
        violations.push("must be sealed");
    }
    if decl.is_static {
        violations.push("must not be static");
    }
    if !decl.derives_from_attribute() {
        violations.push("must derive from System.Attribute");
    }
    if !decl.has_accessible_parameterless_ctor() {
        violations.push("must have an accessible parameterless constructor");
    }
    if let Some(usage) = decl.attribute_usage.get() {
        if !usage.covers(descriptor.targets) {
            violations.push("AttributeUsage must cover the targets the compiler applies it to");
        }
    }

    if violations.is_empty() {
        decl.mark_recognized();
        return true;
    }

    diagnostics.report(
        DiagnosticCode::InvalidWellKnownAttributeShape,
        decl.location(),
        format!(
            "'{}' is not a valid well-known attribute definition: {}",
            decl.fullname(),
            violations.join(", ")
        ),
    );
    false
}
