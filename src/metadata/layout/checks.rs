//! Argument validation for layout attributes.
//!
//! Packing follows the runtime's rules: 0 selects the default, everything else
//! must be a power of two no larger than 128.
//!
//! | Value | Alignment |
//! |-------|-----------|
//! | 0     | runtime default |
//! | 1-128 | power of two    |

/// Stateless validator for layout attribute argument values.
pub struct LayoutChecks;

impl LayoutChecks {
    /// Validates a `Pack` named argument value.
    #[must_use]
    pub fn packing_is_valid(value: i32) -> bool {
        if value == 0 {
            return true;
        }
        (1..=128).contains(&value) && (value as u32).is_power_of_two()
    }

    /// Validates a `Size` named argument value.
    #[must_use]
    pub fn size_is_valid(value: i32) -> bool {
        value >= 0
    }

    /// Validates a `FieldOffset` positional argument value.
    #[must_use]
    pub fn offset_is_valid(value: i32) -> bool {
        value >= 0
    }
}
