//! Metadata record emission.
//!
//! The final stage of the subsystem: turning layout decisions, synthesized
//! definitions, and trigger-scan findings into the table rows and attribute
//! blobs the host compiler writes out.
//!
//! - [`flags`] - TypeDef attribute bitmask constants
//! - [`tables`] - Row types for ClassLayout, FieldLayout, and CustomAttribute
//! - [`blob`] - ECMA-335 §II.23.3 custom-attribute blob encoding
//!
//! [`crate::metadata::compilation::Compilation::emit`] drives this module and
//! collects its output into one
//! [`crate::metadata::compilation::EmittedMetadata`].

pub mod blob;
pub mod flags;
pub mod tables;

pub use blob::{encode_attribute_blob, CaValue};
pub use tables::{
    type_flags, ClassLayoutRow, CustomAttributeRow, FieldLayoutRow, SynthesizedTypeRow,
};
