//! Shared, version-pinned protocol identifiers and ABI constants.
//!
//! These constants are the single source of truth for schema/version strings that
//! appear in machine-readable I/O, and for the handful of layout values the code
//! generator and the runtime must agree on without a manifest.

pub const TARN_LAYOUT_SCHEMA_VERSION: &str = "tarn.layout@0.1.0";
pub const TARN_DIAG_SCHEMA_VERSION: &str = "tarn.diag@0.1.0";
pub const TARN_CAPS_REPORT_SCHEMA_VERSION: &str = "tarn.caps.report@0.1.0";
pub const TARN_TEXT_REPORT_SCHEMA_VERSION: &str = "tarn.text.report@0.1.0";

/// Class position recorded in every ordinary instance.
///
/// Classes record the position of their special type attribute instead.
pub const INSTANCE_POS: u32 = 0;

/// Slot of the context (bound receiver or closure environment) in every argument array.
pub const CONTEXT_ARG: usize = 0;

/// Attribute codes are assigned from 1; 0 marks a gap in a table.
pub const GAP_CODE: u32 = 0;
