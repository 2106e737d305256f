//! Diagnostic ID constants.
//!
//! Auto-generated from `spec/diagnostics.jsonc` at build time. ARG1xxx codes
//! are per-parse errors, ARG2xxx codes are grammar construction errors.

include!(concat!(env!("OUT_DIR"), "/generated_codes.rs"));
