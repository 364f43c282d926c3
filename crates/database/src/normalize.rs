//! Token/display conversion for enum-like fields.
//!
//! The relational store keeps values such as `ACTIVE_DEAL`; callers see
//! `ACTIVE DEAL`. Case is not restored on the way back out.

use crate::entity::Entity;

/// Render a stored token for display: every underscore becomes a space.
pub fn to_display(token: &str) -> String {
    token.replace('_', " ")
}

/// Encode a display string as a token: trimmed, whitespace runs joined by a
/// single underscore, upper-cased.
pub fn to_token(display: &str) -> String {
    display
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_uppercase()
}

/// Convert every enum-like field of a record to token form.
pub fn encode_record<E: Entity>(record: &mut E) {
    for field in record.enum_fields_mut() {
        *field = to_token(field);
    }
}

/// Convert every enum-like field of a record to display form.
pub fn decode_record<E: Entity>(record: &mut E) {
    for field in record.enum_fields_mut() {
        *field = to_display(field);
    }
}
