//! POS reference normalization and cancellation-tag handling
//!
//! The POS sends references like `"Order 00012-001-0001"`, but the same
//! logical order may show up with or without the `Order` token and with
//! different casing on it. Product names of cancelled lines carry one or more
//! leading `CANCELLED:` tags instead of a structured flag.

/// Tag prepended to product names of cancelled lines
pub const CANCELLED_TAG: &str = "CANCELLED:";

const ORDER_TOKEN: &str = "order";

/// Normalize a POS reference
///
/// Trims the reference and strips the leading `Order` token (any case) along
/// with the whitespace after it. Only the `Order` prefix is compared
/// case-insensitively; the rest of the reference is kept verbatim.
///
/// Repeated leading tokens are all stripped so that normalizing twice gives
/// the same result as normalizing once.
pub fn normalize_pos_reference(reference: &str) -> String {
    let mut rest = reference.trim();
    while let Some(stripped) = strip_prefix_ignore_case(rest, ORDER_TOKEN) {
        rest = stripped.trim_start();
    }
    rest.trim().to_string()
}

/// Whether a raw product name marks a cancelled line
pub fn is_cancelled_name(name: &str) -> bool {
    strip_prefix_ignore_case(name.trim_start(), CANCELLED_TAG).is_some()
}

/// Remove every leading `CANCELLED:` tag (any case) and trim the result
pub fn strip_cancelled_prefixes(name: &str) -> &str {
    let mut rest = name.trim_start();
    while let Some(stripped) = strip_prefix_ignore_case(rest, CANCELLED_TAG) {
        rest = stripped.trim_start();
    }
    rest.trim()
}

/// Label for a net cancellation: `"CANCELLED: <name>"`, or the bare tag
/// when no name is known
pub fn cancelled_label(base_name: &str) -> String {
    let sanitized = strip_cancelled_prefixes(base_name);
    if sanitized.is_empty() {
        CANCELLED_TAG.to_string()
    } else {
        format!("{} {}", CANCELLED_TAG, sanitized)
    }
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &s[prefix.len()..])
}
