//! Component identity and identifier-format helpers.
//!
//! Cross-registry joins are string-keyed on purpose: a handler may subscribe
//! to an event type that has not been declared yet, and a test may name an
//! expectation that arrives later. The formats preserved here are load-bearing
//! for those joins:
//!
//! - Expectation ID: `^[A-Z]{2,}-EXP-\d{3,}$` (e.g. `PO-EXP-001`)
//! - Test ID: `{expectationId}-TEST-{N}`, N incrementing per expectation
//! - Derived event type: strip a trailing `Event`, split camelCase
//!   boundaries, lowercase, dot-delimited (`OrderPlacedEvent` → `order.placed`)

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

static EXPECTATION_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{2,}-EXP-\d{3,}$").expect("expectation id pattern"));

/// Opaque, stable identity handle for an annotated component.
///
/// The registries own their entries; components are referred to by this
/// handle rather than by reference, so an identity stays valid for the whole
/// process lifetime regardless of what the declaring code does afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(Uuid);

impl ComponentId {
    /// Mint a fresh identity.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID (useful when the caller already tracks one).
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// The underlying UUID.
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ComponentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Check an expectation identifier against the required
/// `{2+ uppercase}-EXP-{3+ digits}` format.
pub fn is_valid_expectation_id(id: &str) -> bool {
    EXPECTATION_ID_PATTERN.is_match(id)
}

/// Format a test identifier for the given expectation and sequence number.
pub fn format_test_id(expectation_id: &str, sequence: u32) -> String {
    format!("{expectation_id}-TEST-{sequence}")
}

/// Derive a canonical dot-delimited event type from a declaring type name.
///
/// One trailing `Event` suffix is stripped, then the name is split at
/// camelCase boundaries, lowercased, and joined with dots:
///
/// - `OrderPlacedEvent` → `order.placed`
/// - `PaymentHTTPTimeout` → `payment.http.timeout`
/// - `Event` → `event` (the bare suffix is left alone)
pub fn derive_event_type(type_name: &str) -> String {
    let base = match type_name.strip_suffix("Event") {
        Some(stripped) if !stripped.is_empty() => stripped,
        _ => type_name,
    };

    let chars: Vec<char> = base.chars().collect();
    let mut segments: Vec<String> = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() && !current.is_empty() {
            let prev_lower = chars[i - 1].is_lowercase() || chars[i - 1].is_ascii_digit();
            // Last capital of an acronym run starts a new word when followed
            // by a lowercase letter (HTTPTimeout → HTTP, Timeout).
            let acronym_end = chars[i - 1].is_uppercase()
                && chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev_lower || acronym_end {
                segments.push(current.to_lowercase());
                current = String::new();
            }
        }
        current.push(c);
    }
    if !current.is_empty() {
        segments.push(current.to_lowercase());
    }

    segments.join(".")
}
