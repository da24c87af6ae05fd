//! SQLite helper utilities for type conversion
//!
//! SQLite has no array or boolean column types. Ingredient lists are stored as
//! JSON arrays in TEXT columns and flags as 0/1 integers.

use serde::{Serialize, de::DeserializeOwned};

// ============================================================================
// Array/Vec Helpers (stored as JSON strings in SQLite)
// ============================================================================

/// Serialize a slice to a JSON string for SQLite storage
#[inline]
pub fn vec_to_json<T: Serialize>(v: &[T]) -> String {
    serde_json::to_string(v).unwrap_or_else(|_| "[]".to_string())
}

/// Deserialize a JSON array read back from SQLite.
///
/// A NULL or empty column decodes to an empty list; anything else that is not
/// a JSON array is an error.
#[inline]
pub fn json_to_vec<T: DeserializeOwned>(s: Option<&str>) -> Result<Vec<T>, serde_json::Error> {
    match s {
        Some(s) if !s.trim().is_empty() => serde_json::from_str(s),
        _ => Ok(Vec::new()),
    }
}

// ============================================================================
// Boolean Helpers (SQLite uses 0/1 integers)
// ============================================================================

/// Convert bool to SQLite integer (0 or 1)
#[inline]
pub fn bool_to_int(b: bool) -> i32 {
    if b { 1 } else { 0 }
}

/// Convert SQLite integer to bool
#[inline]
pub fn int_to_bool(i: i32) -> bool {
    i != 0
}

// ============================================================================
// Connection URL Helpers
// ============================================================================

/// Accept either a `sqlite:` URL or a bare file path.
pub fn normalize_sqlite_url(url_or_path: &str) -> String {
    if url_or_path.starts_with("sqlite:") {
        url_or_path.to_string()
    } else {
        format!("sqlite:{}", url_or_path)
    }
}

// ============================================================================
// LIKE pattern helpers
// ============================================================================

/// Escape `%`, `_` and the escape character itself so `value` matches literally
/// inside a `LIKE ... ESCAPE '\'` pattern.
pub fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
