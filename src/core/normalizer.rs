//! Row normalization.
//!
//! Maps raw CSV cells into a canonical field bag via the user-defined column
//! mapping. Pure: no side effects, no I/O.

use crate::models::session::{ColumnMapping, NormalizedRow, FIELD_TITLE};
use crate::{Error, Result};
use std::collections::HashMap;

/// Normalize one raw row.
///
/// For every canonical field with a configured mapping, the raw cell is
/// copied if present and non-empty. Unmapped fields and empty source cells
/// are omitted rather than defaulted, so "unspecified" stays distinguishable
/// from "explicitly empty".
///
/// Fails only when the resolved title is empty after mapping.
pub fn normalize(
    raw_row: &HashMap<String, String>,
    mapping: &ColumnMapping,
) -> Result<NormalizedRow> {
    let mut fields = HashMap::new();

    for (canonical_field, source_column) in mapping {
        if let Some(value) = raw_row.get(source_column) {
            let value = value.trim();
            if !value.is_empty() {
                fields.insert(canonical_field.clone(), value.to_string());
            }
        }
    }

    if fields.get(FIELD_TITLE).map(String::as_str).unwrap_or("").is_empty() {
        return Err(Error::MissingTitle);
    }

    Ok(NormalizedRow { fields })
}
