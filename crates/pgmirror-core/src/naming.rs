// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Database-name resolver.
//!
//! Provisioned databases follow the encoding
//! `<region-code>_d1_<numeric-id>_<slug>`: a 2-letter lowercase region code,
//! the numeric subscription id used as the provisioning correlation key, and
//! a free-form trailing slug. Names that do not match the encoding carry no
//! correlation key and the provisioning chain is skipped for them.

use std::sync::LazyLock;

use regex::Regex;

static CORRELATION_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]{2}_d1_(\d+)_").expect("static pattern is valid"));

/// Extract the correlation key from a source database name.
///
/// Matching is case-insensitive on the whole name. Returns `None` when the
/// name does not follow the encoding; never fails.
pub fn extract_correlation_key(database_name: &str) -> Option<String> {
    let lowered = database_name.to_lowercase();
    CORRELATION_KEY
        .captures(&lowered)
        .map(|captures| captures[1].to_string())
}

/// Compose a target database name from a subscription id, its display name,
/// and its region code.
///
/// Takes the first whitespace-delimited token of `display_name`, lowercases
/// it, composes `<region>_d1_<id>_<token>`, and strips every character that
/// is not an ASCII letter, digit, or underscore. A display name made of
/// non-ASCII characters degrades to a short or empty slug segment.
pub fn derive_target_name(id: &str, display_name: &str, region: &str) -> String {
    let slug = display_name
        .split_whitespace()
        .next()
        .unwrap_or("")
        .to_lowercase();

    let raw = format!("{}_d1_{}_{}", region.to_lowercase(), id, slug);
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_key_from_encoded_name() {
        assert_eq!(
            extract_correlation_key("sp_d1_123_acme"),
            Some("123".to_string())
        );
        assert_eq!(
            extract_correlation_key("rj_d1_456_empresa"),
            Some("456".to_string())
        );
    }

    #[test]
    fn extraction_is_case_insensitive() {
        assert_eq!(
            extract_correlation_key("SP_D1_123_ACME"),
            Some("123".to_string())
        );
    }

    #[test]
    fn unencoded_names_have_no_key() {
        assert_eq!(extract_correlation_key("banco_invalido"), None);
        assert_eq!(extract_correlation_key(""), None);
        // Region code must be exactly two letters.
        assert_eq!(extract_correlation_key("abc_d1_1_x"), None);
        // Numeric id must be present.
        assert_eq!(extract_correlation_key("sp_d1__x"), None);
    }

    #[test]
    fn derives_target_name_from_first_token() {
        assert_eq!(derive_target_name("55", "Acme Corp", "SP"), "sp_d1_55_acme");
        assert_eq!(
            derive_target_name("901", "Varejo Ltda", "RJ"),
            "rj_d1_901_varejo"
        );
    }

    #[test]
    fn derivation_strips_everything_but_word_characters() {
        assert_eq!(
            derive_target_name("7", "Açaí & Cia.", "SP"),
            "sp_d1_7_aa"
        );
    }

    #[test]
    fn empty_display_name_yields_empty_slug() {
        assert_eq!(derive_target_name("9", "", "MG"), "mg_d1_9_");
        assert_eq!(derive_target_name("9", "   ", "MG"), "mg_d1_9_");
    }
}
