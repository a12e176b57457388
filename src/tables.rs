use crate::error::AppError;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, warn};

/// Immutable reference data the extractor consults: constructed once at
/// startup, read-only afterwards. Kept as data rather than code literals so
/// a classifier retrain can ship new tables without a rebuild.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReferenceTables {
    pub dangerous_chars: Vec<char>,
    pub dangerous_tlds: HashSet<String>,
    pub suspicious_keywords: Vec<String>,
    pub brands: Vec<String>,
    /// Ordered substitution pairs. Order matters: "1" -> "l" must run
    /// before "l" -> "i", matching the sequence the classifier saw in
    /// training.
    pub confusables: Vec<(String, String)>,
    /// Registrable domains, lowercase.
    pub whitelist: HashSet<String>,
}

impl Default for ReferenceTables {
    fn default() -> Self {
        Self {
            dangerous_chars: vec!['@', '?', '-', '=', '&', '%'],
            dangerous_tlds: ["tk", "ml", "ga", "cf", "gq"]
                .into_iter()
                .map(String::from)
                .collect(),
            suspicious_keywords: [
                "secure",
                "account",
                "update",
                "login",
                "verify",
                "signin",
                "bank",
                "notify",
                "click",
                "inconvenient",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            brands: [
                "google",
                "facebook",
                "paypal",
                "amazon",
                "apple",
                "microsoft",
                "youtube",
                "netflix",
                "twitter",
                "instagram",
                "linkedin",
                "github",
                "dropbox",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            confusables: [
                ("0", "o"),
                ("1", "l"),
                ("3", "e"),
                ("5", "s"),
                ("7", "t"),
                ("8", "b"),
                ("9", "g"),
                ("l", "i"),
                ("rn", "m"),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
            whitelist: [
                "google.com",
                "youtube.com",
                "facebook.com",
                "twitter.com",
                "wikipedia.org",
                "microsoft.com",
                "amazon.com",
                "apple.com",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

impl ReferenceTables {
    pub fn load_from_file(path: &str) -> Result<Self, AppError> {
        let content = std::fs::read_to_string(path)?;
        let tables: ReferenceTables = serde_json::from_str(&content)?;
        debug!(
            "Loaded reference tables from {}: {} keywords, {} brands, {} whitelisted domains",
            path,
            tables.suspicious_keywords.len(),
            tables.brands.len(),
            tables.whitelist.len()
        );
        Ok(tables)
    }

    /// Load-or-default: a missing tables file is not fatal, the built-in
    /// tables match what the bundled model was trained against.
    pub fn load_or_default(path: &str) -> Self {
        if Path::new(path).exists() {
            match Self::load_from_file(path) {
                Ok(tables) => return tables,
                Err(e) => warn!("Failed to load reference tables from {}: {}", path, e),
            }
        } else {
            warn!("Reference tables not found at {}, using built-in defaults", path);
        }
        Self::default()
    }

    pub fn is_dangerous_char(&self, c: char) -> bool {
        self.dangerous_chars.contains(&c)
    }

    pub fn is_dangerous_tld(&self, suffix: &str) -> bool {
        self.dangerous_tlds.contains(suffix)
    }

    pub fn is_whitelisted(&self, registered_domain: &str) -> bool {
        self.whitelist.contains(registered_domain)
    }

    /// Applies each confusable mapping once, in table order, as a plain
    /// global replace. Non-recursive within a single mapping, but a later
    /// mapping may rewrite the output of an earlier one.
    pub fn normalize_confusables(&self, s: &str) -> String {
        let mut normalized = s.to_string();
        for (from, to) in &self.confusables {
            normalized = normalized.replace(from.as_str(), to);
        }
        normalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_carry_expected_entries() {
        let tables = ReferenceTables::default();
        assert!(tables.is_dangerous_char('@'));
        assert!(!tables.is_dangerous_char('a'));
        assert!(tables.is_dangerous_tld("tk"));
        assert!(!tables.is_dangerous_tld("com"));
        assert!(tables.is_whitelisted("google.com"));
        assert!(!tables.is_whitelisted("google"));
        assert!(tables.brands.contains(&"paypal".to_string()));
    }

    #[test]
    fn confusable_normalization_is_sequential() {
        let tables = ReferenceTables::default();
        assert_eq!(tables.normalize_confusables("go0gle"), "googie");
        assert_eq!(tables.normalize_confusables("payp4l"), "payp4i");
        // "rn" collapses to "m" after the single-char passes.
        assert_eq!(tables.normalize_confusables("rnicrosoft"), "microsoft");
        // "1" becomes "l" which the later "l" -> "i" mapping rewrites.
        assert_eq!(tables.normalize_confusables("goog1e"), "googie");
    }

    #[test]
    fn load_from_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"whitelist": ["example.org"], "brands": ["examplebrand"]}}"#
        )
        .unwrap();

        let tables =
            ReferenceTables::load_from_file(file.path().to_str().unwrap()).unwrap();
        assert!(tables.is_whitelisted("example.org"));
        assert!(!tables.is_whitelisted("google.com"));
        // Unlisted sections keep their defaults.
        assert!(tables.is_dangerous_tld("tk"));
    }

    #[test]
    fn load_or_default_falls_back_on_missing_file() {
        let tables = ReferenceTables::load_or_default("/nonexistent/tables.json");
        assert!(tables.is_whitelisted("google.com"));
    }
}
