use crate::{
    error::AppError,
    tables::ReferenceTables,
    types::{DomainInfo, UrlFeatures},
};
use std::collections::BTreeMap;
use std::sync::Arc;
use url::Url;

/// Pure, deterministic URL-to-feature-vector mapping. Touches only the
/// immutable reference tables and per-call locals, so it is safe to call
/// concurrently without locking.
pub struct FeatureExtractor {
    tables: Arc<ReferenceTables>,
}

impl FeatureExtractor {
    pub fn new(tables: Arc<ReferenceTables>) -> Self {
        Self { tables }
    }

    /// Extracts the full feature set for one URL.
    ///
    /// Empty (or all-whitespace) input is rejected up front rather than
    /// producing degenerate ratios; a URL without a usable hostname is
    /// rejected as malformed. No default vector is ever substituted for an
    /// error, a zero vector would read as confidently benign downstream.
    pub fn extract(&self, url: &str) -> Result<UrlFeatures, AppError> {
        if url.trim().is_empty() {
            return Err(AppError::InvalidInput("URL cannot be empty".to_string()));
        }

        let domain_info = self.parse_domain(url)?;

        let url_length = url.chars().count();
        let num_dots = url.chars().filter(|c| *c == '.').count();
        let num_slashes = url.chars().filter(|c| *c == '/').count();

        let dangerous_count = url
            .chars()
            .filter(|c| self.tables.is_dangerous_char(*c))
            .count();
        let numerical_count = url.chars().filter(|c| c.is_ascii_digit()).count();

        let url_lower = url.to_lowercase();
        let keyword_hits = self
            .tables
            .suspicious_keywords
            .iter()
            .filter(|keyword| url_lower.contains(keyword.as_str()))
            .count();
        // Ratio against the table size, not the URL length, so the value
        // stays in [0, 1] regardless of how long the URL is.
        let suspicious_keyword_ratio = if self.tables.suspicious_keywords.is_empty() {
            0.0
        } else {
            keyword_hits as f64 / self.tables.suspicious_keywords.len() as f64
        };

        let full_domain = format!("{}.{}", domain_info.domain, domain_info.suffix);
        let subdomain_count = if domain_info.subdomain.is_empty() {
            0
        } else {
            domain_info.subdomain.split('.').count()
        };

        Ok(UrlFeatures {
            url_length: url_length as f64,
            num_dots: num_dots as f64,
            num_slashes: num_slashes as f64,
            dangerous_char_ratio: dangerous_count as f64 / url_length as f64,
            numerical_char_ratio: numerical_count as f64 / url_length as f64,
            dangerous_tld: bool_flag(self.tables.is_dangerous_tld(&domain_info.suffix)),
            entropy: shannon_entropy(url),
            is_ip_host: bool_flag(is_dotted_quad(&domain_info.hostname)),
            domain_length: domain_info.domain.chars().count() as f64,
            full_domain_length: full_domain.chars().count() as f64,
            subdomain_count: subdomain_count as f64,
            suspicious_keyword_ratio,
            has_repetitions: bool_flag(has_repeated_run(&domain_info.domain)),
            redirection_flag: bool_flag(has_late_double_slash(url)),
            brand_spoof_distance: self.brand_spoof_distance(&domain_info.domain),
            is_whitelisted: bool_flag(
                self.tables.is_whitelisted(&domain_info.registered_domain),
            ),
        })
    }

    /// Splits the URL's authority into subdomain, registrable domain and
    /// public suffix using the compiled-in public suffix list. A naive
    /// last-two-labels split would mishandle multi-part suffixes like
    /// "co.uk".
    pub fn parse_domain(&self, url: &str) -> Result<DomainInfo, AppError> {
        let parsed = Url::parse(url)
            .map_err(|e| AppError::MalformedUrl(format!("{}: {}", url, e)))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| AppError::MalformedUrl(format!("{}: no hostname", url)))?;
        let hostname = host.to_lowercase();

        let known_suffix = match psl::suffix(hostname.as_bytes()) {
            Some(suffix) if suffix.is_known() => {
                psl::suffix_str(&hostname).map(str::to_owned)
            }
            _ => None,
        };

        let (subdomain, domain, suffix) = match known_suffix {
            // Host carries labels in front of the suffix.
            Some(suffix) if hostname.len() > suffix.len() => {
                let stem = &hostname[..hostname.len() - suffix.len() - 1];
                match stem.rsplit_once('.') {
                    Some((sub, dom)) => (sub.to_string(), dom.to_string(), suffix),
                    None => (String::new(), stem.to_string(), suffix),
                }
            }
            // Host is itself a public suffix, e.g. "co.uk".
            Some(suffix) => (String::new(), String::new(), suffix),
            // Single labels and IP literals: the whole host is the domain.
            None => (String::new(), hostname.clone(), String::new()),
        };

        let registered_domain = if domain.is_empty() || suffix.is_empty() {
            String::new()
        } else {
            format!("{}.{}", domain, suffix)
        };

        Ok(DomainInfo {
            subdomain,
            domain,
            suffix,
            registered_domain,
            hostname,
        })
    }

    /// Minimum Levenshtein distance between the confusable-normalized
    /// domain label and the brand reference set. Lower means more
    /// brand-like, which is suspicious when the registered domain is not
    /// actually the brand's.
    fn brand_spoof_distance(&self, domain: &str) -> f64 {
        let normalized = self.tables.normalize_confusables(&domain.to_lowercase());
        self.tables
            .brands
            .iter()
            .map(|brand| strsim::levenshtein(&normalized, brand))
            .min()
            .unwrap_or(0) as f64
    }
}

fn bool_flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

/// Base-2 Shannon entropy of the per-character frequency distribution.
/// Counting into a BTreeMap fixes the summation order, so repeated calls
/// agree bit for bit.
fn shannon_entropy(text: &str) -> f64 {
    let total = text.chars().count();
    if total == 0 {
        return 0.0;
    }

    let mut counts: BTreeMap<char, usize> = BTreeMap::new();
    for ch in text.chars() {
        *counts.entry(ch).or_insert(0) += 1;
    }

    let total = total as f64;
    let mut entropy = 0.0;
    for count in counts.values() {
        let probability = *count as f64 / total;
        entropy -= probability * probability.log2();
    }
    entropy
}

/// Loose IPv4 heuristic: four dot-separated all-digit labels, no 0-255
/// range validation.
fn is_dotted_quad(hostname: &str) -> bool {
    let parts: Vec<&str> = hostname.split('.').collect();
    parts.len() == 4
        && parts
            .iter()
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()))
}

/// True when any character repeats 3+ times consecutively.
fn has_repeated_run(text: &str) -> bool {
    let mut run = 0;
    let mut previous = None;
    for ch in text.chars() {
        if Some(ch) == previous {
            run += 1;
            if run >= 3 {
                return true;
            }
        } else {
            previous = Some(ch);
            run = 1;
        }
    }
    false
}

/// A "//" after the scheme delimiter suggests an embedded redirect target.
fn has_late_double_slash(url: &str) -> bool {
    match url.rfind("//") {
        Some(byte_index) => url[..byte_index].chars().count() > 7,
        None => false,
    }
}
