use serde::{Deserialize, Serialize};

/// Number of features the classifier was trained on. The scaler and model
/// files are rejected at load time if their dimensions disagree.
pub const FEATURE_COUNT: usize = 16;

/// Feature names in training order. `UrlFeatures::to_vector` must emit
/// values in exactly this order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "url_length",
    "num_dots",
    "num_slashes",
    "dangerous_char_ratio",
    "numerical_char_ratio",
    "dangerous_tld",
    "entropy",
    "is_ip_host",
    "domain_length",
    "full_domain_length",
    "subdomain_count",
    "suspicious_keyword_ratio",
    "has_repetitions",
    "redirection_flag",
    "brand_spoof_distance",
    "is_whitelisted",
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Phishing,
    Benign,
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Label::Phishing => write!(f, "phishing"),
            Label::Benign => write!(f, "benign"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub url: String,
    pub prediction: Label,
    pub phishing_probability: f64,
}

/// Read-only view of the URL's authority component, computed once per
/// extraction call.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainInfo {
    /// Dot-separated labels left of the registrable domain, possibly empty.
    pub subdomain: String,
    /// The registrable label, e.g. "google" in "www.google.com".
    pub domain: String,
    /// The public suffix, e.g. "com" or "co.uk". Empty when the host
    /// carries no known suffix (single labels, IP literals).
    pub suffix: String,
    /// Domain plus suffix, e.g. "google.com". Empty when either part is
    /// missing.
    pub registered_domain: String,
    /// Full lowercased authority string.
    pub hostname: String,
}

/// One extracted feature set, named fields in training order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlFeatures {
    pub url_length: f64,
    pub num_dots: f64,
    pub num_slashes: f64,
    pub dangerous_char_ratio: f64,
    pub numerical_char_ratio: f64,
    pub dangerous_tld: f64,
    pub entropy: f64,
    pub is_ip_host: f64,
    pub domain_length: f64,
    pub full_domain_length: f64,
    pub subdomain_count: f64,
    pub suspicious_keyword_ratio: f64,
    pub has_repetitions: f64,
    pub redirection_flag: f64,
    pub brand_spoof_distance: f64,
    pub is_whitelisted: f64,
}

impl UrlFeatures {
    /// Freezes the feature order the classifier expects. The classifier
    /// receives a plain array and has no feature names at inference time,
    /// so any reordering here silently corrupts predictions.
    pub fn to_vector(&self) -> [f64; FEATURE_COUNT] {
        [
            self.url_length,
            self.num_dots,
            self.num_slashes,
            self.dangerous_char_ratio,
            self.numerical_char_ratio,
            self.dangerous_tld,
            self.entropy,
            self.is_ip_host,
            self.domain_length,
            self.full_domain_length,
            self.subdomain_count,
            self.suspicious_keyword_ratio,
            self.has_repetitions,
            self.redirection_flag,
            self.brand_spoof_distance,
            self.is_whitelisted,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_names_match_vector_width() {
        assert_eq!(FEATURE_NAMES.len(), FEATURE_COUNT);
        let features = UrlFeatures {
            url_length: 1.0,
            num_dots: 2.0,
            num_slashes: 3.0,
            dangerous_char_ratio: 4.0,
            numerical_char_ratio: 5.0,
            dangerous_tld: 6.0,
            entropy: 7.0,
            is_ip_host: 8.0,
            domain_length: 9.0,
            full_domain_length: 10.0,
            subdomain_count: 11.0,
            suspicious_keyword_ratio: 12.0,
            has_repetitions: 13.0,
            redirection_flag: 14.0,
            brand_spoof_distance: 15.0,
            is_whitelisted: 16.0,
        };
        let vector = features.to_vector();
        assert_eq!(vector.len(), FEATURE_COUNT);
        // Position i must hold the field named by FEATURE_NAMES[i].
        assert_eq!(vector[0], features.url_length);
        assert_eq!(vector[5], features.dangerous_tld);
        assert_eq!(vector[14], features.brand_spoof_distance);
        assert_eq!(vector[15], features.is_whitelisted);
    }

    #[test]
    fn label_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Label::Phishing).unwrap(),
            "\"phishing\""
        );
        assert_eq!(serde_json::to_string(&Label::Benign).unwrap(), "\"benign\"");
    }
}
