use crate::error::AppError;
use crate::types::{Label, FEATURE_COUNT};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Standardizes raw features with stored centering/scaling parameters.
/// The parameters are external state owned by the classifier side and must
/// be applied in the same feature order the extractor emits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl FeatureScaler {
    /// A scaler that leaves features untouched.
    pub fn identity() -> Self {
        Self {
            mean: vec![0.0; FEATURE_COUNT],
            scale: vec![1.0; FEATURE_COUNT],
        }
    }

    pub fn load_from_file(path: &str) -> Result<Self, AppError> {
        let content = std::fs::read_to_string(path)?;
        let scaler: FeatureScaler = serde_json::from_str(&content)?;
        if scaler.mean.len() != FEATURE_COUNT || scaler.scale.len() != FEATURE_COUNT {
            return Err(AppError::ModelLoad(format!(
                "scaler at {} has {}/{} parameters, expected {}",
                path,
                scaler.mean.len(),
                scaler.scale.len(),
                FEATURE_COUNT
            )));
        }
        debug!("Loaded feature scaler from {}", path);
        Ok(scaler)
    }

    pub fn transform(&self, features: &[f64; FEATURE_COUNT]) -> [f64; FEATURE_COUNT] {
        let mut scaled = [0.0; FEATURE_COUNT];
        for i in 0..FEATURE_COUNT {
            // Zero variance means the column was constant in training;
            // scikit-learn treats its scale as 1.
            let scale = if self.scale[i] == 0.0 { 1.0 } else { self.scale[i] };
            scaled[i] = (features[i] - self.mean[i]) / scale;
        }
        scaled
    }
}

/// Pre-trained binary classifier: logistic regression over the scaled
/// 16-feature vector. The extractor knows nothing about it beyond the
/// predict contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhishingModel {
    pub weights: Vec<f64>,
    pub bias: f64,
    pub version: String,
}

impl PhishingModel {
    pub fn load_from_file(path: &str) -> Result<Self, AppError> {
        let content = std::fs::read_to_string(path)?;
        let model: PhishingModel = serde_json::from_str(&content)?;
        if model.weights.len() != FEATURE_COUNT {
            return Err(AppError::ModelLoad(format!(
                "model at {} has {} weights, expected {}",
                path,
                model.weights.len(),
                FEATURE_COUNT
            )));
        }
        debug!("Loaded phishing model from {}: version {}", path, model.version);
        Ok(model)
    }

    /// Phishing probability in [0, 1] for an already-scaled vector.
    pub fn predict_probability(&self, scaled: &[f64; FEATURE_COUNT]) -> f64 {
        let mut score = self.bias;
        for (weight, value) in self.weights.iter().zip(scaled.iter()) {
            score += weight * value;
        }
        sigmoid(score)
    }

    pub fn predict(&self, scaled: &[f64; FEATURE_COUNT]) -> (Label, f64) {
        let probability = self.predict_probability(scaled);
        let label = if probability >= 0.5 {
            Label::Phishing
        } else {
            Label::Benign
        };
        (label, probability)
    }
}

impl Default for PhishingModel {
    fn default() -> Self {
        // Fallback weights over standardized features, ordered per
        // FEATURE_NAMES. Used only when no trained artifact is shipped.
        Self {
            weights: vec![
                0.35,  // url_length
                0.20,  // num_dots
                0.10,  // num_slashes
                0.45,  // dangerous_char_ratio
                0.40,  // numerical_char_ratio
                0.90,  // dangerous_tld
                0.30,  // entropy
                0.85,  // is_ip_host
                0.05,  // domain_length
                0.05,  // full_domain_length
                0.25,  // subdomain_count
                0.70,  // suspicious_keyword_ratio
                0.40,  // has_repetitions
                0.60,  // redirection_flag
                -0.55, // brand_spoof_distance (closer to a brand = riskier)
                -1.60, // is_whitelisted
            ],
            bias: -1.0,
            version: "default".to_string(),
        }
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}
