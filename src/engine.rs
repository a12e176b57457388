use crate::{
    config::Config,
    error::AppError,
    features::FeatureExtractor,
    model::{FeatureScaler, PhishingModel},
    tables::ReferenceTables,
    types::PredictResponse,
};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Owns the reference tables, the extractor and the classifier artifacts.
/// Everything is loaded once at startup and read-only afterwards, so the
/// engine can be shared across request handlers without locking.
pub struct DetectionEngine {
    extractor: FeatureExtractor,
    scaler: FeatureScaler,
    model: PhishingModel,
}

impl DetectionEngine {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        info!("Initializing detection engine...");

        let tables = Arc::new(ReferenceTables::load_or_default(&config.tables_path));
        let extractor = FeatureExtractor::new(Arc::clone(&tables));

        let scaler = if Path::new(&config.scaler_path).exists() {
            FeatureScaler::load_from_file(&config.scaler_path)?
        } else {
            warn!(
                "Scaler not found at {}, using identity scaling",
                config.scaler_path
            );
            FeatureScaler::identity()
        };

        let model = if Path::new(&config.model_path).exists() {
            PhishingModel::load_from_file(&config.model_path)?
        } else {
            warn!(
                "Model not found at {}, using built-in default weights",
                config.model_path
            );
            PhishingModel::default()
        };

        info!("Detection engine initialized, model version {}", model.version);

        Ok(Self {
            extractor,
            scaler,
            model,
        })
    }

    /// Classifies one URL. Errors are terminal for the call: extraction is
    /// deterministic, so retrying an identical input never changes the
    /// outcome.
    pub fn predict(&self, url: &str) -> Result<PredictResponse, AppError> {
        self.validate_url(url)?;

        let features = self.extractor.extract(url)?;
        debug!("Extracted features for {}: {:?}", url, features);

        let scaled = self.scaler.transform(&features.to_vector());
        let (label, probability) = self.model.predict(&scaled);

        Ok(PredictResponse {
            url: url.to_string(),
            prediction: label,
            phishing_probability: round4(probability),
        })
    }

    fn validate_url(&self, url: &str) -> Result<(), AppError> {
        if url.trim().is_empty() {
            return Err(AppError::InvalidInput("URL cannot be empty".to_string()));
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(AppError::InvalidInput(
                "URL must carry an http:// or https:// scheme".to_string(),
            ));
        }
        Ok(())
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Label;

    fn engine() -> DetectionEngine {
        // The bundled artifacts; cargo runs tests from the crate root.
        let config = Config {
            port: 0,
            model_path: "data/model.json".to_string(),
            scaler_path: "data/scaler.json".to_string(),
            tables_path: "data/tables.json".to_string(),
        };
        DetectionEngine::new(&config).unwrap()
    }

    #[test]
    fn starts_with_defaults_when_artifacts_are_missing() {
        let config = Config {
            port: 0,
            model_path: "/nonexistent/model.json".to_string(),
            scaler_path: "/nonexistent/scaler.json".to_string(),
            tables_path: "/nonexistent/tables.json".to_string(),
        };
        let engine = DetectionEngine::new(&config).unwrap();
        let response = engine.predict("https://example.com/").unwrap();
        assert!((0.0..=1.0).contains(&response.phishing_probability));
    }

    #[test]
    fn predict_returns_probability_in_range() {
        let engine = engine();
        let response = engine
            .predict("http://paypa1-login.serve.tk/verify//account?id=1")
            .unwrap();
        assert!((0.0..=1.0).contains(&response.phishing_probability));
        // Rounded to 4 decimal places.
        let scaled = response.phishing_probability * 10_000.0;
        assert_eq!(scaled, scaled.round());
    }

    #[test]
    fn rejects_missing_scheme() {
        let engine = engine();
        assert!(matches!(
            engine.predict("www.google.com"),
            Err(AppError::InvalidInput(_))
        ));
        assert!(matches!(
            engine.predict("ftp://example.com"),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn rejects_empty_url() {
        let engine = engine();
        assert!(matches!(
            engine.predict(""),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn prediction_is_deterministic() {
        let engine = engine();
        let url = "https://secure-login.go0gle.cf/update";
        let first = engine.predict(url).unwrap();
        let second = engine.predict(url).unwrap();
        assert_eq!(first.prediction, second.prediction);
        assert_eq!(first.phishing_probability, second.phishing_probability);
    }

    #[test]
    fn whitelisted_url_leans_benign() {
        let engine = engine();
        let benign = engine
            .predict("https://www.google.com/search?q=x")
            .unwrap();
        let risky = engine
            .predict("http://192.168.0.1//secure-login.tk/verify-account-update?signin=1&bank=1")
            .unwrap();
        assert!(benign.phishing_probability < risky.phishing_probability);
        assert_eq!(benign.prediction, Label::Benign);
    }
}
