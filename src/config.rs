use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub model_path: String,
    pub scaler_path: String,
    pub tables_path: String,
}

impl Config {
    pub fn load() -> Self {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse()
            .unwrap_or(5000);

        let model_path =
            env::var("MODEL_PATH").unwrap_or_else(|_| "data/model.json".to_string());
        let scaler_path =
            env::var("SCALER_PATH").unwrap_or_else(|_| "data/scaler.json".to_string());
        let tables_path =
            env::var("TABLES_PATH").unwrap_or_else(|_| "data/tables.json".to_string());

        Config {
            port,
            model_path,
            scaler_path,
            tables_path,
        }
    }
}
