use serde::Deserialize;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub bargain: BargainRules,
    #[serde(default)]
    pub recommendation: RecommendationConfig,
    #[serde(default)]
    pub history: HistoryConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: default_port() }
    }
}

fn default_port() -> u16 { 8080 }

#[derive(Debug, Deserialize, Clone, Default)]
pub struct StorageConfig {
    /// Directory for the file store. Unset means in-memory only.
    pub data_dir: Option<PathBuf>,
}

pub const DEV_JWT_SECRET: &str = "bazaar-dev-secret";

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    #[serde(default = "default_jwt_expiration")]
    pub jwt_expiration_seconds: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            jwt_expiration_seconds: default_jwt_expiration(),
        }
    }
}

fn default_jwt_secret() -> String { DEV_JWT_SECRET.to_string() }
fn default_jwt_expiration() -> u64 { 86_400 }

#[derive(Debug, Deserialize, Clone)]
pub struct BargainRules {
    /// Largest discount a buyer may ask for, as a percentage of the listed price.
    #[serde(default = "default_max_discount")]
    pub max_discount_percent: u8,
    /// Categories open to bargaining, by their lowercase name.
    #[serde(default = "default_eligible_categories")]
    pub eligible_categories: Vec<String>,
}

impl Default for BargainRules {
    fn default() -> Self {
        Self {
            max_discount_percent: default_max_discount(),
            eligible_categories: default_eligible_categories(),
        }
    }
}

fn default_max_discount() -> u8 { 20 }
fn default_eligible_categories() -> Vec<String> { vec!["electronics".to_string()] }

#[derive(Debug, Deserialize, Clone)]
pub struct RecommendationConfig {
    #[serde(default = "default_affinity_weight")]
    pub category_affinity_weight: f64,
    #[serde(default = "default_popularity_base")]
    pub popularity_base: f64,
    #[serde(default = "default_popularity_divisor")]
    pub popularity_divisor: f64,
    /// Upper bound (exclusive) of the random jitter added to every score.
    #[serde(default = "default_jitter")]
    pub jitter_max: f64,
    #[serde(default = "default_limit")]
    pub default_limit: usize,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            category_affinity_weight: default_affinity_weight(),
            popularity_base: default_popularity_base(),
            popularity_divisor: default_popularity_divisor(),
            jitter_max: default_jitter(),
            default_limit: default_limit(),
        }
    }
}

fn default_affinity_weight() -> f64 { 3.0 }
fn default_popularity_base() -> f64 { 100.0 }
fn default_popularity_divisor() -> f64 { 10.0 }
fn default_jitter() -> f64 { 2.0 }
fn default_limit() -> usize { 4 }

#[derive(Debug, Deserialize, Clone)]
pub struct HistoryConfig {
    #[serde(default = "default_history_capacity")]
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { capacity: default_history_capacity() }
    }
}

fn default_history_capacity() -> usize { 20 }

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `BAZAAR_SERVER__PORT=9000`
            .add_source(config::Environment::with_prefix("BAZAAR").separator("__"))
            .build()?;

        let config: Config = s.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the services cannot work with.
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.bargain.max_discount_percent > 100 {
            return Err(config::ConfigError::Message(format!(
                "bargain.max_discount_percent must be at most 100, got {}",
                self.bargain.max_discount_percent
            )));
        }
        Ok(())
    }
}
