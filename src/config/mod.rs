use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub recommendation: RecommendationConfig,
    pub generator: GeneratorConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        let ip = self
            .host
            .parse::<IpAddr>()
            .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        SocketAddr::new(ip, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationConfig {
    pub default_n: usize,
    pub max_n: usize,
    pub min_rating_threshold: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub num_users: usize,
    pub num_items: usize,
    pub max_users: usize,
    pub max_items: usize,
    pub ratings_per_user: usize,
    pub seed: Option<u64>,
    pub price_min: f64,
    pub price_max: f64,
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                workers: num_cpus::get(),
            },
            recommendation: RecommendationConfig {
                default_n: 5,
                max_n: 100,
                min_rating_threshold: 4.0,
            },
            generator: GeneratorConfig::default(),
            cache: CacheConfig { capacity: 8 },
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            num_users: 100,
            num_items: 50,
            max_users: 1000,
            max_items: 1000,
            ratings_per_user: 10,
            seed: Some(42),
            price_min: 20.0,
            price_max: 100.0,
            categories: [
                "Shirt", "Pants", "Shoes", "Jacket", "Hat", "Gloves", "Sweater", "Dress", "Scarf", "Boots",
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
        }
    }
}

impl Config {
    /// Loads a TOML/YAML/JSON file layered under `PIVOTREC__*` environment
    /// overrides (e.g. `PIVOTREC__SERVER__PORT=9000`).
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Config::default())?)
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("PIVOTREC").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Loads `path` when it exists, otherwise falls back to defaults.
    pub fn load_or_default(path: &str) -> anyhow::Result<Self> {
        if std::path::Path::new(path).exists() {
            Self::from_file(path)
        } else {
            tracing::info!("Config file {} not found, using default configuration", path);
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_dashboard() {
        let config = Config::default();
        assert_eq!(config.recommendation.default_n, 5);
        assert_eq!(config.recommendation.min_rating_threshold, 4.0);
        assert_eq!(config.generator.num_users, 100);
        assert_eq!(config.generator.num_items, 50);
        assert_eq!(config.generator.categories.len(), 10);
        assert!(config.server.workers >= 1);
    }

    #[test]
    fn test_socket_addr() {
        let server = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 9000,
            workers: 1,
        };
        assert_eq!(server.socket_addr().to_string(), "127.0.0.1:9000");
    }

    #[test]
    fn test_missing_file_falls_back() {
        let config = Config::load_or_default("does/not/exist.toml").unwrap();
        assert_eq!(config.server.port, 8080);
    }
}
