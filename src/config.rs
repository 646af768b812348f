use crate::service::Tolerances;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub compare: CompareConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// 数值比对容差
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareConfig {
    pub quantity_tolerance: f64,
    pub value_tolerance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub max_entries: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        let tolerances = Tolerances::default();
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            compare: CompareConfig {
                quantity_tolerance: tolerances.quantity,
                value_tolerance: tolerances.value,
            },
            cache: CacheConfig { max_entries: 256 },
        }
    }
}

impl AppConfig {
    /// 默认值 -> config/cofc.* (可选) -> COFC_ 环境变量, 例如 `COFC_SERVER__PORT=9000`
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Config::builder()
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", i64::from(defaults.server.port))?
            .set_default("compare.quantity_tolerance", defaults.compare.quantity_tolerance)?
            .set_default("compare.value_tolerance", defaults.compare.value_tolerance)?
            .set_default("cache.max_entries", defaults.cache.max_entries as i64)?
            .add_source(File::with_name("config/cofc").required(false))
            .add_source(
                Environment::with_prefix("COFC")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// 加载配置, 失败时退回默认值
    pub fn from_env() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!("配置加载失败, 使用默认配置: {}", e);
            Self::default()
        })
    }

    pub fn tolerances(&self) -> Tolerances {
        Tolerances {
            quantity: self.compare.quantity_tolerance,
            value: self.compare.value_tolerance,
        }
    }
}
