//! Service configuration.
//!
//! Values come from `HOUSING_*` environment variables with defaults, then an
//! optional YAML file named by `HOUSING_CONFIG` overrides individual fields.
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::str::FromStr;

pub const DEV_JWT_SECRET: &str = "housing-dev-secret-change-me";
pub const DEFAULT_FORUM_MAX_DEPTH: usize = 32;
/// Longest accepted access token lifetime: 30 days.
pub const MAX_TOKEN_TTL_SECONDS: u64 = 30 * 24 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Postgres,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            other => bail!("unknown storage backend {other:?} (expected memory or postgres)"),
        }
    }
}

#[derive(Clone)]
pub struct PostgresConfig {
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout_ms: u64,
    pub acquire_timeout_ms: u64,
}

// The URL may carry credentials.
impl std::fmt::Debug for PostgresConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresConfig")
            .field("url", &"<redacted>")
            .field("max_connections", &self.max_connections)
            .field("connect_timeout_ms", &self.connect_timeout_ms)
            .field("acquire_timeout_ms", &self.acquire_timeout_ms)
            .finish()
    }
}

#[derive(Clone)]
pub struct HousingConfig {
    pub bind_addr: SocketAddr,
    pub metrics_bind: SocketAddr,
    pub storage: StorageBackend,
    pub postgres: Option<PostgresConfig>,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub token_ttl_seconds: u64,
    pub forum_max_depth: usize,
    pub strict_ownership: bool,
}

impl std::fmt::Debug for HousingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HousingConfig")
            .field("bind_addr", &self.bind_addr)
            .field("metrics_bind", &self.metrics_bind)
            .field("storage", &self.storage)
            .field("postgres", &self.postgres)
            .field("jwt_secret", &"<redacted>")
            .field("jwt_issuer", &self.jwt_issuer)
            .field("token_ttl_seconds", &self.token_ttl_seconds)
            .field("forum_max_depth", &self.forum_max_depth)
            .field("strict_ownership", &self.strict_ownership)
            .finish()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct HousingConfigOverride {
    bind_addr: Option<String>,
    metrics_bind: Option<String>,
    storage: Option<String>,
    postgres_url: Option<String>,
    postgres_max_connections: Option<u32>,
    postgres_connect_timeout_ms: Option<u64>,
    postgres_acquire_timeout_ms: Option<u64>,
    jwt_secret: Option<String>,
    jwt_issuer: Option<String>,
    token_ttl_seconds: Option<u64>,
    forum_max_depth: Option<usize>,
    strict_ownership: Option<bool>,
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|err| anyhow::anyhow!("parse {key}: {err}")),
        Err(_) => Ok(default),
    }
}

fn env_flag(key: &str, default: bool) -> Result<bool> {
    match std::env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" | "" => Ok(false),
            other => bail!("parse {key}: expected a boolean, got {other:?}"),
        },
        Err(_) => Ok(default),
    }
}

impl HousingConfig {
    pub fn from_env() -> Result<Self> {
        let bind_addr = env_or("HOUSING_BIND", "0.0.0.0:8000".to_string())?
            .parse()
            .with_context(|| "parse HOUSING_BIND")?;
        let metrics_bind = env_or("HOUSING_METRICS_BIND", "0.0.0.0:9090".to_string())?
            .parse()
            .with_context(|| "parse HOUSING_METRICS_BIND")?;
        let storage = env_or("HOUSING_STORAGE", "memory".to_string())?.parse()?;
        let postgres_url = std::env::var("HOUSING_POSTGRES_URL")
            .or_else(|_| std::env::var("DATABASE_URL"))
            .ok();
        let postgres = match postgres_url {
            Some(url) => Some(PostgresConfig {
                url,
                max_connections: env_or("HOUSING_POSTGRES_MAX_CONNECTIONS", 10)?,
                connect_timeout_ms: env_or("HOUSING_POSTGRES_CONNECT_TIMEOUT_MS", 5_000)?,
                acquire_timeout_ms: env_or("HOUSING_POSTGRES_ACQUIRE_TIMEOUT_MS", 5_000)?,
            }),
            None => None,
        };
        Ok(Self {
            bind_addr,
            metrics_bind,
            storage,
            postgres,
            jwt_secret: std::env::var("HOUSING_JWT_SECRET")
                .unwrap_or_else(|_| DEV_JWT_SECRET.to_string()),
            jwt_issuer: std::env::var("HOUSING_JWT_ISSUER")
                .unwrap_or_else(|_| "housing-api".to_string()),
            token_ttl_seconds: env_or("HOUSING_TOKEN_TTL_SECONDS", 3_600)?,
            forum_max_depth: env_or("HOUSING_FORUM_MAX_DEPTH", DEFAULT_FORUM_MAX_DEPTH)?,
            strict_ownership: env_flag("HOUSING_STRICT_OWNERSHIP", false)?,
        })
    }

    pub fn from_env_or_yaml() -> Result<Self> {
        let mut config = Self::from_env()?;
        if let Ok(path) = std::env::var("HOUSING_CONFIG") {
            let contents =
                fs::read_to_string(&path).with_context(|| format!("read HOUSING_CONFIG: {path}"))?;
            let override_cfg: HousingConfigOverride =
                serde_yaml::from_str(&contents).with_context(|| "parse housing config yaml")?;
            config.apply(override_cfg)?;
        }
        config.validate()?;
        Ok(config)
    }

    fn apply(&mut self, file: HousingConfigOverride) -> Result<()> {
        if let Some(value) = file.bind_addr {
            self.bind_addr = value.parse().with_context(|| "parse bind_addr")?;
        }
        if let Some(value) = file.metrics_bind {
            self.metrics_bind = value.parse().with_context(|| "parse metrics_bind")?;
        }
        if let Some(value) = file.storage {
            self.storage = value.parse()?;
        }
        if let Some(url) = file.postgres_url {
            let current = self.postgres.take();
            self.postgres = Some(PostgresConfig {
                url,
                max_connections: current.as_ref().map_or(10, |pg| pg.max_connections),
                connect_timeout_ms: current.as_ref().map_or(5_000, |pg| pg.connect_timeout_ms),
                acquire_timeout_ms: current.as_ref().map_or(5_000, |pg| pg.acquire_timeout_ms),
            });
        }
        if let Some(pg) = self.postgres.as_mut() {
            if let Some(value) = file.postgres_max_connections {
                pg.max_connections = value;
            }
            if let Some(value) = file.postgres_connect_timeout_ms {
                pg.connect_timeout_ms = value;
            }
            if let Some(value) = file.postgres_acquire_timeout_ms {
                pg.acquire_timeout_ms = value;
            }
        }
        if let Some(value) = file.jwt_secret {
            self.jwt_secret = value;
        }
        if let Some(value) = file.jwt_issuer {
            self.jwt_issuer = value;
        }
        if let Some(value) = file.token_ttl_seconds {
            self.token_ttl_seconds = value;
        }
        if let Some(value) = file.forum_max_depth {
            self.forum_max_depth = value;
        }
        if let Some(value) = file.strict_ownership {
            self.strict_ownership = value;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.jwt_secret.is_empty() {
            bail!("jwt secret must not be empty");
        }
        if self.token_ttl_seconds == 0 {
            bail!("token ttl must be positive");
        }
        if self.token_ttl_seconds > MAX_TOKEN_TTL_SECONDS {
            bail!(
                "token ttl of {}s exceeds the {MAX_TOKEN_TTL_SECONDS}s maximum",
                self.token_ttl_seconds
            );
        }
        if self.forum_max_depth == 0 {
            bail!("forum max depth must be at least 1");
        }
        Ok(())
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    struct EnvGuard {
        key: &'static str,
        prev: Option<String>,
    }

    impl EnvGuard {
        fn set(key: &'static str, value: &str) -> Self {
            let prev = std::env::var(key).ok();
            unsafe {
                std::env::set_var(key, value);
            }
            Self { key, prev }
        }

        fn unset(key: &'static str) -> Self {
            let prev = std::env::var(key).ok();
            unsafe {
                std::env::remove_var(key);
            }
            Self { key, prev }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.prev {
                Some(value) => unsafe {
                    std::env::set_var(self.key, value);
                },
                None => unsafe {
                    std::env::remove_var(self.key);
                },
            }
        }
    }

    fn clear_env() -> Vec<EnvGuard> {
        [
            "HOUSING_BIND",
            "HOUSING_METRICS_BIND",
            "HOUSING_STORAGE",
            "HOUSING_POSTGRES_URL",
            "DATABASE_URL",
            "HOUSING_JWT_SECRET",
            "HOUSING_TOKEN_TTL_SECONDS",
            "HOUSING_FORUM_MAX_DEPTH",
            "HOUSING_STRICT_OWNERSHIP",
            "HOUSING_CONFIG",
        ]
        .into_iter()
        .map(EnvGuard::unset)
        .collect()
    }

    #[test]
    #[serial]
    fn defaults_without_env() {
        let _guards = clear_env();
        let config = HousingConfig::from_env_or_yaml().expect("config");
        assert_eq!(config.bind_addr, "0.0.0.0:8000".parse().expect("addr"));
        assert_eq!(config.storage, StorageBackend::Memory);
        assert!(config.postgres.is_none());
        assert!(config.uses_dev_secret());
        assert_eq!(config.forum_max_depth, DEFAULT_FORUM_MAX_DEPTH);
        assert!(!config.strict_ownership);
    }

    #[test]
    #[serial]
    fn env_values_are_parsed() {
        let _guards = clear_env();
        let _g1 = EnvGuard::set("HOUSING_STORAGE", "postgres");
        let _g2 = EnvGuard::set("DATABASE_URL", "postgres://localhost/housing");
        let _g3 = EnvGuard::set("HOUSING_STRICT_OWNERSHIP", "true");
        let _g4 = EnvGuard::set("HOUSING_FORUM_MAX_DEPTH", "4");
        let config = HousingConfig::from_env_or_yaml().expect("config");
        assert_eq!(config.storage, StorageBackend::Postgres);
        let pg = config.postgres.expect("postgres");
        assert_eq!(pg.url, "postgres://localhost/housing");
        assert_eq!(pg.max_connections, 10);
        assert!(config.strict_ownership);
        assert_eq!(config.forum_max_depth, 4);
    }

    #[test]
    #[serial]
    fn invalid_env_values_fail() {
        let _guards = clear_env();
        let _g1 = EnvGuard::set("HOUSING_STRICT_OWNERSHIP", "maybe");
        assert!(HousingConfig::from_env().is_err());
        drop(_g1);
        let _g2 = EnvGuard::set("HOUSING_STORAGE", "sqlite");
        assert!(HousingConfig::from_env().is_err());
    }

    #[test]
    #[serial]
    fn yaml_overrides_env() {
        let _guards = clear_env();
        let dir = std::env::temp_dir().join(format!("housing-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("dir");
        let path = dir.join("housing.yaml");
        let mut file = std::fs::File::create(&path).expect("file");
        writeln!(
            file,
            "bind_addr: \"127.0.0.1:8181\"\njwt_secret: \"from-file\"\nforum_max_depth: 8\npostgres_url: \"postgres://db/housing\"\npostgres_max_connections: 3"
        )
        .expect("write");
        let _g = EnvGuard::set("HOUSING_CONFIG", path.to_str().expect("utf8 path"));

        let config = HousingConfig::from_env_or_yaml().expect("config");
        assert_eq!(config.bind_addr, "127.0.0.1:8181".parse().expect("addr"));
        assert_eq!(config.jwt_secret, "from-file");
        assert!(!config.uses_dev_secret());
        assert_eq!(config.forum_max_depth, 8);
        let pg = config.postgres.expect("postgres");
        assert_eq!(pg.max_connections, 3);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    #[serial]
    fn zero_depth_is_rejected() {
        let _guards = clear_env();
        let _g = EnvGuard::set("HOUSING_FORUM_MAX_DEPTH", "0");
        assert!(HousingConfig::from_env_or_yaml().is_err());
    }

    #[test]
    #[serial]
    fn token_ttl_is_bounded() {
        let _guards = clear_env();
        let _g = EnvGuard::set("HOUSING_TOKEN_TTL_SECONDS", "9223372036854775807");
        assert!(HousingConfig::from_env_or_yaml().is_err());
        drop(_g);
        let _g = EnvGuard::set(
            "HOUSING_TOKEN_TTL_SECONDS",
            &MAX_TOKEN_TTL_SECONDS.to_string(),
        );
        let config = HousingConfig::from_env_or_yaml().expect("config");
        assert_eq!(config.token_ttl_seconds, MAX_TOKEN_TTL_SECONDS);
    }

    #[test]
    fn debug_redacts_secrets() {
        let pg = PostgresConfig {
            url: "postgres://user:hunter2@db/housing".to_string(),
            max_connections: 1,
            connect_timeout_ms: 1,
            acquire_timeout_ms: 1,
        };
        assert!(!format!("{pg:?}").contains("hunter2"));
    }
}
