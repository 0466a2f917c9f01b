use base64::engine::general_purpose::STANDARD as b64;
use base64::Engine;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

const DB_USERNAME_VAR: &str = "LEDGER_DB_USERNAME";
const DB_PASSWORD_VAR: &str = "LEDGER_DB_PASSWORD";
const DB_HOSTNAME_VAR: &str = "LEDGER_DB_HOSTNAME";
const DB_PORT_VAR: &str = "LEDGER_DB_PORT";
const DB_NAME_VAR: &str = "LEDGER_DB_NAME";
const DB_MAX_CONNECTIONS_VAR: &str = "LEDGER_DB_MAX_CONNECTIONS";
const DB_IDLE_TIMEOUT_SECS_VAR: &str = "LEDGER_DB_IDLE_TIMEOUT_SECS";

const HASHING_KEY_VAR: &str = "LEDGER_HASHING_KEY_B64";
const TOKEN_SIGNING_KEY_VAR: &str = "LEDGER_TOKEN_SIGNING_KEY_B64";

const HASH_LENGTH_VAR: &str = "LEDGER_HASH_LENGTH";
const HASH_ITERATIONS_VAR: &str = "LEDGER_HASH_ITERATIONS";
const HASH_MEM_COST_KIB_VAR: &str = "LEDGER_HASH_MEM_COST_KIB";
const HASH_THREADS_VAR: &str = "LEDGER_HASH_THREADS";
const HASH_SALT_LENGTH_VAR: &str = "LEDGER_HASH_SALT_LENGTH";

const ACCESS_TOKEN_LIFETIME_MINS_VAR: &str = "LEDGER_ACCESS_TOKEN_LIFETIME_MINS";

const ACTIX_WORKER_COUNT_VAR: &str = "LEDGER_ACTIX_WORKER_COUNT";
const LOG_LEVEL_VAR: &str = "LEDGER_LOG_LEVEL";

const HASHING_KEY_SIZE: usize = 32;
const TOKEN_SIGNING_KEY_SIZE: usize = 64;

pub struct Config {
    /// Absent when the server runs against the in-memory store
    pub db: Option<DbConfig>,
    pub auth: AuthConfig,

    pub actix_worker_count: usize,
    pub log_level: String,
}

#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DbConfig {
    pub username: String,
    pub password: String,
    pub hostname: String,
    pub port: u16,
    pub name: String,
    #[zeroize(skip)]
    pub max_connections: u32,
    #[zeroize(skip)]
    pub idle_timeout: Duration,
}

impl DbConfig {
    pub fn database_uri(&self) -> Zeroizing<String> {
        Zeroizing::new(format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.hostname, self.port, self.name,
        ))
    }
}

#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct AuthConfig {
    pub hashing_key: [u8; HASHING_KEY_SIZE],
    pub token_signing_key: [u8; TOKEN_SIGNING_KEY_SIZE],

    pub hash_length: u32,
    pub hash_iterations: u32,
    pub hash_mem_cost_kib: u32,
    pub hash_threads: u32,
    pub hash_salt_length: u32,

    #[zeroize(skip)]
    pub access_token_lifetime: Duration,
}

impl Config {
    pub fn from_env(in_memory: bool) -> Result<Config, ConfigError> {
        let db = if in_memory {
            None
        } else {
            Some(DbConfig::from_env()?)
        };

        Ok(Config {
            db,
            auth: AuthConfig::from_env()?,
            actix_worker_count: env_var_or(ACTIX_WORKER_COUNT_VAR, num_cpus::get()),
            log_level: env_var_or(LOG_LEVEL_VAR, String::from("info")),
        })
    }
}

impl DbConfig {
    fn from_env() -> Result<DbConfig, ConfigError> {
        Ok(DbConfig {
            username: env_var(DB_USERNAME_VAR)?,
            password: env_var(DB_PASSWORD_VAR)?,
            hostname: env_var(DB_HOSTNAME_VAR)?,
            port: env_var(DB_PORT_VAR)?,
            name: env_var(DB_NAME_VAR)?,
            max_connections: env_var_or(DB_MAX_CONNECTIONS_VAR, 48),
            idle_timeout: Duration::from_secs(env_var_or(DB_IDLE_TIMEOUT_SECS_VAR, 30)),
        })
    }
}

impl AuthConfig {
    fn from_env() -> Result<AuthConfig, ConfigError> {
        Ok(AuthConfig {
            hashing_key: b64_key(HASHING_KEY_VAR)?,
            token_signing_key: b64_key(TOKEN_SIGNING_KEY_VAR)?,

            hash_length: env_var(HASH_LENGTH_VAR)?,
            hash_iterations: env_var(HASH_ITERATIONS_VAR)?,
            hash_mem_cost_kib: env_var(HASH_MEM_COST_KIB_VAR)?,
            hash_threads: env_var(HASH_THREADS_VAR)?,
            hash_salt_length: env_var(HASH_SALT_LENGTH_VAR)?,

            access_token_lifetime: Duration::from_secs(
                env_var_or(ACCESS_TOKEN_LIFETIME_MINS_VAR, 15) * 60,
            ),
        })
    }
}

fn b64_key<const N: usize>(key: &'static str) -> Result<[u8; N], ConfigError> {
    let decoded = Zeroizing::new(
        b64.decode(env_var::<String>(key)?.as_bytes())
            .map_err(|_| ConfigError::invalid(key))?,
    );

    decoded[..].try_into().map_err(|_| ConfigError::invalid(key))
}

fn env_var<T: FromStr>(key: &'static str) -> Result<T, ConfigError> {
    let var = std::env::var(key).map_err(|_| ConfigError::missing(key))?;
    let var: T = var.parse().map_err(|_| ConfigError::invalid(key))?;
    Ok(var)
}

fn env_var_or<T: FromStr>(key: &'static str, default: T) -> T {
    let Ok(var) = std::env::var(key) else {
        return default;
    };

    var.parse().unwrap_or(default)
}

#[derive(Clone, Copy, Debug)]
pub enum ConfigError {
    MissingVar(&'static str),
    InvalidVar(&'static str),
}

impl ConfigError {
    fn missing(var_name: &'static str) -> Self {
        Self::MissingVar(var_name)
    }

    fn invalid(var_name: &'static str) -> Self {
        Self::InvalidVar(var_name)
    }
}

impl std::error::Error for ConfigError {}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingVar(key) => write!(f, "Missing environment variable '{}'", key),
            Self::InvalidVar(key) => write!(f, "Environment variable '{}' is invalid", key),
        }
    }
}
