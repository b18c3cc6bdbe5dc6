use std::{
    env,
    fmt::Display,
    net::SocketAddr,
    num::NonZeroU32,
    path::PathBuf,
    str::FromStr,
};

use chrono::Duration;

use crate::{error::Error, menu::MergePolicy, store::WRITE_COOLDOWN};

const DEFAULT_RATE_LIMIT: NonZeroU32 = match NonZeroU32::new(20) {
    Some(n) => n,
    None => panic!("rate limit must be positive"),
};

/// Where menus are persisted, from `MENUS_STORE`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StoreKind {
    #[default]
    Memory,
    Firestore,
    File(PathBuf),
}

impl From<&str> for StoreKind {
    fn from(value: &str) -> Self {
        match value.trim() {
            "" | ":memory:" => Self::Memory,
            ":firestore:" => Self::Firestore,
            path => Self::File(PathBuf::from(path)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub store: StoreKind,
    pub firestore_project: String,
    pub host: String,
    pub port: u16,
    /// Attempts per url before a page is given up.
    pub retries: u32,
    pub write_cooldown: Duration,
    pub max_workers: usize,
    /// Requests per second to the residence's site.
    pub rate_limit: NonZeroU32,
    /// Never touch the network; only stored menus are served.
    pub offline: bool,
    /// Walk every page of the blog instead of the first one.
    pub parse_all: bool,
    pub merge_policy: MergePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store: StoreKind::Memory,
            firestore_project: "residencia-menus".to_owned(),
            host: "127.0.0.1".to_owned(),
            port: 3000,
            retries: 5,
            write_cooldown: WRITE_COOLDOWN,
            max_workers: 8,
            rate_limit: DEFAULT_RATE_LIMIT,
            offline: false,
            parse_all: false,
            merge_policy: MergePolicy::default(),
        }
    }
}

fn parse_var<T>(name: &str, raw: Option<String>, default: T) -> crate::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match raw {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("{name}={raw:?}: {e}"))),
    }
}

fn parse_flag(name: &str, raw: Option<String>) -> crate::Result<bool> {
    let Some(raw) = raw else {
        return Ok(false);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::Config(format!("{name}={raw:?} is not a boolean"))),
    }
}

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Builds the configuration from `lookup`, which maps a variable name to
    /// its value when set.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> crate::Result<Self> {
        let defaults = Self::default();
        let store = lookup("MENUS_STORE").map_or_else(
            || {
                log::warn!("env var MENUS_STORE not set, using ad-hoc memory store.");
                StoreKind::Memory
            },
            |raw| StoreKind::from(raw.as_str()),
        );
        let cooldown: i64 = parse_var(
            "MENUS_WRITE_COOLDOWN_MINUTES",
            lookup("MENUS_WRITE_COOLDOWN_MINUTES"),
            defaults.write_cooldown.num_minutes(),
        )?;
        if cooldown < 0 {
            return Err(Error::Config(format!(
                "MENUS_WRITE_COOLDOWN_MINUTES must not be negative, got {cooldown}"
            )));
        }
        let write_cooldown = Duration::try_minutes(cooldown).ok_or_else(|| {
            Error::Config(format!("MENUS_WRITE_COOLDOWN_MINUTES={cooldown} is out of range"))
        })?;

        Ok(Self {
            store,
            firestore_project: lookup("FIRESTORE_PROJECT").unwrap_or(defaults.firestore_project),
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_var("PORT", lookup("PORT"), defaults.port)?,
            retries: parse_var("MENUS_RETRIES", lookup("MENUS_RETRIES"), defaults.retries)?,
            write_cooldown,
            max_workers: parse_var(
                "MENUS_MAX_WORKERS",
                lookup("MENUS_MAX_WORKERS"),
                defaults.max_workers,
            )?,
            rate_limit: parse_var(
                "MENUS_RATE_LIMIT",
                lookup("MENUS_RATE_LIMIT"),
                defaults.rate_limit,
            )?,
            offline: parse_flag("MENUS_OFFLINE", lookup("MENUS_OFFLINE"))?,
            parse_all: parse_flag("MENUS_PARSE_ALL", lookup("MENUS_PARSE_ALL"))?,
            merge_policy: parse_var(
                "MENUS_MERGE_POLICY",
                lookup("MENUS_MERGE_POLICY"),
                defaults.merge_policy,
            )?,
        })
    }

    pub fn addr(&self) -> crate::Result<SocketAddr> {
        let addr = format!("{}:{}", self.host, self.port);
        SocketAddr::from_str(&addr).map_err(|e| Error::Config(format!("bad listen address {addr}: {e}")))
    }
}
