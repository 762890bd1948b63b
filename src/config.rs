use std::path::PathBuf;

use crate::error::ConfigError;

pub const DEFAULT_TICK_MS: u64 = 70;
pub const DEFAULT_RENDER_FPS: u64 = 120;
pub const DEFAULT_MAX_LEVEL: u32 = 8;

/// Runtime settings for the terminal game, read from `MAZE_*` environment variables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub tick_ms: u64,
    pub render_fps: u64,
    pub max_level: u32,
    pub seed: Option<u64>,
    pub log_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tick_ms: DEFAULT_TICK_MS,
            render_fps: DEFAULT_RENDER_FPS,
            max_level: DEFAULT_MAX_LEVEL,
            seed: None,
            log_path: None,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            tick_ms: positive(&lookup, "MAZE_TICK_MS")?.unwrap_or(defaults.tick_ms),
            render_fps: positive(&lookup, "MAZE_FPS")?.unwrap_or(defaults.render_fps),
            max_level: positive(&lookup, "MAZE_MAX_LEVEL")?.unwrap_or(defaults.max_level),
            seed: parse(&lookup, "MAZE_SEED")?,
            log_path: lookup("MAZE_LOG")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
        })
    }
}

fn parse<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError> {
    let Some(value) = lookup(var) else {
        return Ok(None);
    };
    match value.trim().parse::<T>() {
        Ok(v) => Ok(Some(v)),
        Err(_) => Err(ConfigError::Invalid { var, value }),
    }
}

fn positive<T: std::str::FromStr + PartialEq + Default>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError> {
    let Some(value) = lookup(var) else {
        return Ok(None);
    };
    match value.trim().parse::<T>() {
        Ok(v) if v != T::default() => Ok(Some(v)),
        _ => Err(ConfigError::Invalid { var, value }),
    }
}
