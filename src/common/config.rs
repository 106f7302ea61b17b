use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use strum::VariantNames;
use tracing::warn;

use crate::common::collections::HashMap;
use crate::switch_engine::press::{MAX_HOLD_DURATION, MIN_HOLD_DURATION};
use crate::sys::hotkey::Hotkey;

const DEFAULT_TOML: &str = include_str!("../../tapswitch.default.toml");

static DEFAULT_CONFIG: Lazy<Config> =
    Lazy::new(|| Config::parse(DEFAULT_TOML).expect("embedded default config must parse"));

pub fn config_file() -> PathBuf {
    dirs::home_dir().unwrap().join(".config").join("tapswitch").join("config.toml")
}

/// The four engine actions a hotkey can be bound to. The snake_case names
/// are the keys of the `[keys]` table.
#[derive(
    Serialize,
    Deserialize,
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    strum_macros::VariantNames,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Action {
    AppSwitch,
    CycleWindows,
    OverlaySelect,
    OverlayQuit,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid config: {0}")]
    Parse(#[from] Box<toml::de::Error>),
    #[error("unknown key action `{name}`{}", suggestion_suffix(.suggestion))]
    UnknownAction { name: String, suggestion: Option<String> },
    #[error("invalid hotkey for `{action}`: {message}")]
    BadHotkey { action: Action, message: String },
}

fn suggestion_suffix(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(" (did you mean `{s}`?)"),
        None => String::new(),
    }
}

/// On-disk shape. Every field is optional and falls back to the embedded
/// defaults, so a partial or empty file is always accepted.
#[derive(Serialize, Deserialize, Debug, Default)]
struct ConfigFile {
    #[serde(default)]
    settings: Settings,
    #[serde(default)]
    keys: HashMap<String, String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    pub settings: Settings,
    pub keys: Vec<(Action, Hotkey)>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default = "default_hold_duration")]
    pub hold_duration: f64,
    #[serde(default = "yes")]
    pub show_number_badges: bool,
    #[serde(default = "yes")]
    pub auto_select_single: bool,
    #[serde(default = "yes")]
    pub hot_reload: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            hold_duration: default_hold_duration(),
            show_number_badges: true,
            auto_select_single: true,
            hot_reload: true,
        }
    }
}

impl Settings {
    /// Hold threshold as a duration, clamped to the supported range.
    /// Out-of-range values are accepted and clamped, never rejected.
    pub fn hold_threshold(&self) -> Duration {
        let secs = if self.hold_duration.is_finite() {
            self.hold_duration.max(0.0)
        } else {
            warn!(value = self.hold_duration, "non-finite hold_duration; using default");
            default_hold_duration()
        };
        Duration::from_secs_f64(secs).clamp(MIN_HOLD_DURATION, MAX_HOLD_DURATION)
    }

    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        let min = MIN_HOLD_DURATION.as_secs_f64();
        let max = MAX_HOLD_DURATION.as_secs_f64();
        if !self.hold_duration.is_finite() || self.hold_duration < min || self.hold_duration > max
        {
            issues.push(format!(
                "hold_duration {} is outside {min}..{max} and will be clamped",
                self.hold_duration
            ));
        }
        issues
    }
}

impl Config {
    pub fn read(path: &Path) -> anyhow::Result<Config> {
        let buf = std::fs::read_to_string(path)?;
        Ok(Self::parse(&buf)?)
    }

    pub fn default() -> Config {
        DEFAULT_CONFIG.clone()
    }

    pub fn parse(buf: &str) -> Result<Config, ConfigError> {
        let file: ConfigFile = toml::from_str(buf).map_err(Box::new)?;
        let mut keys = Config::default_keys();
        for (name, binding) in &file.keys {
            let action = Action::from_str(name).map_err(|_| ConfigError::UnknownAction {
                name: name.clone(),
                suggestion: closest_action(name),
            })?;
            let hotkey = Hotkey::from_str(binding).map_err(|e| ConfigError::BadHotkey {
                action,
                message: e.to_string(),
            })?;
            keys.retain(|(a, _)| *a != action);
            keys.push((action, hotkey));
        }
        Ok(Config { settings: file.settings, keys })
    }

    fn default_keys() -> Vec<(Action, Hotkey)> {
        // Avoid recursing through DEFAULT_CONFIG while it is initializing.
        static DEFAULT_KEYS: Lazy<Vec<(Action, Hotkey)>> = Lazy::new(|| {
            let file: ConfigFile = toml::from_str(DEFAULT_TOML).expect("default config");
            file.keys
                .iter()
                .map(|(name, binding)| {
                    (
                        Action::from_str(name).expect("default action name"),
                        Hotkey::from_str(binding).expect("default hotkey"),
                    )
                })
                .collect()
        });
        DEFAULT_KEYS.clone()
    }

    pub fn binding(&self, action: Action) -> Option<Hotkey> {
        self.keys.iter().find(|(a, _)| *a == action).map(|(_, hk)| *hk)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let file = ConfigFile {
            settings: self.settings.clone(),
            keys: self
                .keys
                .iter()
                .map(|(action, hotkey)| (action.to_string(), hotkey.to_string()))
                .collect(),
        };
        let toml_string = toml::to_string_pretty(&file)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, toml_string.as_bytes())?;
        Ok(())
    }

    pub fn validate(&self) -> Vec<String> {
        self.settings.validate()
    }
}

fn closest_action(name: &str) -> Option<String> {
    Action::VARIANTS
        .iter()
        .map(|v| (levenshtein(name, v), *v))
        .filter(|(d, _)| *d <= 3)
        .min_by_key(|(d, _)| *d)
        .map(|(_, v)| v.to_string())
}

/// no need to pull in a dep for just this
fn levenshtein(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let mut d = vec![vec![0usize; b_chars.len() + 1]; a_chars.len() + 1];
    for (i, row) in d.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=b_chars.len() {
        d[0][j] = j;
    }
    for i in 1..=a_chars.len() {
        for j in 1..=b_chars.len() {
            let cost = usize::from(a_chars[i - 1] != b_chars[j - 1]);
            d[i][j] = (d[i - 1][j] + 1).min(d[i][j - 1] + 1).min(d[i - 1][j - 1] + cost);
        }
    }
    d[a_chars.len()][b_chars.len()]
}

fn yes() -> bool {
    true
}

fn default_hold_duration() -> f64 {
    1.0
}
