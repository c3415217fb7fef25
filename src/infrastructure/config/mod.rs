//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use crate::application::errors::ConfigError;
use crate::application::messaging::parser::{DEFAULT_MAX_COUNT, DEFAULT_MAX_SIDES};

/// Bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub bot: BotConfig,
    #[serde(default)]
    pub dice: DiceConfig,
    pub adapters: AdaptersConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BotConfig {
    pub name: String,
}

/// Upper bounds for `/roll`
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct DiceConfig {
    pub max_count: i64,
    pub max_sides: i64,
}

impl Default for DiceConfig {
    fn default() -> Self {
        Self {
            max_count: DEFAULT_MAX_COUNT,
            max_sides: DEFAULT_MAX_SIDES,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct AdaptersConfig {
    pub telegram: Option<TelegramConfig>,
    pub console: Option<ConsoleConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct TelegramConfig {
    pub enabled: bool,
    pub token: Option<String>,
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout: i64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConsoleConfig {
    pub enabled: bool,
}

fn default_poll_timeout() -> i64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot: BotConfig {
                name: "roll-bot".to_string(),
            },
            dice: DiceConfig::default(),
            adapters: AdaptersConfig {
                telegram: Some(TelegramConfig {
                    enabled: false,
                    token: None,
                    poll_timeout: default_poll_timeout(),
                }),
                console: Some(ConsoleConfig {
                    enabled: true,
                }),
            },
        }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self)
            .map_err(|e| ConfigError::Parse(format!("Failed to serialize config: {}", e)))
    }

    pub fn load_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by `BOT_TOKEN`, `ROLL_MAX_COUNT` and `ROLL_MAX_SIDES`
    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Some(token) = var("BOT_TOKEN") {
            if let Some(ref mut tg) = config.adapters.telegram {
                tg.token = Some(token);
                tg.enabled = true;
            }
        }

        if let Some(max) = var("ROLL_MAX_COUNT") {
            config.dice.max_count = parse_var("ROLL_MAX_COUNT", &max)?;
        }

        if let Some(max) = var("ROLL_MAX_SIDES") {
            config.dice.max_sides = parse_var("ROLL_MAX_SIDES", &max)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Token of the enabled Telegram adapter, if any
    pub fn telegram_token(&self) -> Option<String> {
        self.adapters.telegram
            .as_ref()
            .filter(|t| t.enabled)
            .and_then(|t| t.token.clone())
    }

    /// The console adapter runs unless explicitly disabled
    pub fn console_enabled(&self) -> bool {
        self.adapters.console
            .as_ref()
            .map_or(true, |c| c.enabled)
    }

    pub fn poll_timeout(&self) -> i64 {
        self.adapters.telegram
            .as_ref()
            .map(|t| t.poll_timeout)
            .unwrap_or_else(default_poll_timeout)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.bot.name.trim().is_empty() {
            return Err(ConfigError::MissingField("bot.name".to_string()));
        }
        if !(1..=DEFAULT_MAX_COUNT).contains(&self.dice.max_count) {
            return Err(ConfigError::InvalidValue(format!(
                "dice.max-count must be between 1 and {}, got {}",
                DEFAULT_MAX_COUNT, self.dice.max_count
            )));
        }
        if !(1..=DEFAULT_MAX_SIDES).contains(&self.dice.max_sides) {
            return Err(ConfigError::InvalidValue(format!(
                "dice.max-sides must be between 1 and {}, got {}",
                DEFAULT_MAX_SIDES, self.dice.max_sides
            )));
        }
        if self.poll_timeout() < 0 {
            return Err(ConfigError::InvalidValue(format!("adapters.telegram.poll-timeout must not be negative, got {}", self.poll_timeout())));
        }
        Ok(())
    }
}

fn parse_var(key: &str, value: &str) -> Result<i64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(format!("{}={:?} is not an integer", key, value)))
}
