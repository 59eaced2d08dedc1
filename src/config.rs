use std::collections::HashSet;

use anyhow::{Context, bail};
use clap::Parser;
use serde::Deserialize;

#[derive(Parser)]
#[command(name = "classjudge", version = "0.1", about, long_about = None)]
pub struct CliArgs {
    /// Path to the configuration file
    #[arg(long = "config", short = 'c')]
    pub config_path: String,

    /// Whether to flush the existing database
    #[arg(long = "flush-data", short = 'f', default_value_t = false)]
    pub flush_data: bool,
}

impl CliArgs {
    /// Load and validate the configuration from the specified file
    pub fn to_config(&self) -> anyhow::Result<Config> {
        let file = std::fs::File::open(&self.config_path)
            .with_context(|| format!("Failed to open config file {}", self.config_path))?;
        let reader = std::io::BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file {}", self.config_path))?;
        config.validate()?;
        Ok(config)
    }
}

#[derive(Deserialize, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub bot: BotConfig,
    pub guild: GuildConfig,
    pub sandbox: SandboxConfig,
}

#[derive(Deserialize, Debug)]
pub struct ServerConfig {
    pub bind_address: Option<String>,
    pub bind_port: Option<u16>,
}

#[derive(Deserialize, Debug)]
pub struct BotConfig {
    /// Messages not starting with this prefix are ignored
    pub prefix: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct GuildConfig {
    pub teachers: HashSet<u64>,
    pub student_channels: HashSet<u64>,
}

#[derive(Deserialize, Debug)]
pub struct SandboxConfig {
    pub url: String,
    /// Transport timeout for a single round trip, unbounded when absent
    pub timeout_secs: Option<u64>,
    #[serde(default = "default_eval_line_cap")]
    pub eval_line_cap: usize,
}

fn default_eval_line_cap() -> usize {
    10
}

impl Config {
    /// Rejects values that would otherwise only fail at first use
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.bot.prefix.trim().is_empty() {
            bail!("bot.prefix must not be empty");
        }
        reqwest::Url::parse(&self.sandbox.url)
            .with_context(|| format!("sandbox.url is not a valid URL: {}", self.sandbox.url))?;
        if self.sandbox.eval_line_cap == 0 {
            bail!("sandbox.eval_line_cap must be at least 1");
        }
        if self.sandbox.timeout_secs == Some(0) {
            bail!("sandbox.timeout_secs must be at least 1 when set");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> serde_json::Result<Config> {
        serde_json::from_str(json)
    }

    #[test]
    fn test_config_deserialization() {
        let file = std::fs::File::open("data/example.json").unwrap();
        let reader = std::io::BufReader::new(file);
        let config: Config = serde_json::from_reader(reader).unwrap();
        assert_eq!(config.server.bind_address, Some("127.0.0.1".to_string()));
        assert_eq!(config.bot.prefix, "!");
        assert!(config.guild.teachers.contains(&1000));
        assert_eq!(config.sandbox.eval_line_cap, 10);
        config.validate().unwrap();
    }

    #[test]
    fn test_missing_key_fails_at_load() {
        let result = parse(
            r#"{
                "server": {},
                "bot": { "prefix": "!" },
                "guild": { "teachers": [], "student_channels": [] }
            }"#,
        );
        assert!(result.unwrap_err().to_string().contains("sandbox"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = parse(
            r#"{
                "server": {},
                "bot": { "prefix": "!" },
                "guild": { "teachers": [1], "student_channels": [2] },
                "sandbox": { "url": "not a url" }
            }"#,
        )
        .unwrap();
        assert!(config.validate().is_err());

        config.sandbox.url = "http://localhost:8060/eval".to_string();
        config.validate().unwrap();

        config.sandbox.eval_line_cap = 0;
        assert!(config.validate().is_err());

        config.sandbox.eval_line_cap = 10;
        config.bot.prefix = " ".to_string();
        assert!(config.validate().is_err());
    }
}
