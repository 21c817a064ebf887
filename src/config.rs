use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub commands: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub engines: Vec<EngineConfig>,
    pub timeout_seconds: u64,
    #[serde(default)]
    pub passing_wins: bool,
    #[serde(default)]
    pub restart: bool,
    pub games: usize,
    #[serde(default = "default_size")]
    pub size: u8,
    #[serde(default = "default_komi")]
    pub komi: f64,
    #[serde(default)]
    pub winners: String,
}

fn default_size() -> u8 {
    19
}

fn default_komi() -> f64 {
    7.5
}

impl Config {
    pub fn load(path: &Path) -> Result<Config> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("couldn't read config file {}", path.display()))?;
        let config: Config = serde_json::from_str(&text)
            .with_context(|| format!("couldn't parse {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.engines.len() != 2 {
            bail!(
                "config must list exactly two engines, found {}",
                self.engines.len()
            );
        }
        if self.size < 1 || self.size > 25 {
            bail!("board size {} out of range 1..25", self.size);
        }
        if let Some(c) = self.winners.chars().find(|c| !matches!(c, '0'..='2')) {
            bail!("winners holds invalid character {c:?}");
        }
        if self.winners.len() > self.games {
            bail!(
                "winners records {} rounds but games is only {}",
                self.winners.len(),
                self.games
            );
        }
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        fs::write(path, json)
            .with_context(|| format!("couldn't write config file {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> &'static str {
        r#"{
            "engines": [
                {"name": "Leela Zero", "path": "/opt/lz/leelaz", "args": ["--gtp", "-w", "best.gz"], "commands": ["time_settings 0 5 1"]},
                {"name": "GNU Go", "path": "/usr/bin/gnugo", "args": ["--mode", "gtp"]}
            ],
            "timeout_seconds": 120,
            "passing_wins": true,
            "restart": false,
            "games": 100,
            "komi": 7.5,
            "winners": "121"
        }"#
    }

    #[test]
    fn parses_a_full_config() {
        let config: Config = serde_json::from_str(sample_json()).unwrap();
        config.validate().unwrap();
        assert_eq!(config.engines[0].name, "Leela Zero");
        assert_eq!(config.engines[1].commands, Vec::<String>::new());
        assert_eq!(config.timeout_seconds, 120);
        assert!(config.passing_wins);
        assert_eq!(config.games, 100);
        assert_eq!(config.size, 19); // defaulted
        assert_eq!(config.komi, 7.5);
        assert_eq!(config.winners, "121");
    }

    #[test]
    fn optional_fields_default() {
        let config: Config = serde_json::from_str(
            r#"{
                "engines": [
                    {"name": "a", "path": "/bin/a"},
                    {"name": "b", "path": "/bin/b"}
                ],
                "timeout_seconds": 60,
                "games": 2
            }"#,
        )
        .unwrap();
        config.validate().unwrap();
        assert!(!config.passing_wins);
        assert!(!config.restart);
        assert_eq!(config.size, 19);
        assert_eq!(config.komi, 7.5);
        assert_eq!(config.winners, "");
        assert_eq!(config.engines[0].args, Vec::<String>::new());
    }

    #[test]
    fn engine_count_must_be_two() {
        let mut config: Config = serde_json::from_str(sample_json()).unwrap();
        config.engines.pop();
        assert!(config.validate().is_err());
        let extra = config.engines[0].clone();
        config.engines.push(extra.clone());
        config.engines.push(extra);
        assert!(config.validate().is_err());
    }

    #[test]
    fn size_bounds() {
        let mut config: Config = serde_json::from_str(sample_json()).unwrap();
        config.size = 1;
        config.validate().unwrap();
        config.size = 25;
        config.validate().unwrap();
        config.size = 26;
        assert!(config.validate().is_err());
        config.size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn winners_alphabet_is_checked() {
        let mut config: Config = serde_json::from_str(sample_json()).unwrap();
        config.winners = String::from("0121x");
        assert!(config.validate().is_err());
    }

    #[test]
    fn winners_may_not_outgrow_games() {
        let mut config: Config = serde_json::from_str(sample_json()).unwrap();
        config.games = 3;
        config.winners = String::from("121");
        config.validate().unwrap();
        config.winners = String::from("1211");
        assert!(config.validate().is_err());
    }

    #[test]
    fn save_and_reload_round_trips() {
        let config: Config = serde_json::from_str(sample_json()).unwrap();
        let path = std::env::temp_dir().join(format!("twogtp-config-{}.json", std::process::id()));
        config.save(&path).unwrap();
        let reloaded = Config::load(&path).unwrap();
        assert_eq!(config, reloaded);
        let _ = fs::remove_file(&path);
    }
}
