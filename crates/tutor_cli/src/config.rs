use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tutor_engine::SolveOptions;

const CONFIG_FILE: &str = "tutor_config.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TutorConfig {
    pub trig_decimals: usize,
    pub physics_decimals: usize,
    pub general_decimals: usize,
    pub sample_point: i64,
    /// Print the worked steps, not only the final answer.
    pub show_steps: bool,
    /// Filter used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for TutorConfig {
    fn default() -> Self {
        let options = SolveOptions::default();
        Self {
            trig_decimals: options.trig_decimals,
            physics_decimals: options.physics_decimals,
            general_decimals: options.general_decimals,
            sample_point: options.sample_point,
            show_steps: true,
            log_filter: "warn".to_string(),
        }
    }
}

impl TutorConfig {
    pub fn path() -> PathBuf {
        PathBuf::from(CONFIG_FILE)
    }

    /// `Ok(None)` when no config file exists.
    pub fn read() -> Result<Option<Self>> {
        Self::read_from(&Self::path())
    }

    pub fn read_from(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        Ok(Some(config))
    }

    pub fn save(&self) -> std::io::Result<()> {
        self.save_to(&Self::path())
    }

    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        let mut file = fs::File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }

    /// Resets to defaults and overwrites the file.
    pub fn restore() -> std::io::Result<Self> {
        let config = Self::default();
        config.save()?;
        Ok(config)
    }

    pub fn solve_options(&self) -> SolveOptions {
        SolveOptions {
            trig_decimals: self.trig_decimals,
            physics_decimals: self.physics_decimals,
            general_decimals: self.general_decimals,
            sample_point: self.sample_point,
        }
    }
}
