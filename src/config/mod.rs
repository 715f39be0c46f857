//! Configuration module for loadscope.
//!
//! Settings are read from environment variables (a `.env` file is loaded by
//! the binary first). Every setting has a default, so an empty environment
//! means "analyze the current directory and write charts next to it".

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// How the pipeline reacts to a result file that fails to parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPolicy {
    /// Skip the broken source and record a warning on the run report
    #[default]
    Isolate,
    /// Abort the run on the first broken source
    FailFast,
}

impl FromStr for LoadPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "isolate" => Ok(LoadPolicy::Isolate),
            "fail-fast" | "fail_fast" | "failfast" => Ok(LoadPolicy::FailFast),
            _ => anyhow::bail!(
                "Invalid LOADSCOPE_LOAD_POLICY: {}. Must be 'isolate' or 'fail-fast'",
                s
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub load_policy: LoadPolicy,
    /// Samples on the trend curve, at least 2
    pub trend_grid_points: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("."),
            output_dir: PathBuf::from("."),
            load_policy: LoadPolicy::default(),
            trend_grid_points: 100,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let input_dir = lookup("LOADSCOPE_INPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.input_dir);
        // Output defaults to wherever the input lives
        let output_dir = lookup("LOADSCOPE_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| input_dir.clone());

        let load_policy = match lookup("LOADSCOPE_LOAD_POLICY") {
            Some(raw) => raw.parse::<LoadPolicy>()?,
            None => defaults.load_policy,
        };

        let trend_grid_points = match lookup("LOADSCOPE_TREND_GRID_POINTS") {
            Some(raw) => raw
                .parse::<usize>()
                .context("Failed to parse LOADSCOPE_TREND_GRID_POINTS")?,
            None => defaults.trend_grid_points,
        };
        if trend_grid_points < 2 {
            anyhow::bail!(
                "LOADSCOPE_TREND_GRID_POINTS must be at least 2, got: {}",
                trend_grid_points
            );
        }

        Ok(Self {
            input_dir,
            output_dir,
            load_policy,
            trend_grid_points,
        })
    }
}
