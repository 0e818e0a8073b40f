use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, ensure};

use crate::fit::DEFAULT_OVERFLOW_BUFFER_PX;

pub const DEFAULT_RESIZE_DEBOUNCE_MS: u64 = 100;
pub const DEFAULT_FIXTURE_PATH: &str = "fixtures/gallery.yaml";
pub const DEFAULT_LEGEND_GAP_PX: f32 = 12.0;

#[derive(Debug, Clone, PartialEq)]
pub struct PresenterSettings {
    pub resize_debounce_ms: u64,
    pub legend_buffer_px: f32,
    pub legend_gap_px: f32,
    pub fixture_path: PathBuf,
}

impl Default for PresenterSettings {
    fn default() -> Self {
        Self {
            resize_debounce_ms: DEFAULT_RESIZE_DEBOUNCE_MS,
            legend_buffer_px: DEFAULT_OVERFLOW_BUFFER_PX,
            legend_gap_px: DEFAULT_LEGEND_GAP_PX,
            fixture_path: PathBuf::from(DEFAULT_FIXTURE_PATH),
        }
    }
}

impl PresenterSettings {
    pub fn from_env() -> Result<Self> {
        // Load .env if present, but do not fail if file does not exist.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let resize_debounce_ms = parse_env(
            &lookup,
            "OVERFLOW_RESIZE_DEBOUNCE_MS",
            DEFAULT_RESIZE_DEBOUNCE_MS,
        )?;
        ensure!(
            resize_debounce_ms > 0,
            "OVERFLOW_RESIZE_DEBOUNCE_MS must be greater than 0"
        );

        let legend_buffer_px = parse_env(
            &lookup,
            "OVERFLOW_LEGEND_BUFFER_PX",
            DEFAULT_OVERFLOW_BUFFER_PX,
        )?;
        ensure!(
            legend_buffer_px.is_finite() && legend_buffer_px >= 0.0,
            "OVERFLOW_LEGEND_BUFFER_PX must be a non-negative number"
        );

        let legend_gap_px = parse_env(&lookup, "OVERFLOW_LEGEND_GAP_PX", DEFAULT_LEGEND_GAP_PX)?;
        ensure!(
            legend_gap_px.is_finite() && legend_gap_px >= 0.0,
            "OVERFLOW_LEGEND_GAP_PX must be a non-negative number"
        );

        let fixture_path = read_optional(&lookup, "OVERFLOW_FIXTURE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_FIXTURE_PATH));

        Ok(Self {
            resize_debounce_ms,
            legend_buffer_px,
            legend_gap_px,
            fixture_path,
        })
    }

    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }
}

fn read_optional(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name).and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_owned())
        }
    })
}

fn parse_env<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match read_optional(lookup, name) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("failed to parse {name} as {}", std::any::type_name::<T>())),
        None => Ok(default),
    }
}
