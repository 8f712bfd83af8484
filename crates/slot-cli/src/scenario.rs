//! Scenario files: an engine configuration, a weekly hours table and a list
//! of blocks, all in one JSON document.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use slot_engine::{Availability, Block, EngineConfig, HoursEntry};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    #[serde(flatten)]
    pub config: EngineConfig,
    #[serde(default)]
    pub regular_hours: BTreeMap<String, HoursEntry>,
    #[serde(default)]
    pub unavailable: Vec<Block>,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario: {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse scenario: {}", path.display()))
    }

    /// Build an engine holding every day and block of the scenario.
    pub fn build(self) -> Result<Availability> {
        let mut av = Availability::with_config(self.config);
        av.set_regular_hours(self.regular_hours)
            .context("Invalid regular hours")?;

        for (i, block) in self.unavailable.into_iter().enumerate() {
            av.add_block(block)
                .with_context(|| format!("Invalid unavailable entry #{i}"))?;
        }

        tracing::info!(
            tz = %av.time_zone(),
            interval = %av.interval(),
            chunks = av.unavailable().len(),
            "loaded scenario"
        );
        Ok(av)
    }
}

/// Read and build a scenario in one step.
pub fn open(path: &Path) -> Result<Availability> {
    Scenario::load(path)?.build()
}
