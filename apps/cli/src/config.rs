//! CLI configuration loading and merging.

use anyhow::Context;
use featsweep_core::SweepConfig;
use std::path::Path;

/// Fallback for `--log-level`.
pub const ENV_LOG_LEVEL: &str = "FEATSWEEP_LOG_LEVEL";

/// Load and merge CLI configuration.
///
/// Configuration precedence:
/// 1. CLI arguments (handled by clap)
/// 2. Environment variables
/// 3. Explicit `--config` file
/// 4. Local config file (./.featsweeprc)
/// 5. Global config file (~/.featsweep/config.toml)
/// 6. Defaults
pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<SweepConfig> {
    SweepConfig::load(explicit).context("Failed to load configuration")
}
