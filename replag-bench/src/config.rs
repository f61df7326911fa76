use replag_config::load_config;
use replag_config::shared::HarnessConfig;

/// Loads the [`HarnessConfig`] and validates it.
pub fn load_harness_config() -> anyhow::Result<HarnessConfig> {
    let config = load_config::<HarnessConfig>()?;
    config.validate()?;

    Ok(config)
}
