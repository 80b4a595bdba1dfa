mod types;

pub use types::*;

use anyhow::{ensure, Result};
use std::path::PathBuf;
use tracing::info;

/// Largest accepted screen width or height, keeping pixel math inside `i32`.
pub const MAX_SCREEN_DIM: u32 = 65535;

/// Returns the config directory: `<config dir>/spacepoint/`
pub fn config_dir() -> Result<PathBuf> {
    let dir = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
        .join("spacepoint");
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Returns the config file path: `<config dir>/spacepoint/config.toml`
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Load config from disk, or return default if not found.
pub fn load_config() -> Result<AppConfig> {
    let path = config_path()?;
    if path.exists() {
        let contents = std::fs::read_to_string(&path)?;
        let config = parse_config(&contents)?;
        info!(?path, "Loaded config");
        Ok(config)
    } else {
        info!("No config found, using defaults");
        Ok(AppConfig::default())
    }
}

/// Parse and validate a TOML config. Missing fields take their defaults.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(contents)?;
    config.validate()?;
    Ok(config)
}

/// Serialize a config the way `save_config` writes it.
pub fn render_config(config: &AppConfig) -> Result<String> {
    Ok(toml::to_string_pretty(config)?)
}

/// Save config to disk.
pub fn save_config(config: &AppConfig) -> Result<()> {
    let path = config_path()?;
    let contents = render_config(config)?;
    std::fs::write(&path, contents)?;
    info!(?path, "Saved config");
    Ok(())
}

impl AppConfig {
    /// Reject values the sample loop cannot run with.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.sampling.period().is_some(),
            "sampling.frequency_hz must give a period between 1 µs and 1 hour, got {}",
            self.sampling.frequency_hz
        );
        ensure!(
            (1..=MAX_SCREEN_DIM).contains(&self.screen.width)
                && (1..=MAX_SCREEN_DIM).contains(&self.screen.height),
            "screen size must be between 1 and {MAX_SCREEN_DIM} pixels per side, got {}x{}",
            self.screen.width,
            self.screen.height
        );
        ensure!(
            self.pointer.dead_zone_deg >= 0.0,
            "pointer.dead_zone_deg must not be negative"
        );
        ensure!(
            self.pointer.wrap_threshold_deg > self.pointer.dead_zone_deg,
            "pointer.wrap_threshold_deg must exceed the dead zone"
        );
        ensure!(
            self.device.read_timeout_ms > 0,
            "device.read_timeout_ms must be positive"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        config.validate().unwrap();
        assert_eq!(config.device.vendor_id, 0x20ff);
        assert_eq!(config.device.product_id, 0x0100);
        assert_eq!(config.sampling.frequency_hz, 125.0);
        assert_eq!(config.pointer.mode, MappingMode::Delta);
        assert_eq!(config.screen.center(), (960, 540));
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config = parse_config(
            r#"
            [pointer]
            mode = "absolute"
            gain_x = 12.5

            [screen]
            width = 2560
            "#,
        )
        .unwrap();

        assert_eq!(config.pointer.mode, MappingMode::Absolute);
        assert_eq!(config.pointer.gain_x, 12.5);
        assert_eq!(config.pointer.gain_y, 20.0);
        assert_eq!(config.screen.width, 2560);
        assert_eq!(config.screen.height, 1080);
        assert_eq!(config.device, DeviceConfig::default());
    }

    #[test]
    fn saved_form_parses_back() {
        let mut config = AppConfig::default();
        config.pointer.dead_zone_deg = 0.15;
        let contents = render_config(&config).unwrap();
        assert_eq!(parse_config(&contents).unwrap(), config);
    }

    #[test]
    fn period_follows_frequency() {
        let period = SamplingConfig::default().period().unwrap();
        assert!((period.as_secs_f64() - 0.008).abs() < 1e-9);

        let slow = SamplingConfig { frequency_hz: 0.5 };
        assert_eq!(slow.period(), Some(Duration::from_secs(2)));

        for frequency_hz in [0.0, -1.0, f64::NAN, f64::INFINITY, 1e-300, 1e12] {
            assert_eq!(SamplingConfig { frequency_hz }.period(), None, "{frequency_hz}");
        }
    }

    #[test]
    fn largest_screen_is_accepted() {
        let config = parse_config("[screen]\nwidth = 65535\nheight = 65535").unwrap();
        assert_eq!(config.screen.center(), (32767, 32767));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(parse_config("[sampling]\nfrequency_hz = 0.0").is_err());
        assert!(parse_config("[sampling]\nfrequency_hz = -125.0").is_err());
        // Period too long for a Duration, and too short to tick.
        assert!(parse_config("[sampling]\nfrequency_hz = 1e-300").is_err());
        assert!(parse_config("[sampling]\nfrequency_hz = 1e12").is_err());
        assert!(parse_config("[screen]\nwidth = 0").is_err());
        assert!(parse_config("[screen]\nwidth = 70000").is_err());
        assert!(parse_config("[screen]\nheight = 4294967295").is_err());
        assert!(parse_config("[pointer]\ndead_zone_deg = -1.0").is_err());
        assert!(parse_config("[pointer]\nmode = \"sideways\"").is_err());
    }
}
