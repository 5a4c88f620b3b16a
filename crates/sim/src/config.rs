//! Scenario runner configuration.
use std::env;
use std::path::PathBuf;

/// Settings read from `GAS_SIM_*` environment variables.
#[derive(Clone, Debug)]
pub struct SimConfig {
    /// Content directory; the bundled sample content when unset.
    pub data_dir: Option<PathBuf>,
    pub tick_rate_hz: u32,
    /// Simulated seconds.
    pub duration_secs: f32,
    pub session_id: Option<String>,
    pub log_dir: Option<PathBuf>,
    /// Write the JSON summary here instead of stdout.
    pub summary_path: Option<PathBuf>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            tick_rate_hz: 30,
            duration_secs: 6.0,
            session_id: None,
            log_dir: None,
            summary_path: None,
        }
    }
}

impl SimConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `GAS_SIM_DATA_DIR` - Content directory (default: bundled content)
    /// - `GAS_SIM_TICK_RATE` - Frames per simulated second (default: 30)
    /// - `GAS_SIM_DURATION` - Simulated seconds (default: 6)
    /// - `GAS_SIM_SESSION_ID` - Session identifier for the log directory
    /// - `GAS_SIM_LOG_DIR` - Log directory (default: platform cache dir)
    /// - `GAS_SIM_SUMMARY` - Summary output file (default: stdout)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        config.data_dir = env::var("GAS_SIM_DATA_DIR").ok().map(PathBuf::from);

        if let Some(rate) = read_env::<u32>("GAS_SIM_TICK_RATE") {
            config.tick_rate_hz = rate.max(1);
        }

        if let Some(duration) = read_env::<f32>("GAS_SIM_DURATION")
            && duration.is_finite()
        {
            config.duration_secs = duration.max(0.0);
        }

        config.session_id = env::var("GAS_SIM_SESSION_ID").ok();
        config.log_dir = env::var("GAS_SIM_LOG_DIR").ok().map(PathBuf::from);
        config.summary_path = env::var("GAS_SIM_SUMMARY").ok().map(PathBuf::from);

        config
    }

    pub fn frame_delta(&self) -> f32 {
        1.0 / self.tick_rate_hz.max(1) as f32
    }

    pub fn total_frames(&self) -> u64 {
        (self.duration_secs * self.tick_rate_hz as f32).ceil() as u64
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_cover_the_duration() {
        let config = SimConfig {
            tick_rate_hz: 20,
            duration_secs: 1.5,
            ..SimConfig::default()
        };
        assert_eq!(config.total_frames(), 30);
        assert_eq!(config.frame_delta(), 0.05);
    }
}
