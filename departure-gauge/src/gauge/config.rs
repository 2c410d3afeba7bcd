//! Gauge configuration.

/// Configuration for computing gauge responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GaugeConfig {
    /// Maximum number of itineraries returned with a response.
    pub max_routes: usize,

    /// Wait budget (minutes) used when a request does not specify one.
    pub default_max_wait: u32,

    /// How far ahead to look for departure windows (minutes).
    pub window_minutes: u32,
}

impl GaugeConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(max_routes: usize, default_max_wait: u32, window_minutes: u32) -> Self {
        Self {
            max_routes,
            default_max_wait,
            window_minutes,
        }
    }
}

impl Default for GaugeConfig {
    fn default() -> Self {
        Self {
            max_routes: 5,
            default_max_wait: 15,
            window_minutes: 120, // 2 hours
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = GaugeConfig::default();

        assert_eq!(config.max_routes, 5);
        assert_eq!(config.default_max_wait, 15);
        assert_eq!(config.window_minutes, 120);
    }

    #[test]
    fn custom_config() {
        let config = GaugeConfig::new(3, 20, 60);

        assert_eq!(config.max_routes, 3);
        assert_eq!(config.default_max_wait, 20);
        assert_eq!(config.window_minutes, 60);
    }
}
