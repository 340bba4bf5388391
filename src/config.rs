use crate::constants::*;

/// Population-control parameters of a [`Snowfall`](crate::snowfall::Snowfall).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SnowfallConfig {
    pub max_snowflakes: usize,
    pub initial_max: usize,
    pub increase_rate: usize,
    /// Seconds that must pass between two ramp-up steps.
    pub increase_interval: f64,
}

impl Default for SnowfallConfig {
    fn default() -> Self {
        Self {
            max_snowflakes: MAX_SNOWFLAKES,
            initial_max: INITIAL_MAX_SNOWFLAKES,
            increase_rate: SNOWFLAKE_INCREASE_RATE,
            increase_interval: SNOWFLAKE_INCREASE_INTERVAL,
        }
    }
}
