use {
    crate::{config::SnowfallConfig, snowflake::Snowflake},
    rand::{Rng, SeedableRng, rngs::StdRng},
};

/// What a single [`Snowfall::tick`] did to the population.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TickReport {
    pub dt: f32,
    pub ramped: bool,
    pub replenished: usize,
}

pub struct Snowfall {
    flakes: Vec<Snowflake>,
    config: SnowfallConfig,
    current_max: usize,
    last_increase: f64,
    last_time: f64,
    rng: StdRng,
}

impl Snowfall {
    pub fn new(config: SnowfallConfig) -> Self {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    pub fn with_rng(config: SnowfallConfig, rng: StdRng) -> Self {
        Self {
            flakes: Vec::with_capacity(config.max_snowflakes),
            current_max: config.initial_max,
            config,
            last_increase: 0.0,
            last_time: 0.0,
            rng,
        }
    }

    /// Replaces the population with `initial_count` flakes scattered over
    /// the screen height, and rewinds the clock to zero.
    pub fn initialize(&mut self, initial_count: usize) {
        self.flakes.clear();
        self.current_max = self.config.initial_max;
        self.last_increase = 0.0;
        self.last_time = 0.0;

        for _ in 0..initial_count {
            let mut flake = Snowflake::spawn(&mut self.rng);
            flake.position.y = self.rng.random_range(-1.0..1.0);
            self.flakes.push(flake);
        }
    }

    /// Advances the simulation to `current_time` (seconds since start).
    pub fn tick(&mut self, current_time: f64) -> TickReport {
        let dt = (current_time - self.last_time) as f32;
        self.last_time = current_time;

        let ramped = self.ramp_up(current_time);
        let replenished = self.replenish();

        for flake in &mut self.flakes {
            flake.update(dt, &mut self.rng);
        }

        TickReport {
            dt,
            ramped,
            replenished,
        }
    }

    fn ramp_up(&mut self, current_time: f64) -> bool {
        if self.current_max >= self.config.max_snowflakes
            || current_time - self.last_increase <= self.config.increase_interval
        {
            return false;
        }

        self.current_max =
            (self.current_max + self.config.increase_rate).min(self.config.max_snowflakes);

        for _ in 0..self.config.increase_rate {
            if self.flakes.len() < self.current_max {
                self.flakes.push(Snowflake::spawn(&mut self.rng));
            }
        }

        self.last_increase = current_time;
        log::info!(
            "Snowflake count: {} (cap {})",
            self.flakes.len(),
            self.current_max
        );

        true
    }

    fn replenish(&mut self) -> usize {
        if self.flakes.len() >= self.current_max / 2 {
            return 0;
        }

        let count = self.current_max / 10;
        for _ in 0..count {
            self.flakes.push(Snowflake::spawn(&mut self.rng));
        }

        log::info!("Replenished {count} snowflakes, count: {}", self.flakes.len());
        count
    }

    pub fn flakes(&self) -> &[Snowflake] {
        &self.flakes
    }

    pub fn population(&self) -> usize {
        self.flakes.len()
    }

    pub fn current_max(&self) -> usize {
        self.current_max
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::constants::{BOUNDS, MAX_SNOWFLAKES},
    };

    const DT: f64 = 0.016;

    fn snowfall(seed: u64) -> Snowfall {
        Snowfall::with_rng(SnowfallConfig::default(), StdRng::seed_from_u64(seed))
    }

    #[test]
    fn initialize_scatters_initial_batch() {
        let mut snowfall = snowfall(1);
        snowfall.initialize(20);

        assert_eq!(snowfall.population(), 20);
        assert_eq!(snowfall.current_max(), 20);
        assert!(
            snowfall
                .flakes()
                .iter()
                .all(|f| (-1.0..1.0).contains(&f.position.y))
        );
    }

    #[test]
    fn ramp_up_waits_for_interval() {
        let mut snowfall = snowfall(2);
        snowfall.initialize(20);

        let report = snowfall.tick(0.5);
        assert!(!report.ramped);
        assert_eq!(snowfall.current_max(), 20);

        // The gate is strict: exactly one interval is not enough.
        assert!(!snowfall.tick(1.0).ramped);

        let report = snowfall.tick(1.01);
        assert!(report.ramped);
        assert_eq!(snowfall.current_max(), 30);
        assert_eq!(snowfall.population(), 30);

        assert!(!snowfall.tick(1.5).ramped);
        assert!(snowfall.tick(2.02).ramped);
        assert_eq!(snowfall.current_max(), 40);
    }

    #[test]
    fn ramp_up_fires_at_most_once_per_interval() {
        let mut snowfall = snowfall(3);
        snowfall.initialize(20);

        let mut time = 0.0;
        let mut last_ramp: Option<f64> = None;
        while time < 20.0 {
            time += DT;
            let cap_before = snowfall.current_max();
            if snowfall.tick(time).ramped {
                if let Some(previous) = last_ramp {
                    assert!(time - previous > 1.0);
                }
                let expected = (cap_before + 10).min(MAX_SNOWFLAKES);
                assert_eq!(snowfall.current_max(), expected);
                last_ramp = Some(time);
            } else {
                assert_eq!(snowfall.current_max(), cap_before);
            }
        }
        assert_eq!(snowfall.current_max(), MAX_SNOWFLAKES);
    }

    #[test]
    fn cap_is_clamped_to_maximum() {
        let config = SnowfallConfig {
            max_snowflakes: 25,
            ..SnowfallConfig::default()
        };
        let mut snowfall = Snowfall::with_rng(config, StdRng::seed_from_u64(4));
        snowfall.initialize(20);

        assert!(snowfall.tick(1.5).ramped);
        assert_eq!(snowfall.current_max(), 25);
        assert_eq!(snowfall.population(), 25);

        assert!(!snowfall.tick(3.0).ramped);
        assert_eq!(snowfall.population(), 25);
    }

    #[test]
    fn replenishes_when_below_half() {
        let mut snowfall = snowfall(5);
        snowfall.initialize(0);

        // Cap 20: 0 < 10, so 2 flakes are added; the guard is a single check.
        let report = snowfall.tick(0.1);
        assert_eq!(report.replenished, 2);
        assert_eq!(snowfall.population(), 2);

        let report = snowfall.tick(0.2);
        assert_eq!(report.replenished, 2);
        assert_eq!(snowfall.population(), 4);
    }

    #[test]
    fn replenish_skipped_at_half() {
        let mut snowfall = snowfall(6);
        snowfall.initialize(10);

        let report = snowfall.tick(0.1);
        assert_eq!(report.replenished, 0);
        assert_eq!(snowfall.population(), 10);
    }

    #[test]
    fn ramp_up_and_replenish_in_same_tick() {
        let mut snowfall = snowfall(7);
        snowfall.initialize(0);

        // Cap goes 20 -> 30, ramp-up adds 10, then 10 < 15 adds 3 more.
        let report = snowfall.tick(1.5);
        assert!(report.ramped);
        assert_eq!(report.replenished, 3);
        assert_eq!(snowfall.population(), 13);
    }

    #[test]
    fn population_saturates_at_maximum() {
        let mut snowfall = snowfall(8);
        snowfall.initialize(20);
        assert_eq!(snowfall.population(), 20);

        let mut time = 0.0;
        let mut previous = snowfall.population();
        while time < 100.0 {
            time += DT;
            snowfall.tick(time);

            assert!(snowfall.population() >= previous);
            assert!(snowfall.population() <= MAX_SNOWFLAKES);
            previous = snowfall.population();

            for flake in snowfall.flakes() {
                assert!((-BOUNDS..=BOUNDS).contains(&flake.position.y));
                assert!((-BOUNDS..=BOUNDS).contains(&flake.position.x));
            }
        }

        assert_eq!(snowfall.population(), MAX_SNOWFLAKES);
        assert_eq!(snowfall.current_max(), MAX_SNOWFLAKES);
    }

    #[test]
    fn tick_reports_elapsed_delta() {
        let mut snowfall = snowfall(9);
        snowfall.initialize(5);

        assert!((snowfall.tick(0.25).dt - 0.25).abs() < 1e-6);
        assert!((snowfall.tick(0.5).dt - 0.25).abs() < 1e-6);
    }
}
