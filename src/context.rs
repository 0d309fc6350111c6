use crate::config::ScrapeConfig;
use rand::Rng;
use std::time::{Duration, Instant};
use tracing::debug;

/// Randomized pause between consecutive requests
#[derive(Debug, Clone, Copy)]
pub struct Politeness {
    min: Duration,
    max: Duration,
}

impl Politeness {
    pub fn new(min: Duration, max: Duration) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    pub fn next_delay(&self) -> Duration {
        if self.min == self.max {
            return self.min;
        }
        let secs = rand::thread_rng().gen_range(self.min.as_secs_f64()..=self.max.as_secs_f64());
        Duration::from_secs_f64(secs)
    }

    pub async fn pause(&self) {
        let delay = self.next_delay();
        if delay.is_zero() {
            return;
        }
        debug!("Sleeping {:.2}s", delay.as_secs_f64());
        tokio::time::sleep(delay).await;
    }
}

/// State for one crawl run, handed to every component by reference
#[derive(Debug, Clone)]
pub struct RunContext {
    pub config: ScrapeConfig,
    pub politeness: Politeness,
    pub started: Instant,
}

impl RunContext {
    pub fn new(config: ScrapeConfig) -> Self {
        let politeness = Politeness::new(
            Duration::from_secs_f64(config.delay_min_secs.max(0.0)),
            Duration::from_secs_f64(config.delay_max_secs.max(0.0)),
        );
        Self {
            config,
            politeness,
            started: Instant::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_stays_in_range() {
        let p = Politeness::new(Duration::from_millis(200), Duration::from_millis(400));
        for _ in 0..100 {
            let d = p.next_delay();
            assert!(d >= Duration::from_millis(200) && d <= Duration::from_millis(400));
        }
    }

    #[test]
    fn swapped_bounds_are_reordered() {
        let p = Politeness::new(Duration::from_secs(3), Duration::from_secs(1));
        let d = p.next_delay();
        assert!(d >= Duration::from_secs(1) && d <= Duration::from_secs(3));
    }

    #[test]
    fn context_builds_pacer_from_config() {
        let mut config = ScrapeConfig::default();
        config.delay_min_secs = 0.0;
        config.delay_max_secs = 0.0;
        let ctx = RunContext::new(config);
        assert_eq!(ctx.politeness.next_delay(), Duration::ZERO);
    }
}
