use crate::pose::GroundState;
use chrono::{DateTime, FixedOffset};
use tracing::debug;

/// Result of feeding one frame of contact flags to the counter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepObservation {
    pub stepped: bool,
    /// Time since the previous counted step, only set when `stepped`
    pub step_duration_ms: Option<f64>,
}

/// Counts steps from foot contact with a support-phase gate and a debounce.
///
/// A step is one entry into single support (exactly one foot grounded).
/// The gate closes for the rest of that single-support interval and reopens
/// once both feet share a state again, so a held single support counts once.
/// Entries closer than `debounce_ms` to the last counted step are dropped.
#[derive(Debug, Clone)]
pub struct StepCounter {
    pub step_count: u32,
    gate_open: bool,
    last_step_time: Option<DateTime<FixedOffset>>,
    debounce_ms: f64,
}

impl StepCounter {
    pub fn new(debounce_ms: f64) -> Self {
        Self {
            step_count: 0,
            gate_open: true,
            last_step_time: None,
            debounce_ms,
        }
    }

    pub fn observe(
        &mut self,
        left_grounded: bool,
        right_grounded: bool,
        now: DateTime<FixedOffset>,
    ) -> StepObservation {
        let single_support = GroundState::new(left_grounded, right_grounded).single_support();
        let mut observation = StepObservation {
            stepped: false,
            step_duration_ms: None,
        };

        // First observation seeds the step clock
        let last = *self.last_step_time.get_or_insert(now);

        if single_support && self.gate_open {
            let elapsed = elapsed_ms(last, now);

            if elapsed >= self.debounce_ms {
                self.step_count += 1;
                self.last_step_time = Some(now);
                observation = StepObservation {
                    stepped: true,
                    step_duration_ms: Some(elapsed),
                };
                debug!(step = self.step_count, elapsed_ms = elapsed, "step counted");
            }
        }

        self.gate_open = !single_support;
        observation
    }

    pub fn reset(&mut self, now: DateTime<FixedOffset>) {
        self.step_count = 0;
        self.gate_open = true;
        self.last_step_time = Some(now);
    }
}

/// Signed milliseconds from `earlier` to `later`
pub fn elapsed_ms(earlier: DateTime<FixedOffset>, later: DateTime<FixedOffset>) -> f64 {
    let delta = later - earlier;
    match delta.num_microseconds() {
        Some(us) => us as f64 / 1000.0,
        None => delta.num_milliseconds() as f64,
    }
}
