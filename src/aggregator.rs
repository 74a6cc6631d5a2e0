use crate::config::RecorderConfig;
use crate::frame::GaitFrame;
use crate::hips::HipsTracker;
use crate::pose::PoseSample;
use crate::step_counter::{elapsed_ms, StepCounter};
use crate::stride::StrideCalculator;
use chrono::{DateTime, FixedOffset};
use nalgebra as na;

/// Drives the per-tick gait state machines and owns the session's frame buffer
pub struct FrameAggregator {
    pub step_counter: StepCounter,
    pub hips_tracker: HipsTracker,
    /// Seeded from the first sample
    pub stride: Option<StrideCalculator>,

    leg_length: f64,
    time_sum: f64,
    prev_wall_clock: Option<DateTime<FixedOffset>>,

    // Step length bookkeeping between step boundaries
    prev_foot_separation: Option<f64>,
    step_length_accum: f64,
    last_step_hip_position: Option<na::Vector3<f64>>,

    frames: Vec<GaitFrame>,
}

impl FrameAggregator {
    pub fn new(config: &RecorderConfig, leg_length: f64) -> Self {
        Self {
            step_counter: StepCounter::new(config.step_debounce_ms),
            hips_tracker: HipsTracker::new(config.min_dt),
            stride: None,
            leg_length,
            time_sum: 0.0,
            prev_wall_clock: None,
            prev_foot_separation: None,
            step_length_accum: 0.0,
            last_step_hip_position: None,
            frames: Vec::new(),
        }
    }

    /// Process one tick and append its frame
    pub fn push(&mut self, sample: &PoseSample) -> &GaitFrame {
        let positions = &sample.positions;
        let ground = sample.ground;

        // Non-finite or negative deltas are not accumulated into session time
        if sample.delta_time.is_finite() && sample.delta_time >= 0.0 {
            self.time_sum += sample.delta_time;
        }

        // 1. Strides
        let stride = match self.stride.take() {
            Some(mut stride) => {
                stride.update(
                    &positions.right_foot,
                    &positions.left_foot,
                    ground.right_grounded,
                    ground.left_grounded,
                    self.time_sum,
                );
                stride
            }
            None => StrideCalculator::init(
                &positions.right_foot,
                &positions.left_foot,
                ground.right_grounded,
                ground.left_grounded,
                self.time_sum,
            ),
        };
        let (stride_length_right, stride_time_right) =
            (stride.right.stride_length, stride.right.stride_duration);
        let (stride_length_left, stride_time_left) =
            (stride.left.stride_length, stride.left.stride_duration);
        self.stride = Some(stride);

        // 2. Steps
        let step = self.step_counter.observe(
            ground.left_grounded,
            ground.right_grounded,
            sample.wall_clock,
        );

        // 3. Instantaneous foot geometry
        let foot_separation = (positions.right_foot - positions.left_foot).norm();
        let stride_width = (positions.right_foot.x - positions.left_foot.x).abs();

        // 4. Separation change accumulated between step boundaries
        let prev_separation = *self.prev_foot_separation.get_or_insert(foot_separation);
        self.step_length_accum += (foot_separation - prev_separation).abs();
        self.prev_foot_separation = Some(foot_separation);

        let step_length_accum = if step.stepped {
            Some(std::mem::take(&mut self.step_length_accum))
        } else {
            None
        };

        // 5. Hip travel between step boundaries
        let anchor = *self.last_step_hip_position.get_or_insert(positions.hips);
        let step_hip_distance = if step.stepped {
            self.last_step_hip_position = Some(positions.hips);
            Some(planar_distance(&anchor, &positions.hips))
        } else {
            None
        };

        // 6. Hip kinematics
        let hips = self.hips_tracker.update(&positions.hips, sample.delta_time);

        let wall_clock_delta_ms = self
            .prev_wall_clock
            .map(|prev| elapsed_ms(prev, sample.wall_clock))
            .unwrap_or(0.0);
        self.prev_wall_clock = Some(sample.wall_clock);

        let frame = GaitFrame {
            index: self.frames.len() as u64,
            time_sum: self.time_sum,
            wall_clock: sample.wall_clock,
            wall_clock_delta_ms,
            step_count: self.step_counter.step_count,
            last_step_ms: step.step_duration_ms,
            foot_separation,
            step_length_accum,
            step_hip_distance,
            stride_width,
            stride_length_right,
            stride_time_right,
            stride_length_left,
            stride_time_left,
            leg_length: self.leg_length,
            hip_position: positions.hips,
            ground,
            orientations: sample.orientations.clone(),
            hips,
        };

        self.frames.push(frame);
        &self.frames[self.frames.len() - 1]
    }

    pub fn frames(&self) -> &[GaitFrame] {
        &self.frames
    }

    pub fn leg_length(&self) -> f64 {
        self.leg_length
    }

    /// Hand the buffered frames to the caller, leaving the buffer empty
    pub fn take_frames(&mut self) -> Vec<GaitFrame> {
        std::mem::take(&mut self.frames)
    }
}

/// Distance between two points on the ground plane (x, z)
pub fn planar_distance(a: &na::Vector3<f64>, b: &na::Vector3<f64>) -> f64 {
    na::Vector2::new(b.x - a.x, b.z - a.z).norm()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::{GroundState, JointOrientations, JointPositions};
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 5, 9, 30, 0)
            .unwrap()
    }

    fn sample(
        ms: i64,
        right_x: f64,
        left_x: f64,
        hips_z: f64,
        left: bool,
        right: bool,
    ) -> PoseSample {
        PoseSample {
            positions: JointPositions {
                hips: na::Vector3::new(0.0, 0.9, hips_z),
                right_thigh: na::Vector3::new(right_x, 0.9, 0.0),
                left_thigh: na::Vector3::new(left_x, 0.9, 0.0),
                right_foot: na::Vector3::new(right_x, 0.0, 0.0),
                left_foot: na::Vector3::new(left_x, 0.0, 0.0),
            },
            orientations: JointOrientations::default(),
            ground: GroundState::new(left, right),
            delta_time: 0.1,
            wall_clock: t0() + Duration::milliseconds(ms),
        }
    }

    #[test]
    fn test_three_tick_step_length_accumulation() {
        let mut agg = FrameAggregator::new(&RecorderConfig::default(), 1.0);

        // Separations 0.2, 0.5, 0.2; single support only on the last tick
        agg.push(&sample(0, 0.1, -0.1, 0.0, true, true));
        agg.push(&sample(100, 0.25, -0.25, 0.1, true, true));
        agg.push(&sample(200, 0.1, -0.1, 0.3, true, false));

        let frames = agg.frames();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].step_length_accum, None);
        assert_eq!(frames[1].step_length_accum, None);
        assert_relative_eq!(frames[2].step_length_accum.unwrap(), 0.6, epsilon = 1e-12);
        assert_relative_eq!(frames[2].step_hip_distance.unwrap(), 0.3, epsilon = 1e-12);
        assert_eq!(frames[2].last_step_ms, Some(200.0));
        assert_eq!(frames[2].step_count, 1);
    }

    #[test]
    fn test_accumulator_resets_after_step() {
        let mut agg = FrameAggregator::new(&RecorderConfig::default(), 1.0);

        agg.push(&sample(0, 0.1, -0.1, 0.0, true, true));
        agg.push(&sample(200, 0.2, -0.2, 0.0, true, false));
        agg.push(&sample(300, 0.3, -0.3, 0.0, true, true));
        agg.push(&sample(500, 0.3, -0.1, 0.5, false, true));

        let frames = agg.frames();
        assert_relative_eq!(frames[1].step_length_accum.unwrap(), 0.2, epsilon = 1e-12);
        // |0.6 - 0.4| + |0.4 - 0.6|
        assert_relative_eq!(frames[3].step_length_accum.unwrap(), 0.4, epsilon = 1e-12);
        assert_relative_eq!(frames[3].step_hip_distance.unwrap(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_frame_bookkeeping() {
        let mut agg = FrameAggregator::new(&RecorderConfig::default(), 0.9);

        for i in 0..5 {
            agg.push(&sample(i * 16, 0.1, -0.1, 0.0, true, true));
        }

        let frames = agg.frames();
        for (i, frame) in frames.iter().enumerate() {
            assert_eq!(frame.index, i as u64);
            assert_eq!(frame.leg_length, 0.9);
            assert_relative_eq!(frame.time_sum, 0.1 * (i + 1) as f64, epsilon = 1e-12);
            assert_relative_eq!(frame.stride_width, 0.2, epsilon = 1e-12);
        }
        assert_eq!(frames[0].wall_clock_delta_ms, 0.0);
        assert_eq!(frames[3].wall_clock_delta_ms, 16.0);
    }

    #[test]
    fn test_degenerate_delta_does_not_poison_frames() {
        let mut agg = FrameAggregator::new(&RecorderConfig::default(), 1.0);

        agg.push(&sample(0, 0.1, -0.1, 0.0, true, true));
        agg.push(&sample(100, 0.1, -0.1, 0.1, true, true));

        let mut bad = sample(200, 0.1, -0.1, 0.2, true, true);
        bad.delta_time = f64::NAN;
        let held = agg.push(&bad).clone();

        let resumed = agg.push(&sample(300, 0.1, -0.1, 0.3, true, true)).clone();

        assert_relative_eq!(held.hips.velocity, 1.0, epsilon = 1e-9);
        assert_relative_eq!(held.time_sum, 0.2, epsilon = 1e-12);
        assert!(resumed.hips.velocity.is_finite());
        assert!(resumed.hips.acceleration.is_finite());
    }

    #[test]
    fn test_take_frames_empties_buffer() {
        let mut agg = FrameAggregator::new(&RecorderConfig::default(), 1.0);
        agg.push(&sample(0, 0.1, -0.1, 0.0, true, true));

        let taken = agg.take_frames();
        assert_eq!(taken.len(), 1);
        assert!(agg.frames().is_empty());
    }
}
