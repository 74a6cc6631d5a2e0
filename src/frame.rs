use crate::hips::HipsKinematics;
use crate::pose::{GroundState, JointOrientations};
use chrono::{DateTime, FixedOffset};
use nalgebra as na;
use serde::{Deserialize, Serialize};

/// Floor for the leg length divisor in every ratio
pub const RATIO_EPSILON: f64 = 1e-4;

/// One tick worth of gait metrics. Built once by the aggregator and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaitFrame {
    /// 0-based, equal to the frame's position in the session buffer
    pub index: u64,
    /// Cumulative simulation time (s)
    pub time_sum: f64,
    pub wall_clock: DateTime<FixedOffset>,
    /// Wall-clock time since the previous frame (ms), zero on the first frame
    pub wall_clock_delta_ms: f64,

    pub step_count: u32,
    /// Set only on frames where a step was counted
    pub last_step_ms: Option<f64>,

    /// 3D distance between the feet
    pub foot_separation: f64,
    /// Separation change accumulated since the previous step, set on step frames
    pub step_length_accum: Option<f64>,
    /// Planar hip displacement since the previous step, set on step frames
    pub step_hip_distance: Option<f64>,
    /// Lateral distance between the feet
    pub stride_width: f64,

    pub stride_length_right: f64,
    pub stride_time_right: f64,
    pub stride_length_left: f64,
    pub stride_time_left: f64,

    pub leg_length: f64,
    pub hip_position: na::Vector3<f64>,
    pub ground: GroundState,
    pub orientations: JointOrientations,
    pub hips: HipsKinematics,
}

/// `value` normalized by leg length, guarded against a zero leg
pub fn ratio(value: f64, leg_length: f64, epsilon: f64) -> f64 {
    value / leg_length.max(epsilon)
}

impl GaitFrame {
    pub fn step_length_ratio(&self, epsilon: f64) -> f64 {
        ratio(self.foot_separation, self.leg_length, epsilon)
    }

    pub fn stride_width_ratio(&self, epsilon: f64) -> f64 {
        ratio(self.stride_width, self.leg_length, epsilon)
    }

    pub fn stride_length_right_ratio(&self, epsilon: f64) -> f64 {
        ratio(self.stride_length_right, self.leg_length, epsilon)
    }

    pub fn stride_length_left_ratio(&self, epsilon: f64) -> f64 {
        ratio(self.stride_length_left, self.leg_length, epsilon)
    }

    pub fn velocity_ratio(&self, epsilon: f64) -> f64 {
        ratio(self.hips.velocity, self.leg_length, epsilon)
    }

    pub fn acceleration_ratio(&self, epsilon: f64) -> f64 {
        ratio(self.hips.acceleration, self.leg_length, epsilon)
    }
}
