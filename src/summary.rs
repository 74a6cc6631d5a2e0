use crate::frame::GaitFrame;
use crate::pose::GroundState;
use serde::{Deserialize, Serialize};

/// Whole-session aggregates for a quick look at a recording
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub frame_count: usize,
    pub total_steps: u32,
    /// Simulation time covered by the frames (s)
    pub duration_s: f64,
    /// Steps per minute
    pub cadence_spm: f64,
    pub mean_stride_right: Option<f64>,
    pub mean_stride_left: Option<f64>,
    pub peak_velocity: f64,
}

impl SessionSummary {
    pub fn from_frames(frames: &[GaitFrame]) -> Self {
        let (first, last) = match (frames.first(), frames.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Self::default(),
        };

        let duration_s = last.time_sum;
        let cadence_spm = if duration_s > 0.0 {
            last.step_count as f64 / duration_s * 60.0
        } else {
            0.0
        };

        // Strides are committed on the touch-down frame of each foot
        let mut right = Vec::new();
        let mut left = Vec::new();
        let mut prev: GroundState = first.ground;
        for frame in &frames[1..] {
            if frame.ground.right_grounded && !prev.right_grounded {
                right.push(frame.stride_length_right);
            }
            if frame.ground.left_grounded && !prev.left_grounded {
                left.push(frame.stride_length_left);
            }
            prev = frame.ground;
        }

        let peak_velocity = frames
            .iter()
            .map(|f| f.hips.velocity)
            .filter(|v| v.is_finite())
            .fold(0.0, f64::max);

        Self {
            frame_count: frames.len(),
            total_steps: last.step_count,
            duration_s,
            cadence_spm,
            mean_stride_right: mean(&right),
            mean_stride_left: mean(&left),
            peak_velocity,
        }
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
