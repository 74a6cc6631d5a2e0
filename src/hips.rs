use nalgebra as na;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Planar hip motion reported for one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HipsKinematics {
    /// Hip position projected onto the ground plane [x, z]
    pub position: na::Vector2<f64>,
    /// Planar speed magnitude (m/s)
    pub velocity: f64,
    /// Planar acceleration magnitude (m/s^2)
    pub acceleration: f64,
}

impl Default for HipsKinematics {
    fn default() -> Self {
        Self {
            position: na::Vector2::zeros(),
            velocity: 0.0,
            acceleration: 0.0,
        }
    }
}

/// Backward finite-difference estimator of planar hip velocity and acceleration
#[derive(Debug, Clone)]
pub struct HipsTracker {
    prev_position: na::Vector2<f64>,
    prev_velocity: na::Vector2<f64>,
    has_prev: bool,
    kinematics: HipsKinematics,
    min_dt: f64,
}

impl HipsTracker {
    pub fn new(min_dt: f64) -> Self {
        Self {
            prev_position: na::Vector2::zeros(),
            prev_velocity: na::Vector2::zeros(),
            has_prev: false,
            kinematics: HipsKinematics::default(),
            min_dt,
        }
    }

    pub fn update(&mut self, hip_position: &na::Vector3<f64>, dt: f64) -> HipsKinematics {
        // Drop the vertical axis
        let position = na::Vector2::new(hip_position.x, hip_position.z);

        if !self.has_prev {
            self.prev_position = position;
            self.prev_velocity = na::Vector2::zeros();
            self.has_prev = true;
            self.kinematics = HipsKinematics {
                position,
                velocity: 0.0,
                acceleration: 0.0,
            };
            return self.kinematics;
        }

        // A single non-finite division would poison prev_velocity for good
        if !dt.is_finite() || dt < self.min_dt {
            trace!(dt, "degenerate time delta, holding hip kinematics");
            self.prev_position = position;
            self.kinematics.position = position;
            return self.kinematics;
        }

        let velocity = (position - self.prev_position) / dt;
        let acceleration = (velocity - self.prev_velocity) / dt;

        self.prev_position = position;
        self.prev_velocity = velocity;
        self.kinematics = HipsKinematics {
            position,
            velocity: velocity.norm(),
            acceleration: acceleration.norm(),
        };
        self.kinematics
    }
}
