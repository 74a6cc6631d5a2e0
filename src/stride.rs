use nalgebra as na;
use tracing::debug;

/// Which foot is which
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Foot {
    Left,
    Right,
}

/// Lift-off to touch-down tracker for a single foot
#[derive(Debug, Clone)]
pub struct FootStride {
    pub foot: Foot,
    prev_grounded: bool,
    liftoff_position: na::Vector3<f64>,
    liftoff_time: f64,

    /// Displacement between the last lift-off and the following touch-down
    pub stride_length: f64,
    /// Seconds between the last lift-off and the following touch-down
    pub stride_duration: f64,
}

impl FootStride {
    pub fn new(foot: Foot, position: na::Vector3<f64>, grounded: bool, time: f64) -> Self {
        Self {
            foot,
            prev_grounded: grounded,
            liftoff_position: position,
            liftoff_time: time,
            stride_length: 0.0,
            stride_duration: 0.0,
        }
    }

    /// Returns true when a stride was committed this frame
    pub fn update(&mut self, position: &na::Vector3<f64>, grounded: bool, time: f64) -> bool {
        let mut committed = false;

        match (self.prev_grounded, grounded) {
            // Touch-down closes the stride opened at lift-off
            (false, true) => {
                self.stride_length = (position - self.liftoff_position).norm();
                self.stride_duration = (time - self.liftoff_time).max(0.0);
                committed = true;
                debug!(
                    foot = ?self.foot,
                    length = self.stride_length,
                    duration = self.stride_duration,
                    "stride committed"
                );
            }
            (true, false) => {
                self.liftoff_position = *position;
                self.liftoff_time = time;
            }
            _ => {}
        }

        self.prev_grounded = grounded;
        committed
    }
}

/// Independent stride trackers for both feet
#[derive(Debug, Clone)]
pub struct StrideCalculator {
    pub right: FootStride,
    pub left: FootStride,
}

impl StrideCalculator {
    /// Seed both feet from the first frame of the session
    pub fn init(
        right_pos: &na::Vector3<f64>,
        left_pos: &na::Vector3<f64>,
        right_grounded: bool,
        left_grounded: bool,
        time: f64,
    ) -> Self {
        Self {
            right: FootStride::new(Foot::Right, *right_pos, right_grounded, time),
            left: FootStride::new(Foot::Left, *left_pos, left_grounded, time),
        }
    }

    pub fn update(
        &mut self,
        right_pos: &na::Vector3<f64>,
        left_pos: &na::Vector3<f64>,
        right_grounded: bool,
        left_grounded: bool,
        time: f64,
    ) {
        self.right.update(right_pos, right_grounded, time);
        self.left.update(left_pos, left_grounded, time);
    }

    pub fn foot(&self, foot: Foot) -> &FootStride {
        match foot {
            Foot::Left => &self.left,
            Foot::Right => &self.right,
        }
    }
}
