use crate::pose::{
    GroundState, JointOrientations, JointPositions, LegSegments, PoseSample, PoseSource,
};
use crate::stride::Foot;
use chrono::{DateTime, Duration, FixedOffset, TimeZone};
use nalgebra as na;
use std::f64::consts::PI;

/// Walking phase of the gait cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GaitPhase {
    /// Both feet on the ground
    DoubleSupport,
    /// Left foot is the stance foot, right foot is swinging
    LeftStance,
    /// Right foot is the stance foot, left foot is swinging
    RightStance,
}

/// A planned footstep target on the ground plane [x, z]
#[derive(Debug, Clone, PartialEq)]
pub struct Footstep {
    pub foot: Foot,
    pub position: na::Vector2<f64>,
}

/// Shape and timing of the scripted gait
#[derive(Debug, Clone)]
pub struct WalkerParams {
    /// Forward distance between consecutive footsteps (m)
    pub step_length: f64,
    /// Lateral distance between the feet (m)
    pub foot_spacing: f64,
    /// Duration of a single swing phase (s)
    pub swing_duration: f64,
    /// Duration of a double support phase (s)
    pub double_support_duration: f64,
    /// Maximum foot lift height during swing (m)
    pub swing_height: f64,
    /// Height of the thigh joints above the ground (m)
    pub thigh_height: f64,
    /// Height of the hips above the ground (m)
    pub hip_height: f64,
    /// Sampling rate (Hz)
    pub rate_hz: f64,
}

impl Default for WalkerParams {
    fn default() -> Self {
        Self {
            step_length: 0.6,
            foot_spacing: 0.2,
            swing_duration: 0.4,
            double_support_duration: 0.15,
            swing_height: 0.08,
            thigh_height: 0.9,
            hip_height: 0.95,
            rate_hz: 60.0,
        }
    }
}

impl WalkerParams {
    /// The `index`-th footstep of a straight walk along +z, left foot first.
    /// Each landing sits half a step ahead of the previous one's midpoint.
    pub fn footstep(&self, index: usize) -> Footstep {
        let (foot, side) = if index % 2 == 0 {
            (Foot::Left, -1.0)
        } else {
            (Foot::Right, 1.0)
        };
        Footstep {
            foot,
            position: na::Vector2::new(
                side * self.foot_spacing / 2.0,
                self.step_length * (index as f64 + 0.5),
            ),
        }
    }

    /// Swing foot at `progress` in [0, 1] between two ground points, lifted on a half sine
    pub fn swing_position(
        &self,
        from: &na::Vector2<f64>,
        to: &na::Vector2<f64>,
        progress: f64,
    ) -> na::Vector3<f64> {
        let s = progress.clamp(0.0, 1.0);
        let over = from.lerp(to, s);
        na::Vector3::new(over.x, self.swing_height * (PI * s).sin(), over.y)
    }

    fn duration_of(&self, phase: GaitPhase) -> f64 {
        match phase.swing_foot() {
            Some(_) => self.swing_duration,
            None => self.double_support_duration,
        }
    }
}

impl GaitPhase {
    /// Foot in the air, if any
    pub fn swing_foot(self) -> Option<Foot> {
        match self {
            GaitPhase::DoubleSupport => None,
            GaitPhase::LeftStance => Some(Foot::Right),
            GaitPhase::RightStance => Some(Foot::Left),
        }
    }

    fn swinging(foot: Foot) -> Self {
        match foot {
            Foot::Left => GaitPhase::RightStance,
            Foot::Right => GaitPhase::LeftStance,
        }
    }
}

/// Deterministic pose source that walks an endless straight footstep sequence.
///
/// Stance feet are grounded, the swing foot follows a sine arc, and the
/// hips track the midpoint of the feet. Wall-clock instants advance with
/// simulation time from a fixed start.
pub struct ScriptedWalker {
    pub params: WalkerParams,
    pub phase: GaitPhase,
    phase_time: f64,
    steps_taken: usize,
    planted: [na::Vector2<f64>; 2],
    start: DateTime<FixedOffset>,
    tick: u64,
    total_ticks: u64,
}

fn slot(foot: Foot) -> usize {
    match foot {
        Foot::Right => 0,
        Foot::Left => 1,
    }
}

impl ScriptedWalker {
    pub fn new(params: WalkerParams, duration_s: f64) -> Self {
        let total_ticks = (duration_s * params.rate_hz).round().max(0.0) as u64;
        let half_spacing = params.foot_spacing / 2.0;

        let start = FixedOffset::east_opt(0)
            .and_then(|utc| utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single())
            .unwrap_or_default();

        Self {
            params,
            phase: GaitPhase::DoubleSupport,
            phase_time: 0.0,
            steps_taken: 0,
            planted: [
                na::Vector2::new(half_spacing, 0.0),
                na::Vector2::new(-half_spacing, 0.0),
            ],
            start,
            tick: 0,
            total_ticks,
        }
    }

    pub fn dt(&self) -> f64 {
        1.0 / self.params.rate_hz
    }

    pub fn is_done(&self) -> bool {
        self.tick >= self.total_ticks
    }

    pub fn steps_taken(&self) -> usize {
        self.steps_taken
    }

    fn advance(&mut self, dt: f64) {
        self.phase_time += dt;
        if self.phase_time < self.params.duration_of(self.phase) {
            return;
        }
        self.phase_time = 0.0;

        self.phase = match self.phase.swing_foot() {
            None => GaitPhase::swinging(self.params.footstep(self.steps_taken).foot),
            Some(foot) => {
                // Swing foot lands on its target
                self.planted[slot(foot)] = self.params.footstep(self.steps_taken).position;
                self.steps_taken += 1;
                GaitPhase::DoubleSupport
            }
        };
    }

    /// Right foot, left foot and contact for the current phase
    fn feet(&self) -> (na::Vector3<f64>, na::Vector3<f64>, GroundState) {
        let on_ground = |p: &na::Vector2<f64>| na::Vector3::new(p.x, 0.0, p.y);
        let mut feet = self.planted.map(|p| on_ground(&p));

        let Some(swing) = self.phase.swing_foot() else {
            return (feet[0], feet[1], GroundState::new(true, true));
        };

        let progress = self.phase_time / self.params.duration_of(self.phase);
        let target = self.params.footstep(self.steps_taken).position;
        feet[slot(swing)] = self
            .params
            .swing_position(&self.planted[slot(swing)], &target, progress);

        let ground = GroundState::new(swing != Foot::Left, swing != Foot::Right);
        (feet[0], feet[1], ground)
    }

    fn pose(&self) -> (JointPositions, JointOrientations, GroundState) {
        let (right_foot, left_foot, ground) = self.feet();
        let mid = (right_foot + left_foot) / 2.0;
        let hips = na::Vector3::new(mid.x, self.params.hip_height, mid.z);

        let thigh = |foot: &na::Vector3<f64>| na::Vector3::new(foot.x, self.params.thigh_height, hips.z);
        let right_thigh = thigh(&right_foot);
        let left_thigh = thigh(&left_foot);

        // Leg pitch about the lateral axis, positive with the foot ahead of the thigh
        let pitch = |thigh: &na::Vector3<f64>, foot: &na::Vector3<f64>| {
            (foot.z - thigh.z).atan2(thigh.y - foot.y)
        };
        let rotation = |angle: f64| {
            na::UnitQuaternion::from_axis_angle(&na::Vector3::x_axis(), angle).into_inner()
        };

        let right_pitch = pitch(&right_thigh, &right_foot);
        let left_pitch = pitch(&left_thigh, &left_foot);

        let orientations = JointOrientations {
            right_thigh: rotation(right_pitch),
            left_thigh: rotation(left_pitch),
            right_shin: rotation(right_pitch * 0.5),
            left_shin: rotation(left_pitch * 0.5),
            // Arms swing against the legs
            right_shoulder: rotation(-right_pitch * 0.5),
            left_shoulder: rotation(-left_pitch * 0.5),
            head: na::Quaternion::identity(),
        };

        let positions = JointPositions {
            hips,
            right_thigh,
            left_thigh,
            right_foot,
            left_foot,
        };

        (positions, orientations, ground)
    }
}

impl PoseSource for ScriptedWalker {
    fn leg_segments(&self) -> LegSegments {
        let (positions, _, _) = self.pose();
        LegSegments::from_positions(&positions)
    }

    fn sample(&mut self) -> Option<PoseSample> {
        if self.is_done() {
            return None;
        }

        let dt = self.dt();
        let elapsed = self.tick as f64 * dt;
        let (positions, orientations, ground) = self.pose();

        let sample = PoseSample {
            positions,
            orientations,
            ground,
            delta_time: dt,
            wall_clock: self.start + Duration::microseconds((elapsed * 1e6).round() as i64),
        };

        self.advance(dt);
        self.tick += 1;
        Some(sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_footsteps_alternate_and_advance() {
        let params = WalkerParams::default();
        let steps: Vec<_> = (0..4).map(|i| params.footstep(i)).collect();

        assert_eq!(steps[0].foot, Foot::Left);
        assert_eq!(steps[1].foot, Foot::Right);
        assert_eq!(steps[2].foot, Foot::Left);
        // Left foot at negative x, right at positive x
        assert_relative_eq!(steps[0].position.x, -0.1);
        assert_relative_eq!(steps[1].position.x, 0.1);
        assert_relative_eq!(steps[0].position.y, 0.3);
        assert_relative_eq!(
            steps[3].position.y - steps[2].position.y,
            params.step_length,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_swing_arc() {
        let params = WalkerParams::default();
        let from = na::Vector2::new(0.1, 0.0);
        let to = na::Vector2::new(0.1, 0.6);

        let p0 = params.swing_position(&from, &to, 0.0);
        let p1 = params.swing_position(&from, &to, 1.0);
        assert!(p0.y.abs() < 1e-10);
        assert!(p1.y.abs() < 1e-10);
        assert_relative_eq!(p1.z, 0.6, epsilon = 1e-12);

        let mid = params.swing_position(&from, &to, 0.5);
        assert_relative_eq!(mid.y, params.swing_height, epsilon = 1e-10);
        assert_relative_eq!(mid.z, 0.3, epsilon = 1e-10);

        // Out-of-range progress stays on the endpoints
        assert_eq!(params.swing_position(&from, &to, 1.5), p1);
    }

    #[test]
    fn test_starts_in_double_support() {
        let mut walker = ScriptedWalker::new(WalkerParams::default(), 1.0);
        let first = walker.sample().unwrap();

        assert_eq!(first.ground, GroundState::new(true, true));
        assert_relative_eq!(
            (first.positions.right_foot - first.positions.left_foot).norm(),
            0.2,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_phase_sequence_alternates() {
        let mut walker = ScriptedWalker::new(WalkerParams::default(), 3.0);
        let mut phases = vec![walker.phase];

        while walker.sample().is_some() {
            if phases.last() != Some(&walker.phase) {
                phases.push(walker.phase);
            }
        }

        assert_eq!(phases[0], GaitPhase::DoubleSupport);
        assert_eq!(phases[1], GaitPhase::RightStance);
        assert_eq!(phases[2], GaitPhase::DoubleSupport);
        assert_eq!(phases[3], GaitPhase::LeftStance);
        assert!(walker.steps_taken() >= 4);
    }

    #[test]
    fn test_swing_foot_is_the_lifted_one() {
        let mut walker = ScriptedWalker::new(WalkerParams::default(), 2.0);
        let mut lifted = 0;
        while let Some(sample) = walker.sample() {
            let (ground, p) = (sample.ground, &sample.positions);
            assert!(ground.right_grounded || ground.left_grounded);
            if ground.right_grounded {
                assert_eq!(p.right_foot.y, 0.0);
            }
            if ground.left_grounded {
                assert_eq!(p.left_foot.y, 0.0);
            }
            if p.right_foot.y > 0.0 || p.left_foot.y > 0.0 {
                lifted += 1;
            }
        }
        assert!(lifted > 0);
        assert_eq!(GaitPhase::LeftStance.swing_foot(), Some(Foot::Right));
        assert_eq!(GaitPhase::DoubleSupport.swing_foot(), None);
    }

    #[test]
    fn test_sample_count_and_clock() {
        let mut walker = ScriptedWalker::new(WalkerParams::default(), 0.5);
        let samples: Vec<_> = std::iter::from_fn(|| walker.sample()).collect();

        assert_eq!(samples.len(), 30);
        let span = samples[29].wall_clock - samples[0].wall_clock;
        assert_eq!(span.num_microseconds(), Some(483_333));
    }

    #[test]
    fn test_leg_segments_match_thigh_height() {
        let walker = ScriptedWalker::new(WalkerParams::default(), 1.0);
        let leg = walker.leg_segments().leg_length().unwrap();
        assert_relative_eq!(leg, 0.9, epsilon = 1e-12);
    }
}
