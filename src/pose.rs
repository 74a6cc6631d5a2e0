use crate::error::{GaitError, Result};
use chrono::{DateTime, FixedOffset};
use nalgebra as na;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Foot contact flags for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundState {
    pub left_grounded: bool,
    pub right_grounded: bool,
}

impl GroundState {
    pub fn new(left_grounded: bool, right_grounded: bool) -> Self {
        Self {
            left_grounded,
            right_grounded,
        }
    }

    /// Exactly one foot on the ground
    pub fn single_support(&self) -> bool {
        self.left_grounded != self.right_grounded
    }
}

/// Joints whose positions drive the metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PositionJoint {
    Hips,
    RightThigh,
    LeftThigh,
    RightFoot,
    LeftFoot,
}

impl PositionJoint {
    pub const ALL: [PositionJoint; 5] = [
        PositionJoint::Hips,
        PositionJoint::RightThigh,
        PositionJoint::LeftThigh,
        PositionJoint::RightFoot,
        PositionJoint::LeftFoot,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PositionJoint::Hips => "hips",
            PositionJoint::RightThigh => "right_thigh",
            PositionJoint::LeftThigh => "left_thigh",
            PositionJoint::RightFoot => "right_foot",
            PositionJoint::LeftFoot => "left_foot",
        }
    }
}

/// Joints whose orientation is recorded verbatim, in output column order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrientationJoint {
    RightThigh,
    LeftThigh,
    RightShin,
    LeftShin,
    RightShoulder,
    LeftShoulder,
    Head,
}

impl OrientationJoint {
    pub const ALL: [OrientationJoint; 7] = [
        OrientationJoint::RightThigh,
        OrientationJoint::LeftThigh,
        OrientationJoint::RightShin,
        OrientationJoint::LeftShin,
        OrientationJoint::RightShoulder,
        OrientationJoint::LeftShoulder,
        OrientationJoint::Head,
    ];

    pub fn name(self) -> &'static str {
        match self {
            OrientationJoint::RightThigh => "right_thigh",
            OrientationJoint::LeftThigh => "left_thigh",
            OrientationJoint::RightShin => "right_shin",
            OrientationJoint::LeftShin => "left_shin",
            OrientationJoint::RightShoulder => "right_shoulder",
            OrientationJoint::LeftShoulder => "left_shoulder",
            OrientationJoint::Head => "head",
        }
    }
}

/// World-space joint positions for one frame (y is up)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointPositions {
    pub hips: na::Vector3<f64>,
    pub right_thigh: na::Vector3<f64>,
    pub left_thigh: na::Vector3<f64>,
    pub right_foot: na::Vector3<f64>,
    pub left_foot: na::Vector3<f64>,
}

impl JointPositions {
    /// Build from a name -> position lookup, failing on the first missing joint
    pub fn from_named(named: &HashMap<String, na::Vector3<f64>>) -> Result<Self> {
        let get = |joint: PositionJoint| {
            named
                .get(joint.name())
                .copied()
                .ok_or_else(|| GaitError::MissingJoint(joint.name().to_string()))
        };

        Ok(Self {
            hips: get(PositionJoint::Hips)?,
            right_thigh: get(PositionJoint::RightThigh)?,
            left_thigh: get(PositionJoint::LeftThigh)?,
            right_foot: get(PositionJoint::RightFoot)?,
            left_foot: get(PositionJoint::LeftFoot)?,
        })
    }
}

/// Raw sampled orientations. Quaternions are stored as given, not renormalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointOrientations {
    pub right_thigh: na::Quaternion<f64>,
    pub left_thigh: na::Quaternion<f64>,
    pub right_shin: na::Quaternion<f64>,
    pub left_shin: na::Quaternion<f64>,
    pub right_shoulder: na::Quaternion<f64>,
    pub left_shoulder: na::Quaternion<f64>,
    pub head: na::Quaternion<f64>,
}

impl Default for JointOrientations {
    fn default() -> Self {
        let identity = na::Quaternion::identity();
        Self {
            right_thigh: identity,
            left_thigh: identity,
            right_shin: identity,
            left_shin: identity,
            right_shoulder: identity,
            left_shoulder: identity,
            head: identity,
        }
    }
}

impl JointOrientations {
    pub fn get(&self, joint: OrientationJoint) -> &na::Quaternion<f64> {
        match joint {
            OrientationJoint::RightThigh => &self.right_thigh,
            OrientationJoint::LeftThigh => &self.left_thigh,
            OrientationJoint::RightShin => &self.right_shin,
            OrientationJoint::LeftShin => &self.left_shin,
            OrientationJoint::RightShoulder => &self.right_shoulder,
            OrientationJoint::LeftShoulder => &self.left_shoulder,
            OrientationJoint::Head => &self.head,
        }
    }

    /// Build from a name -> orientation lookup, failing on the first missing joint
    pub fn from_named(named: &HashMap<String, na::Quaternion<f64>>) -> Result<Self> {
        let get = |joint: OrientationJoint| {
            named
                .get(joint.name())
                .copied()
                .ok_or_else(|| GaitError::MissingJoint(joint.name().to_string()))
        };

        Ok(Self {
            right_thigh: get(OrientationJoint::RightThigh)?,
            left_thigh: get(OrientationJoint::LeftThigh)?,
            right_shin: get(OrientationJoint::RightShin)?,
            left_shin: get(OrientationJoint::LeftShin)?,
            right_shoulder: get(OrientationJoint::RightShoulder)?,
            left_shoulder: get(OrientationJoint::LeftShoulder)?,
            head: get(OrientationJoint::Head)?,
        })
    }
}

/// Everything the pipeline consumes for one tick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoseSample {
    pub positions: JointPositions,
    pub orientations: JointOrientations,
    pub ground: GroundState,

    /// Simulation time elapsed since the previous tick (s)
    pub delta_time: f64,

    /// Wall-clock instant the sample was taken
    pub wall_clock: DateTime<FixedOffset>,
}

/// Thigh and foot positions of one leg, sampled at rig resolution
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegSegment {
    pub thigh: na::Vector3<f64>,
    pub foot: na::Vector3<f64>,
}

impl LegSegment {
    pub fn length(&self) -> f64 {
        (self.thigh - self.foot).norm()
    }
}

/// Whichever legs the rig could resolve
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LegSegments {
    pub right: Option<LegSegment>,
    pub left: Option<LegSegment>,
}

impl LegSegments {
    pub fn from_positions(positions: &JointPositions) -> Self {
        Self {
            right: Some(LegSegment {
                thigh: positions.right_thigh,
                foot: positions.right_foot,
            }),
            left: Some(LegSegment {
                thigh: positions.left_thigh,
                foot: positions.left_foot,
            }),
        }
    }

    /// Average thigh-to-foot distance over the available legs
    pub fn leg_length(&self) -> Result<f64> {
        match (self.right, self.left) {
            (Some(right), Some(left)) => Ok((right.length() + left.length()) / 2.0),
            (Some(one), None) | (None, Some(one)) => Ok(one.length()),
            (None, None) => Err(GaitError::NoLegSegment),
        }
    }
}

/// Per-tick provider of pose samples (rig, replay file, scripted fake)
pub trait PoseSource {
    /// Leg geometry as resolved at startup
    fn leg_segments(&self) -> LegSegments;

    /// Next sample, or `None` once the source is exhausted
    fn sample(&mut self) -> Option<PoseSample>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn segment(thigh_y: f64) -> LegSegment {
        LegSegment {
            thigh: na::Vector3::new(0.0, thigh_y, 0.0),
            foot: na::Vector3::zeros(),
        }
    }

    #[test]
    fn test_leg_length_averages_both_sides() {
        let legs = LegSegments {
            right: Some(segment(0.8)),
            left: Some(segment(0.9)),
        };
        assert_relative_eq!(legs.leg_length().unwrap(), 0.85, epsilon = 1e-12);
    }

    #[test]
    fn test_leg_length_single_side() {
        let legs = LegSegments {
            right: None,
            left: Some(segment(0.9)),
        };
        assert_relative_eq!(legs.leg_length().unwrap(), 0.9, epsilon = 1e-12);
    }

    #[test]
    fn test_leg_length_requires_a_segment() {
        let legs = LegSegments::default();
        assert!(matches!(legs.leg_length(), Err(GaitError::NoLegSegment)));
    }

    #[test]
    fn test_named_positions_report_missing_joint() {
        let mut named = HashMap::new();
        for joint in PositionJoint::ALL {
            if joint != PositionJoint::LeftFoot {
                named.insert(joint.name().to_string(), na::Vector3::zeros());
            }
        }

        match JointPositions::from_named(&named) {
            Err(GaitError::MissingJoint(name)) => assert_eq!(name, "left_foot"),
            other => panic!("expected missing joint, got {:?}", other),
        }
    }

    #[test]
    fn test_named_orientations_kept_verbatim() {
        let raw = na::Quaternion::new(2.0, 0.0, 0.0, 0.0);
        let named: HashMap<String, na::Quaternion<f64>> = OrientationJoint::ALL
            .iter()
            .map(|joint| (joint.name().to_string(), raw))
            .collect();

        let orientations = JointOrientations::from_named(&named).unwrap();
        assert_eq!(orientations.get(OrientationJoint::Head).w, 2.0);
    }

    #[test]
    fn test_single_support() {
        assert!(GroundState::new(true, false).single_support());
        assert!(!GroundState::new(true, true).single_support());
        assert!(!GroundState::new(false, false).single_support());
    }
}
