//! Gait metrics from per-frame body pose samples.
//!
//! Each tick a [`PoseSample`] goes through the step counter, the per-foot
//! stride trackers and the hips tracker, and the aggregator appends one
//! immutable [`GaitFrame`]. At the end of a session the frames are written
//! once as a fixed-column CSV table.

pub mod aggregator;
pub mod config;
pub mod error;
pub mod frame;
pub mod hips;
pub mod pose;
pub mod recorder;
pub mod serializer;
pub mod step_counter;
pub mod stride;
pub mod summary;
pub mod synthetic;

pub use aggregator::FrameAggregator;
pub use config::RecorderConfig;
pub use error::{GaitError, Result};
pub use frame::GaitFrame;
pub use hips::{HipsKinematics, HipsTracker};
pub use pose::{
    GroundState, JointOrientations, JointPositions, LegSegment, LegSegments, OrientationJoint,
    PoseSample, PoseSource, PositionJoint,
};
pub use recorder::GaitRecorder;
pub use serializer::{RecordSerializer, COLUMNS, FLOAT_PRECISION, UNSET};
pub use step_counter::{StepCounter, StepObservation};
pub use stride::{Foot, FootStride, StrideCalculator};
pub use summary::SessionSummary;
pub use synthetic::{ScriptedWalker, WalkerParams};
