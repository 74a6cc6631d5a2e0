use crate::config::RecorderConfig;
use crate::error::{GaitError, Result};
use crate::frame::GaitFrame;
use crate::pose::OrientationJoint;
use chrono::{DateTime, FixedOffset, SecondsFormat};
use std::io;

/// Decimal places for every floating column
pub const FLOAT_PRECISION: usize = 6;

/// Written for fields that do not apply to a frame
pub const UNSET: f64 = -1.0;

/// Output header, in column order
pub const COLUMNS: [&str; 57] = [
    "DateTime",
    "DateTimeDiffMs",
    "Frame",
    "TimeSum",
    "SysTimestamp",
    "StepCount",
    "LastStepMs",
    "RightFootGround",
    "LeftFootGround",
    "StepLengthAccum",
    "HipPosX",
    "HipPosY",
    "HipPosZ",
    "StepHipDistance",
    "LegLength",
    "StepLength",
    "StepLengthRatio",
    "StrideWidth",
    "StrideWidthRatio",
    "StrideLengthRight",
    "StrideLengthRightRatio",
    "StrideTimeRight",
    "StrideLengthLeft",
    "StrideLengthLeftRatio",
    "StrideTimeLeft",
    "Velocity",
    "VelocityRatio",
    "Acceleration",
    "AccelerationRatio",
    "RightThighRotationX",
    "RightThighRotationY",
    "RightThighRotationZ",
    "RightThighRotationW",
    "LeftThighRotationX",
    "LeftThighRotationY",
    "LeftThighRotationZ",
    "LeftThighRotationW",
    "RightShinRotationX",
    "RightShinRotationY",
    "RightShinRotationZ",
    "RightShinRotationW",
    "LeftShinRotationX",
    "LeftShinRotationY",
    "LeftShinRotationZ",
    "LeftShinRotationW",
    "RightShoulderRotationX",
    "RightShoulderRotationY",
    "RightShoulderRotationZ",
    "RightShoulderRotationW",
    "LeftShoulderRotationX",
    "LeftShoulderRotationY",
    "LeftShoulderRotationZ",
    "LeftShoulderRotationW",
    "HeadRotationX",
    "HeadRotationY",
    "HeadRotationZ",
    "HeadRotationW",
];

/// Renders a frame buffer as a fixed-column CSV table.
///
/// Floats use a fixed number of decimals with `.` as separator, NaN and
/// infinities become empty cells, and fields that do not apply to a frame
/// are written as [`UNSET`]. Ratio columns are derived here
/// from each frame's stored values and leg length.
#[derive(Debug, Clone)]
pub struct RecordSerializer {
    ratio_epsilon: f64,
}

impl Default for RecordSerializer {
    fn default() -> Self {
        Self::new(&RecorderConfig::default())
    }
}

impl RecordSerializer {
    pub fn new(config: &RecorderConfig) -> Self {
        Self {
            ratio_epsilon: config.ratio_epsilon,
        }
    }

    /// Write the header and one row per frame; returns the number of rows written
    pub fn write<W: io::Write>(&self, frames: &[GaitFrame], writer: W) -> Result<usize> {
        let mut wtr = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(writer);

        wtr.write_record(COLUMNS)?;
        for frame in frames {
            wtr.write_record(self.row(frame))?;
        }
        wtr.flush()?;

        Ok(frames.len())
    }

    /// Render into an in-memory string
    pub fn render(&self, frames: &[GaitFrame]) -> Result<String> {
        let mut buf = Vec::new();
        self.write(frames, &mut buf)?;
        String::from_utf8(buf)
            .map_err(|e| GaitError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
    }

    pub fn row(&self, frame: &GaitFrame) -> Vec<String> {
        let eps = self.ratio_epsilon;
        let mut row = Vec::with_capacity(COLUMNS.len());

        row.push(format_instant(&frame.wall_clock));
        row.push(self.float(frame.wall_clock_delta_ms));
        row.push(frame.index.to_string());
        row.push(self.float(frame.time_sum));
        row.push(format_epoch_seconds(&frame.wall_clock));
        row.push(frame.step_count.to_string());
        row.push(self.optional(frame.last_step_ms));
        row.push(flag(frame.ground.right_grounded));
        row.push(flag(frame.ground.left_grounded));
        row.push(self.optional(frame.step_length_accum));

        row.push(self.float(frame.hip_position.x));
        row.push(self.float(frame.hip_position.y));
        row.push(self.float(frame.hip_position.z));
        row.push(self.optional(frame.step_hip_distance));
        row.push(self.float(frame.leg_length));

        row.push(self.float(frame.foot_separation));
        row.push(self.float(frame.step_length_ratio(eps)));
        row.push(self.float(frame.stride_width));
        row.push(self.float(frame.stride_width_ratio(eps)));

        row.push(self.float(frame.stride_length_right));
        row.push(self.float(frame.stride_length_right_ratio(eps)));
        row.push(self.float(frame.stride_time_right));
        row.push(self.float(frame.stride_length_left));
        row.push(self.float(frame.stride_length_left_ratio(eps)));
        row.push(self.float(frame.stride_time_left));

        row.push(self.float(frame.hips.velocity));
        row.push(self.float(frame.velocity_ratio(eps)));
        row.push(self.float(frame.hips.acceleration));
        row.push(self.float(frame.acceleration_ratio(eps)));

        for joint in OrientationJoint::ALL {
            let q = frame.orientations.get(joint);
            row.push(self.float(q.coords.x));
            row.push(self.float(q.coords.y));
            row.push(self.float(q.coords.z));
            row.push(self.float(q.coords.w));
        }

        row
    }

    fn float(&self, value: f64) -> String {
        if value.is_finite() {
            format!("{:.*}", FLOAT_PRECISION, value)
        } else {
            String::new()
        }
    }

    fn optional(&self, value: Option<f64>) -> String {
        self.float(value.unwrap_or(UNSET))
    }
}

fn flag(value: bool) -> String {
    String::from(if value { "1" } else { "0" })
}

/// RFC 3339 with the original offset and full sub-second precision
fn format_instant(instant: &DateTime<FixedOffset>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::AutoSi, false)
}

/// Unix epoch seconds with six decimals, built from integer microseconds
fn format_epoch_seconds(instant: &DateTime<FixedOffset>) -> String {
    let micros = instant.timestamp_micros();
    let sign = if micros < 0 { "-" } else { "" };
    let abs = micros.unsigned_abs();
    format!("{}{}.{:06}", sign, abs / 1_000_000, abs % 1_000_000)
}
