use crate::aggregator::FrameAggregator;
use crate::config::RecorderConfig;
use crate::error::{GaitError, Result};
use crate::frame::GaitFrame;
use crate::pose::{LegSegments, PoseSample, PoseSource};
use crate::serializer::RecordSerializer;
use crate::summary::SessionSummary;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;
use tracing::{info, warn};

/// One recording session: per-tick aggregation plus a single flush at the end
pub struct GaitRecorder {
    config: RecorderConfig,
    aggregator: FrameAggregator,
    serializer: RecordSerializer,
    last_summary: Option<SessionSummary>,
}

impl GaitRecorder {
    /// Resolve leg length and get ready for the first tick
    pub fn start(config: RecorderConfig, legs: &LegSegments) -> Result<Self> {
        config.validate()?;
        let leg_length = legs.leg_length()?;

        info!(
            leg_length,
            debounce_ms = config.step_debounce_ms,
            "gait recording started"
        );

        Ok(Self {
            aggregator: FrameAggregator::new(&config, leg_length),
            serializer: RecordSerializer::new(&config),
            last_summary: None,
            config,
        })
    }

    pub fn from_source<S: PoseSource + ?Sized>(config: RecorderConfig, source: &S) -> Result<Self> {
        Self::start(config, &source.leg_segments())
    }

    pub fn record(&mut self, sample: &PoseSample) -> &GaitFrame {
        self.aggregator.push(sample)
    }

    /// Record every remaining sample from `source`; returns how many were taken
    pub fn record_all<S: PoseSource + ?Sized>(&mut self, source: &mut S) -> usize {
        let mut count = 0;
        while let Some(sample) = source.sample() {
            self.record(&sample);
            count += 1;
        }
        count
    }

    pub fn frames(&self) -> &[GaitFrame] {
        self.aggregator.frames()
    }

    pub fn leg_length(&self) -> f64 {
        self.aggregator.leg_length()
    }

    pub fn config(&self) -> &RecorderConfig {
        &self.config
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary::from_frames(self.frames())
    }

    /// Summary of the frames taken by the most recent flush
    pub fn last_summary(&self) -> Option<&SessionSummary> {
        self.last_summary.as_ref()
    }

    /// Serialize the buffered frames once. The buffer is emptied whether or not the write succeeds.
    pub fn flush_to_writer<W: io::Write>(&mut self, writer: W) -> Result<usize> {
        let frames = self.take_session();
        let result = self.serializer.write(&frames, writer);
        self.report(&result);
        result
    }

    /// Like [`flush_to_writer`](Self::flush_to_writer), creating or truncating `path`
    pub fn flush_to_path(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let frames = self.take_session();

        let result = File::create(path)
            .map_err(GaitError::from)
            .and_then(|file| self.serializer.write(&frames, BufWriter::new(file)));

        match &result {
            Ok(rows) => info!(rows, path = %path.display(), "flushed gait frames"),
            Err(e) => warn!(path = %path.display(), error = %e, "gait flush failed, frames discarded"),
        }
        result
    }

    fn take_session(&mut self) -> Vec<GaitFrame> {
        let frames = self.aggregator.take_frames();
        let summary = SessionSummary::from_frames(&frames);
        info!(
            frames = summary.frame_count,
            steps = summary.total_steps,
            duration_s = summary.duration_s,
            cadence_spm = summary.cadence_spm,
            peak_velocity = summary.peak_velocity,
            "gait session summary"
        );
        self.last_summary = Some(summary);
        frames
    }

    fn report(&self, result: &Result<usize>) {
        match result {
            Ok(rows) => info!(rows, "flushed gait frames"),
            Err(e) => warn!(error = %e, "gait flush failed, frames discarded"),
        }
    }
}
