//! Adaptive painting session: the composition root.
//!
//! Ties a painter to the grip pipeline. Each tick drains the collector,
//! feeds the stability detector, lets the painter simulate, applies any
//! freshly stabilized reading to the magnifier in automatic mode, and
//! commits. Losing the sensor stream downgrades the session to plain
//! painting instead of failing it.

use chrono::Local;
use easel::export::{timestamped_name, SnapshotWriter};
use easel::magnifier::MagnifierMode;
use easel::painter::{ContactProbe, FrameInput, Painter};
use gripflow::assist::{AssistCurve, CalibrationRange};
use gripflow::collector::{CollectError, ForceCollector};
use gripflow::stability::{StabilityConfig, StabilityDetector};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::phase::{PhaseKind, PhasePlan};

const SNAPSHOT_WORKERS: usize = 2;
const SNAPSHOT_QUEUE_DEPTH: usize = 8;

/// Session counters for summaries and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub frames: u64,
    pub samples_ingested: u64,
    pub levels_applied: u64,
}

struct SnapshotExporter {
    writer: SnapshotWriter,
    dir: PathBuf,
}

/// A painter with grip-adaptive assistance and a phase plan.
pub struct AdaptiveSession<P: ContactProbe> {
    painter: Painter<P>,
    collector: Option<ForceCollector>,
    detector: StabilityDetector,
    range: CalibrationRange,
    curve: AssistCurve,
    plan: PhasePlan,
    stats: SessionStats,
    was_painting: bool,
    exporter: Option<SnapshotExporter>,
}

impl<P: ContactProbe> AdaptiveSession<P> {
    /// Build a session at the start of the default phase plan.
    ///
    /// `collector` is optional so replays and manual-only runs work
    /// without a sensor attached.
    pub fn new(
        painter: Painter<P>,
        collector: Option<ForceCollector>,
        stability: StabilityConfig,
        curve: AssistCurve,
    ) -> Self {
        let mut session = Self {
            painter,
            collector,
            detector: StabilityDetector::new(stability),
            range: CalibrationRange::default(),
            curve,
            plan: PhasePlan::default(),
            stats: SessionStats::default(),
            was_painting: false,
            exporter: None,
        };
        session.enter_phase();
        session
    }

    /// Export both buffers into `dir` whenever a phase is left.
    ///
    /// Saves run on background workers; a full queue drops that snapshot
    /// with a warning instead of stalling the tick.
    pub fn enable_snapshots(&mut self, dir: impl Into<PathBuf>) {
        self.exporter = Some(SnapshotExporter {
            writer: SnapshotWriter::new(SNAPSHOT_WORKERS, SNAPSHOT_QUEUE_DEPTH),
            dir: dir.into(),
        });
    }

    /// One frame: drain sensor input, simulate, apply assist, commit.
    pub fn tick(&mut self, input: FrameInput) {
        self.drain_sensor();
        self.painter.simulate(input);
        self.rearm_on_stroke_start();
        self.apply_assist();
        self.painter.commit();
        self.stats.frames += 1;
    }

    // In automatic mode the detector re-arms on every stroke start:
    // readings gathered before the press do not carry over.
    fn rearm_on_stroke_start(&mut self) {
        let painting = !self.painter.active_brushes().is_empty();
        if painting
            && !self.was_painting
            && self.painter.magnifier().mode() == MagnifierMode::Auto
        {
            debug!("stroke started in automatic mode, re-arming stability detection");
            self.detector.reset();
            if let Some(collector) = &self.collector {
                collector.clear();
            }
        }
        self.was_painting = painting;
    }

    fn drain_sensor(&mut self) {
        let polled = match &self.collector {
            Some(collector) => collector.poll(),
            None => return,
        };
        match polled {
            Ok(records) => {
                for record in &records {
                    self.detector.ingest(record);
                }
                self.stats.samples_ingested += records.len() as u64;
            }
            Err(CollectError::Disconnected { error, .. }) => {
                warn!(
                    "grip stream lost ({}); continuing without assist",
                    error.as_deref().unwrap_or("no detail")
                );
                self.collector = None;
            }
        }
    }

    fn apply_assist(&mut self) {
        if self.painter.magnifier().mode() != MagnifierMode::Auto {
            return;
        }
        if let Some(value) = self.detector.take_stabilized() {
            let level = self.curve.select_level(value, &self.range);
            debug!("stabilized {value:.2} -> assist level {level}");
            self.painter.magnifier_mut().set_level(level);
            self.stats.levels_applied += 1;
        }
    }

    /// Advance the phase plan, capturing calibration extremes at the
    /// boundary.
    pub fn next_phase(&mut self) {
        let left = match self.plan.advance() {
            Some(kind) => kind,
            None => {
                debug!("already at the final phase");
                return;
            }
        };
        self.leave_phase(left);
        self.enter_phase();
    }

    /// Step back one phase, capturing calibration extremes on the way
    /// out just as a forward move would.
    pub fn previous_phase(&mut self) {
        let left = match self.plan.retreat() {
            Some(kind) => kind,
            None => return,
        };
        self.leave_phase(left);
        self.enter_phase();
    }

    fn leave_phase(&mut self, left: PhaseKind) {
        match left {
            PhaseKind::CalibrateMin => match self.detector.stabilized_value() {
                Some(value) => {
                    info!("calibrated grip minimum: {value:.2}");
                    self.range.min = value;
                }
                None => warn!("leaving min calibration with no stabilized grip"),
            },
            PhaseKind::CalibrateMax => match self.detector.stabilized_value() {
                Some(value) => {
                    info!("calibrated grip maximum: {value:.2}");
                    self.range.max = value;
                }
                None => warn!("leaving max calibration with no stabilized grip"),
            },
            _ => {}
        }
        self.export_phase(left);
    }

    /// Export both buffers for the current phase on demand, e.g. before
    /// shutting down while still in the final phase.
    pub fn export_snapshots(&self) {
        self.export_phase(self.plan.current());
    }

    fn export_phase(&self, phase: PhaseKind) {
        let exporter = match &self.exporter {
            Some(exporter) => exporter,
            None => return,
        };
        let now = Local::now();
        for (buffer, surface) in [
            ("canvas", self.painter.canvas().clone()),
            ("result", self.painter.result().clone()),
        ] {
            let stem = format!("{}_{buffer}", phase.slug());
            let path = exporter.dir.join(timestamped_name(&stem, now));
            if let Err(e) = exporter.writer.enqueue(surface, path) {
                warn!("snapshot export dropped: {e}");
            }
        }
    }

    // Every phase starts the same way: fresh canvas, fresh detection
    // state, magnifier closed, and no stale queued readings.
    fn enter_phase(&mut self) {
        let phase = self.plan.current();
        info!("entering phase {phase:?}");

        self.detector.reset();
        if let Some(collector) = &self.collector {
            collector.clear();
        }
        self.detector.set_calibration(phase.is_calibration());

        self.painter.clear_canvas();
        self.was_painting = false;
        let mode = match phase {
            PhaseKind::AutoAssist => MagnifierMode::Auto,
            _ => MagnifierMode::Manual,
        };
        self.painter.magnifier_mut().set_mode(mode);
        self.painter.magnifier_mut().set_level(0);
    }

    pub fn phase(&self) -> PhaseKind {
        self.plan.current()
    }

    pub fn calibration_range(&self) -> CalibrationRange {
        self.range
    }

    /// Override the calibrated range, e.g. for replays that skip the
    /// calibration phases.
    pub fn set_calibration_range(&mut self, range: CalibrationRange) {
        self.range = range;
    }

    pub fn has_sensor(&self) -> bool {
        self.collector.is_some()
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn painter(&self) -> &Painter<P> {
        &self.painter
    }

    pub fn painter_mut(&mut self) -> &mut Painter<P> {
        &mut self.painter
    }

    pub fn detector(&self) -> &StabilityDetector {
        &self.detector
    }

    pub fn detector_mut(&mut self) -> &mut StabilityDetector {
        &mut self.detector
    }

    /// Tear down: flush queued snapshot saves, then join the collector
    /// thread if one is still attached.
    pub fn shutdown(self) {
        if let Some(exporter) = self.exporter {
            exporter.writer.wait_for_completion();
        }
        if let Some(collector) = self.collector {
            collector.shutdown();
        }
    }
}
