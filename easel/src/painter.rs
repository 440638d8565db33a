//! The painter: two-phase frame tick over the canvas/result buffer pair.
//!
//! `simulate` consumes actuator input and accumulates pending writes;
//! `commit` applies them to both buffers and publishes the canvas. Nothing
//! painted is externally visible between the two.
//!
//! The painter is generic over a `ContactProbe` so the interactive
//! frontend, a replay harness, and tests all drive the same machine.

use crate::brush::{Actuator, ActuatorState, BrushFlags, BrushSettings, HoverIndicator};
use crate::color::Rgba;
use crate::config::PaintConfig;
use crate::event::{CallbackId, EventHub, PaintEvent};
use crate::history::SnapshotHistory;
use crate::magnifier::MagnifierController;
use crate::stroke::{texel_from_uv, StampBuffer, Texel};
use crate::surface::{NullSink, PaintSurface, SurfaceSink};
use tracing::{debug, info};

/// A successful surface hit from the pointing service.
///
/// `u` and `v` are normalized surface coordinates in [0, 1]; `world` is
/// the 3-D contact point, carried through untouched for display layers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    pub u: f64,
    pub v: f64,
    pub world: [f64; 3],
}

/// Opaque pointing service: where is this actuator touching the canvas?
pub trait ContactProbe {
    fn hit(&mut self, actuator: Actuator) -> Option<SurfaceHit>;
}

/// Per-frame actuator input.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameInput {
    pub left_pressed: bool,
    pub right_pressed: bool,
    /// Frame time step in seconds.
    pub dt: f64,
}

/// Interactive painting engine over a live canvas and a result buffer.
///
/// The live canvas carries backdrop and hover overlay; the result buffer
/// records only user strokes over the base color, so downstream scoring
/// sees strokes alone. Both buffers are dimension-locked.
pub struct Painter<P: ContactProbe> {
    probe: P,
    canvas: PaintSurface,
    result: PaintSurface,
    backdrop: Option<PaintSurface>,
    stamps: StampBuffer,
    history: SnapshotHistory,
    hover: HoverIndicator,
    brush: BrushSettings,
    hover_radius: i32,
    hover_color: Rgba,
    base_color: Rgba,
    left_state: ActuatorState,
    right_state: ActuatorState,
    active: BrushFlags,
    painting_latch: bool,
    previous_texel: Option<Texel>,
    magnifier: MagnifierController,
    events: EventHub,
    sink: Box<dyn SurfaceSink>,
    last_hit_texel: Option<Texel>,
    revert_count: u32,
}

impl<P: ContactProbe> Painter<P> {
    pub fn new(config: PaintConfig, probe: P) -> Self {
        Self::with_sink(config, probe, Box::new(NullSink))
    }

    pub fn with_sink(config: PaintConfig, probe: P, sink: Box<dyn SurfaceSink>) -> Self {
        let PaintConfig {
            width,
            height,
            base_color,
            brush,
            hover_radius,
            hover_color,
            undo_depth,
            magnifier,
        } = config;

        let canvas = PaintSurface::new(width, height, base_color);
        let result = canvas.clone();
        info!("painter created: {width}x{height}, undo depth {undo_depth}");

        Self {
            probe,
            canvas,
            result,
            backdrop: None,
            stamps: StampBuffer::new(),
            history: SnapshotHistory::new(undo_depth),
            hover: HoverIndicator::new(),
            brush,
            hover_radius,
            hover_color,
            base_color,
            left_state: ActuatorState::Idle,
            right_state: ActuatorState::Idle,
            active: BrushFlags::empty(),
            painting_latch: false,
            previous_texel: None,
            magnifier: MagnifierController::new(magnifier),
            events: EventHub::new(),
            sink,
            last_hit_texel: None,
            revert_count: 0,
        }
    }

    /// Advance one frame of input without publishing anything.
    ///
    /// Order matters: the previous frame's hover overlay comes off before
    /// anything samples or snapshots the canvas, then actuator transitions
    /// run, then the overlay goes back on if the painter idles over the
    /// surface.
    pub fn simulate(&mut self, input: FrameInput) {
        self.hover.restore(&mut self.canvas);

        let left_hit = self.probe.hit(Actuator::Left);
        let right_hit = self.probe.hit(Actuator::Right);

        self.process_actuator(Actuator::Left, input.left_pressed, left_hit);
        self.process_actuator(Actuator::Right, input.right_pressed, right_hit);

        if self.active.is_empty() {
            if let Some(hit) = left_hit.or(right_hit) {
                let texel = self.texel_for(hit);
                self.last_hit_texel = Some(texel);
                self.hover
                    .apply(&mut self.canvas, texel, self.hover_radius, self.hover_color);
            }
        }

        if let Some(texel) = self.last_hit_texel {
            let dimensions = self.canvas.dimensions();
            self.magnifier.set_focus(texel, dimensions);
        }
        self.magnifier.tick(input.dt);
    }

    /// Apply the frame's pending writes to both buffers atomically and
    /// publish the canvas. No pending write survives a commit.
    pub fn commit(&mut self) {
        if !self.stamps.is_empty() {
            self.stamps.apply_to(&mut self.canvas);
            self.stamps.apply_to(&mut self.result);
            self.stamps.clear();
        }
        self.canvas.commit(self.sink.as_mut());
    }

    fn process_actuator(&mut self, actuator: Actuator, pressed: bool, hit: Option<SurfaceHit>) {
        match (self.state_of(actuator), pressed, hit) {
            (ActuatorState::Idle, true, Some(hit)) => self.start_stroke(actuator, hit),
            (ActuatorState::Drawing, true, Some(hit)) => self.paint_at(hit),
            // A mid-stroke miss ends the stroke, as does releasing.
            (ActuatorState::Drawing, true, None) => self.end_stroke(actuator),
            (ActuatorState::Drawing, false, _) => self.end_stroke(actuator),
            _ => {}
        }
    }

    fn start_stroke(&mut self, actuator: Actuator, hit: SurfaceHit) {
        // One checkpoint per stroke, however many actuators join it. The
        // snapshot precedes the first stamp so undo restores the
        // pre-stroke state.
        if !self.painting_latch {
            self.painting_latch = true;
            self.history.push(&self.canvas, &self.result);
        }
        self.set_state(actuator, ActuatorState::Drawing);
        self.active.insert(actuator.flag());
        debug!("{actuator:?} stroke started");
        self.events.emit(&PaintEvent::StrokeStarted {
            brushes: self.active,
        });
        self.paint_at(hit);
    }

    fn paint_at(&mut self, hit: SurfaceHit) {
        let (width, height) = self.canvas.dimensions();
        let texel = texel_from_uv(hit.u, hit.v, width, height);
        self.stamps.stroke_to(
            self.previous_texel,
            texel,
            self.brush.size,
            self.brush.color,
            width,
            height,
        );
        self.previous_texel = Some(texel);
        self.last_hit_texel = Some(texel);
    }

    fn end_stroke(&mut self, actuator: Actuator) {
        self.set_state(actuator, ActuatorState::Idle);
        self.active.remove(actuator.flag());
        debug!("{actuator:?} stroke ended");
        self.events.emit(&PaintEvent::StrokeEnded {
            brushes: self.active,
        });
        if self.active.is_empty() {
            self.painting_latch = false;
            self.previous_texel = None;
        }
    }

    fn state_of(&self, actuator: Actuator) -> ActuatorState {
        match actuator {
            Actuator::Left => self.left_state,
            Actuator::Right => self.right_state,
        }
    }

    fn set_state(&mut self, actuator: Actuator, state: ActuatorState) {
        match actuator {
            Actuator::Left => self.left_state = state,
            Actuator::Right => self.right_state = state,
        }
    }

    fn texel_for(&self, hit: SurfaceHit) -> Texel {
        let (width, height) = self.canvas.dimensions();
        texel_from_uv(hit.u, hit.v, width, height)
    }

    /// Restore the most recent undo checkpoint into both buffers. A silent
    /// no-op when the history is empty.
    pub fn undo(&mut self) {
        self.hover.restore(&mut self.canvas);
        // A stroke in flight would repaint over the restored state from
        // stale continuity; drop pending work first.
        self.stamps.clear();
        if self.history.undo_into(&mut self.canvas, &mut self.result) {
            self.revert_count += 1;
            info!("undo applied ({} total)", self.revert_count);
        }
    }

    /// Reset both buffers for a new round: the canvas to its backdrop (or
    /// base color), the result to the base color. History, pending writes,
    /// and stroke state are dropped.
    pub fn clear_canvas(&mut self) {
        self.hover.restore(&mut self.canvas);
        self.stamps.clear();
        match &self.backdrop {
            Some(backdrop) => self.canvas.copy_from(backdrop),
            None => self.canvas.fill(self.base_color),
        }
        self.result.fill(self.base_color);
        self.history.reset();
        self.left_state = ActuatorState::Idle;
        self.right_state = ActuatorState::Idle;
        self.active = BrushFlags::empty();
        self.painting_latch = false;
        self.previous_texel = None;
        self.events.emit(&PaintEvent::CanvasCleared);
        info!("canvas cleared");
    }

    /// Put a backdrop on the live canvas, effective immediately. The
    /// result buffer is unaffected.
    ///
    /// # Panics
    /// Panics when the backdrop dimensions differ from the canvas.
    pub fn set_backdrop(&mut self, backdrop: PaintSurface) {
        self.canvas.copy_from(&backdrop);
        self.backdrop = Some(backdrop);
    }

    pub fn clear_backdrop(&mut self) {
        self.backdrop = None;
    }

    pub fn set_brush_color(&mut self, color: Rgba) {
        self.brush.color = color;
        self.events.emit(&PaintEvent::ColorChanged { color });
    }

    pub fn set_brush_size(&mut self, size: i32) {
        let applied = self.brush.set_size(size);
        self.events
            .emit(&PaintEvent::BrushSizeChanged { size: applied });
    }

    pub fn increase_brush_size(&mut self) {
        let applied = self.brush.increase_size();
        self.events
            .emit(&PaintEvent::BrushSizeChanged { size: applied });
    }

    pub fn decrease_brush_size(&mut self) {
        let applied = self.brush.decrease_size();
        self.events
            .emit(&PaintEvent::BrushSizeChanged { size: applied });
    }

    /// Register a callback for paint events.
    pub fn register_callback<F>(&self, callback: F) -> CallbackId
    where
        F: Fn(&PaintEvent) + Send + Sync + 'static,
    {
        self.events.register_callback(callback)
    }

    /// Deregister a callback. Returns whether the id was registered.
    pub fn deregister_callback(&self, callback_id: CallbackId) -> bool {
        self.events.deregister_callback(callback_id)
    }

    pub fn canvas(&self) -> &PaintSurface {
        &self.canvas
    }

    pub fn result(&self) -> &PaintSurface {
        &self.result
    }

    pub fn brush(&self) -> &BrushSettings {
        &self.brush
    }

    pub fn magnifier(&self) -> &MagnifierController {
        &self.magnifier
    }

    pub fn magnifier_mut(&mut self) -> &mut MagnifierController {
        &mut self.magnifier
    }

    pub fn probe_mut(&mut self) -> &mut P {
        &mut self.probe
    }

    /// Undo checkpoints currently stored.
    pub fn undo_checkpoints(&self) -> usize {
        self.history.len()
    }

    /// Number of undos applied since construction.
    pub fn revert_count(&self) -> u32 {
        self.revert_count
    }

    /// Actuators currently drawing.
    pub fn active_brushes(&self) -> BrushFlags {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    struct ScriptProbe {
        left: VecDeque<Option<SurfaceHit>>,
        right: VecDeque<Option<SurfaceHit>>,
    }

    impl ScriptProbe {
        fn new(left: Vec<Option<SurfaceHit>>, right: Vec<Option<SurfaceHit>>) -> Self {
            Self {
                left: left.into(),
                right: right.into(),
            }
        }
    }

    impl ContactProbe for ScriptProbe {
        fn hit(&mut self, actuator: Actuator) -> Option<SurfaceHit> {
            match actuator {
                Actuator::Left => self.left.pop_front().flatten(),
                Actuator::Right => self.right.pop_front().flatten(),
            }
        }
    }

    fn hit_at(u: f64, v: f64) -> Option<SurfaceHit> {
        Some(SurfaceHit {
            u,
            v,
            world: [0.0, 0.0, 0.0],
        })
    }

    fn test_config() -> PaintConfig {
        PaintConfig {
            width: 100,
            height: 100,
            brush: BrushSettings {
                size: 3,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn pressed_left(dt: f64) -> FrameInput {
        FrameInput {
            left_pressed: true,
            right_pressed: false,
            dt,
        }
    }

    #[test]
    fn test_nothing_visible_before_commit() {
        let probe = ScriptProbe::new(vec![hit_at(0.105, 0.105)], vec![None]);
        let mut painter = Painter::new(test_config(), probe);

        painter.simulate(pressed_left(0.016));
        assert_eq!(painter.canvas().get(10, 10).unwrap(), Rgba::WHITE);

        painter.commit();
        assert_eq!(painter.canvas().get(10, 10).unwrap(), Rgba::RED);
        assert_eq!(painter.result().get(10, 10).unwrap(), Rgba::RED);
        assert_eq!(painter.undo_checkpoints(), 1);
    }

    #[test]
    fn test_undo_restores_pre_stroke_state() {
        let probe = ScriptProbe::new(vec![hit_at(0.5, 0.5)], vec![None]);
        let mut painter = Painter::new(test_config(), probe);

        painter.simulate(pressed_left(0.016));
        painter.commit();
        assert_eq!(painter.canvas().get(50, 50).unwrap(), Rgba::RED);

        painter.undo();
        assert_eq!(painter.canvas().get(50, 50).unwrap(), Rgba::WHITE);
        assert_eq!(painter.result().get(50, 50).unwrap(), Rgba::WHITE);
        assert_eq!(painter.revert_count(), 1);

        // Undo below the floor is a no-op.
        painter.undo();
        assert_eq!(painter.revert_count(), 1);
    }

    #[test]
    fn test_second_actuator_joins_without_new_checkpoint() {
        let probe = ScriptProbe::new(
            vec![hit_at(0.2, 0.2), hit_at(0.21, 0.2)],
            vec![None, hit_at(0.7, 0.7)],
        );
        let mut painter = Painter::new(test_config(), probe);

        painter.simulate(pressed_left(0.016));
        painter.simulate(FrameInput {
            left_pressed: true,
            right_pressed: true,
            dt: 0.016,
        });

        assert_eq!(painter.undo_checkpoints(), 1);
        assert_eq!(
            painter.active_brushes(),
            BrushFlags::LEFT | BrushFlags::RIGHT
        );
    }

    #[test]
    fn test_separate_strokes_push_separate_checkpoints() {
        let probe = ScriptProbe::new(
            vec![hit_at(0.2, 0.2), hit_at(0.2, 0.2), hit_at(0.6, 0.6)],
            vec![None, None, None],
        );
        let mut painter = Painter::new(test_config(), probe);

        painter.simulate(pressed_left(0.016));
        painter.commit();
        painter.simulate(FrameInput::default()); // release ends the stroke
        painter.commit();
        painter.simulate(pressed_left(0.016));
        painter.commit();

        assert_eq!(painter.undo_checkpoints(), 2);

        // One undo removes only the second stroke.
        painter.undo();
        assert_eq!(painter.canvas().get(60, 60).unwrap(), Rgba::WHITE);
        assert_eq!(painter.canvas().get(20, 20).unwrap(), Rgba::RED);
        assert_eq!(painter.result().get(20, 20).unwrap(), Rgba::RED);
    }

    #[test]
    fn test_mid_stroke_miss_ends_stroke() {
        let events: Arc<Mutex<Vec<PaintEvent>>> = Arc::new(Mutex::new(Vec::new()));
        let events_clone = Arc::clone(&events);

        let probe = ScriptProbe::new(
            vec![hit_at(0.2, 0.2), None, hit_at(0.4, 0.4)],
            vec![None, None, None],
        );
        let mut painter = Painter::new(test_config(), probe);
        painter.register_callback(move |event| {
            events_clone.lock().unwrap().push(event.clone());
        });

        for _ in 0..3 {
            painter.simulate(pressed_left(0.016));
            painter.commit();
        }

        let seen = events.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                PaintEvent::StrokeStarted {
                    brushes: BrushFlags::LEFT
                },
                PaintEvent::StrokeEnded {
                    brushes: BrushFlags::empty()
                },
                PaintEvent::StrokeStarted {
                    brushes: BrushFlags::LEFT
                },
            ]
        );
        drop(seen);
        assert_eq!(painter.undo_checkpoints(), 2);
    }

    #[test]
    fn test_miss_breaks_stroke_continuity() {
        // Paint at two distant points with a miss between them: the gap
        // must not get interpolated.
        let probe = ScriptProbe::new(
            vec![hit_at(0.1, 0.1), None, hit_at(0.9, 0.1)],
            vec![None, None, None],
        );
        let mut painter = Painter::new(test_config(), probe);

        for _ in 0..3 {
            painter.simulate(pressed_left(0.016));
            painter.commit();
        }

        assert_eq!(painter.canvas().get(10, 10).unwrap(), Rgba::RED);
        assert_eq!(painter.canvas().get(90, 10).unwrap(), Rgba::RED);
        assert_eq!(painter.canvas().get(50, 10).unwrap(), Rgba::WHITE);
    }

    #[test]
    fn test_hover_overlay_applied_and_restored() {
        let config = test_config();
        let hover_radius = config.hover_radius;
        let probe = ScriptProbe::new(vec![hit_at(0.5, 0.5), None], vec![None, None]);
        let mut painter = Painter::new(config, probe);

        painter.simulate(FrameInput::default());
        painter.commit();
        let ring_y = 50 - (hover_radius - 1);
        assert_eq!(
            painter.canvas().get(50, ring_y).unwrap(),
            Rgba::HOVER_GRAY,
            "hover ring visible after commit"
        );
        assert_eq!(painter.result().get(50, ring_y).unwrap(), Rgba::WHITE);
        assert_eq!(painter.undo_checkpoints(), 0);

        painter.simulate(FrameInput::default());
        painter.commit();
        assert_eq!(painter.canvas().get(50, ring_y).unwrap(), Rgba::WHITE);
    }

    #[test]
    fn test_stroke_interpolates_across_frames() {
        let probe = ScriptProbe::new(
            vec![hit_at(0.105, 0.105), hit_at(0.105, 0.155)],
            vec![None, None],
        );
        let mut painter = Painter::new(test_config(), probe);

        painter.simulate(pressed_left(0.016));
        painter.simulate(pressed_left(0.016));
        painter.commit();

        // Contacts at (10, 10) and (10, 15); the swept block fills in.
        for y in 8..=17 {
            for x in 8..=12 {
                assert_eq!(painter.canvas().get(x, y).unwrap(), Rgba::RED);
            }
        }
    }

    #[test]
    fn test_brush_setters_emit_clamped_values() {
        let events: Arc<Mutex<Vec<PaintEvent>>> = Arc::new(Mutex::new(Vec::new()));
        let events_clone = Arc::clone(&events);

        let probe = ScriptProbe::new(vec![], vec![]);
        let mut painter = Painter::new(test_config(), probe);
        painter.register_callback(move |event| {
            events_clone.lock().unwrap().push(event.clone());
        });

        painter.set_brush_size(99);
        painter.set_brush_color(Rgba::BLACK);

        let seen = events.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                PaintEvent::BrushSizeChanged { size: 20 },
                PaintEvent::ColorChanged {
                    color: Rgba::BLACK
                },
            ]
        );
        assert_eq!(painter.brush().size, 20);
    }

    #[test]
    fn test_clear_canvas_restores_backdrop_not_result() {
        let probe = ScriptProbe::new(vec![hit_at(0.5, 0.5)], vec![None]);
        let mut painter = Painter::new(test_config(), probe);

        let backdrop = PaintSurface::new(100, 100, Rgba::rgb(200, 200, 200));
        painter.set_backdrop(backdrop);
        assert_eq!(
            painter.canvas().get(0, 0).unwrap(),
            Rgba::rgb(200, 200, 200)
        );
        assert_eq!(painter.result().get(0, 0).unwrap(), Rgba::WHITE);

        painter.simulate(pressed_left(0.016));
        painter.commit();
        painter.clear_canvas();

        assert_eq!(
            painter.canvas().get(50, 50).unwrap(),
            Rgba::rgb(200, 200, 200)
        );
        assert_eq!(painter.result().get(50, 50).unwrap(), Rgba::WHITE);
        assert_eq!(painter.undo_checkpoints(), 0);
    }

    #[test]
    fn test_magnifier_focus_follows_hits() {
        let probe = ScriptProbe::new(vec![hit_at(0.25, 0.75)], vec![None]);
        let mut painter = Painter::new(test_config(), probe);

        painter.simulate(FrameInput::default());
        let viewport = painter.magnifier().viewport();
        assert!((viewport.center.0 - 0.25).abs() < 0.02);
        assert!((viewport.center.1 - 0.75).abs() < 0.02);
    }
}
