//! Scripted session driving for binaries and integration tests.

use std::sync::{Arc, Mutex};

use easel::event::PaintEvent;
use easel::painter::{ContactProbe, FrameInput};
use tracing::info;

use crate::session::{AdaptiveSession, SessionStats};

/// Outcome of a scripted run.
#[derive(Debug)]
pub struct RunnerSummary {
    pub stats: SessionStats,
    pub events: Vec<PaintEvent>,
    pub final_level: usize,
    pub undo_checkpoints: usize,
}

/// Drive `session` through the scripted `inputs`, one tick per entry,
/// collecting every paint event emitted along the way.
pub fn run_session<P: ContactProbe>(
    session: &mut AdaptiveSession<P>,
    inputs: &[FrameInput],
) -> RunnerSummary {
    let events: Arc<Mutex<Vec<PaintEvent>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let callback_id = session
        .painter()
        .register_callback(move |event| sink.lock().unwrap().push(event.clone()));

    for input in inputs {
        session.tick(*input);
    }

    session.painter().deregister_callback(callback_id);
    let collected = events.lock().unwrap().clone();
    info!(
        "scripted run complete: {} frames, {} events",
        inputs.len(),
        collected.len()
    );

    RunnerSummary {
        stats: session.stats(),
        events: collected,
        final_level: session.painter().magnifier().level(),
        undo_checkpoints: session.painter().undo_checkpoints(),
    }
}

/// `count` frames of held left actuator at a fixed `dt`.
pub fn held_left_frames(count: usize, dt: f64) -> Vec<FrameInput> {
    (0..count)
        .map(|_| FrameInput {
            left_pressed: true,
            right_pressed: false,
            dt,
        })
        .collect()
}

/// `count` frames with nothing pressed at a fixed `dt`.
pub fn idle_frames(count: usize, dt: f64) -> Vec<FrameInput> {
    (0..count)
        .map(|_| FrameInput {
            left_pressed: false,
            right_pressed: false,
            dt,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::{uv_hit, ScriptedProbe};
    use easel::config::PaintConfig;
    use easel::painter::Painter;
    use gripflow::assist::AssistCurve;
    use gripflow::stability::StabilityConfig;

    #[test]
    fn test_run_collects_stroke_events() {
        let config = PaintConfig {
            width: 100,
            height: 100,
            ..Default::default()
        };
        let probe = ScriptedProbe::left_only(vec![uv_hit(0.3, 0.3), uv_hit(0.35, 0.3), None]);
        let painter = Painter::new(config, probe);
        let mut session = AdaptiveSession::new(
            painter,
            None,
            StabilityConfig::default(),
            AssistCurve::default(),
        );
        session.next_phase();
        session.next_phase();

        let mut inputs = held_left_frames(2, 0.016);
        inputs.extend(idle_frames(1, 0.016));
        let summary = run_session(&mut session, &inputs);

        assert_eq!(summary.stats.frames, 3);
        assert_eq!(summary.undo_checkpoints, 1);
        assert!(matches!(
            summary.events.first(),
            Some(PaintEvent::StrokeStarted { .. })
        ));
        assert!(matches!(
            summary.events.last(),
            Some(PaintEvent::StrokeEnded { .. })
        ));
        assert_eq!(summary.events.len(), 2);
    }
}
