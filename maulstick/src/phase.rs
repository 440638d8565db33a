//! Session phase flow.
//!
//! A session moves through a fixed plan: capture the weak-grip extreme,
//! capture the strong-grip extreme, free practice, then the assisted
//! rounds. The two calibration phases bound the per-user force range the
//! assist curve maps over.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseKind {
    /// Capture the weak-grip stabilized extreme as the range minimum.
    CalibrateMin,
    /// Capture the strong-grip stabilized extreme as the range maximum.
    CalibrateMax,
    /// Paint without assistance.
    Practice,
    /// Magnifier level driven by stabilized grip.
    AutoAssist,
    /// Magnifier stepped by the operator.
    ManualAssist,
}

impl PhaseKind {
    /// Whether the stability detector runs in calibration mode here.
    pub fn is_calibration(&self) -> bool {
        matches!(self, PhaseKind::CalibrateMin | PhaseKind::CalibrateMax)
    }

    /// Lowercase tag used in exported snapshot file names.
    pub fn slug(&self) -> &'static str {
        match self {
            PhaseKind::CalibrateMin => "calibrate_min",
            PhaseKind::CalibrateMax => "calibrate_max",
            PhaseKind::Practice => "practice",
            PhaseKind::AutoAssist => "auto_assist",
            PhaseKind::ManualAssist => "manual_assist",
        }
    }
}

/// Ordered phase plan with clamped moves in both directions.
#[derive(Debug, Clone)]
pub struct PhasePlan {
    phases: Vec<PhaseKind>,
    current: usize,
}

impl Default for PhasePlan {
    fn default() -> Self {
        Self::new(vec![
            PhaseKind::CalibrateMin,
            PhaseKind::CalibrateMax,
            PhaseKind::Practice,
            PhaseKind::AutoAssist,
            PhaseKind::ManualAssist,
        ])
    }
}

impl PhasePlan {
    /// # Panics
    /// Panics if `phases` is empty.
    pub fn new(phases: Vec<PhaseKind>) -> Self {
        assert!(!phases.is_empty(), "phase plan must not be empty");
        Self { phases, current: 0 }
    }

    pub fn current(&self) -> PhaseKind {
        self.phases[self.current]
    }

    pub fn index(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.phases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    /// Move to the next phase. Clamped at the end; returns the phase
    /// left when a move happened.
    pub fn advance(&mut self) -> Option<PhaseKind> {
        if self.current + 1 >= self.phases.len() {
            return None;
        }
        let left = self.phases[self.current];
        self.current += 1;
        Some(left)
    }

    /// Move to the previous phase. Clamped at the start; returns the
    /// phase left when a move happened.
    pub fn retreat(&mut self) -> Option<PhaseKind> {
        if self.current == 0 {
            return None;
        }
        let left = self.phases[self.current];
        self.current -= 1;
        Some(left)
    }
}
