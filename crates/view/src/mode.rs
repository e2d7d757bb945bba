//! Switch between the rendered globe and the fetched raster image.

/// What the viewer presents.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum ViewMode {
    /// Procedurally rendered 3D globe.
    #[default]
    Rendered3D,
    /// Remote raster image for high zoom.
    Fetched2D,
}

impl ViewMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ViewMode::Rendered3D => "rendered_3d",
            ViewMode::Fetched2D => "fetched_2d",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum ModeState {
    Rendered3D,
    /// `presented` turns true once the first image of this 2D session is shown.
    /// Until then the last 3D frame stays on screen.
    Fetched2D { presented: bool },
}

/// Outcome of re-evaluating the mode.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ModeChange {
    Unchanged,
    Entered2D,
    Entered3D,
}

/// Two-state machine driven by zoom crossing a fixed threshold.
///
/// Switching is suppressed while the pointer is dragging; callers re-evaluate
/// on drag release, wheel input and transition completion.
#[derive(Debug, Clone)]
pub struct ViewModeSwitch {
    threshold: f64,
    state: ModeState,
}

impl ViewModeSwitch {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            state: ModeState::Rendered3D,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn mode(&self) -> ViewMode {
        match self.state {
            ModeState::Rendered3D => ViewMode::Rendered3D,
            ModeState::Fetched2D { .. } => ViewMode::Fetched2D,
        }
    }

    /// Whether `zoom` is high enough for the fetched image.
    pub fn wants_2d(&self, zoom: f64) -> bool {
        zoom >= self.threshold
    }

    /// Whether a fetched image is currently on screen.
    pub fn is_presenting_image(&self) -> bool {
        matches!(self.state, ModeState::Fetched2D { presented: true })
    }

    pub fn evaluate(&mut self, zoom: f64, dragging: bool) -> ModeChange {
        if dragging {
            return ModeChange::Unchanged;
        }
        match (self.state, self.wants_2d(zoom)) {
            (ModeState::Rendered3D, true) => {
                self.state = ModeState::Fetched2D { presented: false };
                ModeChange::Entered2D
            }
            (ModeState::Fetched2D { .. }, false) => {
                self.state = ModeState::Rendered3D;
                ModeChange::Entered3D
            }
            _ => ModeChange::Unchanged,
        }
    }

    /// Record that an image is being shown.
    ///
    /// Returns `true` for the first image of a 2D session, when the surface
    /// has to switch presentation. Returns `false` in 3D mode, where late
    /// images must be discarded.
    pub fn present_image(&mut self) -> bool {
        match self.state {
            ModeState::Fetched2D { presented: false } => {
                self.state = ModeState::Fetched2D { presented: true };
                true
            }
            _ => false,
        }
    }
}
