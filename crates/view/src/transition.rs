//! Time-based animated camera transitions.
//!
//! A transition interpolates orientation and zoom from where the camera was
//! when it began to a target, shaped by an ease-in-out cubic curve. Azimuth
//! always takes the short way round. A new transition or a drag replaces the
//! running one; transitions are never queued.

use foundation::math::{GeoPoint, shortest_angle_path};

use crate::orientation::{Orientation, OrientationState, clamp_zoom};

/// Progress within this distance of 1 counts as complete, so that summing
/// per-frame deltas that add up to the duration always lands.
const PROGRESS_EPSILON: f64 = 1e-9;

/// Ease-in-out cubic on `[0, 1]`.
pub fn ease_in_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// An in-progress transition.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    start: Orientation,
    start_zoom: f64,
    /// Azimuth end point on the short path; may lie outside `(-π, π]`.
    path_azimuth: f64,
    /// Sanitized end state assigned verbatim on completion.
    target: Orientation,
    target_zoom: f64,
    progress: f64,
    duration_s: f64,
    exact: Option<GeoPoint>,
}

impl Transition {
    pub fn start(&self) -> Orientation {
        self.start
    }

    pub fn target(&self) -> Orientation {
        self.target
    }

    pub fn target_zoom(&self) -> f64 {
        self.target_zoom
    }

    /// Linear progress in `[0, 1]` before easing.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn duration_s(&self) -> f64 {
        self.duration_s
    }

    fn sample(&self, eased: f64) -> (Orientation, f64) {
        let tilt = self.start.tilt + (self.target.tilt - self.start.tilt) * eased;
        let azimuth = self.start.azimuth + (self.path_azimuth - self.start.azimuth) * eased;
        let zoom = self.start_zoom + (self.target_zoom - self.start_zoom) * eased;
        (Orientation::new(tilt, azimuth), zoom)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
enum TransitionState {
    #[default]
    Idle,
    Animating(Transition),
}

/// Result of advancing the controller by one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransitionStep {
    /// Nothing was running.
    Idle,
    /// Still running; `eased` is the applied interpolation fraction.
    Animating { eased: f64 },
    /// Landed on the target this frame.
    Completed { exact: Option<GeoPoint> },
}

#[derive(Debug, Clone, Default)]
pub struct TransitionController {
    state: TransitionState,
}

impl TransitionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_animating(&self) -> bool {
        matches!(self.state, TransitionState::Animating(_))
    }

    pub fn current(&self) -> Option<&Transition> {
        match &self.state {
            TransitionState::Animating(t) => Some(t),
            TransitionState::Idle => None,
        }
    }

    /// Start animating from the camera's current state towards a target,
    /// replacing any running transition.
    pub fn begin(
        &mut self,
        from: &OrientationState,
        target: Orientation,
        target_zoom: f64,
        duration_s: f64,
        exact: Option<GeoPoint>,
    ) {
        let start = from.orientation();
        let target = Orientation::new(target.tilt, target.azimuth);
        let path_azimuth = shortest_angle_path(start.azimuth, target.azimuth);

        self.state = TransitionState::Animating(Transition {
            start,
            start_zoom: from.zoom(),
            path_azimuth,
            target,
            target_zoom: clamp_zoom(target_zoom),
            progress: 0.0,
            duration_s,
            exact,
        });
    }

    /// Drop the running transition, leaving the camera where it is.
    ///
    /// Returns whether a transition was running.
    pub fn cancel(&mut self) -> bool {
        matches!(
            std::mem::take(&mut self.state),
            TransitionState::Animating(_)
        )
    }

    /// Advance by `dt_s` seconds and write the interpolated camera into `camera`.
    pub fn advance(&mut self, dt_s: f64, camera: &mut OrientationState) -> TransitionStep {
        let TransitionState::Animating(t) = &mut self.state else {
            return TransitionStep::Idle;
        };

        let dt_s = if dt_s.is_finite() { dt_s.max(0.0) } else { 0.0 };
        if t.duration_s > 0.0 && t.duration_s.is_finite() {
            t.progress += dt_s / t.duration_s;
        } else {
            t.progress = 1.0;
        }

        if t.progress >= 1.0 - PROGRESS_EPSILON {
            camera.set(t.target, t.target_zoom);
            let exact = t.exact;
            self.state = TransitionState::Idle;
            return TransitionStep::Completed { exact };
        }

        let eased = ease_in_out_cubic(t.progress);
        let (orientation, zoom) = t.sample(eased);
        camera.set(orientation, zoom);
        TransitionStep::Animating { eased }
    }
}
