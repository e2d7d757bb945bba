//! The viewer engine: one owner for camera state, transitions, presentation
//! mode and imagery fetching.
//!
//! Input handlers and [`Viewer::tick`] run on the host's main loop. Fetch
//! outcomes come back through [`Viewer::on_fetch_complete`] on the same loop,
//! so no state is shared across threads.
//!
//! Mode and fetch decisions are only taken at settle points: drag release,
//! wheel input and transition completion. Nothing is re-evaluated while the
//! pointer is down or a transition is running.

use foundation::math::{CoordinateError, GeoPoint};
use foundation::time::Time;
use runtime::{EventBus, EventKind, Frame};
use streaming::{
    DebounceFire, Evaluation, FetchOutcome, FetchSnapshot, FetchTicket, FireGate,
    ImageFetchPolicy, ImageryTransport, TextureMode, TimeEpoch,
};
use tracing::{debug, info, warn};
use view::{
    ModeChange, Orientation, OrientationState, TransitionController, TransitionStep, ViewConfig,
    ViewMode, ViewModeSwitch, camera_distance,
};

use crate::config::ViewerConfig;
use crate::surface::RenderSurface;

#[derive(Debug, Copy, Clone, PartialEq)]
enum DragState {
    Idle,
    Dragging { last_px: [f64; 2] },
}

/// What happened during one [`Viewer::tick`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameReport {
    pub frame: Frame,
    pub transition: TransitionStep,
    /// Request dispatched this frame, if any.
    pub fetch_issued: Option<FetchTicket>,
    /// Whether the 3D scene was redrawn. Never true in Fetched2D mode.
    pub redrawn: bool,
}

pub struct Viewer<S: RenderSurface, T: ImageryTransport> {
    view_config: ViewConfig,
    camera: OrientationState,
    transition: TransitionController,
    mode: ViewModeSwitch,
    fetch: ImageFetchPolicy,
    drag: DragState,
    texture: TextureMode,
    epoch: TimeEpoch,
    loading: bool,
    frame: Frame,
    events: EventBus,
    surface: S,
    transport: T,
}

impl<S: RenderSurface, T: ImageryTransport> Viewer<S, T> {
    pub fn new(config: &ViewerConfig, mut surface: S, transport: T) -> Self {
        let camera = OrientationState::new(&config.view);
        surface.set_orientation(camera.orientation());
        surface.set_camera_distance(camera_distance(camera.zoom()));
        surface.set_texture(config.texture);

        Self {
            view_config: config.view.clone(),
            camera,
            transition: TransitionController::new(),
            mode: ViewModeSwitch::new(config.view.zoom_threshold),
            fetch: ImageFetchPolicy::new(config.fetch.clone()),
            drag: DragState::Idle,
            texture: config.texture,
            epoch: config.epoch(),
            loading: false,
            frame: Frame::origin(),
            events: EventBus::new(),
            surface,
            transport,
        }
    }

    pub fn orientation(&self) -> Orientation {
        self.camera.orientation()
    }

    pub fn zoom_level(&self) -> f64 {
        self.camera.zoom()
    }

    /// Geographic coordinate currently facing the camera.
    pub fn coordinates(&self) -> GeoPoint {
        self.camera.orientation().to_geo()
    }

    pub fn mode(&self) -> ViewMode {
        self.mode.mode()
    }

    pub fn texture_mode(&self) -> TextureMode {
        self.texture
    }

    pub fn epoch(&self) -> TimeEpoch {
        self.epoch
    }

    pub fn now(&self) -> Time {
        self.frame.time
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, DragState::Dragging { .. })
    }

    pub fn is_animating(&self) -> bool {
        self.transition.is_animating()
    }

    pub fn is_fetch_in_flight(&self) -> bool {
        self.fetch.is_in_flight()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn fetch_policy(&self) -> &ImageFetchPolicy {
        &self.fetch
    }

    /// Nothing left to do until the next input: no drag, no transition,
    /// no pending debounce and no request outstanding.
    pub fn is_settled(&self) -> bool {
        !self.is_dragging()
            && !self.is_animating()
            && self.fetch.pending_deadline().is_none()
            && !self.fetch.is_in_flight()
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn pointer_down(&mut self, pos_px: [f64; 2]) {
        if self.transition.cancel() {
            self.events
                .emit(self.frame, EventKind::TransitionSuperseded, "pointer down");
        }
        self.drag = DragState::Dragging { last_px: pos_px };
    }

    pub fn pointer_move(&mut self, pos_px: [f64; 2]) {
        let DragState::Dragging { last_px } = self.drag else {
            return;
        };
        self.camera
            .apply_drag(pos_px[0] - last_px[0], pos_px[1] - last_px[1]);
        self.drag = DragState::Dragging { last_px: pos_px };
        self.push_camera();
    }

    pub fn pointer_up(&mut self) {
        if !self.is_dragging() {
            return;
        }
        self.drag = DragState::Idle;
        self.settle();
    }

    /// Zoom by a wheel delta (positive zooms out).
    ///
    /// Returns `false` if the input was ignored because a transition is
    /// running.
    pub fn wheel(&mut self, delta: f64) -> bool {
        if self.transition.is_animating() {
            debug!(delta, "wheel ignored during transition");
            return false;
        }
        self.camera.apply_zoom_delta(delta);
        self.push_camera();
        self.settle();
        true
    }

    /// Animate to `point`, landing on `zoom_hint` or the configured
    /// navigation zoom. The imagery request on arrival uses `point` verbatim.
    pub fn navigate_to(&mut self, point: GeoPoint, zoom_hint: Option<f64>) {
        let zoom = zoom_hint
            .filter(|z| z.is_finite())
            .unwrap_or(self.view_config.navigate_zoom);
        info!(
            lat = point.lat_deg,
            lon = point.lon_deg,
            zoom,
            "navigating"
        );
        self.begin_transition(Orientation::from_geo(point), zoom, Some(point));
    }

    /// Validate raw coordinates, then [`navigate_to`](Self::navigate_to).
    ///
    /// Invalid input leaves the engine untouched.
    pub fn navigate_to_coordinates(
        &mut self,
        lat_deg: f64,
        lon_deg: f64,
        zoom_hint: Option<f64>,
    ) -> Result<(), CoordinateError> {
        let point = GeoPoint::new(lat_deg, lon_deg)?;
        self.navigate_to(point, zoom_hint);
        Ok(())
    }

    /// Animate to an orientation without a pinned coordinate. The landing
    /// view goes through the debounced fetch path.
    pub fn animate_to(&mut self, target: Orientation, zoom: f64) {
        self.begin_transition(target, zoom, None);
    }

    fn begin_transition(&mut self, target: Orientation, zoom: f64, exact: Option<GeoPoint>) {
        if self.transition.is_animating() {
            self.events
                .emit(self.frame, EventKind::TransitionSuperseded, "new transition");
        }
        self.transition.begin(
            &self.camera,
            target,
            zoom,
            self.view_config.transition_duration_s,
            exact,
        );
        self.events.emit(
            self.frame,
            EventKind::TransitionStarted,
            format!("tilt={:.4} azimuth={:.4} zoom={zoom:.2}", target.tilt, target.azimuth),
        );
    }

    pub fn set_year(&mut self, year: i32) {
        self.epoch = TimeEpoch::new(year);
        self.events
            .emit(self.frame, EventKind::EpochChanged, self.epoch.to_string());
        if self.mode.wants_2d(self.camera.zoom()) {
            self.refresh_imagery();
        }
    }

    pub fn set_texture_mode(&mut self, texture: TextureMode) {
        self.texture = texture;
        self.events.emit(self.frame, EventKind::TextureChanged, texture.as_str());
        if self.mode.wants_2d(self.camera.zoom()) {
            self.refresh_imagery();
        } else {
            self.surface.set_texture(texture);
        }
    }

    /// Advance the engine by one display frame.
    pub fn tick(&mut self, dt_s: f64) -> FrameReport {
        self.frame = self.frame.next(dt_s);
        let dt_s = self.frame.dt_s;
        let mut fetch_issued = None;

        let transition = self.transition.advance(dt_s, &mut self.camera);
        match transition {
            TransitionStep::Idle => {}
            TransitionStep::Animating { .. } => self.push_camera(),
            TransitionStep::Completed { exact } => {
                self.push_camera();
                let landed = self.coordinates();
                self.events.emit(
                    self.frame,
                    EventKind::TransitionCompleted,
                    format!("lat={:.4} lon={:.4}", landed.lat_deg, landed.lon_deg),
                );
                let change = self.mode.evaluate(self.camera.zoom(), self.is_dragging());
                self.apply_mode_change(change);
                if self.mode.mode() == ViewMode::Fetched2D {
                    match exact {
                        Some(point) => fetch_issued = self.issue_fetch(Some(point)),
                        None => self.evaluate_fetch(),
                    }
                }
            }
        }

        self.surface.advance_decoration(dt_s);

        let gate = FireGate {
            dragging: self.is_dragging(),
            wants_2d: self.mode.wants_2d(self.camera.zoom()),
        };
        if self.fetch.poll(self.frame.time, gate) == DebounceFire::Fire {
            fetch_issued = fetch_issued.or_else(|| self.issue_fetch(None));
        }

        let redrawn = self.mode.mode() == ViewMode::Rendered3D;
        if redrawn {
            self.surface.request_redraw();
        }

        FrameReport {
            frame: self.frame,
            transition,
            fetch_issued,
            redrawn,
        }
    }

    /// Hand back the outcome of a request started through the transport.
    pub fn on_fetch_complete(&mut self, ticket: FetchTicket, outcome: FetchOutcome) {
        let Some(snapshot) = self.fetch.finish(ticket) else {
            warn!(ticket = ticket.0, "completion for unknown fetch ignored");
            return;
        };
        self.set_loading(false);

        let bytes = match outcome {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(ticket = ticket.0, error = %err, "imagery fetch failed");
                self.events
                    .emit(self.frame, EventKind::FetchFailed, err.to_string());
                return;
            }
        };

        if self.mode.mode() != ViewMode::Fetched2D {
            debug!(ticket = ticket.0, "discarding imagery that arrived after leaving 2D");
            self.events
                .emit(self.frame, EventKind::FetchDiscarded, format!("ticket={}", ticket.0));
            return;
        }

        if self.mode.present_image() {
            self.surface.set_mode(ViewMode::Fetched2D);
        }
        self.surface.show_image(&bytes);
        self.fetch.record(snapshot);
        self.events.emit(
            self.frame,
            EventKind::FetchCompleted,
            format!("ticket={} bytes={}", ticket.0, bytes.len()),
        );

        // The camera may have moved while the request was out.
        if !self.is_dragging() && !self.is_animating() {
            self.evaluate_fetch();
        }
    }

    /// Mode re-evaluation followed by the debounced fetch check.
    fn settle(&mut self) {
        let change = self.mode.evaluate(self.camera.zoom(), self.is_dragging());
        self.apply_mode_change(change);
        if self.mode.mode() == ViewMode::Fetched2D && !self.is_dragging() {
            self.evaluate_fetch();
        }
    }

    /// Mode re-evaluation followed by an immediate fetch.
    fn refresh_imagery(&mut self) {
        let change = self.mode.evaluate(self.camera.zoom(), self.is_dragging());
        self.apply_mode_change(change);
        if self.mode.mode() == ViewMode::Fetched2D {
            self.issue_fetch(None);
        }
    }

    fn apply_mode_change(&mut self, change: ModeChange) {
        match change {
            ModeChange::Unchanged => {}
            ModeChange::Entered2D => {
                info!(zoom = self.camera.zoom(), "switching to fetched imagery");
                self.events
                    .emit(self.frame, EventKind::ModeSwitched, ViewMode::Fetched2D.as_str());
                self.set_loading(true);
            }
            ModeChange::Entered3D => {
                info!(zoom = self.camera.zoom(), "switching to rendered globe");
                self.events
                    .emit(self.frame, EventKind::ModeSwitched, ViewMode::Rendered3D.as_str());
                self.fetch.reset();
                self.set_loading(false);
                self.surface.set_mode(ViewMode::Rendered3D);
                self.surface.set_texture(self.texture);
                self.push_camera();
                self.surface.request_redraw();
            }
        }
    }

    fn evaluate_fetch(&mut self) {
        let snapshot = self.snapshot();
        if let Evaluation::Scheduled { deadline } = self.fetch.evaluate(self.frame.time, &snapshot)
        {
            debug!(deadline = deadline.0, zoom = snapshot.zoom, "fetch scheduled");
        }
    }

    /// Take the in-flight slot and dispatch a request for `exact`, or for the
    /// coordinate under the camera when `None`.
    fn issue_fetch(&mut self, exact: Option<GeoPoint>) -> Option<FetchTicket> {
        let snapshot = self.snapshot();
        let target = exact.unwrap_or_else(|| snapshot.orientation.to_geo());
        let issued = self.fetch.begin(target, snapshot, self.texture, self.epoch)?;

        self.set_loading(true);
        self.events.emit(
            self.frame,
            EventKind::FetchIssued,
            format!(
                "ticket={} lat={} lon={} zoom={}",
                issued.ticket.0, issued.descriptor.lat, issued.descriptor.lon, issued.descriptor.zoom
            ),
        );
        let ticket = issued.ticket;
        self.transport.dispatch(ticket, issued.descriptor);
        Some(ticket)
    }

    fn snapshot(&self) -> FetchSnapshot {
        FetchSnapshot {
            orientation: self.camera.orientation(),
            zoom: self.camera.zoom(),
        }
    }

    /// The globe is only moved while it is what the user sees.
    fn push_camera(&mut self) {
        if self.mode.mode() != ViewMode::Rendered3D {
            return;
        }
        self.surface.set_orientation(self.camera.orientation());
        self.surface
            .set_camera_distance(camera_distance(self.camera.zoom()));
    }

    fn set_loading(&mut self, loading: bool) {
        if self.loading != loading {
            self.loading = loading;
            self.surface.set_loading(loading);
        }
    }
}
