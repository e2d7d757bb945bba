//! When to ask the imagery service for a new image, and what to ask for.
//!
//! - A fetch is warranted when there is no previous fetch, or the camera moved
//!   past any one per-axis threshold since the last one was issued.
//! - Warranted fetches are debounced: each qualifying movement pushes the fire
//!   deadline out again, so bursts of movement coalesce into one request.
//! - At most one request is outstanding; evaluations while one is in flight
//!   are no-ops.

use foundation::math::{GeoPoint, angular_difference};
use foundation::time::Time;
use tracing::{debug, info};

use crate::config::FetchPolicyConfig;
use crate::in_flight::{FetchSnapshot, InFlightGuard};
use crate::request::{FetchRequestDescriptor, FetchTicket, ResolutionTier, TextureMode, TimeEpoch};

/// Result of a should-fetch evaluation.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Evaluation {
    /// A request is outstanding; nothing was changed.
    InFlight,
    /// The camera is still close to the last fetched view.
    Unchanged,
    /// The debounce window was (re)started.
    Scheduled { deadline: Time },
}

/// State re-checked when the debounce window elapses.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FireGate {
    pub dragging: bool,
    pub wants_2d: bool,
}

/// Result of polling the debounce deadline.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DebounceFire {
    /// No deadline pending.
    Idle,
    /// Deadline pending but not reached.
    Waiting,
    /// Deadline reached and the gate is open: issue a fetch now.
    Fire,
    /// Deadline reached but the state changed during the window.
    Dropped,
}

/// A request that has taken the in-flight slot and must be dispatched.
#[derive(Debug, Clone, PartialEq)]
pub struct IssuedFetch {
    pub ticket: FetchTicket,
    pub descriptor: FetchRequestDescriptor,
}

#[derive(Debug)]
pub struct ImageFetchPolicy {
    config: FetchPolicyConfig,
    last: Option<FetchSnapshot>,
    pending_fire: Option<Time>,
    guard: InFlightGuard,
}

impl ImageFetchPolicy {
    pub fn new(config: FetchPolicyConfig) -> Self {
        Self {
            config,
            last: None,
            pending_fire: None,
            guard: InFlightGuard::new(),
        }
    }

    pub fn config(&self) -> &FetchPolicyConfig {
        &self.config
    }

    pub fn last_snapshot(&self) -> Option<FetchSnapshot> {
        self.last
    }

    pub fn pending_deadline(&self) -> Option<Time> {
        self.pending_fire
    }

    pub fn is_in_flight(&self) -> bool {
        self.guard.is_held()
    }

    /// Whether `current` is far enough from the last fetched view.
    ///
    /// Each axis is compared on its own; azimuth uses the wrapped difference.
    pub fn needs_fetch(&self, current: &FetchSnapshot) -> bool {
        let Some(last) = self.last else {
            return true;
        };
        (current.zoom - last.zoom).abs() > self.config.zoom_change_threshold
            || (current.orientation.tilt - last.orientation.tilt).abs()
                > self.config.tilt_change_threshold
            || angular_difference(current.orientation.azimuth, last.orientation.azimuth).abs()
                > self.config.azimuth_change_threshold
    }

    /// Decide whether `current` warrants a fetch and (re)start the debounce
    /// window if so.
    pub fn evaluate(&mut self, now: Time, current: &FetchSnapshot) -> Evaluation {
        if self.guard.is_held() {
            return Evaluation::InFlight;
        }
        if !self.needs_fetch(current) {
            return Evaluation::Unchanged;
        }
        let deadline = now.after(self.config.debounce_s);
        self.pending_fire = Some(deadline);
        Evaluation::Scheduled { deadline }
    }

    /// Check the debounce deadline. A reached deadline is consumed whether it
    /// fires or is dropped.
    pub fn poll(&mut self, now: Time, gate: FireGate) -> DebounceFire {
        let Some(deadline) = self.pending_fire else {
            return DebounceFire::Idle;
        };
        if !now.has_reached(deadline) {
            return DebounceFire::Waiting;
        }
        self.pending_fire = None;
        if self.guard.is_held() || gate.dragging || !gate.wants_2d {
            debug!(
                in_flight = self.guard.is_held(),
                dragging = gate.dragging,
                wants_2d = gate.wants_2d,
                "debounced fetch dropped"
            );
            return DebounceFire::Dropped;
        }
        DebounceFire::Fire
    }

    /// Take the in-flight slot and build the request for `target`.
    ///
    /// `current` is the camera at issue time; it becomes the last fetched
    /// view if the request succeeds. Returns `None` if a request is already
    /// outstanding.
    pub fn begin(
        &mut self,
        target: GeoPoint,
        current: FetchSnapshot,
        texture: TextureMode,
        epoch: TimeEpoch,
    ) -> Option<IssuedFetch> {
        let Some(ticket) = self.guard.try_acquire(current) else {
            debug!("already loading, skipping request");
            return None;
        };
        // An explicit fetch satisfies any pending debounced one.
        self.pending_fire = None;

        let tier = ResolutionTier::for_zoom(current.zoom, texture, &self.config);
        let descriptor = FetchRequestDescriptor::new(target, tier, texture, epoch);
        info!(
            ticket = ticket.0,
            lat = %descriptor.lat,
            lon = %descriptor.lon,
            time = %descriptor.time,
            texture = %texture,
            tier = tier.0,
            zoom = current.zoom,
            "fetching imagery"
        );
        Some(IssuedFetch { ticket, descriptor })
    }

    /// Release the in-flight slot held by `ticket`.
    ///
    /// Returns the request-time snapshot, or `None` for an unknown ticket.
    pub fn finish(&mut self, ticket: FetchTicket) -> Option<FetchSnapshot> {
        self.guard.release(ticket)
    }

    /// Remember `snapshot` as the last successfully fetched view.
    pub fn record(&mut self, snapshot: FetchSnapshot) {
        self.last = Some(snapshot);
    }

    /// Forget the last fetched view and any pending debounce.
    ///
    /// An outstanding request keeps its slot until it completes.
    pub fn reset(&mut self) {
        self.last = None;
        self.pending_fire = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use view::Orientation;

    fn snap(tilt: f64, azimuth: f64, zoom: f64) -> FetchSnapshot {
        FetchSnapshot {
            orientation: Orientation::new(tilt, azimuth),
            zoom,
        }
    }

    const OPEN: FireGate = FireGate {
        dragging: false,
        wants_2d: true,
    };

    fn policy() -> ImageFetchPolicy {
        ImageFetchPolicy::new(FetchPolicyConfig::default())
    }

    fn london() -> GeoPoint {
        GeoPoint::new(51.5, -0.12).expect("valid")
    }

    #[test]
    fn first_evaluation_always_warrants_fetch() {
        let mut p = policy();
        assert_eq!(
            p.evaluate(Time(1.0), &snap(0.0, 0.0, 3.0)),
            Evaluation::Scheduled {
                deadline: Time(1.0).after(0.3)
            }
        );
    }

    #[test]
    fn per_axis_thresholds() {
        let mut p = policy();
        p.record(snap(0.0, 0.0, 3.0));

        assert!(!p.needs_fetch(&snap(0.04, 0.04, 3.29)));
        assert!(p.needs_fetch(&snap(0.06, 0.0, 3.0)));
        assert!(p.needs_fetch(&snap(0.0, -0.06, 3.0)));
        assert!(p.needs_fetch(&snap(0.0, 0.0, 3.31)));
    }

    #[test]
    fn azimuth_threshold_wraps_across_seam() {
        let mut p = policy();
        let pi = core::f64::consts::PI;
        p.record(snap(0.0, pi - 0.01, 3.0));
        assert!(!p.needs_fetch(&snap(0.0, -pi + 0.01, 3.0)));
    }

    #[test]
    fn rapid_movement_coalesces_into_one_fire() {
        let mut p = policy();
        let mut now = Time(0.0);
        let mut fires = 0;
        let mut last_deadline = Time::ZERO;

        // Ten qualifying movements 0.1 s apart, all inside the window.
        for i in 0..10 {
            match p.evaluate(now, &snap(0.0, i as f64 * 0.1, 3.0)) {
                Evaluation::Scheduled { deadline } => last_deadline = deadline,
                other => panic!("unexpected {other:?}"),
            }
            if p.poll(now, OPEN) == DebounceFire::Fire {
                fires += 1;
            }
            now = now.after(0.1);
        }
        assert_eq!(fires, 0);

        while !now.has_reached(last_deadline) {
            assert_eq!(p.poll(now, OPEN), DebounceFire::Waiting);
            now = now.after(0.01);
        }
        assert_eq!(p.poll(now, OPEN), DebounceFire::Fire);
        assert_eq!(p.poll(now.after(1.0), OPEN), DebounceFire::Idle);
    }

    #[test]
    fn gate_is_rechecked_at_fire_time() {
        let mut p = policy();
        p.evaluate(Time(0.0), &snap(0.0, 0.0, 3.0));
        let dragging = FireGate {
            dragging: true,
            wants_2d: true,
        };
        assert_eq!(p.poll(Time(0.5), dragging), DebounceFire::Dropped);
        assert_eq!(p.pending_deadline(), None);

        p.evaluate(Time(1.0), &snap(0.0, 0.0, 3.0));
        let zoomed_out = FireGate {
            dragging: false,
            wants_2d: false,
        };
        assert_eq!(p.poll(Time(2.0), zoomed_out), DebounceFire::Dropped);
    }

    #[test]
    fn evaluation_is_noop_while_in_flight() {
        let mut p = policy();
        let issued = p
            .begin(london(), snap(0.0, 0.0, 3.0), TextureMode::Fine250m, TimeEpoch::default())
            .expect("slot free");

        assert_eq!(p.evaluate(Time(0.0), &snap(1.0, 1.0, 6.0)), Evaluation::InFlight);
        assert_eq!(p.pending_deadline(), None);
        assert!(
            p.begin(london(), snap(1.0, 1.0, 6.0), TextureMode::Fine250m, TimeEpoch::default())
                .is_none()
        );

        assert_eq!(p.finish(issued.ticket), Some(snap(0.0, 0.0, 3.0)));
        assert!(!p.is_in_flight());
    }

    #[test]
    fn success_records_request_time_snapshot() {
        let mut p = policy();
        let at_request = snap(0.2, 0.2, 3.0);
        let issued = p
            .begin(london(), at_request, TextureMode::Fine250m, TimeEpoch::default())
            .expect("slot free");

        // The user kept moving during the round trip.
        let moved = snap(0.4, 0.2, 3.0);
        let snapshot = p.finish(issued.ticket).expect("held");
        p.record(snapshot);

        assert_eq!(p.last_snapshot(), Some(at_request));
        assert!(p.needs_fetch(&moved));
    }

    #[test]
    fn begin_clamps_tier_for_texture() {
        let mut p = policy();
        let issued = p
            .begin(london(), snap(0.0, 0.0, 7.5), TextureMode::Coarse2km, TimeEpoch::new(2020))
            .expect("slot free");
        assert_eq!(issued.descriptor.zoom, 5);
        assert_eq!(issued.descriptor.lat, "51.5000");
        assert_eq!(issued.descriptor.time, "2020-01-01");
    }

    #[test]
    fn reset_forgets_last_view_and_pending_fire() {
        let mut p = policy();
        p.record(snap(0.0, 0.0, 3.0));
        p.evaluate(Time(0.0), &snap(1.0, 0.0, 3.0));
        p.reset();
        assert_eq!(p.last_snapshot(), None);
        assert_eq!(p.poll(Time(5.0), OPEN), DebounceFire::Idle);
    }
}
