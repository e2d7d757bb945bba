use view::Orientation;

use crate::request::FetchTicket;

/// Camera state at the moment a fetch was issued.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FetchSnapshot {
    pub orientation: Orientation,
    pub zoom: f64,
}

#[derive(Debug, Copy, Clone, PartialEq, Default)]
enum GuardState {
    #[default]
    Idle,
    Fetching {
        ticket: FetchTicket,
        snapshot: FetchSnapshot,
    },
}

/// Single-slot guard: at most one outstanding imagery request.
///
/// Requests attempted while the slot is taken are dropped, never queued.
#[derive(Debug, Default)]
pub struct InFlightGuard {
    next_ticket: u64,
    state: GuardState,
}

impl InFlightGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_held(&self) -> bool {
        matches!(self.state, GuardState::Fetching { .. })
    }

    pub fn ticket(&self) -> Option<FetchTicket> {
        match self.state {
            GuardState::Fetching { ticket, .. } => Some(ticket),
            GuardState::Idle => None,
        }
    }

    /// Take the slot for a request issued with camera state `snapshot`.
    ///
    /// Returns `None` if a request is already outstanding.
    pub fn try_acquire(&mut self, snapshot: FetchSnapshot) -> Option<FetchTicket> {
        if self.is_held() {
            return None;
        }
        self.next_ticket += 1;
        let ticket = FetchTicket(self.next_ticket);
        self.state = GuardState::Fetching { ticket, snapshot };
        Some(ticket)
    }

    /// Free the slot held by `ticket` and hand back its request-time snapshot.
    ///
    /// A ticket that does not hold the slot leaves the guard untouched.
    pub fn release(&mut self, ticket: FetchTicket) -> Option<FetchSnapshot> {
        match self.state {
            GuardState::Fetching { ticket: held, snapshot } if held == ticket => {
                self.state = GuardState::Idle;
                Some(snapshot)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FetchSnapshot, InFlightGuard};
    use crate::request::FetchTicket;
    use view::Orientation;

    fn snap(zoom: f64) -> FetchSnapshot {
        FetchSnapshot {
            orientation: Orientation::default(),
            zoom,
        }
    }

    #[test]
    fn second_acquire_is_dropped() {
        let mut g = InFlightGuard::new();
        let t = g.try_acquire(snap(3.0)).expect("free");
        assert!(g.try_acquire(snap(4.0)).is_none());
        assert_eq!(g.ticket(), Some(t));
    }

    #[test]
    fn release_returns_request_time_snapshot() {
        let mut g = InFlightGuard::new();
        let t = g.try_acquire(snap(3.0)).expect("free");
        assert_eq!(g.release(t), Some(snap(3.0)));
        assert!(!g.is_held());
        assert!(g.try_acquire(snap(4.0)).is_some());
    }

    #[test]
    fn foreign_ticket_does_not_release() {
        let mut g = InFlightGuard::new();
        let t = g.try_acquire(snap(3.0)).expect("free");
        assert_eq!(g.release(FetchTicket(t.0 + 100)), None);
        assert!(g.is_held());
    }

    #[test]
    fn tickets_are_unique() {
        let mut g = InFlightGuard::new();
        let a = g.try_acquire(snap(3.0)).expect("free");
        g.release(a);
        let b = g.try_acquire(snap(3.0)).expect("free");
        assert_ne!(a, b);
    }
}
