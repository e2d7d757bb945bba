use core::fmt;

use crate::frame::Frame;

/// What an engine event is about. Stable and machine-matchable.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Presentation switched between rendered globe and fetched imagery.
    ModeSwitched,
    TransitionStarted,
    TransitionCompleted,
    /// A running transition was replaced by a drag or a new target.
    TransitionSuperseded,
    FetchIssued,
    FetchCompleted,
    FetchFailed,
    /// A result arrived after the view stopped wanting it.
    FetchDiscarded,
    EpochChanged,
    TextureChanged,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::ModeSwitched => "mode",
            EventKind::TransitionStarted => "transition.started",
            EventKind::TransitionCompleted => "transition.completed",
            EventKind::TransitionSuperseded => "transition.superseded",
            EventKind::FetchIssued => "fetch.issued",
            EventKind::FetchCompleted => "fetch.completed",
            EventKind::FetchFailed => "fetch.failed",
            EventKind::FetchDiscarded => "fetch.discarded",
            EventKind::EpochChanged => "epoch",
            EventKind::TextureChanged => "texture",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded event: which frame, what kind, free-form detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub frame_index: u64,
    pub kind: EventKind,
    pub message: String,
}

/// Append-only log of engine events, drained by the host.
#[derive(Debug, Default)]
pub struct EventBus {
    events: Vec<Event>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, frame: Frame, kind: EventKind, message: impl Into<String>) {
        self.events.push(Event {
            frame_index: frame.index,
            kind,
            message: message.into(),
        });
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn of_kind(&self, kind: EventKind) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(move |e| e.kind == kind)
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.of_kind(kind).count()
    }

    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}
