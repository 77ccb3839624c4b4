use crate::api::types::PieceId;

/// Input events the puzzle understands.
/// Pointer coordinates are client-space (CSS pixels); `time_ms` uses the same clock
/// as animation-frame timestamps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// A pointer went down on the drawable of `piece`.
    PointerDown { piece: PieceId, x: f32, y: f32, time_ms: f64 },
    /// The captured pointer moved.
    PointerMove { x: f32, y: f32, time_ms: f64 },
    /// The captured pointer was released.
    PointerUp { time_ms: f64 },
    /// The gesture was interrupted by the host (e.g. a touch was taken over).
    PointerCancel { time_ms: f64 },
    /// Break all groups and scatter the pieces.
    Shuffle,
}

/// Pending pointer and command input.
/// The host writes events in arrival order; the session drains and applies them serially.
pub struct InputQueue {
    events: Vec<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(32),
        }
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    /// Take every pending event in arrival order, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}
