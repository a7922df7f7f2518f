use crate::api::types::HotspotId;

/// Pointer / focus / touch gestures on a hotspot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gesture {
    Enter,
    Leave,
    Focus,
    Blur,
    Click,
    /// Enter or Space pressed while focused.
    Activate,
    TouchStart,
}

/// Input events the stage understands.
/// The host translates DOM events into these; no DOM types cross over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageInput {
    Hotspot { hotspot: HotspotId, gesture: Gesture },
    /// A click that landed outside every interactive region.
    ClickOutside,
    /// A click that landed outside the waterfall's own elements.
    ClickAwayFromWaterfall,
    /// Explicit "stop all dialogues" request.
    StopAll,
    /// Ejection request. `epoch_ms` is wall-clock time for the session record.
    Eject { reason: String, epoch_ms: u64 },
}

impl StageInput {
    pub fn hotspot(hotspot: impl Into<HotspotId>, gesture: Gesture) -> Self {
        StageInput::Hotspot {
            hotspot: hotspot.into(),
            gesture,
        }
    }
}

/// A queue of stage inputs.
/// Event listeners push; the stage drains at the current virtual time.
#[derive(Debug)]
pub struct InputQueue {
    events: Vec<StageInput>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(16),
        }
    }

    pub fn push(&mut self, event: StageInput) {
        self.events.push(event);
    }

    /// Drain all pending events. Returns a Vec and clears the queue.
    pub fn drain(&mut self) -> Vec<StageInput> {
        std::mem::take(&mut self.events)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StageInput> {
        self.events.iter()
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
