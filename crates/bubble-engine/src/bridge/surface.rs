//! Surface ops — the engine's only output.
//!
//! The engine never touches the DOM. Every visible change is queued here as a
//! `SurfaceOp` and the host (`bubble-web`) drains and applies them after each
//! input or frame. Class names must stay in sync with the page stylesheet.

use crate::api::types::{BubbleId, ElementKey};

/// CSS class names the engine toggles on non-bubble elements.
pub mod classes {
    /// Default bubble visibility class (library scene).
    pub const SHOW_BUBBLE: &str = "show-bubble";
    /// Ambient zone marker.
    pub const SHOW_BUBBLES: &str = "show-bubbles";
    /// Waterfall entrance: threshold visible.
    pub const SHOW_THRESHOLD: &str = "show-threshold";
    /// Waterfall entrance: reveal animation running.
    pub const REVEAL: &str = "reveal";
    /// Stage container: hotspot outlines for debugging.
    pub const DEBUG_HOTSPOTS: &str = "debug-hotspots";
}

/// One DOM mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceOp {
    /// Unhide a bubble and add the stage's bubble class; replace its text
    /// when `text` is present.
    ShowBubble { bubble: BubbleId, text: Option<String> },
    /// Remove the bubble class and hide the bubble.
    HideBubble { bubble: BubbleId },
    AddClass { target: ElementKey, class: &'static str },
    RemoveClass { target: ElementKey, class: &'static str },
    /// Remove then re-add a class with a forced reflow in between, so CSS
    /// animations start over.
    RestartClass { target: ElementKey, class: &'static str },
    SetHidden { target: ElementKey, hidden: bool },
    /// `aria-expanded` on a control.
    SetExpanded { target: ElementKey, expanded: bool },
}

/// Ops produced since the host last drained.
#[derive(Debug, Default)]
pub struct Outbox {
    ops: Vec<SurfaceOp>,
}

impl Outbox {
    pub fn new() -> Self {
        Self {
            ops: Vec::with_capacity(32),
        }
    }

    pub fn push(&mut self, op: SurfaceOp) {
        self.ops.push(op);
    }

    /// Drain all pending ops in emission order.
    pub fn drain(&mut self) -> Vec<SurfaceOp> {
        std::mem::take(&mut self.ops)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SurfaceOp> {
        self.ops.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_empties_in_order() {
        let mut out = Outbox::new();
        out.push(SurfaceOp::HideBubble { bubble: "a".into() });
        out.push(SurfaceOp::AddClass {
            target: "zone".into(),
            class: classes::SHOW_BUBBLES,
        });
        assert_eq!(out.len(), 2);

        let ops = out.drain();
        assert!(out.is_empty());
        assert!(matches!(ops[0], SurfaceOp::HideBubble { .. }));
        assert!(matches!(ops[1], SurfaceOp::AddClass { class: "show-bubbles", .. }));
    }
}
