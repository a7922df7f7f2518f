//! Waterfall reveal: an independent timed show/hide effect.
//!
//! Never gated by the dialogue sequencer and never touched by "stop all".
//! It keeps its own single-slot timer: each trigger replaces the pending hide.

use serde::{Deserialize, Serialize};

use crate::api::types::ElementKey;
use crate::bridge::surface::{classes, Outbox, SurfaceOp};
use crate::core::timers::TimerRegistry;

/// How long the waterfall stays visible after a trigger.
pub const DEFAULT_GRACE_MS: u64 = 9000;

/// DOM elements the waterfall drives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaterfallElements {
    /// The stag hotspot; carries `aria-expanded`.
    pub hotspot: ElementKey,
    /// Entrance container; carries `show-threshold` and `reveal`.
    pub entrance: ElementKey,
    /// Hint bubble next to the hotspot.
    #[serde(default)]
    pub bubble: Option<ElementKey>,
    #[serde(default)]
    pub cover: Option<ElementKey>,
    #[serde(default)]
    pub scene: Option<ElementKey>,
}

impl WaterfallElements {
    /// Elements a click may land on without collapsing the reveal.
    pub fn own_elements(&self) -> impl Iterator<Item = &ElementKey> {
        std::iter::once(&self.hotspot).chain(self.bubble.iter())
    }
}

#[derive(Debug)]
pub struct WaterfallReveal {
    elements: WaterfallElements,
    grace_ms: u64,
    hide_timer: TimerRegistry<()>,
    revealed: bool,
    hint_visible: bool,
}

impl WaterfallReveal {
    pub fn new(elements: WaterfallElements, grace_ms: u64) -> Self {
        Self {
            elements,
            grace_ms,
            hide_timer: TimerRegistry::new(),
            revealed: false,
            hint_visible: false,
        }
    }

    pub fn elements(&self) -> &WaterfallElements {
        &self.elements
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub fn is_hint_visible(&self) -> bool {
        self.hint_visible
    }

    /// Scheduled hide time, if any.
    pub fn hide_at(&self) -> Option<u64> {
        self.hide_timer.next_due()
    }

    /// Show threshold, hint and scenery, restart the reveal animation, and
    /// (re)schedule the hide `grace_ms` from now. Always permitted.
    pub fn trigger(&mut self, now: u64, out: &mut Outbox) {
        log::debug!("waterfall: trigger at {}ms", now);
        self.hide_timer.cancel_all();
        self.hover_hint_show(out);
        self.set_scenery_hidden(false, out);
        out.push(SurfaceOp::RestartClass {
            target: self.elements.entrance.clone(),
            class: classes::REVEAL,
        });
        self.revealed = true;
        self.hide_timer.schedule(now, self.grace_ms, ());
    }

    /// Pointer enter: show the threshold and the hint bubble only.
    pub fn hover_hint_show(&mut self, out: &mut Outbox) {
        out.push(SurfaceOp::AddClass {
            target: self.elements.entrance.clone(),
            class: classes::SHOW_THRESHOLD,
        });
        if let Some(bubble) = &self.elements.bubble {
            out.push(SurfaceOp::SetHidden { target: bubble.clone(), hidden: false });
            out.push(SurfaceOp::AddClass {
                target: bubble.clone(),
                class: classes::SHOW_BUBBLE,
            });
            out.push(SurfaceOp::SetExpanded {
                target: self.elements.hotspot.clone(),
                expanded: true,
            });
            self.hint_visible = true;
        }
    }

    /// Pointer leave: hide the hint unless a reveal is running.
    pub fn hover_hint_hide(&mut self, out: &mut Outbox) {
        if !self.revealed {
            self.hide_hint(out);
        }
    }

    /// Click away from the waterfall's own elements: collapse immediately.
    pub fn collapse(&mut self, out: &mut Outbox) {
        self.hide_timer.cancel_all();
        self.hide_everything(out);
    }

    pub fn next_due(&self) -> Option<u64> {
        self.hide_timer.next_due()
    }

    /// Perform the scheduled hide once its time has come.
    pub fn tick(&mut self, now: u64, out: &mut Outbox) {
        let mut fired = false;
        while self.hide_timer.pop_due(now).is_some() {
            fired = true;
        }
        if fired {
            log::debug!("waterfall: grace elapsed at {}ms", now);
            self.hide_everything(out);
        }
    }

    fn hide_everything(&mut self, out: &mut Outbox) {
        out.push(SurfaceOp::RemoveClass {
            target: self.elements.entrance.clone(),
            class: classes::REVEAL,
        });
        self.revealed = false;
        self.set_scenery_hidden(true, out);
        self.hide_hint(out);
    }

    fn hide_hint(&mut self, out: &mut Outbox) {
        if let Some(bubble) = &self.elements.bubble {
            out.push(SurfaceOp::RemoveClass {
                target: bubble.clone(),
                class: classes::SHOW_BUBBLE,
            });
            out.push(SurfaceOp::SetHidden { target: bubble.clone(), hidden: true });
            out.push(SurfaceOp::SetExpanded {
                target: self.elements.hotspot.clone(),
                expanded: false,
            });
        }
        self.hint_visible = false;
        out.push(SurfaceOp::RemoveClass {
            target: self.elements.entrance.clone(),
            class: classes::SHOW_THRESHOLD,
        });
    }

    fn set_scenery_hidden(&self, hidden: bool, out: &mut Outbox) {
        for target in [&self.elements.cover, &self.elements.scene].into_iter().flatten() {
            out.push(SurfaceOp::SetHidden { target: target.clone(), hidden });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn waterfall() -> WaterfallReveal {
        WaterfallReveal::new(
            WaterfallElements {
                hotspot: "stag-hotspot".into(),
                entrance: "library-entrance".into(),
                bubble: Some("stag-bubble".into()),
                cover: Some("waterfall-cover".into()),
                scene: Some("waterfall-scene".into()),
            },
            DEFAULT_GRACE_MS,
        )
    }

    #[test]
    fn trigger_shows_then_hides_after_grace() {
        let mut wf = waterfall();
        let mut out = Outbox::new();

        wf.trigger(0, &mut out);
        assert!(wf.is_revealed());
        assert!(wf.is_hint_visible());
        assert!(out.iter().any(|op| matches!(
            op,
            SurfaceOp::SetExpanded { expanded: true, .. }
        )));
        assert!(out.iter().any(|op| matches!(
            op,
            SurfaceOp::RestartClass { class: "reveal", .. }
        )));

        wf.tick(8999, &mut out);
        assert!(wf.is_revealed());
        wf.tick(9000, &mut out);
        assert!(!wf.is_revealed());
        assert!(!wf.is_hint_visible());
        assert_eq!(wf.next_due(), None);
    }

    #[test]
    fn retrigger_resets_the_timer() {
        let mut wf = waterfall();
        let mut out = Outbox::new();

        wf.trigger(0, &mut out);
        wf.trigger(5000, &mut out);
        assert_eq!(wf.hide_at(), Some(14_000));

        wf.tick(9000, &mut out);
        assert!(wf.is_revealed());
        wf.tick(14_000, &mut out);
        assert!(!wf.is_revealed());
    }

    #[test]
    fn hover_hint_hides_only_when_not_revealed() {
        let mut wf = waterfall();
        let mut out = Outbox::new();

        wf.hover_hint_show(&mut out);
        assert!(wf.is_hint_visible());
        wf.hover_hint_hide(&mut out);
        assert!(!wf.is_hint_visible());

        wf.trigger(0, &mut out);
        wf.hover_hint_hide(&mut out);
        assert!(wf.is_hint_visible());
    }

    #[test]
    fn collapse_is_immediate() {
        let mut wf = waterfall();
        let mut out = Outbox::new();
        wf.trigger(0, &mut out);
        out.drain();

        wf.collapse(&mut out);
        assert!(!wf.is_revealed());
        assert_eq!(wf.next_due(), None);
        assert!(out.iter().any(|op| matches!(
            op,
            SurfaceOp::SetHidden { hidden: true, target } if target.as_str() == "waterfall-scene"
        )));
    }

    #[test]
    fn own_elements_cover_hotspot_and_bubble() {
        let wf = waterfall();
        let own: Vec<_> = wf.elements().own_elements().map(ElementKey::as_str).collect();
        assert_eq!(own, vec!["stag-hotspot", "stag-bubble"]);
    }
}
