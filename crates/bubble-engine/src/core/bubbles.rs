use crate::api::types::BubbleId;
use crate::bridge::surface::{Outbox, SurfaceOp};
use crate::components::bubble::{Bubble, Linger};

/// Bubble visibility store, kept as a flat Vec.
/// A page has a handful of bubbles, so linear lookups are fine.
///
/// Auto-hide deadlines live here and form their own timer scope: cancelling
/// a dialogue's steps never touches them.
#[derive(Debug, Default)]
pub struct BubbleStore {
    bubbles: Vec<Bubble>,
}

impl BubbleStore {
    pub fn new() -> Self {
        Self {
            bubbles: Vec::with_capacity(16),
        }
    }

    /// Register a bubble. Returns false if the id is already known.
    pub fn register(&mut self, bubble: Bubble) -> bool {
        if self.contains(&bubble.id) {
            return false;
        }
        self.bubbles.push(bubble);
        true
    }

    pub fn contains(&self, id: &BubbleId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: &BubbleId) -> Option<&Bubble> {
        self.bubbles.iter().find(|b| &b.id == id)
    }

    fn get_mut(&mut self, id: &BubbleId) -> Option<&mut Bubble> {
        self.bubbles.iter_mut().find(|b| &b.id == id)
    }

    pub fn is_visible(&self, id: &BubbleId) -> bool {
        self.get(id).is_some_and(|b| b.visible)
    }

    pub fn text(&self, id: &BubbleId) -> Option<&str> {
        self.get(id).map(|b| b.text.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bubble> {
        self.bubbles.iter()
    }

    /// Ids of every bubble currently visible, in registration order.
    pub fn visible(&self) -> Vec<&BubbleId> {
        self.bubbles
            .iter()
            .filter(|b| b.visible)
            .map(|b| &b.id)
            .collect()
    }

    /// Ids of every bubble in `group`.
    pub fn group_members(&self, group: &str) -> Vec<BubbleId> {
        self.bubbles
            .iter()
            .filter(|b| b.in_group(group))
            .map(|b| b.id.clone())
            .collect()
    }

    /// Show a bubble with the default linger.
    pub fn show(&mut self, id: &BubbleId, text: Option<&str>, now: u64, out: &mut Outbox) -> bool {
        self.show_for(id, text, Linger::default(), now, out)
    }

    /// Show a bubble, replacing its text when given, and (re)arm its own
    /// auto-hide deadline. Any previous deadline for this bubble is dropped.
    pub fn show_for(
        &mut self,
        id: &BubbleId,
        text: Option<&str>,
        linger: Linger,
        now: u64,
        out: &mut Outbox,
    ) -> bool {
        let Some(bubble) = self.get_mut(id) else {
            log::warn!("show: unknown bubble `{}`", id);
            return false;
        };
        if let Some(text) = text {
            bubble.text = text.to_owned();
        }
        bubble.visible = true;
        bubble.hide_at = match linger {
            Linger::After(ms) => Some(now.saturating_add(ms)),
            Linger::Indefinite => None,
        };
        out.push(SurfaceOp::ShowBubble {
            bubble: id.clone(),
            text: text.map(str::to_owned),
        });
        true
    }

    /// Hide a bubble now. Returns false (and emits nothing) if it was
    /// already hidden or unknown.
    pub fn hide(&mut self, id: &BubbleId, out: &mut Outbox) -> bool {
        let Some(bubble) = self.get_mut(id) else {
            log::warn!("hide: unknown bubble `{}`", id);
            return false;
        };
        bubble.hide_at = None;
        if !bubble.visible {
            return false;
        }
        bubble.visible = false;
        out.push(SurfaceOp::HideBubble { bubble: id.clone() });
        true
    }

    /// Hide every known bubble. Returns how many changed.
    pub fn hide_all(&mut self, out: &mut Outbox) -> usize {
        let mut hidden = 0;
        for bubble in self.bubbles.iter_mut() {
            bubble.hide_at = None;
            if bubble.visible {
                bubble.visible = false;
                out.push(SurfaceOp::HideBubble { bubble: bubble.id.clone() });
                hidden += 1;
            }
        }
        hidden
    }

    pub fn hide_many<'a>(
        &mut self,
        ids: impl IntoIterator<Item = &'a BubbleId>,
        out: &mut Outbox,
    ) -> usize {
        ids.into_iter().filter(|id| self.hide(id, out)).count()
    }

    /// Earliest auto-hide deadline.
    pub fn next_due(&self) -> Option<u64> {
        self.bubbles.iter().filter_map(|b| b.hide_at).min()
    }

    /// Hide every bubble whose deadline has passed. Returns how many hid.
    pub fn tick(&mut self, now: u64, out: &mut Outbox) -> usize {
        let mut hidden = 0;
        for bubble in self.bubbles.iter_mut() {
            if bubble.hide_at.is_some_and(|t| t <= now) {
                bubble.hide_at = None;
                if bubble.visible {
                    bubble.visible = false;
                    out.push(SurfaceOp::HideBubble { bubble: bubble.id.clone() });
                    hidden += 1;
                }
            }
        }
        hidden
    }

    pub fn len(&self) -> usize {
        self.bubbles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bubbles.is_empty()
    }
}
