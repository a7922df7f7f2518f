//! Balloon player for hotspot-declared sequences and groups.
//!
//! Independent of the dialogue sequencer: it has its own playback (and so its
//! own timers and epoch). Comma-list sequences and group-exclusive balloons
//! are both reveals played here.

use crate::api::types::BubbleId;
use crate::bridge::surface::Outbox;
use crate::core::bubbles::BubbleStore;
use crate::systems::reveal::{Playback, Reveal};

#[derive(Debug, Default)]
pub struct SequencePlayer {
    playback: Playback,
    /// Group currently shown, if the player is showing one.
    active_group: Option<String>,
}

impl SequencePlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Play `bubbles` one at a time, `interval_ms` apart. Restarts if
    /// something is already playing.
    pub fn play(&mut self, bubbles: &[BubbleId], interval_ms: u64, now: u64) {
        let names: Vec<BubbleId> = bubbles
            .iter()
            .filter(|b| !b.as_str().trim().is_empty())
            .cloned()
            .collect();
        self.active_group = None;
        if names.is_empty() {
            self.playback.cancel();
            return;
        }
        self.playback.start(Reveal::sequence(&names, interval_ms), now);
    }

    /// Hide every bubble, then show all members of `group`. With
    /// `hide_after_ms`, everything is hidden again after that delay.
    pub fn show_group(
        &mut self,
        group: &str,
        hide_after_ms: Option<u64>,
        now: u64,
        store: &mut BubbleStore,
        out: &mut Outbox,
    ) -> bool {
        store.hide_all(out);
        let members = store.group_members(group);
        if members.is_empty() {
            log::warn!("balloons: group `{}` has no bubbles", group);
            self.stop();
            return false;
        }
        self.playback.start(Reveal::group(&members, hide_after_ms), now);
        self.active_group = Some(group.to_owned());
        true
    }

    /// Stop without hiding anything.
    pub fn stop(&mut self) {
        self.playback.cancel();
        self.active_group = None;
    }

    pub fn is_playing(&self) -> bool {
        self.playback.is_playing()
    }

    pub fn active_group(&self) -> Option<&str> {
        self.active_group.as_deref()
    }

    pub fn next_due(&self) -> Option<u64> {
        self.playback.next_due()
    }

    pub fn tick(&mut self, now: u64, store: &mut BubbleStore, out: &mut Outbox) {
        while let Some(fired) = self.playback.pop(now) {
            fired.apply(store, now, out);
        }
        if !self.playback.is_playing() {
            self.active_group = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::bubble::Bubble;

    fn store() -> BubbleStore {
        let mut store = BubbleStore::new();
        store.register(Bubble::new("a"));
        store.register(Bubble::new("b"));
        store.register(Bubble::new("c"));
        store.register(Bubble::new("wolf").with_group("trio"));
        store.register(Bubble::new("sheep").with_group("trio"));
        store.register(Bubble::new("owl").with_group("night"));
        store
    }

    fn visible(store: &BubbleStore) -> Vec<&str> {
        store.visible().into_iter().map(BubbleId::as_str).collect()
    }

    #[test]
    fn comma_sequence_timeline() {
        let mut store = store();
        let mut out = Outbox::new();
        let mut player = SequencePlayer::new();
        let ids: Vec<BubbleId> = ["a", "b", "c"].into_iter().map(BubbleId::from).collect();

        player.play(&ids, 2400, 0);
        player.tick(0, &mut store, &mut out);
        assert_eq!(visible(&store), vec!["a"]);
        player.tick(2400, &mut store, &mut out);
        assert_eq!(visible(&store), vec!["b"]);
        player.tick(4800, &mut store, &mut out);
        assert_eq!(visible(&store), vec!["c"]);
        player.tick(7200, &mut store, &mut out);
        assert!(visible(&store).is_empty());
        assert!(!player.is_playing());
    }

    #[test]
    fn replay_restarts_from_first() {
        let mut store = store();
        let mut out = Outbox::new();
        let mut player = SequencePlayer::new();
        let ids: Vec<BubbleId> = ["a", "b"].into_iter().map(BubbleId::from).collect();

        player.play(&ids, 1000, 0);
        player.tick(1000, &mut store, &mut out);
        assert_eq!(visible(&store), vec!["b"]);

        player.play(&ids, 1000, 1500);
        player.tick(1500, &mut store, &mut out);
        assert_eq!(visible(&store), vec!["a"]);
        // The first run's finish (due at 2000) is stale.
        player.tick(2000, &mut store, &mut out);
        assert_eq!(visible(&store), vec!["a"]);
    }

    #[test]
    fn group_is_exclusive() {
        let mut store = store();
        let mut out = Outbox::new();
        let mut player = SequencePlayer::new();

        assert!(player.show_group("night", None, 0, &mut store, &mut out));
        player.tick(0, &mut store, &mut out);
        assert_eq!(visible(&store), vec!["owl"]);

        assert!(player.show_group("trio", None, 10, &mut store, &mut out));
        player.tick(10, &mut store, &mut out);
        assert_eq!(visible(&store), vec!["wolf", "sheep"]);
        assert_eq!(player.active_group(), Some("trio"));
    }

    #[test]
    fn touch_group_hides_after_delay() {
        let mut store = store();
        let mut out = Outbox::new();
        let mut player = SequencePlayer::new();

        player.show_group("trio", Some(1200), 0, &mut store, &mut out);
        player.tick(0, &mut store, &mut out);
        assert_eq!(visible(&store).len(), 2);
        player.tick(1200, &mut store, &mut out);
        assert!(visible(&store).is_empty());
        assert_eq!(player.active_group(), None);
    }

    #[test]
    fn unknown_group_shows_nothing() {
        let mut store = store();
        let mut out = Outbox::new();
        let mut player = SequencePlayer::new();
        assert!(!player.show_group("ghosts", None, 0, &mut store, &mut out));
        assert!(!player.is_playing());
    }
}
