// systems/reveal.rs
//
// Timed ordered reveal: the one sequence-player implementation.
//
// Named dialogue scripts, comma-list balloon sequences and group-exclusive
// balloons are all a `Reveal`: a list of timed steps plus an optional finish
// step, played by a `Playback`.
//
// Usage:
//   let mut playback = Playback::new();
//   playback.start(Reveal::sequence(&ids, 2400), now);
//   while let Some(fired) = playback.pop(now) { fired.apply(&mut store, now, &mut out); }

use serde::{Deserialize, Serialize};

use crate::api::types::BubbleId;
use crate::bridge::surface::Outbox;
use crate::components::bubble::Linger;
use crate::core::bubbles::BubbleStore;
use crate::core::timers::TimerRegistry;

/// Which bubbles a step or finish hides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Scope {
    /// Every bubble in the store.
    All,
    Only(Vec<BubbleId>),
}

/// One timed bubble change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevealStep {
    /// Offset from the start of the reveal.
    pub at_ms: u64,
    pub bubble: BubbleId,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub linger: Linger,
    /// Hide everything in this scope before showing.
    #[serde(default)]
    pub solo: Option<Scope>,
}

/// Cleanup that ends a reveal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finish {
    pub at_ms: u64,
    pub hide: Scope,
}

/// A timed ordered list of bubble changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reveal {
    pub steps: Vec<RevealStep>,
    #[serde(default)]
    pub finish: Option<Finish>,
}

impl Reveal {
    pub fn new() -> Self {
        Self::default()
    }

    /// One line of dialogue.
    pub fn line(mut self, at_ms: u64, bubble: impl Into<BubbleId>, text: &str, linger: Linger) -> Self {
        self.steps.push(RevealStep {
            at_ms,
            bubble: bubble.into(),
            text: Some(text.to_owned()),
            linger,
            solo: None,
        });
        self
    }

    pub fn finish(mut self, at_ms: u64, hide: Scope) -> Self {
        self.finish = Some(Finish { at_ms, hide });
        self
    }

    /// Show each bubble alone, one per `interval_ms`, then hide everything one
    /// interval after the last.
    pub fn sequence(bubbles: &[BubbleId], interval_ms: u64) -> Self {
        let steps = bubbles
            .iter()
            .enumerate()
            .map(|(i, bubble)| RevealStep {
                at_ms: (i as u64).saturating_mul(interval_ms),
                bubble: bubble.clone(),
                text: None,
                linger: Linger::Indefinite,
                solo: Some(Scope::All),
            })
            .collect();
        Self {
            steps,
            finish: Some(Finish {
                at_ms: (bubbles.len() as u64).saturating_mul(interval_ms),
                hide: Scope::All,
            }),
        }
    }

    /// Show every bubble of a group at once, optionally hiding all after a delay.
    pub fn group(bubbles: &[BubbleId], hide_after_ms: Option<u64>) -> Self {
        let steps = bubbles
            .iter()
            .map(|bubble| RevealStep {
                at_ms: 0,
                bubble: bubble.clone(),
                text: None,
                linger: Linger::Indefinite,
                solo: None,
            })
            .collect();
        Self {
            steps,
            finish: hide_after_ms.map(|at_ms| Finish { at_ms, hide: Scope::All }),
        }
    }

    /// Offset of the last thing this reveal does.
    pub fn duration(&self) -> u64 {
        let last_step = self.steps.iter().map(|s| s.at_ms).max().unwrap_or(0);
        self.finish.as_ref().map_or(last_step, |f| f.at_ms.max(last_step))
    }

    /// Every bubble the reveal mentions.
    pub fn bubbles(&self) -> impl Iterator<Item = &BubbleId> {
        let finish = self.finish.iter().flat_map(|f| scope_ids(&f.hide));
        let solos = self
            .steps
            .iter()
            .filter_map(|s| s.solo.as_ref())
            .flat_map(scope_ids);
        self.steps.iter().map(|s| &s.bubble).chain(solos).chain(finish)
    }
}

fn scope_ids(scope: &Scope) -> std::slice::Iter<'_, BubbleId> {
    match scope {
        Scope::All => Default::default(),
        Scope::Only(ids) => ids.iter(),
    }
}

/// Hide the bubbles a scope names.
pub fn hide_scope(scope: &Scope, store: &mut BubbleStore, out: &mut Outbox) -> usize {
    match scope {
        Scope::All => store.hide_all(out),
        Scope::Only(ids) => store.hide_many(ids, out),
    }
}

#[derive(Debug, Clone, Copy)]
enum CueKind {
    Step(usize),
    Finish,
}

#[derive(Debug, Clone, Copy)]
struct Cue {
    epoch: u64,
    kind: CueKind,
}

/// A cue that passed the epoch guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fired {
    Step(RevealStep),
    Finish(Finish),
}

impl Fired {
    /// Apply this cue to the bubble store.
    pub fn apply(&self, store: &mut BubbleStore, now: u64, out: &mut Outbox) {
        match self {
            Fired::Step(step) => {
                if let Some(scope) = &step.solo {
                    hide_scope(scope, store, out);
                }
                store.show_for(&step.bubble, step.text.as_deref(), step.linger, now, out);
            }
            Fired::Finish(finish) => {
                hide_scope(&finish.hide, store, out);
            }
        }
    }
}

/// Plays one `Reveal` at a time.
///
/// Every start or cancel bumps the epoch. Cues carry the epoch they were
/// scheduled under and are skipped at fire time if it has moved on, so a
/// superseded reveal can never change visible state even if one of its cues
/// is still in the registry.
#[derive(Debug, Default)]
pub struct Playback {
    timers: TimerRegistry<Cue>,
    epoch: u64,
    current: Option<Reveal>,
}

impl Playback {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel whatever is playing and schedule `reveal` from `now`.
    /// Returns the new epoch.
    pub fn start(&mut self, reveal: Reveal, now: u64) -> u64 {
        self.cancel();
        let epoch = self.epoch;
        for (i, step) in reveal.steps.iter().enumerate() {
            self.timers.schedule(now, step.at_ms, Cue { epoch, kind: CueKind::Step(i) });
        }
        if let Some(finish) = &reveal.finish {
            self.timers.schedule(now, finish.at_ms, Cue { epoch, kind: CueKind::Finish });
        }
        self.current = Some(reveal);
        epoch
    }

    /// Drop all pending cues and invalidate any still in flight.
    pub fn cancel(&mut self) {
        let dropped = self.timers.cancel_all();
        if dropped > 0 {
            log::trace!("playback: cancelled {} pending cue(s)", dropped);
        }
        self.epoch += 1;
        self.current = None;
    }

    /// Pop the next due cue that still belongs to the current epoch.
    /// A finish cue ends the reveal.
    pub fn pop(&mut self, now: u64) -> Option<Fired> {
        while let Some((handle, cue)) = self.timers.pop_due(now) {
            if cue.epoch != self.epoch {
                log::trace!("playback: skipping stale cue {:?} (epoch {})", handle, cue.epoch);
                continue;
            }
            let Some(reveal) = &self.current else {
                continue;
            };
            match cue.kind {
                CueKind::Step(i) => {
                    if let Some(step) = reveal.steps.get(i) {
                        return Some(Fired::Step(step.clone()));
                    }
                }
                CueKind::Finish => {
                    let finish = reveal.finish.clone();
                    self.current = None;
                    if let Some(finish) = finish {
                        return Some(Fired::Finish(finish));
                    }
                }
            }
        }
        None
    }

    pub fn next_due(&self) -> Option<u64> {
        self.timers.next_due()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Whether a reveal is current (started and not finished or cancelled).
    pub fn is_playing(&self) -> bool {
        self.current.is_some()
    }

    pub fn pending(&self) -> usize {
        self.timers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::bubble::Bubble;

    fn ids(names: &[&str]) -> Vec<BubbleId> {
        names.iter().map(|n| BubbleId::from(*n)).collect()
    }

    fn store(names: &[&str]) -> BubbleStore {
        let mut store = BubbleStore::new();
        for name in names {
            store.register(Bubble::new(*name));
        }
        store
    }

    fn run_until(playback: &mut Playback, store: &mut BubbleStore, now: u64, out: &mut Outbox) {
        while let Some(fired) = playback.pop(now) {
            fired.apply(store, now, out);
        }
    }

    #[test]
    fn sequence_shows_one_at_a_time() {
        let names = ["a", "b", "c"];
        let mut store = store(&names);
        let mut out = Outbox::new();
        let mut playback = Playback::new();
        playback.start(Reveal::sequence(&ids(&names), 2400), 0);

        run_until(&mut playback, &mut store, 0, &mut out);
        assert_eq!(store.visible(), vec![&BubbleId::from("a")]);

        run_until(&mut playback, &mut store, 2400, &mut out);
        assert_eq!(store.visible(), vec![&BubbleId::from("b")]);

        run_until(&mut playback, &mut store, 4800, &mut out);
        assert_eq!(store.visible(), vec![&BubbleId::from("c")]);

        run_until(&mut playback, &mut store, 7200, &mut out);
        assert!(store.visible().is_empty());
        assert!(!playback.is_playing());
    }

    #[test]
    fn huge_interval_saturates() {
        let names = ["a", "b"];
        let mut store = store(&names);
        let mut out = Outbox::new();
        let mut playback = Playback::new();

        let reveal = Reveal::sequence(&ids(&names), u64::MAX);
        assert_eq!(reveal.steps[1].at_ms, u64::MAX);
        assert_eq!(reveal.duration(), u64::MAX);

        playback.start(reveal, 10);
        run_until(&mut playback, &mut store, 10, &mut out);
        assert_eq!(store.visible(), vec![&BubbleId::from("a")]);
        assert_eq!(playback.next_due(), Some(u64::MAX));
        assert!(playback.is_playing());
    }

    #[test]
    fn stale_cues_are_skipped() {
        let mut store = store(&["a", "b"]);
        let mut out = Outbox::new();
        let mut playback = Playback::new();

        let first = playback.start(Reveal::new().line(1000, "a", "old", Linger::Indefinite), 0);
        let second = playback.start(Reveal::new().line(2000, "b", "new", Linger::Indefinite), 0);
        assert!(second > first);

        run_until(&mut playback, &mut store, 5000, &mut out);
        assert!(!store.is_visible(&"a".into()));
        assert!(store.is_visible(&"b".into()));
    }

    #[test]
    fn cancel_invalidates_everything() {
        let mut store = store(&["a"]);
        let mut out = Outbox::new();
        let mut playback = Playback::new();
        playback.start(Reveal::group(&ids(&["a"]), Some(1200)), 0);
        assert_eq!(playback.pending(), 2);

        playback.cancel();
        assert_eq!(playback.pending(), 0);
        run_until(&mut playback, &mut store, 10_000, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn group_hides_after_delay() {
        let names = ["x", "y"];
        let mut store = store(&names);
        let mut out = Outbox::new();
        let mut playback = Playback::new();
        playback.start(Reveal::group(&ids(&names), Some(1200)), 0);

        run_until(&mut playback, &mut store, 0, &mut out);
        assert_eq!(store.visible().len(), 2);
        run_until(&mut playback, &mut store, 1199, &mut out);
        assert_eq!(store.visible().len(), 2);
        run_until(&mut playback, &mut store, 1200, &mut out);
        assert!(store.visible().is_empty());
    }

    #[test]
    fn duration_and_bubbles() {
        let reveal = Reveal::new()
            .line(0, "a", "hi", Linger::default())
            .line(3000, "b", "yo", Linger::default())
            .finish(3100, Scope::Only(ids(&["c"])));
        assert_eq!(reveal.duration(), 3100);
        let mentioned: Vec<_> = reveal.bubbles().map(BubbleId::as_str).collect();
        assert_eq!(mentioned, vec!["a", "b", "c"]);
    }

    #[test]
    fn reveal_parses_from_json() {
        let json = r#"{
            "steps": [
                { "atMs": 0, "bubble": "a", "text": "hi", "linger": { "after": 1000 } },
                { "atMs": 500, "bubble": "b", "linger": "indefinite", "solo": "all" }
            ],
            "finish": { "atMs": 900, "hide": { "only": ["a"] } }
        }"#;
        let reveal: Reveal = serde_json::from_str(json).unwrap();
        assert_eq!(reveal.steps[0].linger, Linger::After(1000));
        assert_eq!(reveal.steps[1].solo, Some(Scope::All));
        assert_eq!(reveal.finish.unwrap().hide, Scope::Only(ids(&["a"])));
    }
}
