//! Dialogue sequencer: exclusive playback of named scripts.
//!
//! At most one script is current. Starting a script cancels all pending steps
//! and hides every bubble first. The ejection script (`bramble`) is the only
//! one allowed to pre-empt another; while it plays nothing else may start.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::api::types::ScriptName;
use crate::bridge::surface::Outbox;
use crate::core::bubbles::BubbleStore;
use crate::systems::reveal::{Fired, Playback, Reveal};

/// A named, timed script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueScript {
    pub name: ScriptName,
    #[serde(flatten)]
    pub reveal: Reveal,
}

impl DialogueScript {
    pub fn new(name: ScriptName, reveal: Reveal) -> Self {
        Self { name, reveal }
    }
}

/// Scripts by name.
#[derive(Debug, Clone, Default)]
pub struct ScriptBook {
    scripts: HashMap<ScriptName, DialogueScript>,
}

impl ScriptBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a script, replacing any previous one with the same name.
    pub fn insert(&mut self, script: DialogueScript) {
        self.scripts.insert(script.name, script);
    }

    pub fn get(&self, name: ScriptName) -> Option<&DialogueScript> {
        self.scripts.get(&name)
    }

    pub fn contains(&self, name: ScriptName) -> bool {
        self.scripts.contains_key(&name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DialogueScript> {
        self.scripts.values()
    }

    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }
}

impl FromIterator<DialogueScript> for ScriptBook {
    fn from_iter<I: IntoIterator<Item = DialogueScript>>(iter: I) -> Self {
        let mut book = ScriptBook::new();
        for script in iter {
            book.insert(script);
        }
        book
    }
}

/// Sequencer state. The current script name is the mutual-exclusion token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DialogueState {
    #[default]
    Idle,
    Running(ScriptName),
    Ejected,
}

/// Result of asking the sequencer to start a script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    /// The same script is already current; duplicate hover-enter.
    AlreadyRunning,
    /// Another script is current.
    Busy(ScriptName),
    /// The ejection script is current.
    Muted,
    /// No script with that name is loaded.
    Missing,
}

impl StartOutcome {
    pub fn started(self) -> bool {
        self == StartOutcome::Started
    }
}

#[derive(Debug, Default)]
pub struct DialogueSequencer {
    state: DialogueState,
    playback: Playback,
    scripts: ScriptBook,
}

impl DialogueSequencer {
    pub fn new(scripts: ScriptBook) -> Self {
        Self {
            state: DialogueState::Idle,
            playback: Playback::new(),
            scripts,
        }
    }

    pub fn state(&self) -> DialogueState {
        self.state
    }

    /// Name of the current script, including the ejection script.
    pub fn current(&self) -> Option<ScriptName> {
        match self.state {
            DialogueState::Idle => None,
            DialogueState::Running(name) => Some(name),
            DialogueState::Ejected => Some(ScriptName::Bramble),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.state == DialogueState::Idle
    }

    pub fn epoch(&self) -> u64 {
        self.playback.epoch()
    }

    pub fn scripts(&self) -> &ScriptBook {
        &self.scripts
    }

    /// Start a named script. Only valid from `Idle`; starting `bramble`
    /// routes to `eject`.
    pub fn start(
        &mut self,
        name: ScriptName,
        now: u64,
        store: &mut BubbleStore,
        out: &mut Outbox,
    ) -> StartOutcome {
        if name.is_ejection() {
            self.eject(now, store, out);
            return StartOutcome::Started;
        }
        match self.state {
            DialogueState::Ejected => return StartOutcome::Muted,
            DialogueState::Running(current) if current == name => {
                return StartOutcome::AlreadyRunning
            }
            DialogueState::Running(current) => return StartOutcome::Busy(current),
            DialogueState::Idle => {}
        }
        let Some(script) = self.scripts.get(name) else {
            log::warn!("dialogue: no script named `{}`", name);
            return StartOutcome::Missing;
        };

        let reveal = script.reveal.clone();
        store.hide_all(out);
        self.playback.start(reveal, now);
        self.state = DialogueState::Running(name);
        log::debug!("dialogue: start `{}` at {}ms (epoch {})", name, now, self.epoch());
        StartOutcome::Started
    }

    /// Privileged override: from any state, mute every other script, hide
    /// all bubbles and play the ejection script.
    pub fn eject(&mut self, now: u64, store: &mut BubbleStore, out: &mut Outbox) {
        if let DialogueState::Running(previous) = self.state {
            log::debug!("dialogue: ejection pre-empts `{}`", previous);
        }
        self.playback.cancel();
        store.hide_all(out);

        match self.scripts.get(ScriptName::Bramble) {
            Some(script) => {
                let reveal = script.reveal.clone();
                self.playback.start(reveal, now);
                self.state = DialogueState::Ejected;
            }
            None => {
                log::warn!("dialogue: no ejection script loaded; stopping instead");
                self.state = DialogueState::Idle;
            }
        }
    }

    /// External "stop all": cancel the running script and hide every bubble.
    /// The ejection script runs to completion and is not interrupted.
    /// Returns true if a script was cancelled.
    pub fn stop_all(&mut self, store: &mut BubbleStore, out: &mut Outbox) -> bool {
        match self.state {
            DialogueState::Ejected => {
                log::debug!("dialogue: stop ignored while ejection plays");
                false
            }
            DialogueState::Running(name) => {
                self.playback.cancel();
                store.hide_all(out);
                self.state = DialogueState::Idle;
                log::debug!("dialogue: stopped `{}`", name);
                true
            }
            DialogueState::Idle => {
                self.playback.cancel();
                store.hide_all(out);
                false
            }
        }
    }

    /// A single-bubble hotspot takes the stage.
    pub fn interrupt_for_single(&mut self, store: &mut BubbleStore, out: &mut Outbox) -> bool {
        self.stop_all(store, out)
    }

    pub fn next_due(&self) -> Option<u64> {
        self.playback.next_due()
    }

    /// Fire every due step of the current script. The finish step returns
    /// the sequencer to `Idle`.
    pub fn tick(&mut self, now: u64, store: &mut BubbleStore, out: &mut Outbox) {
        while let Some(fired) = self.playback.pop(now) {
            fired.apply(store, now, out);
            if let Fired::Finish(_) = fired {
                if let Some(name) = self.current() {
                    log::debug!("dialogue: `{}` finished at {}ms", name, now);
                }
                self.state = DialogueState::Idle;
            }
        }
    }
}
