use crate::api::types::{BubbleId, HotspotId, ScriptName};
use crate::bridge::surface::{classes, Outbox, SurfaceOp};
use crate::components::bubble::{Bubble, Linger};
use crate::config::manifest::{StageConfig, Timings};
use crate::core::bubbles::BubbleStore;
use crate::core::time::Clock;
use crate::error::ConfigError;
use crate::input::binder::{Command, HotspotBinder, HotspotBinding};
use crate::input::queue::{InputQueue, StageInput};
use crate::session::{SessionFlags, SessionStore};
use crate::systems::ambient::AmbientToggle;
use crate::systems::dialogue::{DialogueSequencer, DialogueState, StartOutcome};
use crate::systems::sequence::SequencePlayer;
use crate::systems::waterfall::WaterfallReveal;

/// Where `enter_restricted` sends the visitor.
pub const RESTRICTED_PATH: &str = "restricted/dark-arts.html";

/// The stage context. Owns every component and exposes only transition
/// operations; the host feeds it inputs and time and applies the surface ops
/// it emits.
pub struct Stage {
    clock: Clock,
    bubbles: BubbleStore,
    dialogue: DialogueSequencer,
    player: SequencePlayer,
    ambient: AmbientToggle,
    waterfall: Option<WaterfallReveal>,
    binder: HotspotBinder,
    session: SessionFlags,
    input: InputQueue,
    outbox: Outbox,
    timings: Timings,
}

impl Stage {
    pub fn new(config: &StageConfig, store: Box<dyn SessionStore>) -> Result<Self, ConfigError> {
        config.validate()?;
        let timings = config.timings;

        let mut bubbles = BubbleStore::new();
        for descriptor in &config.bubbles {
            bubbles.register(descriptor.to_bubble());
        }
        let mut binder = HotspotBinder::new(timings);
        for hotspot in &config.hotspots {
            binder.bind(hotspot.clone());
        }

        let mut outbox = Outbox::new();
        if config.debug {
            if let Some(stage) = &config.stage {
                outbox.push(SurfaceOp::AddClass {
                    target: stage.clone(),
                    class: classes::DEBUG_HOTSPOTS,
                });
            }
        }

        let stage = Self {
            clock: Clock::new(),
            bubbles,
            dialogue: DialogueSequencer::new(config.script_book()),
            player: SequencePlayer::new(),
            ambient: AmbientToggle::new(config.ambient_zone.clone()),
            waterfall: config
                .waterfall
                .clone()
                .map(|elements| WaterfallReveal::new(elements, timings.waterfall_grace_ms)),
            binder,
            session: SessionFlags::new(store),
            input: InputQueue::new(),
            outbox,
            timings,
        };
        log::info!(
            "stage: {} bubbles, {} hotspots, {} scripts",
            stage.bubbles.len(),
            stage.binder.len(),
            stage.dialogue.scripts().len()
        );
        Ok(stage)
    }

    // -- Setup --

    /// Register a bubble discovered by the host. Returns false on duplicates.
    pub fn register_bubble(&mut self, bubble: Bubble) -> bool {
        self.bubbles.register(bubble)
    }

    /// Bind a hotspot discovered by the host. Returns false on duplicates.
    pub fn bind_hotspot(&mut self, binding: HotspotBinding) -> bool {
        self.binder.bind(binding)
    }

    // -- Input --

    /// Queue an input for the next `pump`.
    pub fn push_input(&mut self, input: StageInput) {
        self.input.push(input);
    }

    /// Handle every queued input at the current time.
    pub fn pump(&mut self) {
        for input in self.input.drain() {
            self.handle(input);
        }
    }

    /// Handle one input now, then fire anything it made due.
    pub fn handle(&mut self, input: StageInput) {
        let now = self.clock.now();
        match input {
            StageInput::Hotspot { hotspot, gesture } => {
                for command in self.binder.route(&hotspot, gesture) {
                    self.run(command, now);
                }
            }
            StageInput::ClickOutside | StageInput::StopAll => self.stop_all_runs(),
            StageInput::ClickAwayFromWaterfall => {
                if let Some(waterfall) = &mut self.waterfall {
                    waterfall.collapse(&mut self.outbox);
                }
            }
            StageInput::Eject { reason, epoch_ms } => self.eject(&reason, epoch_ms),
        }
        self.fire_due(now);
    }

    fn run(&mut self, command: Command, now: u64) {
        match command {
            Command::AmbientStart => {
                self.ambient.start(&mut self.outbox);
            }
            Command::AmbientStop => {
                self.ambient.stop(&mut self.outbox);
            }
            Command::StartScript(name) => {
                self.start_script(name);
            }
            Command::ShowSingle { bubble, linger } => {
                if self.claim_for_balloons() {
                    self.bubbles.show_for(&bubble, None, linger, now, &mut self.outbox);
                }
            }
            Command::ClearBalloons => {
                if self.dialogue.state() != DialogueState::Ejected {
                    self.player.stop();
                    self.bubbles.hide_all(&mut self.outbox);
                }
            }
            Command::PlaySequence { bubbles, interval_ms } => {
                if self.claim_for_balloons() {
                    self.player.play(&bubbles, interval_ms, now);
                }
            }
            Command::ShowGroup { group, hide_after_ms } => {
                if self.claim_for_balloons() {
                    self.player.show_group(
                        &group,
                        hide_after_ms,
                        now,
                        &mut self.bubbles,
                        &mut self.outbox,
                    );
                }
            }
            Command::WaterfallHint(show) => {
                if let Some(waterfall) = &mut self.waterfall {
                    if show {
                        waterfall.hover_hint_show(&mut self.outbox);
                    } else {
                        waterfall.hover_hint_hide(&mut self.outbox);
                    }
                }
            }
            Command::WaterfallTrigger => {
                if let Some(waterfall) = &mut self.waterfall {
                    waterfall.trigger(now, &mut self.outbox);
                }
            }
        }
    }

    /// Hotspot balloons take the stage from any dialogue. Muted while the
    /// ejection plays.
    fn claim_for_balloons(&mut self) -> bool {
        if self.dialogue.state() == DialogueState::Ejected {
            log::debug!("stage: balloon ignored while ejection plays");
            return false;
        }
        self.dialogue.interrupt_for_single(&mut self.bubbles, &mut self.outbox);
        self.player.stop();
        true
    }

    // -- Operations --

    /// Start a named dialogue script now.
    pub fn start_script(&mut self, name: ScriptName) -> StartOutcome {
        let now = self.clock.now();
        let outcome = self.dialogue.start(name, now, &mut self.bubbles, &mut self.outbox);
        if outcome.started() {
            self.player.stop();
        } else {
            log::debug!("stage: `{}` not started: {:?}", name, outcome);
        }
        self.fire_due(now);
        outcome
    }

    /// Show one bubble with the stage's default linger.
    pub fn show_bubble(&mut self, bubble: &BubbleId, text: Option<&str>) -> bool {
        let linger = Linger::After(self.timings.default_linger_ms);
        let now = self.clock.now();
        self.bubbles.show_for(bubble, text, linger, now, &mut self.outbox)
    }

    /// Eject the visitor. Recording the reason is best-effort; the ejection
    /// script plays regardless.
    pub fn eject(&mut self, reason: &str, epoch_ms: u64) {
        log::info!("stage: ejecting ({})", reason);
        self.session.record_ejection(reason, epoch_ms);
        let now = self.clock.now();
        self.player.stop();
        self.dialogue.eject(now, &mut self.bubbles, &mut self.outbox);
        self.fire_due(now);
    }

    /// Stop every dialogue run, the balloon player and the ambient effect.
    /// The waterfall is left alone.
    pub fn stop_all_runs(&mut self) {
        log::debug!("stage: stop all runs at {}ms", self.clock.now());
        self.dialogue.stop_all(&mut self.bubbles, &mut self.outbox);
        if self.dialogue.state() != DialogueState::Ejected {
            self.player.stop();
        }
        self.ambient.stop(&mut self.outbox);
    }

    /// Record the oath and return where to navigate.
    pub fn enter_restricted(&mut self) -> &'static str {
        self.session.accept_oath();
        RESTRICTED_PATH
    }

    // -- Time --

    /// Advance by one frame delta in (possibly fractional) milliseconds.
    pub fn advance(&mut self, dt_ms: f64) {
        let target = self.clock.accumulate(dt_ms);
        self.advance_to(target);
    }

    /// Advance to virtual time `t`, firing every timer of every scope in
    /// due order. Timers scheduled while firing are honoured if due by `t`.
    pub fn advance_to(&mut self, t: u64) {
        while let Some(due) = self.next_due().filter(|&due| due <= t) {
            self.clock.set(due);
            self.fire_due(due);
        }
        self.clock.set(t);
    }

    /// Earliest pending deadline across all scopes.
    pub fn next_due(&self) -> Option<u64> {
        [
            self.dialogue.next_due(),
            self.player.next_due(),
            self.waterfall.as_ref().and_then(WaterfallReveal::next_due),
            self.bubbles.next_due(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    fn fire_due(&mut self, now: u64) {
        self.dialogue.tick(now, &mut self.bubbles, &mut self.outbox);
        self.player.tick(now, &mut self.bubbles, &mut self.outbox);
        if let Some(waterfall) = &mut self.waterfall {
            waterfall.tick(now, &mut self.outbox);
        }
        self.bubbles.tick(now, &mut self.outbox);
    }

    // -- Output --

    /// Take every surface op emitted since the last drain.
    pub fn drain_ops(&mut self) -> Vec<SurfaceOp> {
        self.outbox.drain()
    }

    // -- Queries --

    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    pub fn bubbles(&self) -> &BubbleStore {
        &self.bubbles
    }

    pub fn is_visible(&self, bubble: &str) -> bool {
        self.bubbles.is_visible(&BubbleId::from(bubble))
    }

    pub fn visible_bubbles(&self) -> Vec<&BubbleId> {
        self.bubbles.visible()
    }

    pub fn bubble_text(&self, bubble: &str) -> Option<&str> {
        self.bubbles.text(&BubbleId::from(bubble))
    }

    pub fn dialogue_state(&self) -> DialogueState {
        self.dialogue.state()
    }

    pub fn current_script(&self) -> Option<ScriptName> {
        self.dialogue.current()
    }

    pub fn ambient_active(&self) -> bool {
        self.ambient.is_active()
    }

    pub fn waterfall(&self) -> Option<&WaterfallReveal> {
        self.waterfall.as_ref()
    }

    pub fn player(&self) -> &SequencePlayer {
        &self.player
    }

    pub fn hotspot(&self, id: &HotspotId) -> Option<&HotspotBinding> {
        self.binder.get(id)
    }

    pub fn session(&self) -> &SessionFlags {
        &self.session
    }

    pub fn timings(&self) -> &Timings {
        &self.timings
    }
}
