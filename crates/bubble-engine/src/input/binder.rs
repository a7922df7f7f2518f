//! Hotspot binder — turns hotspot gestures into component commands.
//!
//! Routing is pure: `route` returns the commands and the stage executes them,
//! so the mapping can be tested without any timers or bubbles.

use serde::{Deserialize, Serialize};

use crate::api::types::{BubbleId, HotspotId, ScriptName};
use crate::components::bubble::Linger;
use crate::config::manifest::Timings;
use crate::input::queue::Gesture;

/// What a hotspot does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Binding {
    /// One bubble.
    #[serde(rename_all = "camelCase")]
    Bubble {
        bubble: BubbleId,
        /// `None` uses the stage's default linger.
        #[serde(default)]
        linger: Option<Linger>,
        #[serde(default)]
        hide_on_leave: bool,
    },
    /// An ordered list shown one at a time.
    #[serde(rename_all = "camelCase")]
    Sequence {
        bubbles: Vec<BubbleId>,
        #[serde(default)]
        interval_ms: Option<u64>,
    },
    /// Every bubble of a group, exclusively.
    Group { group: String },
    /// A named dialogue script.
    Script { script: ScriptName },
    /// The waterfall reveal control.
    Waterfall,
}

impl Binding {
    /// Build a binding from hotspot data attributes: `data-group` wins over
    /// `data-balloon`; a comma in `data-balloon` means sequence mode.
    pub fn from_data_attributes(balloon: Option<&str>, group: Option<&str>) -> Option<Binding> {
        if let Some(group) = group.map(str::trim).filter(|g| !g.is_empty()) {
            return Some(Binding::Group {
                group: group.to_owned(),
            });
        }
        let spec = balloon.map(str::trim).filter(|s| !s.is_empty())?;
        if spec.contains(',') {
            let bubbles: Vec<BubbleId> = spec
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(BubbleId::from)
                .collect();
            if bubbles.is_empty() {
                return None;
            }
            return Some(Binding::Sequence {
                bubbles,
                interval_ms: None,
            });
        }
        Some(Binding::Bubble {
            bubble: BubbleId::from(spec),
            linger: Some(Linger::Indefinite),
            hide_on_leave: true,
        })
    }

    /// Whether a touch on this hotspot is handled here rather than left to
    /// the browser's synthesized mouse events.
    pub fn takes_touch(&self) -> bool {
        matches!(self, Binding::Group { .. })
    }

    /// Bubbles this binding refers to directly.
    pub fn bubbles(&self) -> &[BubbleId] {
        match self {
            Binding::Bubble { bubble, .. } => std::slice::from_ref(bubble),
            Binding::Sequence { bubbles, .. } => bubbles,
            _ => &[],
        }
    }
}

/// A hotspot and what it is wired to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotspotBinding {
    pub id: HotspotId,
    pub binding: Binding,
    /// Enter/focus starts the ambient effect, leave/blur stops it.
    #[serde(default)]
    pub ambient: bool,
}

impl HotspotBinding {
    pub fn new(id: impl Into<HotspotId>, binding: Binding) -> Self {
        Self {
            id: id.into(),
            binding,
            ambient: false,
        }
    }

    pub fn with_ambient(mut self) -> Self {
        self.ambient = true;
        self
    }
}

/// One call into a stage component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    AmbientStart,
    AmbientStop,
    StartScript(ScriptName),
    /// Stop dialogue and balloons, hide everything, show one bubble.
    ShowSingle { bubble: BubbleId, linger: Linger },
    /// Stop the balloon player and hide every bubble.
    ClearBalloons,
    PlaySequence { bubbles: Vec<BubbleId>, interval_ms: u64 },
    ShowGroup { group: String, hide_after_ms: Option<u64> },
    WaterfallHint(bool),
    WaterfallTrigger,
}

#[derive(Debug, Default)]
pub struct HotspotBinder {
    bindings: Vec<HotspotBinding>,
    timings: Timings,
}

impl HotspotBinder {
    pub fn new(timings: Timings) -> Self {
        Self {
            bindings: Vec::new(),
            timings,
        }
    }

    /// Add a binding. Returns false if the hotspot is already bound.
    pub fn bind(&mut self, binding: HotspotBinding) -> bool {
        if self.get(&binding.id).is_some() {
            return false;
        }
        self.bindings.push(binding);
        true
    }

    pub fn get(&self, id: &HotspotId) -> Option<&HotspotBinding> {
        self.bindings.iter().find(|b| &b.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &HotspotBinding> {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Commands for a gesture on a hotspot, in execution order.
    pub fn route(&self, id: &HotspotId, gesture: Gesture) -> Vec<Command> {
        let Some(hotspot) = self.get(id) else {
            log::warn!("binder: gesture {:?} on unbound hotspot `{}`", gesture, id);
            return Vec::new();
        };

        let mut commands = Vec::with_capacity(2);
        if hotspot.ambient {
            match gesture {
                Gesture::Enter | Gesture::Focus => commands.push(Command::AmbientStart),
                Gesture::Leave | Gesture::Blur => commands.push(Command::AmbientStop),
                _ => {}
            }
        }

        use Gesture::*;
        match (&hotspot.binding, gesture) {
            (Binding::Bubble { bubble, linger, .. }, Enter | Focus | Click) => {
                commands.push(Command::ShowSingle {
                    bubble: bubble.clone(),
                    linger: linger.unwrap_or(Linger::After(self.timings.default_linger_ms)),
                });
            }
            (Binding::Bubble { hide_on_leave: true, .. }, Leave | Blur) => {
                commands.push(Command::ClearBalloons);
            }
            (Binding::Sequence { bubbles, interval_ms }, Enter | Focus) => {
                commands.push(Command::PlaySequence {
                    bubbles: bubbles.clone(),
                    interval_ms: interval_ms.unwrap_or(self.timings.sequence_interval_ms),
                });
            }
            (Binding::Sequence { bubbles, .. }, Click) => {
                if let Some(last) = bubbles.last() {
                    commands.push(Command::ShowSingle {
                        bubble: last.clone(),
                        linger: Linger::Indefinite,
                    });
                }
            }
            (Binding::Sequence { .. } | Binding::Group { .. }, Leave | Blur) => {
                commands.push(Command::ClearBalloons);
            }
            (Binding::Group { group }, Enter | Focus) => {
                commands.push(Command::ShowGroup {
                    group: group.clone(),
                    hide_after_ms: None,
                });
            }
            (Binding::Group { group }, TouchStart) => {
                commands.push(Command::ShowGroup {
                    group: group.clone(),
                    hide_after_ms: Some(self.timings.touch_hide_ms),
                });
            }
            (Binding::Script { script }, Enter | Focus) => {
                commands.push(Command::StartScript(*script));
            }
            (Binding::Waterfall, Enter) => commands.push(Command::WaterfallHint(true)),
            (Binding::Waterfall, Leave) => commands.push(Command::WaterfallHint(false)),
            (Binding::Waterfall, Click | Activate) => commands.push(Command::WaterfallTrigger),
            _ => {}
        }
        commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binder() -> HotspotBinder {
        let mut binder = HotspotBinder::new(Timings::default());
        binder.bind(
            HotspotBinding::new("armor-hotspot", Binding::Script { script: ScriptName::Armor })
                .with_ambient(),
        );
        binder.bind(HotspotBinding::new(
            "trio",
            Binding::from_data_attributes(Some("wolf, sheep ,donkey"), None).unwrap(),
        ));
        binder.bind(HotspotBinding::new(
            "owl",
            Binding::from_data_attributes(Some("owl"), None).unwrap(),
        ));
        binder.bind(HotspotBinding::new(
            "pets",
            Binding::from_data_attributes(Some("ignored"), Some("pets")).unwrap(),
        ));
        binder.bind(HotspotBinding::new("stag-hotspot", Binding::Waterfall));
        binder
    }

    #[test]
    fn data_attributes_pick_the_mode() {
        assert_eq!(
            Binding::from_data_attributes(Some(" a, b,, c "), None),
            Some(Binding::Sequence {
                bubbles: vec!["a".into(), "b".into(), "c".into()],
                interval_ms: None,
            })
        );
        assert!(matches!(
            Binding::from_data_attributes(Some("solo"), None),
            Some(Binding::Bubble { hide_on_leave: true, linger: Some(Linger::Indefinite), .. })
        ));
        assert!(matches!(
            Binding::from_data_attributes(None, Some("trio")),
            Some(Binding::Group { .. })
        ));
        assert_eq!(Binding::from_data_attributes(Some("  "), Some("")), None);
        assert_eq!(Binding::from_data_attributes(Some(",,"), None), None);
    }

    #[test]
    fn script_hotspot_drives_ambient_and_dialogue() {
        let binder = binder();
        let id = HotspotId::from("armor-hotspot");
        assert_eq!(
            binder.route(&id, Gesture::Enter),
            vec![Command::AmbientStart, Command::StartScript(ScriptName::Armor)]
        );
        assert_eq!(binder.route(&id, Gesture::Leave), vec![Command::AmbientStop]);
        assert!(binder.route(&id, Gesture::Click).is_empty());
    }

    #[test]
    fn sequence_hotspot_plays_clears_and_locks() {
        let binder = binder();
        let id = HotspotId::from("trio");
        match &binder.route(&id, Gesture::Enter)[..] {
            [Command::PlaySequence { bubbles, interval_ms }] => {
                assert_eq!(bubbles.len(), 3);
                assert_eq!(*interval_ms, 2400);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(binder.route(&id, Gesture::Leave), vec![Command::ClearBalloons]);
        assert_eq!(
            binder.route(&id, Gesture::Click),
            vec![Command::ShowSingle {
                bubble: "donkey".into(),
                linger: Linger::Indefinite
            }]
        );
    }

    #[test]
    fn group_touch_uses_short_hide() {
        let binder = binder();
        assert_eq!(
            binder.route(&"pets".into(), Gesture::TouchStart),
            vec![Command::ShowGroup {
                group: "pets".into(),
                hide_after_ms: Some(1200)
            }]
        );
    }

    #[test]
    fn only_groups_take_touch() {
        let binder = binder();
        let takes = |id: &str| binder.get(&id.into()).map(|h| h.binding.takes_touch());
        assert_eq!(takes("pets"), Some(true));
        assert_eq!(takes("armor-hotspot"), Some(false));
        assert_eq!(takes("stag-hotspot"), Some(false));
        assert_eq!(takes("trio"), Some(false));
        assert_eq!(takes("owl"), Some(false));
        for id in ["armor-hotspot", "stag-hotspot", "trio", "owl"] {
            let commands = binder.route(&id.into(), Gesture::TouchStart);
            assert!(commands.is_empty(), "{} routed {:?}", id, commands);
        }
    }

    #[test]
    fn waterfall_gestures() {
        let binder = binder();
        let id = HotspotId::from("stag-hotspot");
        assert_eq!(binder.route(&id, Gesture::Enter), vec![Command::WaterfallHint(true)]);
        assert_eq!(binder.route(&id, Gesture::Activate), vec![Command::WaterfallTrigger]);
        assert!(binder.route(&id, Gesture::Focus).is_empty());
    }

    #[test]
    fn duplicate_and_unknown_hotspots() {
        let mut binder = binder();
        assert!(!binder.bind(HotspotBinding::new("owl", Binding::Waterfall)));
        assert!(binder.route(&"nowhere".into(), Gesture::Enter).is_empty());
        assert_eq!(binder.len(), 5);
    }

    #[test]
    fn bubble_without_linger_uses_manifest_default() {
        let timings = Timings {
            default_linger_ms: 1000,
            ..Timings::default()
        };
        let mut binder = HotspotBinder::new(timings);
        binder.bind(HotspotBinding::new(
            "plain",
            Binding::Bubble {
                bubble: "a".into(),
                linger: None,
                hide_on_leave: false,
            },
        ));
        binder.bind(HotspotBinding::new(
            "pinned",
            Binding::Bubble {
                bubble: "b".into(),
                linger: Some(Linger::After(8000)),
                hide_on_leave: false,
            },
        ));
        assert_eq!(
            binder.route(&"plain".into(), Gesture::Enter),
            vec![Command::ShowSingle {
                bubble: "a".into(),
                linger: Linger::After(1000)
            }]
        );
        assert_eq!(
            binder.route(&"pinned".into(), Gesture::Enter),
            vec![Command::ShowSingle {
                bubble: "b".into(),
                linger: Linger::After(8000)
            }]
        );
    }

    #[test]
    fn binding_json_shape() {
        let json = r#"{ "id": "catback-hotspot", "ambient": true,
            "binding": { "kind": "bubble", "bubble": "consent-bubble",
                         "linger": { "after": 8000 }, "hideOnLeave": false } }"#;
        let hotspot: HotspotBinding = serde_json::from_str(json).unwrap();
        assert!(hotspot.ambient);
        assert_eq!(hotspot.binding.bubbles(), &[BubbleId::from("consent-bubble")]);
    }
}
