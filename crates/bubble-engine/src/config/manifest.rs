use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::api::types::{BubbleId, ElementKey, HotspotId, ScriptName};
use crate::bridge::surface::classes;
use crate::components::bubble::{Bubble, Linger, DEFAULT_LINGER_MS};
use crate::content;
use crate::error::ConfigError;
use crate::input::binder::{Binding, HotspotBinding};
use crate::systems::dialogue::{DialogueScript, ScriptBook};
use crate::systems::waterfall::{WaterfallElements, DEFAULT_GRACE_MS};

/// Timing knobs, all in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Timings {
    pub default_linger_ms: u64,
    pub waterfall_grace_ms: u64,
    pub sequence_interval_ms: u64,
    /// Group balloons shown by touch hide again after this long.
    pub touch_hide_ms: u64,
    pub consent_linger_ms: u64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            default_linger_ms: DEFAULT_LINGER_MS,
            waterfall_grace_ms: DEFAULT_GRACE_MS,
            sequence_interval_ms: 2400,
            touch_hide_ms: 1200,
            consent_linger_ms: 8000,
        }
    }
}

/// One bubble declared in a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BubbleDescriptor {
    pub id: BubbleId,
    /// DOM element id (defaults to `id`).
    #[serde(default)]
    pub element: Option<ElementKey>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub group: Option<String>,
    /// Class toggled to show this bubble (defaults to the stage's).
    #[serde(default)]
    pub show_class: Option<String>,
}

impl BubbleDescriptor {
    pub fn new(id: impl Into<BubbleId>) -> Self {
        Self {
            id: id.into(),
            element: None,
            text: String::new(),
            group: None,
            show_class: None,
        }
    }

    pub fn to_bubble(&self) -> Bubble {
        let mut bubble = Bubble::new(self.id.clone()).with_text(self.text.clone());
        if let Some(element) = &self.element {
            bubble = bubble.with_element(element.clone());
        }
        if let Some(group) = &self.group {
            bubble = bubble.with_group(group.clone());
        }
        bubble
    }
}

/// Stage manifest describing every bubble, hotspot and effect on a page.
/// Loaded from JSON at startup, or built in code for the known pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageConfig {
    /// Stage container; receives `debug-hotspots` in debug mode.
    #[serde(default)]
    pub stage: Option<ElementKey>,
    /// Class that marks a visible bubble.
    #[serde(default = "default_bubble_class")]
    pub bubble_class: String,
    /// Also toggle the `hidden` attribute on bubbles.
    #[serde(default = "default_toggle_hidden")]
    pub toggle_hidden: bool,
    #[serde(default)]
    pub bubbles: Vec<BubbleDescriptor>,
    #[serde(default)]
    pub hotspots: Vec<HotspotBinding>,
    /// Container toggled by the ambient effect.
    #[serde(default)]
    pub ambient_zone: Option<ElementKey>,
    #[serde(default)]
    pub waterfall: Option<WaterfallElements>,
    #[serde(default)]
    pub scripts: Vec<DialogueScript>,
    /// Include the built-in library scripts.
    #[serde(default)]
    pub builtin_scripts: bool,
    #[serde(default)]
    pub timings: Timings,
    /// Let the host discover `.hotspot` / `.balloon` elements in the stage.
    #[serde(default)]
    pub scan_hotspots: bool,
    /// Id prefix stripped from scanned balloon elements to get bubble ids.
    #[serde(default = "default_balloon_prefix")]
    pub balloon_prefix: String,
    /// Clicks inside these never count as "outside".
    #[serde(default = "default_interactive_selectors")]
    pub interactive_selectors: Vec<String>,
    #[serde(default)]
    pub debug: bool,
}

fn default_bubble_class() -> String {
    classes::SHOW_BUBBLE.to_owned()
}

fn default_toggle_hidden() -> bool {
    true
}

fn default_balloon_prefix() -> String {
    "balloon-".to_owned()
}

fn default_interactive_selectors() -> Vec<String> {
    vec![
        ".hotspot".to_owned(),
        ".speech-bubble".to_owned(),
        "#library-card".to_owned(),
    ]
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            stage: None,
            bubble_class: default_bubble_class(),
            toggle_hidden: default_toggle_hidden(),
            bubbles: Vec::new(),
            hotspots: Vec::new(),
            ambient_zone: None,
            waterfall: None,
            scripts: Vec::new(),
            builtin_scripts: false,
            timings: Timings::default(),
            scan_hotspots: false,
            balloon_prefix: default_balloon_prefix(),
            interactive_selectors: default_interactive_selectors(),
            debug: false,
        }
    }
}

impl StageConfig {
    /// Parse and validate a manifest.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: StageConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// The library page: four scripted hotspots, the consent bubble, the
    /// ambient zone and the waterfall.
    pub fn library() -> Self {
        let bubbles = content::LIBRARY_BUBBLES
            .iter()
            .map(|id| BubbleDescriptor::new(*id))
            .collect();
        let timings = Timings::default();
        let script = |id: &str, script: ScriptName| {
            HotspotBinding::new(HotspotId::from(id), Binding::Script { script }).with_ambient()
        };
        let hotspots = vec![
            script("crest-hotspot", ScriptName::Crest),
            script("armor-hotspot", ScriptName::Armor),
            script("cat-hotspot", ScriptName::CatHead),
            HotspotBinding::new(
                HotspotId::from("catback-hotspot"),
                Binding::Bubble {
                    bubble: content::CONSENT_BUBBLE.into(),
                    linger: Some(Linger::After(timings.consent_linger_ms)),
                    hide_on_leave: false,
                },
            )
            .with_ambient(),
            HotspotBinding::new(HotspotId::from("stag-hotspot"), Binding::Waterfall),
        ];
        Self {
            bubbles,
            hotspots,
            ambient_zone: Some("balloon-zone".into()),
            waterfall: Some(WaterfallElements {
                hotspot: "stag-hotspot".into(),
                entrance: "library-entrance".into(),
                bubble: Some("stag-bubble".into()),
                cover: Some("waterfall-cover".into()),
                scene: Some("waterfall-scene".into()),
            }),
            builtin_scripts: true,
            timings,
            scan_hotspots: true,
            ..Self::default()
        }
    }

    /// A page of `.balloon` elements driven by `data-balloon` / `data-group`
    /// hotspots discovered inside `#stage`.
    pub fn balloon_stage() -> Self {
        Self {
            stage: Some("stage".into()),
            bubble_class: "show".to_owned(),
            toggle_hidden: false,
            scan_hotspots: true,
            ..Self::default()
        }
    }

    /// Every script this stage can play.
    pub fn script_book(&self) -> ScriptBook {
        let mut book = if self.builtin_scripts {
            content::library_scripts(self.timings.default_linger_ms)
        } else {
            ScriptBook::new()
        };
        for script in &self.scripts {
            book.insert(script.clone());
        }
        book
    }

    /// Disable components whose elements `exists` cannot find: the stage
    /// container (and with it the hotspot scan), the ambient zone, and the
    /// waterfall along with its hotspots.
    pub fn prune_missing(&mut self, exists: impl Fn(&ElementKey) -> bool) {
        if let Some(stage) = &self.stage {
            if !exists(stage) {
                log::warn!("stage `#{}` not found; hotspot scan disabled", stage);
                self.stage = None;
                self.scan_hotspots = false;
            }
        }
        if let Some(zone) = &self.ambient_zone {
            if !exists(zone) {
                log::warn!("ambient zone `#{}` not found; ambient effect disabled", zone);
                self.ambient_zone = None;
            }
        }
        if let Some(waterfall) = &self.waterfall {
            if !exists(&waterfall.hotspot) || !exists(&waterfall.entrance) {
                log::warn!("waterfall elements not found; waterfall disabled");
                self.waterfall = None;
                self.hotspots.retain(|h| h.binding != Binding::Waterfall);
            }
        }
    }

    /// Check cross references between bubbles, hotspots and scripts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut bubbles = HashSet::new();
        for bubble in &self.bubbles {
            if !bubbles.insert(&bubble.id) {
                return Err(ConfigError::DuplicateBubble(bubble.id.clone()));
            }
        }

        let book = self.script_book();
        for script in book.iter() {
            if let Some(bubble) = script.reveal.bubbles().find(|b| !bubbles.contains(b)) {
                return Err(ConfigError::ScriptBubble {
                    script: script.name,
                    bubble: bubble.clone(),
                });
            }
        }

        let mut hotspots = HashSet::new();
        for hotspot in &self.hotspots {
            if !hotspots.insert(&hotspot.id) {
                return Err(ConfigError::DuplicateHotspot(hotspot.id.clone()));
            }
            match &hotspot.binding {
                Binding::Sequence { bubbles: seq, .. } if seq.is_empty() => {
                    return Err(ConfigError::EmptySequence(hotspot.id.clone()));
                }
                Binding::Group { group } => {
                    let declared = self
                        .bubbles
                        .iter()
                        .any(|b| b.group.as_deref() == Some(group.as_str()));
                    if !declared && !self.scan_hotspots {
                        return Err(ConfigError::EmptyGroup {
                            hotspot: hotspot.id.clone(),
                            group: group.clone(),
                        });
                    }
                }
                Binding::Script { script } if !book.contains(*script) => {
                    return Err(ConfigError::MissingScript {
                        hotspot: hotspot.id.clone(),
                        script: *script,
                    });
                }
                Binding::Waterfall if self.waterfall.is_none() => {
                    return Err(ConfigError::NoWaterfall(hotspot.id.clone()));
                }
                _ => {}
            }
            if let Some(bubble) = hotspot.binding.bubbles().iter().find(|b| !bubbles.contains(b)) {
                return Err(ConfigError::UnknownBubble {
                    hotspot: hotspot.id.clone(),
                    bubble: bubble.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn library_config_is_valid() {
        let config = StageConfig::library();
        config.validate().unwrap();
        assert_eq!(config.bubbles.len(), 6);
        assert_eq!(config.hotspots.len(), 5);
        assert_eq!(config.script_book().len(), 4);
        assert_eq!(config.bubble_class, "show-bubble");
    }

    #[test]
    fn minimal_manifest_gets_defaults() {
        let config = StageConfig::from_json("{}").unwrap();
        assert_eq!(config.timings, Timings::default());
        assert_eq!(config.timings.sequence_interval_ms, 2400);
        assert_eq!(config.interactive_selectors.len(), 3);
        assert!(config.waterfall.is_none());
        assert!(!config.debug);
    }

    #[test]
    fn timings_are_overridable() {
        let config = StageConfig::from_json(r#"{ "timings": { "touchHideMs": 900 } }"#).unwrap();
        assert_eq!(config.timings.touch_hide_ms, 900);
        assert_eq!(config.timings.waterfall_grace_ms, 9000);
    }

    #[test]
    fn missing_stage_disables_the_scan() {
        let mut config = StageConfig::balloon_stage();
        config.prune_missing(|_| false);
        assert_eq!(config.stage, None);
        assert!(!config.scan_hotspots);

        let mut present = StageConfig::balloon_stage();
        present.prune_missing(|_| true);
        assert_eq!(present.stage, Some("stage".into()));
        assert!(present.scan_hotspots);
    }

    #[test]
    fn missing_waterfall_drops_its_hotspots() {
        let mut config = StageConfig::library();
        config.prune_missing(|id| id.as_str() != "library-entrance");
        assert!(config.waterfall.is_none());
        assert!(config.hotspots.iter().all(|h| h.binding != Binding::Waterfall));
        assert_eq!(config.hotspots.len(), 4);
        assert_eq!(config.ambient_zone, Some("balloon-zone".into()));
        config.validate().unwrap();
    }

    #[test]
    fn parse_balloon_manifest() {
        let json = r#"{
            "stage": "stage",
            "bubbleClass": "show",
            "bubbles": [
                { "id": "a", "element": "balloon-a" },
                { "id": "b", "element": "balloon-b" }
            ],
            "hotspots": [
                { "id": "pair", "binding": { "kind": "sequence", "bubbles": ["a", "b"], "intervalMs": 1000 } }
            ]
        }"#;
        let config = StageConfig::from_json(json).unwrap();
        assert_eq!(config.bubble_class, "show");
        assert!(config.toggle_hidden);
        assert_eq!(config.bubbles[0].to_bubble().element.as_str(), "balloon-a");
    }

    #[test]
    fn unknown_bubble_is_rejected() {
        let json = r#"{
            "hotspots": [ { "id": "h", "binding": { "kind": "bubble", "bubble": "ghost" } } ]
        }"#;
        assert!(matches!(
            StageConfig::from_json(json),
            Err(ConfigError::UnknownBubble { .. })
        ));
    }

    #[test]
    fn broken_references_are_rejected() {
        let mut config = StageConfig::library();
        config.bubbles.push(BubbleDescriptor::new("cat-bubble"));
        assert!(matches!(config.validate(), Err(ConfigError::DuplicateBubble(_))));

        let mut config = StageConfig::library();
        config.waterfall = None;
        assert!(matches!(config.validate(), Err(ConfigError::NoWaterfall(_))));

        let mut config = StageConfig::library();
        config.builtin_scripts = false;
        assert!(matches!(config.validate(), Err(ConfigError::MissingScript { .. })));

        let mut config = StageConfig::default();
        config.hotspots.push(HotspotBinding::new(
            HotspotId::from("s"),
            Binding::Sequence { bubbles: vec![], interval_ms: None },
        ));
        assert!(matches!(config.validate(), Err(ConfigError::EmptySequence(_))));

        let mut config = StageConfig::default();
        config.hotspots.push(HotspotBinding::new(
            HotspotId::from("g"),
            Binding::Group { group: "ghosts".into() },
        ));
        assert!(matches!(config.validate(), Err(ConfigError::EmptyGroup { .. })));
    }

    #[test]
    fn bad_script_name_is_a_json_error() {
        let json = r#"{ "hotspots": [ { "id": "h", "binding": { "kind": "script", "script": "dragon" } } ] }"#;
        assert!(matches!(StageConfig::from_json(json), Err(ConfigError::Json(_))));
    }

    #[test]
    fn script_bubbles_must_exist() {
        let mut config = StageConfig::library();
        config.bubbles.retain(|b| b.id.as_str() != content::KING_BUBBLE);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ScriptBubble { script: ScriptName::Bramble, .. })
        ));
    }
}
