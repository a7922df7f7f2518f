use serde::{Deserialize, Serialize};

use crate::api::types::{BubbleId, ElementKey};

/// Default time a shown bubble stays up before hiding itself.
pub const DEFAULT_LINGER_MS: u64 = 5000;

/// How long a bubble stays visible after `show`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Linger {
    /// Hide automatically this many milliseconds after being shown.
    After(u64),
    /// Stay up until something hides it.
    Indefinite,
}

impl Default for Linger {
    fn default() -> Self {
        Linger::After(DEFAULT_LINGER_MS)
    }
}

/// A speech bubble. Never destroyed, only toggled.
#[derive(Debug, Clone)]
pub struct Bubble {
    pub id: BubbleId,
    /// DOM element backing the bubble. Usually the same string as `id`.
    pub element: ElementKey,
    /// Optional exclusivity group (`data-group`).
    pub group: Option<String>,
    /// Current text content.
    pub text: String,
    pub visible: bool,
    /// Auto-hide deadline in virtual ms.
    pub hide_at: Option<u64>,
}

impl Bubble {
    pub fn new(id: impl Into<BubbleId>) -> Self {
        let id = id.into();
        Self {
            element: ElementKey::new(id.as_str()),
            id,
            group: None,
            text: String::new(),
            visible: false,
            hide_at: None,
        }
    }

    // -- Builder pattern --

    pub fn with_element(mut self, element: impl Into<ElementKey>) -> Self {
        self.element = element.into();
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn in_group(&self, group: &str) -> bool {
        self.group.as_deref() == Some(group)
    }
}

impl From<&BubbleId> for ElementKey {
    fn from(id: &BubbleId) -> Self {
        ElementKey::new(id.as_str())
    }
}
