use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

macro_rules! string_key {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(key: impl Into<String>) -> Self {
                Self(key.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(key: &str) -> Self {
                Self(key.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(key: String) -> Self {
                Self(key)
            }
        }
    };
}

string_key!(
    /// Stable key of a speech bubble.
    BubbleId
);

string_key!(
    /// Stable key of an interactive hotspot.
    HotspotId
);

string_key!(
    /// DOM element id the host resolves when applying surface ops.
    ElementKey
);

/// The closed set of named dialogue scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScriptName {
    Crest,
    Armor,
    CatHead,
    /// The ejection script. Pre-empts and mutes every other script.
    Bramble,
}

impl ScriptName {
    pub const ALL: [ScriptName; 4] = [
        ScriptName::Crest,
        ScriptName::Armor,
        ScriptName::CatHead,
        ScriptName::Bramble,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ScriptName::Crest => "crest",
            ScriptName::Armor => "armor",
            ScriptName::CatHead => "catHead",
            ScriptName::Bramble => "bramble",
        }
    }

    pub fn is_ejection(self) -> bool {
        self == ScriptName::Bramble
    }
}

impl fmt::Display for ScriptName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScriptName {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScriptName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownScript(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_names_round_trip_through_strings() {
        for name in ScriptName::ALL {
            assert_eq!(name.as_str().parse::<ScriptName>().unwrap(), name);
        }
        assert!("dragon".parse::<ScriptName>().is_err());
    }

    #[test]
    fn script_name_serde_matches_display() {
        let json = serde_json::to_string(&ScriptName::CatHead).unwrap();
        assert_eq!(json, "\"catHead\"");
        let back: ScriptName = serde_json::from_str("\"bramble\"").unwrap();
        assert!(back.is_ejection());
    }

    #[test]
    fn keys_are_transparent_strings() {
        let id: BubbleId = serde_json::from_str("\"cat-bubble\"").unwrap();
        assert_eq!(id, BubbleId::from("cat-bubble"));
        assert_eq!(id.to_string(), "cat-bubble");
    }
}
