use thiserror::Error;

use crate::api::types::{BubbleId, HotspotId, ScriptName};

/// Problems found while loading or validating a stage manifest.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid stage manifest: {0}")]
    Json(#[from] serde_json::Error),

    #[error("bubble `{0}` is declared more than once")]
    DuplicateBubble(BubbleId),

    #[error("hotspot `{0}` is declared more than once")]
    DuplicateHotspot(HotspotId),

    #[error("hotspot `{hotspot}` references unknown bubble `{bubble}`")]
    UnknownBubble { hotspot: HotspotId, bubble: BubbleId },

    #[error("hotspot `{0}` has an empty sequence")]
    EmptySequence(HotspotId),

    #[error("hotspot `{hotspot}` shows group `{group}` but no bubble belongs to it")]
    EmptyGroup { hotspot: HotspotId, group: String },

    #[error("hotspot `{hotspot}` plays script `{script}` which is not defined")]
    MissingScript { hotspot: HotspotId, script: ScriptName },

    #[error("script `{script}` references unknown bubble `{bubble}`")]
    ScriptBubble { script: ScriptName, bubble: BubbleId },

    #[error("unknown dialogue script `{0}`")]
    UnknownScript(String),

    #[error("waterfall hotspot `{0}` is declared but no waterfall is configured")]
    NoWaterfall(HotspotId),
}

/// Browser storage failures. Always swallowed after logging.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage area is unavailable")]
    Unavailable,

    #[error("storage rejected `{key}`: {message}")]
    Rejected { key: String, message: String },

    #[error("could not encode `{key}`: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}
