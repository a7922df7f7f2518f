//! Built-in scripts for the library scene.
//!
//! Text and timings are user-visible and must not drift.

use crate::api::types::{BubbleId, ScriptName};
use crate::components::bubble::Linger;
use crate::systems::dialogue::{DialogueScript, ScriptBook};
use crate::systems::reveal::{Reveal, Scope};

pub const ARMOR_BUBBLE: &str = "armor-bubble";
pub const CAT_BUBBLE: &str = "cat-bubble";
pub const CREST_BUBBLE: &str = "crest-bubble";
pub const CONSENT_BUBBLE: &str = "consent-bubble";
pub const BRAMBLE_BUBBLE: &str = "bramble-bubble";
pub const KING_BUBBLE: &str = "king-bubble";

/// Every bubble the library scripts touch, in hide order.
pub const LIBRARY_BUBBLES: [&str; 6] = [
    ARMOR_BUBBLE,
    CAT_BUBBLE,
    CONSENT_BUBBLE,
    CREST_BUBBLE,
    BRAMBLE_BUBBLE,
    KING_BUBBLE,
];

/// Crest lines linger longer than the default.
pub const CREST_LINGER_MS: u64 = 22_000;
/// Ejection lines linger this long.
pub const BRAMBLE_LINGER_MS: u64 = 12_000;

/// `linger_ms` is the stage's default linger; the final cleanup does not move.
pub fn armor(linger_ms: u64) -> DialogueScript {
    let linger = Linger::After(linger_ms);
    DialogueScript::new(
        ScriptName::Armor,
        Reveal::new()
            .line(0, ARMOR_BUBBLE, "Pardon me, good feline — could I trouble you for a cup of Civet coffee?", linger)
            .line(3_000, CAT_BUBBLE, "I'm processing. It will be a while, I just ate.", linger)
            .line(6_000, ARMOR_BUBBLE, "Ah, then perhaps a De-cat Red Squirrel Latte?", linger)
            .line(9_000, CAT_BUBBLE, "So you want something from the De-cat Red Squirrel Latte line? We don't serve your kind here...", linger)
            .line(12_000, ARMOR_BUBBLE, "I'm only joking.", linger)
            .line(15_000, CAT_BUBBLE, "Proverbs 26:18-19", linger)
            .line(18_000, ARMOR_BUBBLE, "Is that from the book of Meow?", linger)
            .line(21_000, CAT_BUBBLE, "Why don't you look it up? Brumble has your library card.", linger)
            .finish(21_100, Scope::All),
    )
}

/// Cleanup follows the last line's linger.
pub fn cat_head(linger_ms: u64) -> DialogueScript {
    let linger = Linger::After(linger_ms);
    DialogueScript::new(
        ScriptName::CatHead,
        Reveal::new()
            .line(0, CAT_BUBBLE, "Hey Tin Man — weren't you going to be in the Mischief Players’ rendition of the Wizard of Odd?", linger)
            .line(5_000, ARMOR_BUBBLE, "I tried out... but my heart was not in it.", linger)
            .finish((5_000 + 100u64).saturating_add(linger_ms), Scope::All),
    )
}

pub fn crest() -> DialogueScript {
    let linger = Linger::After(CREST_LINGER_MS);
    DialogueScript::new(
        ScriptName::Crest,
        Reveal::new()
            .line(0, CREST_BUBBLE, "Ah... the Crest of Shirzan. Each part tells a story...", linger)
            .line(6_000, CREST_BUBBLE, "The dolphin — a symbol from the Kennedy clan — symbolizes strength, nobility, joy and freedom on the water.", linger)
            .line(16_000, CREST_BUBBLE, "The helmet — meaning armored Chief and is derived from the Gaelic \"Cinneidigh\" later to become Kennedy.", linger)
            .line(24_000, CREST_BUBBLE, "The crown honors my 21st great-grandfather, Robert the Bruce — the first King of Scotland and was crowned King March 25th, 1306.", linger)
            .line(38_000, CREST_BUBBLE, "The red lion honors my 10th cousin 9x removed, C. S. Lewis, and the Chronicles of Narnia that inspired this realm.", linger)
            .line(47_000, CREST_BUBBLE, "And here... 'Avise la fin' — our motto — 'Consider the end.' A reminder to live with foresight and wisdom and to always consider one's legacy.", linger)
            .finish(40_000 + CREST_LINGER_MS + 80, Scope::Only(vec![BubbleId::from(CREST_BUBBLE)])),
    )
}

pub fn bramble() -> DialogueScript {
    let linger = Linger::After(BRAMBLE_LINGER_MS);
    DialogueScript::new(
        ScriptName::Bramble,
        Reveal::new()
            .line(0, BRAMBLE_BUBBLE, "You broke your oath, and integrity matters. Now take another card.", linger)
            .line(13_000, KING_BUBBLE, "Return with honor, and the door will open once more.", linger)
            .finish(
                13_000 + BRAMBLE_LINGER_MS + 100,
                Scope::Only(vec![BubbleId::from(BRAMBLE_BUBBLE), BubbleId::from(KING_BUBBLE)]),
            ),
    )
}

/// The four library scripts, with `default_linger_ms` for the ordinary lines.
pub fn library_scripts(default_linger_ms: u64) -> ScriptBook {
    [
        armor(default_linger_ms),
        cat_head(default_linger_ms),
        crest(),
        bramble(),
    ]
    .into_iter()
    .collect()
}
