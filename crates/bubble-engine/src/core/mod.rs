pub mod bubbles;
pub mod time;
pub mod timers;
