pub mod ambient;
pub mod dialogue;
pub mod reveal;
pub mod sequence;
pub mod waterfall;
