pub mod controller;
pub mod input;
pub mod shortcuts;

pub use controller::{ControllerConfig, EventOutcome, InteractionController};
pub use input::{InputEvent, Modifiers};
pub use shortcuts::{ShortcutAction, ShortcutMap};
