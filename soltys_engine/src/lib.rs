pub mod input;
pub mod keyboard;
pub mod keys;
pub mod playback;
pub mod render;
pub mod script;
pub mod text;

pub use input::{Input, InputEvent, MouseButton, Point};
pub use keyboard::{KeyboardState, Modifiers};
pub use keys::KeyCode;
pub use playback::ReplayTimer;
pub use render::{Surface, draw_char, draw_string};
pub use script::ScriptSession;
pub use text::{SYSTEM_TEXT_MAX, TextBank};
