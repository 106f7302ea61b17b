pub mod console;
pub mod hotkey;
pub mod timer;
