// Use cases that change state

pub mod reference_commands;
pub mod save_commands;
pub mod session_commands;

pub use reference_commands::*;
pub use save_commands::*;
pub use session_commands::*;
