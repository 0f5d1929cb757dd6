//! Interaction handling module.
//!
//! Processes the `/start` command and the inline menu buttons
//! (`view_ad`, `ref_link`, `stats`).

mod handler;
mod types;

pub use handler::InteractionHandler;
pub use types::{CommandResult, MenuAction, StartCommand};
