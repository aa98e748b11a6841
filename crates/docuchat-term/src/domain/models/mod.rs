mod action;
mod backend_client;
mod diagram;
mod document;
mod error;
mod event;
mod flags;
mod insights;
mod message;
mod slash_command;
mod theme;

pub use action::*;
pub use backend_client::*;
pub use diagram::*;
pub use document::*;
pub use error::*;
pub use event::*;
pub use flags::*;
pub use insights::*;
pub use message::*;
pub use slash_command::*;
pub use theme::*;
