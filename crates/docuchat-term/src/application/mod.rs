//! Application layer: command line handling, logging setup and the terminal
//! loop that connects user input to the session.

pub mod cli;
pub mod logging;
pub mod ui;
