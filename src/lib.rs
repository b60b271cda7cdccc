//! Team Clicker: a two-team click race rendered in a browser terminal.
//!
//! Game logic lives in [`clicker`]; the binary target is only the DOM shell.

pub mod clicker;
pub mod config;
pub mod error;
pub mod input;
pub mod ticker;
pub mod widgets;
