#![warn(missing_docs)]

//! Converts text component parts to and from NBT.

/// Reads and writes click events as NBT compounds.
pub mod click_event;
/// Defines click events and their actions.
pub mod event;

pub use event::{ClickAction, ClickEvent, UnknownClickAction};
