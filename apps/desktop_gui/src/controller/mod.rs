//! Controller layer: UI events, reset prompt transitions, and dispatch into the card.

pub mod events;
pub mod orchestration;
