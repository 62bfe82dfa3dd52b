//! UI events and the reset prompt state of the desktop card surface.

use shared::protocol::CardEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiEvent {
    CupClicked(usize),
    ResetClicked,
    ResetConfirmed,
    ResetCancelled,
}

/// Whether the reset confirmation window is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResetPrompt {
    #[default]
    Hidden,
    Open,
}

/// Folds a UI event into the prompt state and yields the card event, if any,
/// that should reach the controller.
pub fn reduce(prompt: &mut ResetPrompt, event: UiEvent) -> Option<CardEvent> {
    match event {
        UiEvent::CupClicked(index) => Some(CardEvent::CupClicked { index }),
        UiEvent::ResetClicked => {
            *prompt = ResetPrompt::Open;
            None
        }
        UiEvent::ResetConfirmed => {
            if *prompt != ResetPrompt::Open {
                return None;
            }
            *prompt = ResetPrompt::Hidden;
            Some(CardEvent::ResetRequested)
        }
        UiEvent::ResetCancelled => {
            *prompt = ResetPrompt::Hidden;
            None
        }
    }
}
