//! Hands card events from the UI to the punch card controller.

use card_core::{CardRenderer, PunchCardController};
use shared::protocol::CardEvent;
use storage::KeyValueStore;

/// Failures stay in the log; the surface keeps showing the in-memory card.
pub fn dispatch_card_event<S, R>(card: &mut PunchCardController<S, R>, event: CardEvent)
where
    S: KeyValueStore,
    R: CardRenderer,
{
    let event_name = match &event {
        CardEvent::CupClicked { .. } => "cup_clicked",
        CardEvent::ResetRequested => "reset_requested",
    };

    match card.handle_event(event) {
        Ok(()) if card.is_persistent() => {
            tracing::debug!(event = event_name, "applied card event");
        }
        Ok(()) => {
            tracing::warn!(event = event_name, "applied card event without saving it");
        }
        Err(err) => {
            tracing::error!(event = event_name, "card event rejected: {err}");
        }
    }
}
