//! Messages crossing the render and input boundaries of a card.

use serde::{Deserialize, Serialize};

use crate::domain::{CardStatus, CupState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CupView {
    pub index: usize,
    pub state: CupState,
    /// Mirrors the accessible pressed-state attribute of a toggle button.
    pub pressed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardView {
    pub cups: Vec<CupView>,
    pub status: CardStatus,
    pub status_text: String,
    pub reward_message: String,
}

impl CardView {
    pub fn from_punches(punches: &[bool], status: CardStatus) -> Self {
        let cups = punches
            .iter()
            .enumerate()
            .map(|(index, stamped)| CupView {
                index,
                state: CupState::from_flag(*stamped),
                pressed: *stamped,
            })
            .collect();

        Self {
            cups,
            status_text: status.status_text(),
            reward_message: status.reward_message(),
            status,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CardEvent {
    CupClicked { index: usize },
    /// Sent only after whatever confirmation the surface imposes.
    ResetRequested,
}
