pub mod domain;
pub mod error;
pub mod protocol;

pub use domain::{CardConfig, CardStatus, CupState, RewardState};
pub use error::PunchCardError;
pub use protocol::{CardEvent, CardView, CupView};
