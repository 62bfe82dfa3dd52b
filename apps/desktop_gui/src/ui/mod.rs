//! UI layer for the desktop punch card: app shell and cup grid.

pub mod app;

pub use app::{PunchCardApp, StartupConfig};
