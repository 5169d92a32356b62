pub mod controller;
pub mod errors;
pub mod models;
pub mod mpv;

pub use controller::{PlayerBackend, PlayerController};
pub use errors::PlayerError;
pub use models::{PlayerState, Selection, ViewMode};
pub use mpv::MpvPlayer;
