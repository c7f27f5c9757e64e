mod controller;
mod runtime;
mod shutdown;
mod types;

#[cfg(test)]
mod tests;

pub use controller::OrganizerController;
pub use types::{ControllerState, ShutdownReason};
