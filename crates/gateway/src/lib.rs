//! Service wiring: routes inbound chat events to the directory and the
//! broadcaster, and runs the periodic promotion-list job.

pub mod handlers;
pub mod job;
pub mod menu;
pub mod server;
pub mod state;

#[cfg(test)]
mod testing;

pub use {
    handlers::handle_event,
    job::ScheduledBroadcast,
    menu::MenuAction,
    server::{open_directory, start_service},
    state::GatewayState,
};
