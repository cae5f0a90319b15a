pub mod authenticate;
pub mod create_event;
pub mod list_events;
pub mod update_event;
pub mod verify;
