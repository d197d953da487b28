pub mod cancel;
pub mod heartbeat;
