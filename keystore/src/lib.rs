pub mod events;
pub mod keystore;

pub use crate::events::{EmitEvent, EventLog, LogEventSink};
pub use crate::keystore::Keystore;
