//! Session controller and its message protocol.

mod controller;
mod protocol;
mod record;

pub use controller::{SessionClient, SessionController};
pub use protocol::{Request, Response, REQUEST_TYPES};
pub use record::{SessionData, SessionRecord};
