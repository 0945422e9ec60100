//! Device session: the device identifier and its cached token balance.

mod store;

pub use store::{Session, SessionStore};
