// Cloud messaging: runtime lifecycle, non-volatile token store, and the
// REST client used to log the device in and message its owner.

pub mod client;
pub mod runtime;
pub mod store;

pub use client::{CloudClient, Device, MESSAGE_EXPIRY_HEADER, Owner};
pub use runtime::CloudRuntime;
pub use store::{NvStore, REMEMBER_ME_TOKEN_KEY, SESSION_TOKEN_KEY};
