//! Apify API models and resource sub-clients.

mod dataset;
mod key_value_store;
mod log;
mod request_queue;
mod webhook;

pub use dataset::*;
pub use key_value_store::*;
pub use log::*;
pub use request_queue::*;
pub use webhook::*;
