//! Common utilities and types shared across cluster-peers

pub mod config;
pub mod error;
pub mod utils;

pub use self::config::{Config, MINIMUM_CLUSTER_SIZE};
pub use error::{Error, Result};
pub use utils::{attribute_text, decode_attribute, is_truthy, local_route_address, redact};
