//! Logging bootstrap for applications embedding the client.

mod logging;

pub use logging::{create_json_layer, init_logging, LoggingConfig};
