pub mod hierarchy;
pub mod monitor;
pub mod parser;
pub mod ssacli;
pub mod status;
pub mod thresholds;

pub use monitor::{Monitor, RefreshError};
pub use parser::ParseError;
pub use ssacli::{CommandError, Invoke, Ssacli};
pub use status::Status;
pub use thresholds::ThresholdStore;
