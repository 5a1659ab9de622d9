//! Application services for notification fanout and inbox management.

mod error;
mod fanout;
mod inbox;

pub use error::{NotificationError, NotificationResult};
pub use fanout::FanoutEngine;
pub use inbox::{FanoutReport, NotificationService};
