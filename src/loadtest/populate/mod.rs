//! Populate command handler.

mod logging;
mod run;

pub use logging::mask_connection_password;
pub use run::{describe_plan, run_populate};
