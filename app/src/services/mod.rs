pub mod log;

pub use log::{AllCapsLog, Log, PrintLog};
