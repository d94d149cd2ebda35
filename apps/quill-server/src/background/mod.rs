//! Background maintenance.

mod scheduler;

pub use scheduler::{SchedulerConfig, start_maintenance};
