//! Background tasks.

mod maintenance;

pub use maintenance::Maintenance;
