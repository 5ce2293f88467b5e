pub mod aggregate;

pub use aggregate::{ServiceEvent, ServiceEventDto, ServiceEventId};
