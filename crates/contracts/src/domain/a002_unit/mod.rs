pub mod aggregate;

pub use aggregate::{PrepStatus, Unit, UnitDto, UnitId, UnitListItem, UnitStatus};
