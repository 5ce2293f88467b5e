pub mod aggregate;
pub mod stock;

pub use aggregate::{Part, PartDto, PartId};
pub use stock::{StockImportResult, StockRowError, EXPORT_COLUMNS};
