pub mod dto;

pub use dto::UnitMapPoint;
