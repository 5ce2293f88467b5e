pub mod a001_customer;
pub mod a002_unit;
pub mod a003_part;
pub mod a004_service_event;
pub mod a005_part_purchase;
pub mod common;
