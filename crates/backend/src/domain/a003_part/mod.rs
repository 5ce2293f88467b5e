pub mod repository;
pub mod service;
pub mod stock_export;
pub mod stock_import;
