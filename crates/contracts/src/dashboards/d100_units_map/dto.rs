use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Sold unit placed on the dashboard map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitMapPoint {
    pub id: String,
    pub serial_number: String,
    pub model: Option<String>,
    pub sale_date: Option<NaiveDate>,
    pub customer_name: Option<String>,
    pub customer_city: Option<String>,
    /// Normalized postal code (whitespace stripped)
    pub postal_code: Option<String>,
    pub lat: f64,
    pub lng: f64,
    /// `false` when the point is the fallback coordinate
    pub resolved: bool,
}
