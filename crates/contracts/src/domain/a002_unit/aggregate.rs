use crate::domain::common::{
    clean_optional, currency_or_default, AggregateId, AggregateRoot, BaseAggregate,
    EntityMetadata,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// ID Type
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitId(pub Uuid);

impl UnitId {
    pub fn new(value: Uuid) -> Self {
        Self(value)
    }

    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl AggregateId for UnitId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }

    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(UnitId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

// ============================================================================
// Statuses
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UnitStatus {
    #[default]
    InStock,
    Reserved,
    Sold,
}

impl UnitStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitStatus::InStock => "in_stock",
            UnitStatus::Reserved => "reserved",
            UnitStatus::Sold => "sold",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "in_stock" => Some(UnitStatus::InStock),
            "reserved" => Some(UnitStatus::Reserved),
            "sold" => Some(UnitStatus::Sold),
            _ => None,
        }
    }
}

/// Workshop preparation stage of a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PrepStatus {
    #[default]
    NotAssembled,
    Assembled,
    Ready,
}

impl PrepStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrepStatus::NotAssembled => "not_assembled",
            PrepStatus::Assembled => "assembled",
            PrepStatus::Ready => "ready",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "not_assembled" => Some(PrepStatus::NotAssembled),
            "assembled" => Some(PrepStatus::Assembled),
            "ready" => Some(PrepStatus::Ready),
            _ => None,
        }
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// Vehicle unit. `base.code` holds the serial number, `base.description` the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    #[serde(flatten)]
    pub base: BaseAggregate<UnitId>,

    pub status: UnitStatus,
    pub prep_status: PrepStatus,
    pub warehouse_location: Option<String>,
    pub customer_id: Option<String>,
    pub purchase_price: Option<f64>,
    pub purchase_currency: String,
    pub purchase_date: Option<NaiveDate>,
    pub sale_date: Option<NaiveDate>,
    pub sale_price: Option<f64>,
    pub currency: String,
    pub vat_rate: Option<f64>,
}

impl Unit {
    pub fn new_for_insert(dto: &UnitDto) -> Self {
        let mut unit = Self {
            base: BaseAggregate::new(UnitId::new_v4(), String::new(), String::new()),
            status: UnitStatus::InStock,
            prep_status: PrepStatus::NotAssembled,
            warehouse_location: None,
            customer_id: None,
            purchase_price: None,
            purchase_currency: currency_or_default(None),
            purchase_date: None,
            sale_date: None,
            sale_price: None,
            currency: currency_or_default(None),
            vat_rate: None,
        };
        unit.update(dto);
        unit
    }

    pub fn serial_number(&self) -> &str {
        &self.base.code
    }

    /// Model name, `None` when the unit has no model set
    pub fn model(&self) -> Option<&str> {
        Some(self.base.description.as_str()).filter(|m| !m.is_empty())
    }

    pub fn update(&mut self, dto: &UnitDto) {
        self.base.code = dto.serial_number.trim().to_string();
        self.base.description = clean_optional(dto.model.clone()).unwrap_or_default();
        self.base.comment = clean_optional(dto.note.clone());
        self.status = dto
            .status
            .as_deref()
            .and_then(UnitStatus::parse)
            .unwrap_or_default();
        self.prep_status = dto
            .prep_status
            .as_deref()
            .and_then(PrepStatus::parse)
            .unwrap_or_default();
        self.warehouse_location = clean_optional(dto.warehouse_location.clone());
        self.customer_id = clean_optional(dto.customer_id.clone());
        self.purchase_price = dto.purchase_price;
        self.purchase_currency = currency_or_default(dto.purchase_currency.clone());
        self.purchase_date = dto.purchase_date;
        self.sale_date = dto.sale_date;
        self.sale_price = dto.sale_price;
        self.currency = currency_or_default(dto.currency.clone());
        self.vat_rate = dto.vat_rate;
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.base.code.trim().is_empty() {
            return Err("Sériové číslo je povinné.".into());
        }
        if let Some(id) = &self.customer_id {
            if Uuid::parse_str(id).is_err() {
                return Err("Neplatné ID zákazníka.".into());
            }
        }
        for price in [self.purchase_price, self.sale_price].into_iter().flatten() {
            if !price.is_finite() || price < 0.0 {
                return Err("Cena nesmí být záporná.".into());
            }
        }
        Ok(())
    }

    pub fn before_write(&mut self) {
        self.base.touch();
        self.base.metadata.increment_version();
    }
}

impl AggregateRoot for Unit {
    type Id = UnitId;

    fn id(&self) -> Self::Id {
        self.base.id
    }

    fn code(&self) -> &str {
        &self.base.code
    }

    fn description(&self) -> &str {
        &self.base.description
    }

    fn metadata(&self) -> &EntityMetadata {
        &self.base.metadata
    }

    fn metadata_mut(&mut self) -> &mut EntityMetadata {
        &mut self.base.metadata
    }

    fn aggregate_index() -> &'static str {
        "a002"
    }

    fn collection_name() -> &'static str {
        "unit"
    }

    fn element_name() -> &'static str {
        "Vozík"
    }

    fn list_name() -> &'static str {
        "Vozíky"
    }
}

// ============================================================================
// Forms / DTOs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UnitDto {
    pub id: Option<String>,
    pub serial_number: String,
    pub model: Option<String>,
    pub status: Option<String>,
    pub prep_status: Option<String>,
    pub warehouse_location: Option<String>,
    pub customer_id: Option<String>,
    pub purchase_price: Option<f64>,
    pub purchase_currency: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub sale_date: Option<NaiveDate>,
    pub sale_price: Option<f64>,
    pub currency: Option<String>,
    pub vat_rate: Option<f64>,
    pub note: Option<String>,
}

/// Unit row of list views, flattened with the owning customer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitListItem {
    #[serde(flatten)]
    pub unit: Unit,
    pub customer_name: Option<String>,
    pub customer_city: Option<String>,
}
