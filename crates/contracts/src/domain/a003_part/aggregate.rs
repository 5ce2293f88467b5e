use crate::domain::common::{
    clean_optional, currency_or_default, AggregateId, AggregateRoot, BaseAggregate,
    EntityMetadata,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// ID Type
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartId(pub Uuid);

impl PartId {
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

impl AggregateId for PartId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }

    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(PartId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// Spare part. `base.code` is the part number (natural key), `base.description` the name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    #[serde(flatten)]
    pub base: BaseAggregate<PartId>,

    pub category: Option<String>,
    pub stock_qty: i32,
    pub purchase_price: Option<f64>,
    pub sale_price: Option<f64>,
    pub currency: String,
    /// Position on the exploded drawing of the vehicle
    pub drawing_position: Option<i32>,
}

impl Part {
    pub fn new_for_insert(dto: &PartDto) -> Self {
        let mut part = Self {
            base: BaseAggregate::new(PartId::new_v4(), String::new(), String::new()),
            category: None,
            stock_qty: 0,
            purchase_price: None,
            sale_price: None,
            currency: currency_or_default(None),
            drawing_position: None,
        };
        part.update(dto);
        part
    }

    pub fn part_number(&self) -> &str {
        &self.base.code
    }

    pub fn name(&self) -> &str {
        &self.base.description
    }

    /// Apply form data. Omitted `stock_qty` and `currency` keep their stored values.
    pub fn update(&mut self, dto: &PartDto) {
        self.base.code = dto.part_number.trim().to_string();
        self.base.description = dto.name.trim().to_string();
        self.base.comment = clean_optional(dto.note.clone());
        self.category = clean_optional(dto.category.clone());
        if let Some(stock_qty) = dto.stock_qty {
            self.stock_qty = stock_qty;
        }
        self.purchase_price = dto.purchase_price;
        self.sale_price = dto.sale_price;
        if let Some(currency) = clean_optional(dto.currency.clone()) {
            self.currency = currency.to_uppercase();
        }
        self.drawing_position = dto.drawing_position;
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.base.code.is_empty() || self.base.description.is_empty() {
            return Err("Číslo dílu a název jsou povinné.".into());
        }
        if self.stock_qty < 0 {
            return Err("Skladové množství nesmí být záporné.".into());
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

impl AggregateRoot for Part {
    type Id = PartId;

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
        "a003"
    }

    fn collection_name() -> &'static str {
        "part"
    }

    fn element_name() -> &'static str {
        "Náhradní díl"
    }

    fn list_name() -> &'static str {
        "Náhradní díly"
    }
}

// ============================================================================
// Forms / DTOs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PartDto {
    pub id: Option<String>,
    pub part_number: String,
    pub name: String,
    pub category: Option<String>,
    pub stock_qty: Option<i32>,
    pub purchase_price: Option<f64>,
    pub sale_price: Option<f64>,
    pub currency: Option<String>,
    pub drawing_position: Option<i32>,
    pub note: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_part_defaults() {
        let part = Part::new_for_insert(&PartDto {
            part_number: " ABC-1 ".into(),
            name: "Brzdová destička".into(),
            ..Default::default()
        });

        assert_eq!(part.part_number(), "ABC-1");
        assert_eq!(part.stock_qty, 0);
        assert_eq!(part.currency, "CZK");
        assert!(part.validate().is_ok());
    }

    #[test]
    fn test_validate_requires_number_and_name() {
        let part = Part::new_for_insert(&PartDto {
            part_number: "ABC-1".into(),
            name: "  ".into(),
            ..Default::default()
        });
        assert!(part.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_negative_stock() {
        let part = Part::new_for_insert(&PartDto {
            part_number: "ABC-1".into(),
            name: "Filtr".into(),
            stock_qty: Some(-3),
            ..Default::default()
        });
        assert!(part.validate().is_err());
    }

    #[test]
    fn test_update_keeps_currency_and_stock_when_omitted() {
        let mut part = Part::new_for_insert(&PartDto {
            part_number: "ABC-1".into(),
            name: "Filtr".into(),
            stock_qty: Some(7),
            currency: Some("eur".into()),
            ..Default::default()
        });
        assert_eq!(part.currency, "EUR");

        part.update(&PartDto {
            part_number: "ABC-1".into(),
            name: "Filtr vzduchový".into(),
            ..Default::default()
        });

        assert_eq!(part.currency, "EUR");
        assert_eq!(part.stock_qty, 7);
        assert_eq!(part.name(), "Filtr vzduchový");

        part.update(&PartDto {
            part_number: "ABC-1".into(),
            name: "Filtr".into(),
            currency: Some("czk".into()),
            ..Default::default()
        });
        assert_eq!(part.currency, "CZK");
    }
}
