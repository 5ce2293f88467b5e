use crate::domain::common::{
    clean_optional, currency_or_default, AggregateId, AggregateRoot, BaseAggregate,
    EntityMetadata,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// VAT rate (%) applied when none is given
pub const DEFAULT_VAT_RATE: f64 = 21.0;

// ============================================================================
// ID Type
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartPurchaseId(pub Uuid);

impl PartPurchaseId {
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

impl AggregateId for PartPurchaseId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }

    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(PartPurchaseId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// Spare part sold to a customer, optionally as part of a service event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartPurchase {
    #[serde(flatten)]
    pub base: BaseAggregate<PartPurchaseId>,

    pub customer_id: String,
    pub part_id: String,
    pub service_event_id: Option<String>,
    pub purchased_at: NaiveDate,
    pub quantity: f64,
    pub unit_price: f64,
    pub currency: String,
    pub vat_rate: f64,
}

impl PartPurchase {
    /// Builds a purchase from the form. Fails when `part_id` or `unit_price` is missing.
    pub fn new_for_insert(
        code: String,
        customer_id: String,
        dto: &PartPurchaseDto,
        today: NaiveDate,
    ) -> Result<Self, String> {
        let part_id = clean_optional(dto.part_id.clone())
            .ok_or_else(|| "Náhradní díl (part_id) je povinný.".to_string())?;
        let unit_price = dto
            .unit_price
            .ok_or_else(|| "Prodejní cena dílu (unit_price) je povinná.".to_string())?;

        let mut base = BaseAggregate::new(PartPurchaseId::new_v4(), code, String::new());
        base.comment = clean_optional(dto.note.clone());

        Ok(Self {
            base,
            customer_id,
            part_id,
            service_event_id: clean_optional(dto.service_event_id.clone()),
            purchased_at: dto.purchased_at.unwrap_or(today),
            quantity: dto.quantity.unwrap_or(1.0),
            unit_price,
            currency: currency_or_default(dto.currency.clone()),
            vat_rate: dto.vat_rate.unwrap_or(DEFAULT_VAT_RATE),
        })
    }

    /// Partial update: only fields present in the patch change
    pub fn apply_patch(&mut self, patch: &PartPurchasePatch) {
        if let Some(purchased_at) = patch.purchased_at {
            self.purchased_at = purchased_at;
        }
        if let Some(quantity) = patch.quantity {
            self.quantity = quantity;
        }
        if let Some(unit_price) = patch.unit_price {
            self.unit_price = unit_price;
        }
        if let Some(currency) = &patch.currency {
            self.currency = currency_or_default(Some(currency.clone()));
        }
        if let Some(note) = &patch.note {
            self.base.comment = clean_optional(Some(note.clone()));
        }
        if let Some(vat_rate) = patch.vat_rate {
            self.vat_rate = if vat_rate.is_finite() {
                vat_rate
            } else {
                DEFAULT_VAT_RATE
            };
        }
    }

    pub fn total_price(&self) -> f64 {
        self.quantity * self.unit_price
    }

    pub fn validate(&self) -> Result<(), String> {
        if Uuid::parse_str(&self.part_id).is_err() {
            return Err("Neplatné ID dílu.".into());
        }
        if let Some(id) = &self.service_event_id {
            if Uuid::parse_str(id).is_err() {
                return Err("Neplatné ID servisního zásahu.".into());
            }
        }
        if !self.quantity.is_finite() || self.quantity <= 0.0 {
            return Err("Množství musí být kladné číslo.".into());
        }
        if !self.unit_price.is_finite() || self.unit_price < 0.0 {
            return Err("Cena musí být číslo větší nebo rovno nule.".into());
        }
        Ok(())
    }

    pub fn before_write(&mut self) {
        self.base.touch();
        self.base.metadata.increment_version();
    }
}

impl AggregateRoot for PartPurchase {
    type Id = PartPurchaseId;

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
        "a005"
    }

    fn collection_name() -> &'static str {
        "part_purchase"
    }

    fn element_name() -> &'static str {
        "Nákup náhradního dílu"
    }

    fn list_name() -> &'static str {
        "Nákupy náhradních dílů"
    }
}

// ============================================================================
// Forms / DTOs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PartPurchaseDto {
    pub part_id: Option<String>,
    pub service_event_id: Option<String>,
    pub purchased_at: Option<NaiveDate>,
    pub quantity: Option<f64>,
    pub unit_price: Option<f64>,
    pub currency: Option<String>,
    pub vat_rate: Option<f64>,
    pub note: Option<String>,
}

/// Body of `PATCH`; absent fields are left unchanged
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PartPurchasePatch {
    pub purchased_at: Option<NaiveDate>,
    pub quantity: Option<f64>,
    pub unit_price: Option<f64>,
    pub currency: Option<String>,
    pub vat_rate: Option<f64>,
    pub note: Option<String>,
}

/// Part columns shown next to a purchase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartSummary {
    pub id: String,
    pub part_number: String,
    pub name: String,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartPurchaseListItem {
    #[serde(flatten)]
    pub purchase: PartPurchase,
    /// `quantity * unit_price`
    pub total_price: f64,
    /// `None` when the part row is missing
    pub part: Option<PartSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const PART_ID: &str = "67e55044-10b1-426f-9247-bb680e5fe0c8";

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    fn form(unit_price: Option<f64>) -> PartPurchaseDto {
        PartPurchaseDto {
            part_id: Some(PART_ID.into()),
            unit_price,
            ..Default::default()
        }
    }

    fn purchase(dto: &PartPurchaseDto) -> Result<PartPurchase, String> {
        PartPurchase::new_for_insert("NAK-1".into(), "c".into(), dto, today())
    }

    #[test]
    fn test_defaults() {
        let p = purchase(&form(Some(250.0))).unwrap();

        assert_eq!(p.quantity, 1.0);
        assert_eq!(p.purchased_at, today());
        assert_eq!(p.currency, "CZK");
        assert_eq!(p.vat_rate, DEFAULT_VAT_RATE);
        assert_eq!(p.total_price(), 250.0);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_part_and_price_are_required() {
        assert!(purchase(&form(None)).is_err());

        let no_part = PartPurchaseDto {
            part_id: Some("  ".into()),
            unit_price: Some(10.0),
            ..Default::default()
        };
        assert!(purchase(&no_part).is_err());
    }

    #[test]
    fn test_quantity_must_be_positive() {
        for quantity in [0.0, -2.0, f64::NAN] {
            let dto = PartPurchaseDto {
                quantity: Some(quantity),
                ..form(Some(10.0))
            };
            assert!(purchase(&dto).unwrap().validate().is_err(), "{quantity}");
        }
    }

    #[test]
    fn test_price_may_be_zero_but_not_negative() {
        assert!(purchase(&form(Some(0.0))).unwrap().validate().is_ok());
        assert!(purchase(&form(Some(-1.0))).unwrap().validate().is_err());
    }

    #[test]
    fn test_patch_changes_only_given_fields() {
        let mut p = purchase(&PartPurchaseDto {
            currency: Some("eur".into()),
            note: Some("záruka".into()),
            ..form(Some(100.0))
        })
        .unwrap();

        p.apply_patch(&PartPurchasePatch {
            quantity: Some(3.0),
            note: Some("  ".into()),
            ..Default::default()
        });

        assert_eq!(p.quantity, 3.0);
        assert_eq!(p.unit_price, 100.0);
        assert_eq!(p.currency, "EUR");
        assert_eq!(p.base.comment, None);

        p.apply_patch(&PartPurchasePatch {
            unit_price: Some(-5.0),
            ..Default::default()
        });
        assert!(p.validate().is_err());
    }
}
