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
pub struct ServiceEventId(pub Uuid);

impl ServiceEventId {
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

impl AggregateId for ServiceEventId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }

    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(ServiceEventId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// Service intervention at a customer, optionally on one of their units.
/// `base.description` holds the title.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceEvent {
    #[serde(flatten)]
    pub base: BaseAggregate<ServiceEventId>,

    pub customer_id: String,
    pub unit_id: Option<String>,
    pub performed_at: NaiveDate,
    pub details: Option<String>,
    pub event_type: Option<String>,
    pub labor_cost: Option<f64>,
    pub material_cost: Option<f64>,
    pub total_cost: Option<f64>,
    pub currency: String,
}

impl ServiceEvent {
    /// `performed_at` defaults to `today` when the form leaves it empty
    pub fn new_for_insert(
        code: String,
        customer_id: String,
        dto: &ServiceEventDto,
        today: NaiveDate,
    ) -> Self {
        let mut base =
            BaseAggregate::new(ServiceEventId::new_v4(), code, dto.title.trim().to_string());
        base.comment = clean_optional(dto.note.clone());

        Self {
            base,
            customer_id,
            unit_id: clean_optional(dto.unit_id.clone()),
            performed_at: dto.performed_at.unwrap_or(today),
            details: clean_optional(dto.description.clone()),
            event_type: clean_optional(dto.event_type.clone()),
            labor_cost: dto.labor_cost,
            material_cost: dto.material_cost,
            total_cost: dto.total_cost,
            currency: currency_or_default(dto.currency.clone()),
        }
    }

    pub fn title(&self) -> &str {
        &self.base.description
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.base.description.is_empty() {
            return Err("Název zásahu (title) je povinný.".into());
        }
        if let Some(unit_id) = &self.unit_id {
            if Uuid::parse_str(unit_id).is_err() {
                return Err("Neplatné ID vozíku.".into());
            }
        }
        Ok(())
    }

    pub fn before_write(&mut self) {
        self.base.touch();
        self.base.metadata.increment_version();
    }
}

impl AggregateRoot for ServiceEvent {
    type Id = ServiceEventId;

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
        "a004"
    }

    fn collection_name() -> &'static str {
        "service_event"
    }

    fn element_name() -> &'static str {
        "Servisní zásah"
    }

    fn list_name() -> &'static str {
        "Servisní zásahy"
    }
}

// ============================================================================
// Forms / DTOs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ServiceEventDto {
    pub unit_id: Option<String>,
    pub performed_at: Option<NaiveDate>,
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    pub labor_cost: Option<f64>,
    pub material_cost: Option<f64>,
    pub total_cost: Option<f64>,
    pub currency: Option<String>,
    pub note: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 17).unwrap()
    }

    #[test]
    fn test_performed_at_defaults_to_today() {
        let dto = ServiceEventDto {
            title: " Výměna oleje ".into(),
            ..Default::default()
        };
        let event = ServiceEvent::new_for_insert("SRV-1".into(), "c".into(), &dto, today());

        assert_eq!(event.performed_at, today());
        assert_eq!(event.title(), "Výměna oleje");
        assert_eq!(event.currency, "CZK");
        assert!(event.validate().is_ok());
    }

    #[test]
    fn test_title_is_required() {
        let event = ServiceEvent::new_for_insert(
            "SRV-1".into(),
            "c".into(),
            &ServiceEventDto::default(),
            today(),
        );
        assert!(event.validate().is_err());
    }

    #[test]
    fn test_dto_reads_type_field() {
        let dto: ServiceEventDto =
            serde_json::from_str(r#"{"title":"Servis","type":"warranty"}"#).unwrap();
        assert_eq!(dto.event_type.as_deref(), Some("warranty"));
    }
}
