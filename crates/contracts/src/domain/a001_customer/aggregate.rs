use crate::domain::common::{
    clean_optional, AggregateId, AggregateRoot, BaseAggregate, EntityMetadata,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// ID Type
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerId(pub Uuid);

impl CustomerId {
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

impl AggregateId for CustomerId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }

    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(CustomerId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

// ============================================================================
// Status
// ============================================================================

/// Sales pipeline stage of a customer or lead
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CustomerStatus {
    #[default]
    Lead,
    Qualified,
    Negotiation,
    Proposal,
    Won,
    Lost,
    Customer,
}

impl CustomerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerStatus::Lead => "lead",
            CustomerStatus::Qualified => "qualified",
            CustomerStatus::Negotiation => "negotiation",
            CustomerStatus::Proposal => "proposal",
            CustomerStatus::Won => "won",
            CustomerStatus::Lost => "lost",
            CustomerStatus::Customer => "customer",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "lead" => Some(CustomerStatus::Lead),
            "qualified" => Some(CustomerStatus::Qualified),
            "negotiation" => Some(CustomerStatus::Negotiation),
            "proposal" => Some(CustomerStatus::Proposal),
            "won" => Some(CustomerStatus::Won),
            "lost" => Some(CustomerStatus::Lost),
            "customer" => Some(CustomerStatus::Customer),
            _ => None,
        }
    }

    /// Unknown or missing values fall back to `Lead`
    pub fn parse_or_default(value: Option<&str>) -> Self {
        value.and_then(Self::parse).unwrap_or_default()
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// Customer or sales lead
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    #[serde(flatten)]
    pub base: BaseAggregate<CustomerId>,

    pub phone: Option<String>,
    pub email: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
    pub status: CustomerStatus,
    pub source: Option<String>,
    pub next_action_at: Option<NaiveDate>,
    pub is_hot: bool,
}

impl Customer {
    pub fn new_for_insert(code: String, dto: &CustomerDto) -> Self {
        let mut customer = Self {
            base: BaseAggregate::new(CustomerId::new_v4(), code, String::new()),
            phone: None,
            email: None,
            street: None,
            city: None,
            zip: None,
            country: None,
            status: CustomerStatus::Lead,
            source: None,
            next_action_at: None,
            is_hot: false,
        };
        customer.update(dto);
        customer
    }

    pub fn name(&self) -> &str {
        &self.base.description
    }

    /// Apply form data; text fields are trimmed and blanks cleared
    pub fn update(&mut self, dto: &CustomerDto) {
        if let Some(code) = clean_optional(dto.code.clone()) {
            self.base.code = code;
        }
        self.base.description = dto.name.trim().to_string();
        self.base.comment = clean_optional(dto.note.clone());
        self.phone = clean_optional(dto.phone.clone());
        self.email = clean_optional(dto.email.clone());
        self.street = clean_optional(dto.street.clone());
        self.city = clean_optional(dto.city.clone());
        self.zip = clean_optional(dto.zip.clone());
        self.country = clean_optional(dto.country.clone());
        self.status = CustomerStatus::parse_or_default(dto.status.as_deref());
        self.source = clean_optional(dto.source.clone());
        self.next_action_at = dto.next_action_at;
        self.is_hot = dto.is_hot;
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.base.description.trim().is_empty() {
            return Err("Jméno je povinné.".into());
        }
        if let Some(email) = &self.email {
            if !email.contains('@') {
                return Err("Neplatný e-mail.".into());
            }
        }
        Ok(())
    }

    pub fn before_write(&mut self) {
        self.base.touch();
        self.base.metadata.increment_version();
    }
}

impl AggregateRoot for Customer {
    type Id = CustomerId;

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
        "a001"
    }

    fn collection_name() -> &'static str {
        "customer"
    }

    fn element_name() -> &'static str {
        "Zákazník"
    }

    fn list_name() -> &'static str {
        "Zákazníci"
    }
}

// ============================================================================
// Forms / DTOs
// ============================================================================

/// Create/update form of a customer
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CustomerDto {
    pub id: Option<String>,
    pub code: Option<String>,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
    pub status: Option<String>,
    pub source: Option<String>,
    pub next_action_at: Option<NaiveDate>,
    #[serde(default)]
    pub is_hot: bool,
    pub note: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_status_falls_back_to_lead() {
        assert_eq!(CustomerStatus::parse_or_default(Some("vip")), CustomerStatus::Lead);
        assert_eq!(CustomerStatus::parse_or_default(None), CustomerStatus::Lead);
        assert_eq!(
            CustomerStatus::parse_or_default(Some("won")),
            CustomerStatus::Won
        );
    }

    #[test]
    fn test_update_trims_and_clears_blank_fields() {
        let dto = CustomerDto {
            name: "  Jan Novák ".into(),
            city: Some("  ".into()),
            zip: Some(" 110 00 ".into()),
            status: Some("customer".into()),
            ..Default::default()
        };
        let customer = Customer::new_for_insert("CUS-1".into(), &dto);

        assert_eq!(customer.name(), "Jan Novák");
        assert_eq!(customer.city, None);
        assert_eq!(customer.zip.as_deref(), Some("110 00"));
        assert_eq!(customer.status, CustomerStatus::Customer);
        assert!(customer.validate().is_ok());
    }

    #[test]
    fn test_validate_requires_name() {
        let customer = Customer::new_for_insert("CUS-1".into(), &CustomerDto::default());
        assert!(customer.validate().is_err());
    }

    #[test]
    fn test_full_name() {
        assert_eq!(Customer::full_name(), "a001_customer");
    }
}
