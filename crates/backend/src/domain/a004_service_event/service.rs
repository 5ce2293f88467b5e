use super::repository;
use crate::domain::{a001_customer, a002_unit};
use crate::shared::error::ValidationError;
use chrono::Local;
use contracts::domain::a004_service_event::{ServiceEvent, ServiceEventDto};
use uuid::Uuid;

fn generate_code() -> String {
    let simple = Uuid::new_v4().simple().to_string();
    format!("SRV-{}", simple[..8].to_uppercase())
}

/// Records a service event at a customer.
/// `Ok(None)` when the customer does not exist.
pub async fn create(customer_id: Uuid, dto: ServiceEventDto) -> anyhow::Result<Option<ServiceEvent>> {
    if a001_customer::repository::get_by_id(customer_id).await?.is_none() {
        return Ok(None);
    }

    let mut aggregate = ServiceEvent::new_for_insert(
        generate_code(),
        customer_id.to_string(),
        &dto,
        Local::now().date_naive(),
    );
    aggregate.validate().map_err(ValidationError)?;

    if let Some(unit_id) = aggregate.unit_id.as_deref() {
        let uuid = Uuid::parse_str(unit_id)
            .map_err(|_| ValidationError("Neplatné ID vozíku.".into()))?;
        if a002_unit::repository::get_by_id(uuid).await?.is_none() {
            return Err(ValidationError("Vozík nenalezen.".into()).into());
        }
    }

    aggregate.before_write();
    repository::insert(&aggregate).await?;
    tracing::info!(
        "Service event {} recorded for customer {}",
        aggregate.base.code,
        customer_id
    );
    Ok(Some(aggregate))
}

pub async fn list_by_customer(customer_id: Uuid) -> anyhow::Result<Vec<ServiceEvent>> {
    repository::list_by_customer(customer_id).await
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<ServiceEvent>> {
    repository::get_by_id(id).await
}

/// Soft delete
pub async fn delete(id: Uuid) -> anyhow::Result<bool> {
    repository::soft_delete(id).await
}
