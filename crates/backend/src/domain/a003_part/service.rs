use super::repository::{self, PartFilter};
use crate::shared::error::ValidationError;
use contracts::domain::a003_part::{Part, PartDto};
use uuid::Uuid;

async fn ensure_unique_part_number(part: &Part) -> anyhow::Result<()> {
    if let Some(existing) = repository::get_by_part_number(part.part_number()).await? {
        if existing.base.id != part.base.id {
            return Err(ValidationError(format!(
                "Díl s číslem {} již existuje.",
                part.part_number()
            ))
            .into());
        }
    }
    Ok(())
}

/// Creates a part
pub async fn create(dto: PartDto) -> anyhow::Result<Uuid> {
    let mut aggregate = Part::new_for_insert(&dto);

    aggregate.validate().map_err(ValidationError)?;
    ensure_unique_part_number(&aggregate).await?;

    aggregate.before_write();
    repository::insert(&aggregate).await
}

/// Updates a part; `Ok(false)` when it does not exist
pub async fn update(id: Uuid, dto: PartDto) -> anyhow::Result<bool> {
    let Some(mut aggregate) = repository::get_by_id(id).await? else {
        return Ok(false);
    };

    aggregate.update(&dto);
    aggregate.validate().map_err(ValidationError)?;
    ensure_unique_part_number(&aggregate).await?;

    aggregate.before_write();
    repository::update(&aggregate).await?;
    Ok(true)
}

/// Soft delete
pub async fn delete(id: Uuid) -> anyhow::Result<bool> {
    repository::soft_delete(id).await
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<Part>> {
    repository::get_by_id(id).await
}

pub async fn list(filter: &PartFilter) -> anyhow::Result<Vec<Part>> {
    repository::list(filter).await
}

/// Parts for the stock export, ordered by part number
pub async fn list_for_export() -> anyhow::Result<Vec<Part>> {
    repository::list_by_part_number().await
}
