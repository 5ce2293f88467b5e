use std::collections::HashMap;

use super::repository;
use crate::domain::{a001_customer, a003_part, a004_service_event};
use crate::shared::error::ValidationError;
use chrono::Local;
use contracts::domain::a003_part::Part;
use contracts::domain::a005_part_purchase::{
    PartPurchase, PartPurchaseDto, PartPurchaseListItem, PartPurchasePatch, PartSummary,
};
use uuid::Uuid;

fn generate_code() -> String {
    let simple = Uuid::new_v4().simple().to_string();
    format!("NAK-{}", simple[..8].to_uppercase())
}

fn summary(part: &Part) -> PartSummary {
    PartSummary {
        id: part.base.id.value().to_string(),
        part_number: part.part_number().to_string(),
        name: part.name().to_string(),
        category: part.category.clone(),
    }
}

/// Attaches part number, name and category to each purchase
fn with_parts(purchases: Vec<PartPurchase>, parts: &[Part]) -> Vec<PartPurchaseListItem> {
    let by_id: HashMap<String, &Part> = parts
        .iter()
        .map(|p| (p.base.id.value().to_string(), p))
        .collect();

    purchases
        .into_iter()
        .map(|purchase| PartPurchaseListItem {
            part: by_id.get(&purchase.part_id).map(|p| summary(p)),
            total_price: purchase.total_price(),
            purchase,
        })
        .collect()
}

async fn join_parts(purchases: Vec<PartPurchase>) -> anyhow::Result<Vec<PartPurchaseListItem>> {
    let mut ids: Vec<String> = purchases.iter().map(|p| p.part_id.clone()).collect();
    ids.sort();
    ids.dedup();
    let parts = a003_part::repository::list_by_ids(&ids).await?;
    Ok(with_parts(purchases, &parts))
}

async fn check_references(purchase: &PartPurchase) -> anyhow::Result<()> {
    let part_id = Uuid::parse_str(&purchase.part_id)
        .map_err(|_| ValidationError("Neplatné ID dílu.".into()))?;
    if a003_part::repository::get_by_id(part_id).await?.is_none() {
        return Err(ValidationError("Díl nenalezen.".into()).into());
    }

    if let Some(event_id) = purchase.service_event_id.as_deref() {
        let uuid = Uuid::parse_str(event_id)
            .map_err(|_| ValidationError("Neplatné ID servisního zásahu.".into()))?;
        if a004_service_event::repository::get_by_id(uuid).await?.is_none() {
            return Err(ValidationError("Servisní zásah nenalezen.".into()).into());
        }
    }
    Ok(())
}

pub async fn list_by_customer(customer_id: Uuid) -> anyhow::Result<Vec<PartPurchaseListItem>> {
    let purchases = repository::list_by_customer(customer_id).await?;
    join_parts(purchases).await
}

/// Records a part sale to a customer.
/// `Ok(None)` when the customer does not exist.
pub async fn create(
    customer_id: Uuid,
    dto: PartPurchaseDto,
) -> anyhow::Result<Option<PartPurchaseListItem>> {
    if a001_customer::repository::get_by_id(customer_id).await?.is_none() {
        return Ok(None);
    }

    let mut aggregate = PartPurchase::new_for_insert(
        generate_code(),
        customer_id.to_string(),
        &dto,
        Local::now().date_naive(),
    )
    .map_err(ValidationError)?;
    aggregate.validate().map_err(ValidationError)?;
    check_references(&aggregate).await?;

    aggregate.before_write();
    repository::insert(&aggregate).await?;
    tracing::info!(
        "Part purchase {} recorded for customer {}",
        aggregate.base.code,
        customer_id
    );

    let mut items = join_parts(vec![aggregate]).await?;
    Ok(items.pop())
}

/// Applies a partial update; `Ok(None)` when the purchase does not exist
pub async fn update(
    id: Uuid,
    patch: PartPurchasePatch,
) -> anyhow::Result<Option<PartPurchaseListItem>> {
    let Some(mut aggregate) = repository::get_by_id(id).await? else {
        return Ok(None);
    };

    aggregate.apply_patch(&patch);
    aggregate.validate().map_err(ValidationError)?;
    aggregate.before_write();
    repository::update(&aggregate).await?;

    let mut items = join_parts(vec![aggregate]).await?;
    Ok(items.pop())
}

/// Soft delete
pub async fn delete(id: Uuid) -> anyhow::Result<bool> {
    repository::soft_delete(id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use contracts::domain::a003_part::PartDto;

    #[test]
    fn test_with_parts_joins_by_part_id() {
        let part = Part::new_for_insert(&PartDto {
            part_number: "BR-7".into(),
            name: "Brzdové destičky".into(),
            category: Some("brzdy".into()),
            ..Default::default()
        });
        let today = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let known = PartPurchase::new_for_insert(
            "NAK-1".into(),
            "c".into(),
            &PartPurchaseDto {
                part_id: Some(part.base.id.value().to_string()),
                unit_price: Some(480.0),
                ..Default::default()
            },
            today,
        )
        .unwrap();
        let gone = PartPurchase::new_for_insert(
            "NAK-2".into(),
            "c".into(),
            &PartPurchaseDto {
                part_id: Some(Uuid::new_v4().to_string()),
                unit_price: Some(1.0),
                ..Default::default()
            },
            today,
        )
        .unwrap();

        let items = with_parts(vec![known, gone], &[part]);

        let joined = items[0].part.as_ref().unwrap();
        assert_eq!(joined.part_number, "BR-7");
        assert_eq!(joined.name, "Brzdové destičky");
        assert_eq!(joined.category.as_deref(), Some("brzdy"));
        assert_eq!(items[0].total_price, 480.0);
        assert!(items[1].part.is_none());
    }
}
