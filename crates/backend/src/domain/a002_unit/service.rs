use std::collections::HashMap;

use super::repository::{self, UnitFilter};
use crate::domain::a001_customer;
use crate::shared::error::ValidationError;
use contracts::domain::a001_customer::Customer;
use contracts::domain::a002_unit::{Unit, UnitDto, UnitListItem};
use uuid::Uuid;

async fn check_references(unit: &Unit) -> anyhow::Result<()> {
    if let Some(existing) = repository::get_by_serial_number(unit.serial_number()).await? {
        if existing.base.id != unit.base.id {
            return Err(ValidationError(format!(
                "Jednotka se sériovým číslem {} již existuje.",
                unit.serial_number()
            ))
            .into());
        }
    }

    if let Some(customer_id) = unit.customer_id.as_deref() {
        let uuid = Uuid::parse_str(customer_id)
            .map_err(|_| ValidationError("Neplatné ID zákazníka.".into()))?;
        if a001_customer::repository::get_by_id(uuid).await?.is_none() {
            return Err(ValidationError("Zákazník nenalezen.".into()).into());
        }
    }
    Ok(())
}

/// Attaches owner name and city to each unit
fn with_customers(units: Vec<Unit>, customers: &[Customer]) -> Vec<UnitListItem> {
    let by_id: HashMap<String, &Customer> = customers
        .iter()
        .map(|c| (c.base.id.value().to_string(), c))
        .collect();

    units
        .into_iter()
        .map(|unit| {
            let customer = unit.customer_id.as_ref().and_then(|id| by_id.get(id));
            UnitListItem {
                customer_name: customer.map(|c| c.name().to_string()),
                customer_city: customer.and_then(|c| c.city.clone()),
                unit,
            }
        })
        .collect()
}

async fn load_owners(units: &[Unit]) -> anyhow::Result<Vec<Customer>> {
    let mut ids: Vec<String> = units.iter().filter_map(|u| u.customer_id.clone()).collect();
    ids.sort();
    ids.dedup();
    a001_customer::repository::list_by_ids(&ids).await
}

pub async fn create(dto: UnitDto) -> anyhow::Result<Uuid> {
    let mut aggregate = Unit::new_for_insert(&dto);

    aggregate.validate().map_err(ValidationError)?;
    check_references(&aggregate).await?;

    aggregate.before_write();
    repository::insert(&aggregate).await
}

/// Updates a unit; `Ok(false)` when it does not exist
pub async fn update(id: Uuid, dto: UnitDto) -> anyhow::Result<bool> {
    let Some(mut aggregate) = repository::get_by_id(id).await? else {
        return Ok(false);
    };

    aggregate.update(&dto);
    aggregate.validate().map_err(ValidationError)?;
    check_references(&aggregate).await?;

    aggregate.before_write();
    repository::update(&aggregate).await?;
    Ok(true)
}

/// Soft delete
pub async fn delete(id: Uuid) -> anyhow::Result<bool> {
    repository::soft_delete(id).await
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<Unit>> {
    repository::get_by_id(id).await
}

/// Units page rows with the owning customer resolved
pub async fn list(filter: &UnitFilter) -> anyhow::Result<Vec<UnitListItem>> {
    let units = repository::list(filter).await?;
    let customers = load_owners(&units).await?;
    Ok(with_customers(units, &customers))
}

pub async fn list_by_customer(customer_id: Uuid) -> anyhow::Result<Vec<Unit>> {
    repository::list_by_customer(customer_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::domain::a001_customer::CustomerDto;

    #[test]
    fn test_with_customers_joins_by_id() {
        let customer = Customer::new_for_insert(
            "CUS-1".into(),
            &CustomerDto {
                name: "Jan Novák".into(),
                city: Some("Brno".into()),
                ..Default::default()
            },
        );
        let owned = Unit::new_for_insert(&UnitDto {
            serial_number: "SN-1".into(),
            customer_id: Some(customer.base.id.value().to_string()),
            ..Default::default()
        });
        let orphan = Unit::new_for_insert(&UnitDto {
            serial_number: "SN-2".into(),
            customer_id: Some(Uuid::new_v4().to_string()),
            ..Default::default()
        });

        let rows = with_customers(vec![owned, orphan], &[customer]);

        assert_eq!(rows[0].customer_name.as_deref(), Some("Jan Novák"));
        assert_eq!(rows[0].customer_city.as_deref(), Some("Brno"));
        assert_eq!(rows[1].customer_name, None);
        assert_eq!(rows[1].unit.serial_number(), "SN-2");
    }
}
