use std::collections::HashMap;

use anyhow::Result;
use contracts::dashboards::d100_units_map::UnitMapPoint;
use contracts::domain::a001_customer::Customer;
use contracts::domain::a002_unit::Unit;

use crate::domain::{a001_customer, a002_unit};
use crate::shared::geocoding::{normalize_postal_code, Geolocated, Located, MapPointResolver};

/// Sold unit with its owner, located by the owner's postal code
#[derive(Debug, Clone)]
pub struct SoldUnit {
    pub unit: Unit,
    pub customer: Option<Customer>,
}

impl Geolocated for SoldUnit {
    fn postal_code(&self) -> Option<&str> {
        self.customer.as_ref().and_then(|c| c.zip.as_deref())
    }
}

fn pair_with_customers(units: Vec<Unit>, customers: Vec<Customer>) -> Vec<SoldUnit> {
    let by_id: HashMap<String, Customer> = customers
        .into_iter()
        .map(|c| (c.base.id.value().to_string(), c))
        .collect();

    units
        .into_iter()
        .map(|unit| {
            let customer = unit
                .customer_id
                .as_ref()
                .and_then(|id| by_id.get(id).cloned());
            SoldUnit { unit, customer }
        })
        .collect()
}

fn to_map_point(located: Located<SoldUnit>) -> UnitMapPoint {
    let Located {
        item,
        point,
        resolved,
    } = located;
    let postal_code = item.postal_code().and_then(normalize_postal_code);

    UnitMapPoint {
        id: item.unit.base.id.value().to_string(),
        serial_number: item.unit.serial_number().to_string(),
        model: item.unit.model().map(str::to_string),
        sale_date: item.unit.sale_date,
        customer_name: item.customer.as_ref().map(|c| c.name().to_string()),
        customer_city: item.customer.as_ref().and_then(|c| c.city.clone()),
        postal_code,
        lat: point.lat,
        lng: point.lng,
        resolved,
    }
}

/// Places every sold unit on the map. Units whose owner has no usable postal
/// code are kept at the fallback point.
pub async fn get_units_map(resolver: &MapPointResolver) -> Result<Vec<UnitMapPoint>> {
    let units = a002_unit::repository::list_sold().await?;

    let mut customer_ids: Vec<String> =
        units.iter().filter_map(|u| u.customer_id.clone()).collect();
    customer_ids.sort();
    customer_ids.dedup();
    let customers = a001_customer::repository::list_by_ids(&customer_ids).await?;

    let sold = pair_with_customers(units, customers);
    let located = resolver.resolve(sold).await;

    let resolved = located.iter().filter(|l| l.resolved).count();
    tracing::info!(
        "Units map: {} sold units, {} resolved, {} at fallback",
        located.len(),
        resolved,
        located.len() - resolved
    );

    Ok(located.into_iter().map(to_map_point).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::geocoding::GeoPoint;
    use contracts::domain::a001_customer::CustomerDto;
    use contracts::domain::a002_unit::UnitDto;

    fn customer(name: &str, zip: Option<&str>) -> Customer {
        Customer::new_for_insert(
            "CUS-1".into(),
            &CustomerDto {
                name: name.into(),
                city: Some("Olomouc".into()),
                zip: zip.map(str::to_string),
                ..Default::default()
            },
        )
    }

    fn sold_unit(serial: &str, owner: Option<&Customer>) -> Unit {
        Unit::new_for_insert(&UnitDto {
            serial_number: serial.into(),
            model: Some("Jawa 350".into()),
            status: Some("sold".into()),
            customer_id: owner.map(|c| c.base.id.value().to_string()),
            ..Default::default()
        })
    }

    #[test]
    fn test_pairing_uses_owner_zip() {
        let owner = customer("Eva Malá", Some("779 00"));
        let units = vec![
            sold_unit("SN-1", Some(&owner)),
            sold_unit("SN-2", Some(&owner)),
            sold_unit("SN-3", None),
        ];

        let sold = pair_with_customers(units, vec![owner]);

        assert_eq!(sold[0].postal_code(), Some("779 00"));
        assert_eq!(sold[1].postal_code(), Some("779 00"));
        assert_eq!(sold[2].postal_code(), None);
    }

    #[test]
    fn test_map_point_fields() {
        let owner = customer("Eva Malá", Some("779 00"));
        let unit = sold_unit("SN-1", Some(&owner));
        let unit_id = unit.base.id.value().to_string();
        let located = Located {
            item: SoldUnit {
                unit,
                customer: Some(owner),
            },
            point: GeoPoint {
                key: "77900".into(),
                lat: 49.59,
                lng: 17.25,
            },
            resolved: true,
        };

        let point = to_map_point(located);

        assert_eq!(point.id, unit_id);
        assert_eq!(point.serial_number, "SN-1");
        assert_eq!(point.model.as_deref(), Some("Jawa 350"));
        assert_eq!(point.customer_name.as_deref(), Some("Eva Malá"));
        assert_eq!(point.customer_city.as_deref(), Some("Olomouc"));
        assert_eq!(point.postal_code.as_deref(), Some("77900"));
        assert_eq!((point.lat, point.lng), (49.59, 17.25));
        assert!(point.resolved);
    }
}
