use chrono::Utc;
use contracts::domain::a005_part_purchase::{PartPurchase, PartPurchaseId};
use contracts::domain::common::{BaseAggregate, EntityMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::entity::prelude::*;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::shared::data::db::get_connection;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a005_part_purchase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub code: String,
    pub comment: Option<String>,
    pub customer_id: String,
    pub part_id: String,
    pub service_event_id: Option<String>,
    pub purchased_at: chrono::NaiveDate,
    pub quantity: f64,
    pub unit_price: f64,
    pub currency: String,
    pub vat_rate: f64,
    pub is_deleted: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for PartPurchase {
    fn from(m: Model) -> Self {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            is_deleted: m.is_deleted,
            version: m.version,
        };
        let uuid = Uuid::parse_str(&m.id).unwrap_or_else(|_| Uuid::new_v4());

        PartPurchase {
            base: BaseAggregate::with_metadata(
                PartPurchaseId(uuid),
                m.code,
                String::new(),
                m.comment,
                metadata,
            ),
            customer_id: m.customer_id,
            part_id: m.part_id,
            service_event_id: m.service_event_id,
            purchased_at: m.purchased_at,
            quantity: m.quantity,
            unit_price: m.unit_price,
            currency: m.currency,
            vat_rate: m.vat_rate,
        }
    }
}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

/// Purchases of a customer, newest first
pub async fn list_by_customer(customer_id: Uuid) -> anyhow::Result<Vec<PartPurchase>> {
    let items = Entity::find()
        .filter(Column::CustomerId.eq(customer_id.to_string()))
        .filter(Column::IsDeleted.eq(false))
        .order_by_desc(Column::PurchasedAt)
        .order_by_desc(Column::CreatedAt)
        .all(conn())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<PartPurchase>> {
    let result = Entity::find_by_id(id.to_string())
        .filter(Column::IsDeleted.eq(false))
        .one(conn())
        .await?;
    Ok(result.map(Into::into))
}

pub async fn insert(aggregate: &PartPurchase) -> anyhow::Result<Uuid> {
    let uuid = aggregate.base.id.value();
    let active = ActiveModel {
        id: Set(uuid.to_string()),
        code: Set(aggregate.base.code.clone()),
        comment: Set(aggregate.base.comment.clone()),
        customer_id: Set(aggregate.customer_id.clone()),
        part_id: Set(aggregate.part_id.clone()),
        service_event_id: Set(aggregate.service_event_id.clone()),
        purchased_at: Set(aggregate.purchased_at),
        quantity: Set(aggregate.quantity),
        unit_price: Set(aggregate.unit_price),
        currency: Set(aggregate.currency.clone()),
        vat_rate: Set(aggregate.vat_rate),
        is_deleted: Set(aggregate.base.metadata.is_deleted),
        created_at: Set(Some(aggregate.base.metadata.created_at)),
        updated_at: Set(Some(aggregate.base.metadata.updated_at)),
        version: Set(aggregate.base.metadata.version),
    };
    active.insert(conn()).await?;
    Ok(uuid)
}

pub async fn update(aggregate: &PartPurchase) -> anyhow::Result<()> {
    let active = ActiveModel {
        id: Set(aggregate.base.id.value().to_string()),
        code: Set(aggregate.base.code.clone()),
        comment: Set(aggregate.base.comment.clone()),
        customer_id: Set(aggregate.customer_id.clone()),
        part_id: Set(aggregate.part_id.clone()),
        service_event_id: Set(aggregate.service_event_id.clone()),
        purchased_at: Set(aggregate.purchased_at),
        quantity: Set(aggregate.quantity),
        unit_price: Set(aggregate.unit_price),
        currency: Set(aggregate.currency.clone()),
        vat_rate: Set(aggregate.vat_rate),
        is_deleted: Set(aggregate.base.metadata.is_deleted),
        updated_at: Set(Some(aggregate.base.metadata.updated_at)),
        version: Set(aggregate.base.metadata.version),
        created_at: sea_orm::ActiveValue::NotSet,
    };
    active.update(conn()).await?;
    Ok(())
}

pub async fn soft_delete(id: Uuid) -> anyhow::Result<bool> {
    let result = Entity::update_many()
        .col_expr(Column::IsDeleted, Expr::value(true))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(Column::Id.eq(id.to_string()))
        .filter(Column::IsDeleted.eq(false))
        .exec(conn())
        .await?;
    Ok(result.rows_affected > 0)
}
