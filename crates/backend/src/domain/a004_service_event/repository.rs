use chrono::Utc;
use contracts::domain::a004_service_event::{ServiceEvent, ServiceEventId};
use contracts::domain::common::{BaseAggregate, EntityMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::entity::prelude::*;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::shared::data::db::get_connection;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a004_service_event")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub code: String,
    pub title: String,
    pub comment: Option<String>,
    pub customer_id: String,
    pub unit_id: Option<String>,
    pub performed_at: chrono::NaiveDate,
    pub details: Option<String>,
    pub event_type: Option<String>,
    pub labor_cost: Option<f64>,
    pub material_cost: Option<f64>,
    pub total_cost: Option<f64>,
    pub currency: String,
    pub is_deleted: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for ServiceEvent {
    fn from(m: Model) -> Self {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            is_deleted: m.is_deleted,
            version: m.version,
        };
        let uuid = Uuid::parse_str(&m.id).unwrap_or_else(|_| Uuid::new_v4());

        ServiceEvent {
            base: BaseAggregate::with_metadata(
                ServiceEventId(uuid),
                m.code,
                m.title,
                m.comment,
                metadata,
            ),
            customer_id: m.customer_id,
            unit_id: m.unit_id,
            performed_at: m.performed_at,
            details: m.details,
            event_type: m.event_type,
            labor_cost: m.labor_cost,
            material_cost: m.material_cost,
            total_cost: m.total_cost,
            currency: m.currency,
        }
    }
}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

/// Service history of a customer, newest first
pub async fn list_by_customer(customer_id: Uuid) -> anyhow::Result<Vec<ServiceEvent>> {
    let items = Entity::find()
        .filter(Column::CustomerId.eq(customer_id.to_string()))
        .filter(Column::IsDeleted.eq(false))
        .order_by_desc(Column::PerformedAt)
        .order_by_desc(Column::CreatedAt)
        .all(conn())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<ServiceEvent>> {
    let result = Entity::find_by_id(id.to_string())
        .filter(Column::IsDeleted.eq(false))
        .one(conn())
        .await?;
    Ok(result.map(Into::into))
}

pub async fn insert(aggregate: &ServiceEvent) -> anyhow::Result<Uuid> {
    let uuid = aggregate.base.id.value();
    let active = ActiveModel {
        id: Set(uuid.to_string()),
        code: Set(aggregate.base.code.clone()),
        title: Set(aggregate.base.description.clone()),
        comment: Set(aggregate.base.comment.clone()),
        customer_id: Set(aggregate.customer_id.clone()),
        unit_id: Set(aggregate.unit_id.clone()),
        performed_at: Set(aggregate.performed_at),
        details: Set(aggregate.details.clone()),
        event_type: Set(aggregate.event_type.clone()),
        labor_cost: Set(aggregate.labor_cost),
        material_cost: Set(aggregate.material_cost),
        total_cost: Set(aggregate.total_cost),
        currency: Set(aggregate.currency.clone()),
        is_deleted: Set(aggregate.base.metadata.is_deleted),
        created_at: Set(Some(aggregate.base.metadata.created_at)),
        updated_at: Set(Some(aggregate.base.metadata.updated_at)),
        version: Set(aggregate.base.metadata.version),
    };
    active.insert(conn()).await?;
    Ok(uuid)
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
