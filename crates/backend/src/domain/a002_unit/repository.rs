use chrono::Utc;
use contracts::domain::a002_unit::{PrepStatus, Unit, UnitId, UnitStatus};
use contracts::domain::common::{BaseAggregate, EntityMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::entity::prelude::*;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::shared::data::db::get_connection;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a002_unit")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub serial_number: String,
    pub model: String,
    pub comment: Option<String>,
    pub status: String,
    pub prep_status: String,
    pub warehouse_location: Option<String>,
    pub customer_id: Option<String>,
    pub purchase_price: Option<f64>,
    pub purchase_currency: String,
    pub purchase_date: Option<chrono::NaiveDate>,
    pub sale_date: Option<chrono::NaiveDate>,
    pub sale_price: Option<f64>,
    pub currency: String,
    pub vat_rate: Option<f64>,
    pub is_deleted: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Unit {
    fn from(m: Model) -> Self {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            is_deleted: m.is_deleted,
            version: m.version,
        };
        let uuid = Uuid::parse_str(&m.id).unwrap_or_else(|_| Uuid::new_v4());

        Unit {
            base: BaseAggregate::with_metadata(
                UnitId(uuid),
                m.serial_number,
                m.model,
                m.comment,
                metadata,
            ),
            status: UnitStatus::parse(&m.status).unwrap_or_default(),
            prep_status: PrepStatus::parse(&m.prep_status).unwrap_or_default(),
            warehouse_location: m.warehouse_location,
            customer_id: m.customer_id,
            purchase_price: m.purchase_price,
            purchase_currency: m.purchase_currency,
            purchase_date: m.purchase_date,
            sale_date: m.sale_date,
            sale_price: m.sale_price,
            currency: m.currency,
            vat_rate: m.vat_rate,
        }
    }
}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

/// List filter of the units page
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UnitFilter {
    pub q: Option<String>,
    pub status: Option<String>,
}

pub async fn list(filter: &UnitFilter) -> anyhow::Result<Vec<Unit>> {
    let mut query = Entity::find().filter(Column::IsDeleted.eq(false));

    if let Some(status) = filter
        .status
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != "all")
    {
        query = query.filter(Column::Status.eq(status));
    }

    if let Some(q) = filter.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        let like = format!("%{}%", q);
        query = query.filter(
            Condition::any()
                .add(Column::SerialNumber.like(like.clone()))
                .add(Column::Model.like(like.clone()))
                .add(Column::WarehouseLocation.like(like.clone()))
                .add(Column::Comment.like(like)),
        );
    }

    let items = query
        .order_by_desc(Column::CreatedAt)
        .all(conn())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

pub async fn list_by_customer(customer_id: Uuid) -> anyhow::Result<Vec<Unit>> {
    let items = Entity::find()
        .filter(Column::CustomerId.eq(customer_id.to_string()))
        .filter(Column::IsDeleted.eq(false))
        .order_by_desc(Column::SaleDate)
        .all(conn())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

/// Live units in status `sold`, most recent sale first
pub async fn list_sold() -> anyhow::Result<Vec<Unit>> {
    let items = Entity::find()
        .filter(Column::Status.eq(UnitStatus::Sold.as_str()))
        .filter(Column::IsDeleted.eq(false))
        .order_by_desc(Column::SaleDate)
        .order_by_asc(Column::SerialNumber)
        .all(conn())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<Unit>> {
    let result = Entity::find_by_id(id.to_string())
        .filter(Column::IsDeleted.eq(false))
        .one(conn())
        .await?;
    Ok(result.map(Into::into))
}

pub async fn get_by_serial_number(serial_number: &str) -> anyhow::Result<Option<Unit>> {
    let result = Entity::find()
        .filter(Column::SerialNumber.eq(serial_number))
        .filter(Column::IsDeleted.eq(false))
        .one(conn())
        .await?;
    Ok(result.map(Into::into))
}

pub async fn insert(aggregate: &Unit) -> anyhow::Result<Uuid> {
    let uuid = aggregate.base.id.value();
    let active = ActiveModel {
        id: Set(uuid.to_string()),
        serial_number: Set(aggregate.base.code.clone()),
        model: Set(aggregate.base.description.clone()),
        comment: Set(aggregate.base.comment.clone()),
        status: Set(aggregate.status.as_str().to_string()),
        prep_status: Set(aggregate.prep_status.as_str().to_string()),
        warehouse_location: Set(aggregate.warehouse_location.clone()),
        customer_id: Set(aggregate.customer_id.clone()),
        purchase_price: Set(aggregate.purchase_price),
        purchase_currency: Set(aggregate.purchase_currency.clone()),
        purchase_date: Set(aggregate.purchase_date),
        sale_date: Set(aggregate.sale_date),
        sale_price: Set(aggregate.sale_price),
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

pub async fn update(aggregate: &Unit) -> anyhow::Result<()> {
    let active = ActiveModel {
        id: Set(aggregate.base.id.value().to_string()),
        serial_number: Set(aggregate.base.code.clone()),
        model: Set(aggregate.base.description.clone()),
        comment: Set(aggregate.base.comment.clone()),
        status: Set(aggregate.status.as_str().to_string()),
        prep_status: Set(aggregate.prep_status.as_str().to_string()),
        warehouse_location: Set(aggregate.warehouse_location.clone()),
        customer_id: Set(aggregate.customer_id.clone()),
        purchase_price: Set(aggregate.purchase_price),
        purchase_currency: Set(aggregate.purchase_currency.clone()),
        purchase_date: Set(aggregate.purchase_date),
        sale_date: Set(aggregate.sale_date),
        sale_price: Set(aggregate.sale_price),
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
