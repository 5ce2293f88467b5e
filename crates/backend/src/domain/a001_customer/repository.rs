use chrono::Utc;
use contracts::domain::a001_customer::{Customer, CustomerId, CustomerStatus};
use contracts::domain::common::{BaseAggregate, EntityMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::entity::prelude::*;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::shared::data::db::get_connection;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a001_customer")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub code: String,
    pub name: String,
    pub comment: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
    pub status: String,
    pub source: Option<String>,
    pub next_action_at: Option<chrono::NaiveDate>,
    pub is_hot: bool,
    pub is_deleted: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Customer {
    fn from(m: Model) -> Self {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            is_deleted: m.is_deleted,
            version: m.version,
        };
        let uuid = Uuid::parse_str(&m.id).unwrap_or_else(|_| Uuid::new_v4());

        Customer {
            base: BaseAggregate::with_metadata(
                CustomerId(uuid),
                m.code,
                m.name,
                m.comment,
                metadata,
            ),
            phone: m.phone,
            email: m.email,
            street: m.street,
            city: m.city,
            zip: m.zip,
            country: m.country,
            status: CustomerStatus::parse_or_default(Some(&m.status)),
            source: m.source,
            next_action_at: m.next_action_at,
            is_hot: m.is_hot,
        }
    }
}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

/// List filter of the customers page
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerFilter {
    pub q: Option<String>,
    pub status: Option<String>,
}

pub async fn list(filter: &CustomerFilter) -> anyhow::Result<Vec<Customer>> {
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
                .add(Column::Name.like(like.clone()))
                .add(Column::Code.like(like.clone()))
                .add(Column::Email.like(like.clone()))
                .add(Column::Phone.like(like.clone()))
                .add(Column::City.like(like)),
        );
    }

    let items = query
        .order_by_asc(Column::Name)
        .all(conn())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

/// Live customers among `ids`, in no particular order
pub async fn list_by_ids(ids: &[String]) -> anyhow::Result<Vec<Customer>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let items = Entity::find()
        .filter(Column::Id.is_in(ids.iter().cloned()))
        .filter(Column::IsDeleted.eq(false))
        .all(conn())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<Customer>> {
    let result = Entity::find_by_id(id.to_string())
        .filter(Column::IsDeleted.eq(false))
        .one(conn())
        .await?;
    Ok(result.map(Into::into))
}

pub async fn insert(aggregate: &Customer) -> anyhow::Result<Uuid> {
    let uuid = aggregate.base.id.value();
    let active = ActiveModel {
        id: Set(uuid.to_string()),
        code: Set(aggregate.base.code.clone()),
        name: Set(aggregate.base.description.clone()),
        comment: Set(aggregate.base.comment.clone()),
        phone: Set(aggregate.phone.clone()),
        email: Set(aggregate.email.clone()),
        street: Set(aggregate.street.clone()),
        city: Set(aggregate.city.clone()),
        zip: Set(aggregate.zip.clone()),
        country: Set(aggregate.country.clone()),
        status: Set(aggregate.status.as_str().to_string()),
        source: Set(aggregate.source.clone()),
        next_action_at: Set(aggregate.next_action_at),
        is_hot: Set(aggregate.is_hot),
        is_deleted: Set(aggregate.base.metadata.is_deleted),
        created_at: Set(Some(aggregate.base.metadata.created_at)),
        updated_at: Set(Some(aggregate.base.metadata.updated_at)),
        version: Set(aggregate.base.metadata.version),
    };
    active.insert(conn()).await?;
    Ok(uuid)
}

pub async fn update(aggregate: &Customer) -> anyhow::Result<()> {
    let active = ActiveModel {
        id: Set(aggregate.base.id.value().to_string()),
        code: Set(aggregate.base.code.clone()),
        name: Set(aggregate.base.description.clone()),
        comment: Set(aggregate.base.comment.clone()),
        phone: Set(aggregate.phone.clone()),
        email: Set(aggregate.email.clone()),
        street: Set(aggregate.street.clone()),
        city: Set(aggregate.city.clone()),
        zip: Set(aggregate.zip.clone()),
        country: Set(aggregate.country.clone()),
        status: Set(aggregate.status.as_str().to_string()),
        source: Set(aggregate.source.clone()),
        next_action_at: Set(aggregate.next_action_at),
        is_hot: Set(aggregate.is_hot),
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
