use chrono::Utc;
use contracts::domain::a003_part::{Part, PartId};
use contracts::domain::common::{BaseAggregate, EntityMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::entity::prelude::*;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::shared::data::db::get_connection;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a003_part")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub part_number: String,
    pub name: String,
    pub comment: Option<String>,
    pub category: Option<String>,
    pub stock_qty: i32,
    pub purchase_price: Option<f64>,
    pub sale_price: Option<f64>,
    pub currency: String,
    pub drawing_position: Option<i32>,
    pub is_deleted: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Part {
    fn from(m: Model) -> Self {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            is_deleted: m.is_deleted,
            version: m.version,
        };
        let uuid = Uuid::parse_str(&m.id).unwrap_or_else(|_| Uuid::new_v4());

        Part {
            base: BaseAggregate::with_metadata(
                PartId(uuid),
                m.part_number,
                m.name,
                m.comment,
                metadata,
            ),
            category: m.category,
            stock_qty: m.stock_qty,
            purchase_price: m.purchase_price,
            sale_price: m.sale_price,
            currency: m.currency,
            drawing_position: m.drawing_position,
        }
    }
}

pub(crate) fn conn() -> &'static DatabaseConnection {
    get_connection()
}

/// List filter of the parts page
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartFilter {
    pub category: Option<String>,
    pub q: Option<String>,
}

/// Ordered by drawing position (unpositioned parts first), then part number
pub async fn list(filter: &PartFilter) -> anyhow::Result<Vec<Part>> {
    let mut query = Entity::find().filter(Column::IsDeleted.eq(false));

    if let Some(category) = filter
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty() && *c != "all")
    {
        query = query.filter(Column::Category.eq(category));
    }

    if let Some(q) = filter.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        let like = format!("%{}%", q);
        query = query.filter(
            Condition::any()
                .add(Column::PartNumber.like(like.clone()))
                .add(Column::Name.like(like.clone()))
                .add(Column::Category.like(like)),
        );
    }

    // SQLite sorts NULL first on ascending order
    let items = query
        .order_by_asc(Column::DrawingPosition)
        .order_by_asc(Column::PartNumber)
        .all(conn())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

/// All live parts ordered by part number, for the CSV export
pub async fn list_by_part_number() -> anyhow::Result<Vec<Part>> {
    let items = Entity::find()
        .filter(Column::IsDeleted.eq(false))
        .order_by_asc(Column::PartNumber)
        .all(conn())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

/// Parts among `ids`, deleted ones included, in no particular order
pub async fn list_by_ids(ids: &[String]) -> anyhow::Result<Vec<Part>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let items = Entity::find()
        .filter(Column::Id.is_in(ids.iter().cloned()))
        .all(conn())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<Part>> {
    let result = Entity::find_by_id(id.to_string())
        .filter(Column::IsDeleted.eq(false))
        .one(conn())
        .await?;
    Ok(result.map(Into::into))
}

/// Live part by its natural key
pub async fn get_by_part_number(part_number: &str) -> anyhow::Result<Option<Part>> {
    let result = Entity::find()
        .filter(Column::PartNumber.eq(part_number))
        .filter(Column::IsDeleted.eq(false))
        .one(conn())
        .await?;
    Ok(result.map(Into::into))
}

pub async fn insert(aggregate: &Part) -> anyhow::Result<Uuid> {
    insert_in(conn(), aggregate).await
}

pub async fn insert_in<C: ConnectionTrait>(db: &C, aggregate: &Part) -> anyhow::Result<Uuid> {
    let uuid = aggregate.base.id.value();
    let active = ActiveModel {
        id: Set(uuid.to_string()),
        part_number: Set(aggregate.base.code.clone()),
        name: Set(aggregate.base.description.clone()),
        comment: Set(aggregate.base.comment.clone()),
        category: Set(aggregate.category.clone()),
        stock_qty: Set(aggregate.stock_qty),
        purchase_price: Set(aggregate.purchase_price),
        sale_price: Set(aggregate.sale_price),
        currency: Set(aggregate.currency.clone()),
        drawing_position: Set(aggregate.drawing_position),
        is_deleted: Set(aggregate.base.metadata.is_deleted),
        created_at: Set(Some(aggregate.base.metadata.created_at)),
        updated_at: Set(Some(aggregate.base.metadata.updated_at)),
        version: Set(aggregate.base.metadata.version),
    };
    active.insert(db).await?;
    Ok(uuid)
}

pub async fn update(aggregate: &Part) -> anyhow::Result<()> {
    let active = ActiveModel {
        id: Set(aggregate.base.id.value().to_string()),
        part_number: Set(aggregate.base.code.clone()),
        name: Set(aggregate.base.description.clone()),
        comment: Set(aggregate.base.comment.clone()),
        category: Set(aggregate.category.clone()),
        stock_qty: Set(aggregate.stock_qty),
        purchase_price: Set(aggregate.purchase_price),
        sale_price: Set(aggregate.sale_price),
        currency: Set(aggregate.currency.clone()),
        drawing_position: Set(aggregate.drawing_position),
        is_deleted: Set(aggregate.base.metadata.is_deleted),
        updated_at: Set(Some(aggregate.base.metadata.updated_at)),
        version: Set(aggregate.base.metadata.version),
        created_at: sea_orm::ActiveValue::NotSet,
    };
    active.update(conn()).await?;
    Ok(())
}

/// Sets `stock_qty` of the live part with this part number.
/// Returns the number of rows touched (0 when the part does not exist).
pub async fn set_stock_qty(part_number: &str, stock_qty: i32) -> anyhow::Result<u64> {
    set_stock_qty_in(conn(), part_number, stock_qty).await
}

pub async fn set_stock_qty_in<C: ConnectionTrait>(
    db: &C,
    part_number: &str,
    stock_qty: i32,
) -> anyhow::Result<u64> {
    let result = Entity::update_many()
        .col_expr(Column::StockQty, Expr::value(stock_qty))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
        .col_expr(Column::Version, Expr::col(Column::Version).add(1))
        .filter(Column::PartNumber.eq(part_number))
        .filter(Column::IsDeleted.eq(false))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

pub async fn soft_delete(id: Uuid) -> anyhow::Result<bool> {
    soft_delete_in(conn(), id).await
}

pub async fn soft_delete_in<C: ConnectionTrait>(db: &C, id: Uuid) -> anyhow::Result<bool> {
    let result = Entity::update_many()
        .col_expr(Column::IsDeleted, Expr::value(true))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(Column::Id.eq(id.to_string()))
        .filter(Column::IsDeleted.eq(false))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::connect_in_memory;
    use contracts::domain::a003_part::PartDto;

    fn part(number: &str) -> Part {
        let mut part = Part::new_for_insert(&PartDto {
            part_number: number.into(),
            name: "Řetěz".into(),
            ..Default::default()
        });
        part.before_write();
        part
    }

    #[tokio::test]
    async fn test_stock_update_skips_deleted_parts() {
        let db = connect_in_memory().await.unwrap();
        let live = part("R-1");
        let deleted = part("R-2");
        insert_in(&db, &live).await.unwrap();
        let deleted_id = insert_in(&db, &deleted).await.unwrap();
        assert!(soft_delete_in(&db, deleted_id).await.unwrap());

        assert_eq!(set_stock_qty_in(&db, "R-1", 9).await.unwrap(), 1);
        assert_eq!(set_stock_qty_in(&db, "R-2", 9).await.unwrap(), 0);
        assert_eq!(set_stock_qty_in(&db, "R-3", 9).await.unwrap(), 0);

        let stored = Entity::find_by_id(live.base.id.value().to_string())
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.stock_qty, 9);
        assert_eq!(stored.version, live.base.metadata.version + 1);
    }

    #[tokio::test]
    async fn test_part_number_unique_among_live_parts_only() {
        let db = connect_in_memory().await.unwrap();
        let first_id = insert_in(&db, &part("U-1")).await.unwrap();

        assert!(insert_in(&db, &part("U-1")).await.is_err());

        soft_delete_in(&db, first_id).await.unwrap();
        assert!(insert_in(&db, &part("U-1")).await.is_ok());
    }
}
