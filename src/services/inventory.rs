use crate::{
    db::DbPool,
    entities::inventory::{self, Entity as InventoryEntity},
    entities::product::{self, Entity as ProductEntity},
    errors::ServiceError,
};
use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Administrative update to a stock row. Both fields optional; values
/// must be non-negative.
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateInventoryRequest {
    #[validate(range(min = 0))]
    pub quantity: Option<i32>,
    #[validate(range(min = 0))]
    pub min_stock: Option<i32>,
}

/// The stock ledger: per-product quantity and reorder threshold.
///
/// The only mutation on the sale path is `decrement_in_txn`, which runs
/// inside the order transaction supplied by the caller and never commits
/// on its own.
#[derive(Clone)]
pub struct InventoryService {
    db: Arc<DbPool>,
}

impl InventoryService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Fetches the stock row for a product.
    #[instrument(skip(self))]
    pub async fn get_inventory(&self, product_id: Uuid) -> Result<inventory::Model, ServiceError> {
        InventoryEntity::find_by_id(product_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Inventory for product {} not found", product_id))
            })
    }

    /// Lists every stock row with its product, stable order by product name.
    #[instrument(skip(self))]
    pub async fn list_inventory(
        &self,
    ) -> Result<Vec<(inventory::Model, Option<product::Model>)>, ServiceError> {
        InventoryEntity::find()
            .find_also_related(ProductEntity)
            .order_by_asc(product::Column::Name)
            .all(&*self.db)
            .await
            .map_err(Into::into)
    }

    /// Administrative level adjustment, outside the order path.
    #[instrument(skip(self, request), fields(product_id = %product_id))]
    pub async fn update_inventory(
        &self,
        product_id: Uuid,
        request: UpdateInventoryRequest,
    ) -> Result<inventory::Model, ServiceError> {
        request.validate()?;

        let current = self.get_inventory(product_id).await?;
        let mut active: inventory::ActiveModel = current.into();
        if let Some(quantity) = request.quantity {
            active.quantity = Set(quantity);
        }
        if let Some(min_stock) = request.min_stock {
            active.min_stock = Set(min_stock);
        }
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(&*self.db).await?;
        info!(
            product_id = %product_id,
            quantity = updated.quantity,
            min_stock = updated.min_stock,
            "inventory levels updated"
        );
        Ok(updated)
    }

    /// Compare-and-decrement inside the caller's transaction.
    ///
    /// The guard `quantity >= amount` rides in the UPDATE itself, so a
    /// concurrent terminal that drained the stock between the caller's
    /// snapshot read and this statement makes the update match zero rows
    /// instead of driving the quantity negative. Zero rows is then split
    /// into `NotFound` (no ledger row) or `InsufficientStock` (named
    /// product, requested vs available).
    pub async fn decrement_in_txn(
        &self,
        txn: &DatabaseTransaction,
        product_id: Uuid,
        amount: i32,
    ) -> Result<inventory::Model, ServiceError> {
        let result = InventoryEntity::update_many()
            .col_expr(
                inventory::Column::Quantity,
                Expr::col(inventory::Column::Quantity).sub(amount),
            )
            .col_expr(inventory::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(inventory::Column::ProductId.eq(product_id))
            .filter(inventory::Column::Quantity.gte(amount))
            .exec(txn)
            .await?;

        if result.rows_affected == 0 {
            let row = InventoryEntity::find_by_id(product_id)
                .one(txn)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!(
                        "Inventory for product {} not found",
                        product_id
                    ))
                })?;
            return Err(ServiceError::InsufficientStock {
                product_id,
                requested: amount,
                available: row.quantity,
            });
        }

        InventoryEntity::find_by_id(product_id)
            .one(txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Inventory for product {} not found", product_id))
            })
    }
}
