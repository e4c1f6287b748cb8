use crate::{
    db::DbPool,
    entities::category::{self, Entity as CategoryEntity},
    entities::inventory::{self, Entity as InventoryEntity},
    entities::product::{self, Entity as ProductEntity},
    errors::ServiceError,
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
    #[validate(range(min = 0))]
    pub price_cents: i64,
    pub barcode: Option<String>,
    pub image_url: Option<String>,
    pub category_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0))]
    pub price_cents: Option<i64>,
    pub barcode: Option<String>,
    pub image_url: Option<String>,
    pub category_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StockSummary {
    pub quantity: i32,
    pub min_stock: i32,
}

/// Catalog view of a product with its category and stock level.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub barcode: Option<String>,
    pub image_url: Option<String>,
    pub category: Option<category::Model>,
    pub inventory: Option<StockSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Catalog administration. Mutations are manager-gated at the handler
/// boundary; creating a product also creates its one-to-one stock row so
/// every sellable product has an inventory record.
#[derive(Clone)]
pub struct ProductService {
    db: Arc<DbPool>,
}

impl ProductService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<ProductResponse>, ServiceError> {
        let products: Vec<(product::Model, Option<category::Model>)> = ProductEntity::find()
            .find_also_related(CategoryEntity)
            .order_by_asc(product::Column::Name)
            .all(&*self.db)
            .await?;

        let stock: HashMap<Uuid, inventory::Model> = InventoryEntity::find()
            .all(&*self.db)
            .await?
            .into_iter()
            .map(|row| (row.product_id, row))
            .collect();

        Ok(products
            .into_iter()
            .map(|(product, cat)| {
                let stock_row = stock.get(&product.id);
                to_response(product, cat, stock_row)
            })
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, product_id: Uuid) -> Result<ProductResponse, ServiceError> {
        let (product, cat) = ProductEntity::find_by_id(product_id)
            .find_also_related(CategoryEntity)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))?;

        let stock = product
            .find_related(InventoryEntity)
            .one(&*self.db)
            .await?;

        Ok(to_response(product, cat, stock.as_ref()))
    }

    /// Creates a product and its stock row (quantity 0) in one
    /// transaction.
    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_product(
        &self,
        request: CreateProductRequest,
    ) -> Result<ProductResponse, ServiceError> {
        request.validate()?;

        let cat = CategoryEntity::find_by_id(request.category_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Category {} not found", request.category_id))
            })?;

        if let Some(barcode) = &request.barcode {
            let duplicate = ProductEntity::find()
                .filter(product::Column::Barcode.eq(barcode.clone()))
                .one(&*self.db)
                .await?;
            if duplicate.is_some() {
                return Err(ServiceError::Conflict(format!(
                    "barcode {} already in use",
                    barcode
                )));
            }
        }

        let now = Utc::now();
        let product_id = Uuid::new_v4();

        let txn = self.db.begin().await?;

        let product = product::ActiveModel {
            id: Set(product_id),
            name: Set(request.name),
            description: Set(request.description),
            price_cents: Set(request.price_cents),
            barcode: Set(request.barcode),
            image_url: Set(request.image_url),
            category_id: Set(request.category_id),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        }
        .insert(&txn)
        .await?;

        let stock = inventory::ActiveModel {
            product_id: Set(product_id),
            quantity: Set(0),
            min_stock: Set(0),
            updated_at: Set(Some(now)),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        info!(product_id = %product_id, "product created");
        Ok(to_response(product, Some(cat), Some(&stock)))
    }

    #[instrument(skip(self, request), fields(product_id = %product_id))]
    pub async fn update_product(
        &self,
        product_id: Uuid,
        request: UpdateProductRequest,
    ) -> Result<ProductResponse, ServiceError> {
        request.validate()?;

        let product = ProductEntity::find_by_id(product_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))?;

        if let Some(category_id) = request.category_id {
            CategoryEntity::find_by_id(category_id)
                .one(&*self.db)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Category {} not found", category_id))
                })?;
        }

        let mut active: product::ActiveModel = product.into();
        if let Some(name) = request.name {
            active.name = Set(name);
        }
        if let Some(description) = request.description {
            active.description = Set(Some(description));
        }
        if let Some(price_cents) = request.price_cents {
            active.price_cents = Set(price_cents);
        }
        if let Some(barcode) = request.barcode {
            active.barcode = Set(Some(barcode));
        }
        if let Some(image_url) = request.image_url {
            active.image_url = Set(Some(image_url));
        }
        if let Some(category_id) = request.category_id {
            active.category_id = Set(category_id);
        }
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(&*self.db).await?;
        info!(product_id = %product_id, "product updated");

        let cat = updated.find_related(CategoryEntity).one(&*self.db).await?;
        let stock = updated
            .find_related(InventoryEntity)
            .one(&*self.db)
            .await?;
        Ok(to_response(updated, cat, stock.as_ref()))
    }

    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn delete_product(&self, product_id: Uuid) -> Result<(), ServiceError> {
        let product = ProductEntity::find_by_id(product_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))?;

        product.delete(&*self.db).await?;
        info!(product_id = %product_id, "product deleted");
        Ok(())
    }
}

fn to_response(
    product: product::Model,
    cat: Option<category::Model>,
    stock: Option<&inventory::Model>,
) -> ProductResponse {
    ProductResponse {
        id: product.id,
        name: product.name,
        description: product.description,
        price_cents: product.price_cents,
        barcode: product.barcode,
        image_url: product.image_url,
        category: cat,
        inventory: stock.map(|row| StockSummary {
            quantity: row.quantity,
            min_stock: row.min_stock,
        }),
        created_at: product.created_at,
        updated_at: product.updated_at,
    }
}
