use crate::{
    auth::UserProfile,
    db::DbPool,
    entities::category::{self, Entity as CategoryEntity},
    entities::inventory,
    entities::order::{self, Entity as OrderEntity, OrderStatus, PaymentMethod},
    entities::order_item::{self, Entity as OrderItemEntity},
    entities::product::{self, Entity as ProductEntity},
    entities::receipt::{self, Entity as ReceiptEntity},
    entities::user::Entity as UserEntity,
    errors::ServiceError,
    events::{Event, EventSender},
    pricing,
    services::inventory::InventoryService,
};
use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use prometheus::IntCounter;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

lazy_static! {
    static ref ORDER_SUBMISSIONS: IntCounter = IntCounter::new(
        "pos_orders_submitted_total",
        "Total number of orders committed"
    )
    .expect("metric can be created");
    static ref ORDER_SUBMISSION_FAILURES: IntCounter = IntCounter::new(
        "pos_order_submission_failures_total",
        "Total number of rejected order submissions"
    )
    .expect("metric can be created");
}

/// One requested cart line. Duplicate product ids across lines are legal
/// and stay independent; they are never merged.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderLine {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct SubmitOrderRequest {
    #[validate(length(min = 1, message = "At least one item is required"))]
    pub items: Vec<OrderLine>,
    #[validate(email)]
    pub customer_email: Option<String>,
    pub payment_method: Option<PaymentMethod>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategorySummary {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductSummary {
    pub id: Uuid,
    pub name: String,
    pub barcode: Option<String>,
    pub price_cents: i64,
    pub category: Option<CategorySummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price_cents: i64,
    pub line_subtotal_cents: i64,
    pub product: Option<ProductSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReceiptSummary {
    pub id: Uuid,
    pub email_sent: bool,
    pub created_at: DateTime<Utc>,
}

/// Fully-populated order graph returned by submission and lookup.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub order_number: String,
    pub status: OrderStatus,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub customer_email: Option<String>,
    pub payment_method: PaymentMethod,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItemResponse>,
    pub user: Option<UserProfile>,
    pub receipts: Vec<ReceiptSummary>,
}

/// Order header used by the listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderSummary {
    pub id: Uuid,
    pub order_number: String,
    pub user_id: Uuid,
    pub status: OrderStatus,
    pub total_cents: i64,
    pub payment_method: PaymentMethod,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderListResponse {
    pub orders: Vec<OrderSummary>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Coordinates order submission and serves the read side.
///
/// Submission is the only write path for orders, order items, and the
/// sale-side inventory decrement; all three commit together or not at
/// all.
#[derive(Clone)]
pub struct OrderService {
    db: Arc<DbPool>,
    inventory: InventoryService,
    event_sender: EventSender,
}

impl OrderService {
    pub fn new(db: Arc<DbPool>, inventory: InventoryService, event_sender: EventSender) -> Self {
        Self {
            db,
            inventory,
            event_sender,
        }
    }

    /// Submits a cart as a sale.
    ///
    /// Validates the cart against a snapshot read of products and stock,
    /// prices it, then persists the order header, its items (with
    /// snapshot prices), and the per-line stock decrements inside one
    /// transaction. Any failure inside the transaction, including a
    /// decrement losing a race with a concurrent terminal, rolls the
    /// whole submission back.
    #[instrument(skip(self, request), fields(buyer_id = %buyer_id, lines = request.items.len()))]
    pub async fn submit_order(
        &self,
        buyer_id: Uuid,
        request: SubmitOrderRequest,
    ) -> Result<OrderResponse, ServiceError> {
        match self.submit_order_inner(buyer_id, request).await {
            Ok(response) => {
                ORDER_SUBMISSIONS.inc();
                Ok(response)
            }
            Err(err) => {
                ORDER_SUBMISSION_FAILURES.inc();
                Err(err)
            }
        }
    }

    async fn submit_order_inner(
        &self,
        buyer_id: Uuid,
        request: SubmitOrderRequest,
    ) -> Result<OrderResponse, ServiceError> {
        // Reject malformed input before any read.
        request.validate()?;
        if buyer_id.is_nil() {
            return Err(ServiceError::InvalidInput("buyer id is required".into()));
        }
        for line in &request.items {
            if line.quantity < 1 {
                return Err(ServiceError::InvalidInput(format!(
                    "quantity for product {} must be at least 1",
                    line.product_id
                )));
            }
        }

        let buyer = UserEntity::find_by_id(buyer_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", buyer_id)))?;

        // One snapshot read of every referenced product with its stock row.
        let product_ids: Vec<Uuid> = request.items.iter().map(|line| line.product_id).collect();
        let loaded: Vec<(product::Model, Option<inventory::Model>)> = ProductEntity::find()
            .filter(product::Column::Id.is_in(product_ids))
            .find_also_related(crate::entities::Inventory)
            .all(&*self.db)
            .await?;
        let catalog: HashMap<Uuid, (product::Model, Option<inventory::Model>)> = loaded
            .into_iter()
            .map(|(product, stock)| (product.id, (product, stock)))
            .collect();

        // Short-circuit validation in request order: the first failing
        // line rejects the submission before any write.
        for line in &request.items {
            let (product, stock) = catalog.get(&line.product_id).ok_or_else(|| {
                ServiceError::NotFound(format!("Product {} not found", line.product_id))
            })?;
            let available = stock.as_ref().map(|row| row.quantity).unwrap_or(0);
            if available < line.quantity {
                return Err(ServiceError::InsufficientStock {
                    product_id: product.id,
                    requested: line.quantity,
                    available,
                });
            }
        }

        // Price over the snapshot, never a re-read, so the persisted
        // totals match exactly what was validated.
        let priced_lines: Vec<(i64, i32)> = request
            .items
            .iter()
            .map(|line| (catalog[&line.product_id].0.price_cents, line.quantity))
            .collect();
        let totals = pricing::price_cart(&priced_lines)?;

        let order_id = Uuid::new_v4();
        let now = Utc::now();
        let payment_method = request.payment_method.unwrap_or_default();

        let txn = self.db.begin().await?;

        let order_model = order::ActiveModel {
            id: Set(order_id),
            order_number: Set(format!(
                "ORD-{}",
                order_id.to_string()[..8].to_uppercase()
            )),
            user_id: Set(buyer.id),
            status: Set(OrderStatus::Completed),
            subtotal_cents: Set(totals.subtotal_cents),
            tax_cents: Set(totals.tax_cents),
            discount_cents: Set(totals.discount_cents),
            total_cents: Set(totals.total_cents),
            customer_email: Set(request.customer_email.clone()),
            payment_method: Set(payment_method),
            created_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let mut item_models = Vec::with_capacity(request.items.len());
        let mut low_stock = Vec::new();
        for line in &request.items {
            let (product, _) = &catalog[&line.product_id];
            let item = order_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order_id),
                product_id: Set(product.id),
                quantity: Set(line.quantity),
                unit_price_cents: Set(product.price_cents),
                line_subtotal_cents: Set(pricing::line_subtotal(product.price_cents, line.quantity)),
                created_at: Set(now),
            }
            .insert(&txn)
            .await?;
            item_models.push(item);

            // The decrement re-checks stock inside the transaction; a
            // concurrent sale that drained the product since the snapshot
            // read aborts everything here.
            let updated = self
                .inventory
                .decrement_in_txn(&txn, product.id, line.quantity)
                .await?;
            if updated.quantity <= updated.min_stock {
                low_stock.push(updated);
            }
        }

        txn.commit().await?;

        info!(
            order_id = %order_id,
            buyer_id = %buyer.id,
            total_cents = totals.total_cents,
            "order committed"
        );

        // Post-commit notifications are best-effort and never affect the
        // persisted order.
        if let Err(e) = self.event_sender.send(Event::OrderCreated(order_id)).await {
            warn!(order_id = %order_id, error = %e, "failed to publish order event");
        }
        for row in low_stock {
            if let Err(e) = self
                .event_sender
                .send(Event::LowStock {
                    product_id: row.product_id,
                    quantity: row.quantity,
                    min_stock: row.min_stock,
                })
                .await
            {
                warn!(product_id = %row.product_id, error = %e, "failed to publish low-stock event");
            }
        }

        // Assemble the response graph from the snapshot instead of
        // re-reading the rows just written.
        let category_ids: Vec<Uuid> = catalog
            .values()
            .map(|(product, _)| product.category_id)
            .collect();
        let categories: HashMap<Uuid, category::Model> = CategoryEntity::find()
            .filter(category::Column::Id.is_in(category_ids))
            .all(&*self.db)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        let items = item_models
            .into_iter()
            .map(|item| {
                let product = &catalog[&item.product_id].0;
                OrderItemResponse {
                    id: item.id,
                    product_id: item.product_id,
                    quantity: item.quantity,
                    unit_price_cents: item.unit_price_cents,
                    line_subtotal_cents: item.line_subtotal_cents,
                    product: Some(product_summary(product, categories.get(&product.category_id))),
                }
            })
            .collect();

        Ok(OrderResponse {
            id: order_model.id,
            order_number: order_model.order_number,
            status: order_model.status,
            subtotal_cents: order_model.subtotal_cents,
            tax_cents: order_model.tax_cents,
            discount_cents: order_model.discount_cents,
            total_cents: order_model.total_cents,
            customer_email: order_model.customer_email,
            payment_method: order_model.payment_method,
            created_at: order_model.created_at,
            items,
            user: Some(UserProfile::from(&buyer)),
            receipts: Vec::new(),
        })
    }

    /// Fetches one order with items, products, categories, buyer, and
    /// receipts populated.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn get_order(&self, order_id: Uuid) -> Result<OrderResponse, ServiceError> {
        let order = OrderEntity::find_by_id(order_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        let item_models = order
            .find_related(OrderItemEntity)
            .order_by_asc(order_item::Column::Id)
            .all(&*self.db)
            .await?;

        let product_ids: Vec<Uuid> = item_models.iter().map(|item| item.product_id).collect();
        let products: HashMap<Uuid, (product::Model, Option<category::Model>)> =
            ProductEntity::find()
                .filter(product::Column::Id.is_in(product_ids))
                .find_also_related(CategoryEntity)
                .all(&*self.db)
                .await?
                .into_iter()
                .map(|(product, cat)| (product.id, (product, cat)))
                .collect();

        let buyer = UserEntity::find_by_id(order.user_id).one(&*self.db).await?;

        let receipts = order
            .find_related(ReceiptEntity)
            .order_by_asc(receipt::Column::CreatedAt)
            .all(&*self.db)
            .await?
            .into_iter()
            .map(|r| ReceiptSummary {
                id: r.id,
                email_sent: r.email_sent,
                created_at: r.created_at,
            })
            .collect();

        let items = item_models
            .into_iter()
            .map(|item| {
                let product = products.get(&item.product_id).map(|(product, cat)| {
                    product_summary(product, cat.as_ref())
                });
                OrderItemResponse {
                    id: item.id,
                    product_id: item.product_id,
                    quantity: item.quantity,
                    unit_price_cents: item.unit_price_cents,
                    line_subtotal_cents: item.line_subtotal_cents,
                    product,
                }
            })
            .collect();

        Ok(OrderResponse {
            id: order.id,
            order_number: order.order_number,
            status: order.status,
            subtotal_cents: order.subtotal_cents,
            tax_cents: order.tax_cents,
            discount_cents: order.discount_cents,
            total_cents: order.total_cents,
            customer_email: order.customer_email,
            payment_method: order.payment_method,
            created_at: order.created_at,
            items,
            user: buyer.as_ref().map(UserProfile::from),
            receipts,
        })
    }

    /// Lists order headers, newest first, paginated.
    #[instrument(skip(self))]
    pub async fn list_orders(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<OrderListResponse, ServiceError> {
        let page = page.max(1);

        let paginator = OrderEntity::find()
            .order_by_desc(order::Column::CreatedAt)
            .paginate(&*self.db, per_page);

        let total = paginator.num_items().await?;
        let orders = paginator
            .fetch_page(page - 1)
            .await?
            .into_iter()
            .map(|order| OrderSummary {
                id: order.id,
                order_number: order.order_number,
                user_id: order.user_id,
                status: order.status,
                total_cents: order.total_cents,
                payment_method: order.payment_method,
                created_at: order.created_at,
            })
            .collect();

        Ok(OrderListResponse {
            orders,
            total,
            page,
            per_page,
        })
    }
}

fn product_summary(product: &product::Model, cat: Option<&category::Model>) -> ProductSummary {
    ProductSummary {
        id: product.id,
        name: product.name.clone(),
        barcode: product.barcode.clone(),
        price_cents: product.price_cents,
        category: cat.map(|c| CategorySummary {
            id: c.id,
            name: c.name.clone(),
        }),
    }
}
