use crate::{
    db::DbPool,
    entities::receipt::{self, Entity as ReceiptEntity},
    errors::ServiceError,
    events::{Event, EventSender},
    pricing::TAX_RATE_BASIS_POINTS,
    services::orders::{OrderResponse, OrderService},
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

const RECEIPT_WIDTH: usize = 40;

/// Renders and records receipts for committed orders.
///
/// Strictly post-commit: a rendering or delivery failure never touches
/// the order, and the order stays COMPLETED regardless of the outcome
/// here. Actual printing and SMTP delivery belong to external
/// collaborators fed by the event stream.
#[derive(Clone)]
pub struct ReceiptService {
    db: Arc<DbPool>,
    orders: Arc<OrderService>,
    event_sender: EventSender,
    store_name: String,
}

impl ReceiptService {
    pub fn new(
        db: Arc<DbPool>,
        orders: Arc<OrderService>,
        event_sender: EventSender,
        store_name: String,
    ) -> Self {
        Self {
            db,
            orders,
            event_sender,
            store_name,
        }
    }

    /// Renders the thermal-style receipt for an order, storing it on
    /// first render. Re-rendering returns the stored receipt so terminals
    /// can re-print.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn generate(&self, order_id: Uuid) -> Result<receipt::Model, ServiceError> {
        if let Some(existing) = ReceiptEntity::find()
            .filter(receipt::Column::OrderId.eq(order_id))
            .one(&*self.db)
            .await?
        {
            return Ok(existing);
        }

        let order = self.orders.get_order(order_id).await?;
        let body = render_receipt(&self.store_name, &order);

        let created = receipt::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(order_id),
            body: Set(body),
            email_sent: Set(false),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.db)
        .await?;

        info!(order_id = %order_id, receipt_id = %created.id, "receipt rendered");
        if let Err(e) = self
            .event_sender
            .send(Event::ReceiptGenerated {
                order_id,
                receipt_id: created.id,
            })
            .await
        {
            warn!(order_id = %order_id, error = %e, "failed to publish receipt event");
        }

        Ok(created)
    }

    /// Queues the receipt for email delivery to the order's customer
    /// email and marks it sent. Requires a customer email on the order.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn email(&self, order_id: Uuid) -> Result<receipt::Model, ServiceError> {
        let order = self.orders.get_order(order_id).await?;
        let recipient = order.customer_email.clone().ok_or_else(|| {
            ServiceError::InvalidInput(format!("Order {} has no customer email", order_id))
        })?;

        let receipt = self.generate(order_id).await?;

        let updated = if receipt.email_sent {
            receipt
        } else {
            let mut active: receipt::ActiveModel = receipt.into();
            active.email_sent = Set(true);
            active.update(&*self.db).await?
        };

        if let Err(e) = self
            .event_sender
            .send(Event::ReceiptEmailQueued {
                order_id,
                recipient: recipient.clone(),
            })
            .await
        {
            warn!(order_id = %order_id, error = %e, "failed to queue receipt email");
        }

        info!(order_id = %order_id, recipient = %recipient, "receipt email queued");
        Ok(updated)
    }
}

/// Formats integer cents as dollars, e.g. 538 -> "$5.38".
pub fn format_cents(cents: i64) -> String {
    format!("${}.{:02}", cents / 100, cents % 100)
}

/// Builds the 40-column receipt body for a populated order graph.
pub fn render_receipt(store_name: &str, order: &OrderResponse) -> String {
    let mut lines = Vec::new();

    lines.push(center(store_name));
    lines.push(center(&format!("Order {}", order.order_number)));
    lines.push(center(
        &order.created_at.format("%Y-%m-%d %H:%M UTC").to_string(),
    ));
    lines.push("-".repeat(RECEIPT_WIDTH));

    for item in &order.items {
        let name = item
            .product
            .as_ref()
            .map(|p| p.name.as_str())
            .unwrap_or("(unknown item)");
        lines.push(truncate(name));
        lines.push(two_columns(
            &format!(
                "  {} x {}",
                item.quantity,
                format_cents(item.unit_price_cents)
            ),
            &format_cents(item.line_subtotal_cents),
        ));
    }

    lines.push("-".repeat(RECEIPT_WIDTH));
    lines.push(two_columns("Subtotal", &format_cents(order.subtotal_cents)));
    lines.push(two_columns(
        &format!("Tax ({}%)", TAX_RATE_BASIS_POINTS as f64 / 100.0),
        &format_cents(order.tax_cents),
    ));
    if order.discount_cents > 0 {
        lines.push(two_columns(
            "Discount",
            &format!("-{}", format_cents(order.discount_cents)),
        ));
    }
    lines.push(two_columns("TOTAL", &format_cents(order.total_cents)));
    lines.push(two_columns(
        "Payment",
        &format!("{:?}", order.payment_method).to_uppercase(),
    ));
    lines.push(String::new());
    lines.push(center("Thank you for your purchase!"));

    lines.join("\n")
}

fn center(text: &str) -> String {
    let text = truncate(text);
    let pad = RECEIPT_WIDTH.saturating_sub(text.len()) / 2;
    format!("{}{}", " ".repeat(pad), text)
}

fn two_columns(left: &str, right: &str) -> String {
    let space = RECEIPT_WIDTH.saturating_sub(left.len() + right.len()).max(1);
    format!("{}{}{}", left, " ".repeat(space), right)
}

fn truncate(text: &str) -> String {
    if text.len() > RECEIPT_WIDTH {
        text.chars().take(RECEIPT_WIDTH - 1).collect::<String>() + "…"
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::order::{OrderStatus, PaymentMethod};
    use crate::services::orders::{OrderItemResponse, ProductSummary};
    use chrono::TimeZone;

    fn sample_order() -> OrderResponse {
        let product_id = Uuid::new_v4();
        OrderResponse {
            id: Uuid::new_v4(),
            order_number: "ORD-DEADBEEF".to_string(),
            status: OrderStatus::Completed,
            subtotal_cents: 500,
            tax_cents: 38,
            discount_cents: 0,
            total_cents: 538,
            customer_email: None,
            payment_method: PaymentMethod::Cash,
            created_at: chrono::Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap(),
            items: vec![OrderItemResponse {
                id: Uuid::new_v4(),
                product_id,
                quantity: 2,
                unit_price_cents: 250,
                line_subtotal_cents: 500,
                product: Some(ProductSummary {
                    id: product_id,
                    name: "Plain Coffee".to_string(),
                    barcode: None,
                    price_cents: 250,
                    category: None,
                }),
            }],
            user: None,
            receipts: Vec::new(),
        }
    }

    #[test]
    fn formats_cents_as_dollars() {
        assert_eq!(format_cents(538), "$5.38");
        assert_eq!(format_cents(100), "$1.00");
        assert_eq!(format_cents(5), "$0.05");
    }

    #[test]
    fn receipt_shows_totals_and_payment() {
        let body = render_receipt("POS SYSTEM", &sample_order());
        assert!(body.contains("POS SYSTEM"));
        assert!(body.contains("Order ORD-DEADBEEF"));
        assert!(body.contains("Plain Coffee"));
        assert!(body.contains("$5.38"));
        assert!(body.contains("Tax (7.5%)"));
        assert!(body.contains("CASH"));
    }

    #[test]
    fn receipt_lines_fit_the_paper_width() {
        let body = render_receipt("POS SYSTEM", &sample_order());
        for line in body.lines() {
            assert!(line.chars().count() <= RECEIPT_WIDTH, "line too wide: {line:?}");
        }
    }
}
