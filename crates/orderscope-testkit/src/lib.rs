//! Test support for the orderscope crates: an in-memory [`OrderStore`]
//! and order fixture builders.
//!
//! The production store is an external collaborator; this crate exists
//! so engine and report tests can run against a deterministic double
//! without a database.

use std::collections::HashSet;
use std::time::Duration;

use anyhow::anyhow;
use chrono::{DateTime, NaiveDateTime, Utc};

use orderscope_core::order::{
    CustomerKind, CustomerRef, LineItem, Location, Order, Payment, PaymentStatus, Pricing, Refund,
    Shipping, ShippingStatus,
};
use orderscope_core::{OrderStore, TimeWindow};

/// Parse a fixture timestamp like `2025-01-10 12:00:00` (UTC).
pub fn ts(raw: &str) -> DateTime<Utc> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .expect("fixture timestamp")
        .and_utc()
}

/// In-memory [`OrderStore`] over a fixed set of orders.
///
/// `failing` and `with_latency` simulate a broken or slow store for
/// fail-fast and timeout tests.
#[derive(Default)]
pub struct MemoryOrderStore {
    orders: Vec<Order>,
    latency: Option<Duration>,
    fail_message: Option<String>,
}

impl MemoryOrderStore {
    pub fn new(orders: Vec<Order>) -> Self {
        Self {
            orders,
            ..Self::default()
        }
    }

    /// A store whose every query fails with `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            fail_message: Some(message.to_string()),
            ..Self::default()
        }
    }

    /// A store whose every query sleeps for `latency` before answering.
    pub fn with_latency(orders: Vec<Order>, latency: Duration) -> Self {
        Self {
            orders,
            latency: Some(latency),
            fail_message: None,
        }
    }

    async fn gate(&self) -> anyhow::Result<()> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if let Some(message) = &self.fail_message {
            return Err(anyhow!("{message}"));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl OrderStore for MemoryOrderStore {
    async fn orders_in_window(&self, window: &TimeWindow) -> anyhow::Result<Vec<Order>> {
        self.gate().await?;
        Ok(self
            .orders
            .iter()
            .filter(|o| window.contains(o.placed_at))
            .cloned()
            .collect())
    }

    async fn paid_orders_in_window(&self, window: &TimeWindow) -> anyhow::Result<Vec<Order>> {
        self.gate().await?;
        Ok(self
            .orders
            .iter()
            .filter(|o| window.contains(o.placed_at) && o.is_paid())
            .cloned()
            .collect())
    }

    async fn recent_orders(
        &self,
        since: DateTime<Utc>,
        limit: usize,
    ) -> anyhow::Result<Vec<Order>> {
        self.gate().await?;
        let mut recent: Vec<Order> = self
            .orders
            .iter()
            .filter(|o| o.placed_at >= since)
            .cloned()
            .collect();
        recent.sort_by(|a, b| b.placed_at.cmp(&a.placed_at).then_with(|| b.id.cmp(&a.id)));
        recent.truncate(limit);
        Ok(recent)
    }

    async fn refunded_orders_in_window(&self, window: &TimeWindow) -> anyhow::Result<Vec<Order>> {
        self.gate().await?;
        Ok(self
            .orders
            .iter()
            .filter(|o| {
                window.contains(o.placed_at)
                    && matches!(
                        o.payment.status,
                        PaymentStatus::Refunded | PaymentStatus::PartiallyRefunded
                    )
            })
            .cloned()
            .collect())
    }

    async fn customers_with_paid_orders_before(
        &self,
        cutoff: DateTime<Utc>,
        customer_ids: &[String],
    ) -> anyhow::Result<HashSet<String>> {
        self.gate().await?;
        Ok(customer_ids
            .iter()
            .filter(|id| {
                self.orders
                    .iter()
                    .any(|o| o.customer.id == **id && o.is_paid() && o.placed_at < cutoff)
            })
            .cloned()
            .collect())
    }
}

/// Fluent fixture builder. Starts from a paid, unshipped retail order
/// with no line items placed on 2025-01-15.
pub struct OrderBuilder {
    order: Order,
}

/// Shorthand for [`OrderBuilder::new`].
pub fn order(id: &str) -> OrderBuilder {
    OrderBuilder::new(id)
}

impl OrderBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            order: Order {
                id: id.to_string(),
                customer: CustomerRef {
                    id: "ana@example.com".into(),
                    name: "Ana Costa".into(),
                    kind: CustomerKind::Retail,
                },
                items: Vec::new(),
                pricing: Pricing {
                    subtotal: 0.0,
                    shipping: 0.0,
                    tax: 0.0,
                    discount: 0.0,
                    total: 0.0,
                },
                payment: Payment {
                    method: "credit_card".into(),
                    status: PaymentStatus::Paid,
                    refund: None,
                },
                shipping: Shipping {
                    method: "standard".into(),
                    status: ShippingStatus::Pending,
                    cost: 0.0,
                    estimated_delivery: None,
                    actual_delivery: None,
                },
                location: Location {
                    city: "Lisbon".into(),
                    state: "Lisboa".into(),
                },
                placed_at: ts("2025-01-15 12:00:00"),
                paid_at: None,
                shipped_at: None,
                delivered_at: None,
            },
        }
    }

    pub fn customer(mut self, id: &str, name: &str) -> Self {
        self.order.customer.id = id.to_string();
        self.order.customer.name = name.to_string();
        self
    }

    pub fn professional(mut self) -> Self {
        self.order.customer.kind = CustomerKind::Professional;
        self
    }

    pub fn placed(mut self, raw: &str) -> Self {
        self.order.placed_at = ts(raw);
        self
    }

    /// Set the grand total (and subtotal) directly, bypassing items.
    pub fn total(mut self, total: f64) -> Self {
        self.order.pricing.subtotal = total;
        self.order.pricing.total = total;
        self
    }

    /// Append a line item; subtotal and grand total grow accordingly.
    pub fn item(
        mut self,
        product_id: &str,
        name: &str,
        category: &str,
        brand: &str,
        quantity: i64,
        unit_price: f64,
    ) -> Self {
        let line_total = quantity as f64 * unit_price;
        self.order.items.push(LineItem {
            product_id: product_id.to_string(),
            name: name.to_string(),
            category: category.to_string(),
            brand: brand.to_string(),
            quantity,
            unit_price,
            total: line_total,
        });
        self.order.pricing.subtotal += line_total;
        self.order.pricing.total += line_total;
        self
    }

    pub fn payment_method(mut self, method: &str) -> Self {
        self.order.payment.method = method.to_string();
        self
    }

    pub fn payment_status(mut self, status: PaymentStatus) -> Self {
        self.order.payment.status = status;
        self
    }

    pub fn pending(self) -> Self {
        self.payment_status(PaymentStatus::Pending)
    }

    pub fn cancelled(self) -> Self {
        self.payment_status(PaymentStatus::Cancelled)
    }

    pub fn refunded(mut self, amount: f64, reason: &str, at: &str) -> Self {
        self.order.payment.status = PaymentStatus::Refunded;
        self.order.payment.refund = Some(Refund {
            amount,
            reason: Some(reason.to_string()),
            refunded_at: ts(at),
        });
        self
    }

    pub fn shipping_method(mut self, method: &str) -> Self {
        self.order.shipping.method = method.to_string();
        self
    }

    pub fn shipping_cost(mut self, cost: f64) -> Self {
        self.order.shipping.cost = cost;
        self.order.pricing.shipping = cost;
        self.order.pricing.total += cost;
        self
    }

    pub fn shipped(mut self, at: &str) -> Self {
        self.order.shipping.status = ShippingStatus::Shipped;
        self.order.shipped_at = Some(ts(at));
        self
    }

    pub fn delivered(mut self, at: &str) -> Self {
        self.order.shipping.status = ShippingStatus::Delivered;
        self.order.shipping.actual_delivery = Some(ts(at));
        self.order.delivered_at = Some(ts(at));
        self
    }

    pub fn location(mut self, city: &str, state: &str) -> Self {
        self.order.location.city = city.to_string();
        self.order.location.state = state.to_string();
        self
    }

    pub fn build(self) -> Order {
        self.order
    }
}
