//! Order records as read from the order store.
//!
//! Orders are immutable once persisted; this crate only reads them.
//! The pricing invariant (grand total = subtotal + shipping + tax −
//! discount, line totals sum to the subtotal) is owned by the store and
//! treated as given here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerKind {
    Retail,
    Professional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Refunded,
    PartiallyRefunded,
    Cancelled,
}

impl PaymentStatus {
    /// Whether payment reached `Paid` at some point. Refund states
    /// imply a completed payment and count as paid for revenue
    /// purposes.
    pub fn reached_paid(&self) -> bool {
        matches!(self, Self::Paid | Self::Refunded | Self::PartiallyRefunded)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShippingStatus {
    Pending,
    Shipped,
    Delivered,
}

/// One funnel stage per order: the categories are mutually exclusive
/// and exhaustive, so per-stage counts always sum to the order total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunnelStage {
    Pending,
    Paid,
    Shipped,
    Delivered,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerRef {
    /// Customer identity: the email address, as in the order store.
    pub id: String,
    pub name: String,
    pub kind: CustomerKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: String,
    pub name: String,
    pub category: String,
    pub brand: String,
    pub quantity: i64,
    pub unit_price: f64,
    /// Line total as computed at order time (`quantity × unit_price`).
    pub total: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pricing {
    pub subtotal: f64,
    pub shipping: f64,
    pub tax: f64,
    pub discount: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Refund {
    pub amount: f64,
    pub reason: Option<String>,
    pub refunded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub method: String,
    pub status: PaymentStatus,
    pub refund: Option<Refund>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shipping {
    pub method: String,
    pub status: ShippingStatus,
    pub cost: f64,
    pub estimated_delivery: Option<DateTime<Utc>>,
    pub actual_delivery: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub city: String,
    pub state: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Order number, unique in the store.
    pub id: String,
    pub customer: CustomerRef,
    pub items: Vec<LineItem>,
    pub pricing: Pricing,
    pub payment: Payment,
    pub shipping: Shipping,
    pub location: Location,
    pub placed_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Total units across all line items.
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    pub fn is_paid(&self) -> bool {
        self.payment.status.reached_paid()
    }

    /// Buckets the order into exactly one funnel stage.
    ///
    /// Cancellation wins over shipping progress; shipping progress wins
    /// over the bare paid state.
    pub fn funnel_stage(&self) -> FunnelStage {
        if self.payment.status == PaymentStatus::Cancelled {
            FunnelStage::Cancelled
        } else if self.shipping.status == ShippingStatus::Delivered {
            FunnelStage::Delivered
        } else if self.shipping.status == ShippingStatus::Shipped {
            FunnelStage::Shipped
        } else if self.is_paid() {
            FunnelStage::Paid
        } else {
            FunnelStage::Pending
        }
    }

    /// Days from placement to actual delivery. `None` for undelivered
    /// orders; they are excluded from delivery-time means, not counted
    /// as zero.
    pub fn delivery_days(&self) -> Option<f64> {
        if self.shipping.status != ShippingStatus::Delivered {
            return None;
        }
        let delivered = self.shipping.actual_delivery?;
        Some((delivered - self.placed_at).num_seconds() as f64 / 86_400.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .expect("valid rfc3339")
    }

    fn order(payment: PaymentStatus, shipping: ShippingStatus) -> Order {
        Order {
            id: "ORD-1".into(),
            customer: CustomerRef {
                id: "ana@example.com".into(),
                name: "Ana Costa".into(),
                kind: CustomerKind::Retail,
            },
            items: vec![LineItem {
                product_id: "p1".into(),
                name: "Shampoo".into(),
                category: "hair".into(),
                brand: "Acme".into(),
                quantity: 2,
                unit_price: 10.0,
                total: 20.0,
            }],
            pricing: Pricing {
                subtotal: 20.0,
                shipping: 5.0,
                tax: 0.0,
                discount: 0.0,
                total: 25.0,
            },
            payment: Payment {
                method: "credit_card".into(),
                status: payment,
                refund: None,
            },
            shipping: Shipping {
                method: "standard".into(),
                status: shipping,
                cost: 5.0,
                estimated_delivery: None,
                actual_delivery: None,
            },
            location: Location {
                city: "Lisbon".into(),
                state: "Lisboa".into(),
            },
            placed_at: ts("2025-01-10T12:00:00Z"),
            paid_at: None,
            shipped_at: None,
            delivered_at: None,
        }
    }

    #[test]
    fn funnel_stage_is_exclusive() {
        assert_eq!(
            order(PaymentStatus::Pending, ShippingStatus::Pending).funnel_stage(),
            FunnelStage::Pending
        );
        assert_eq!(
            order(PaymentStatus::Paid, ShippingStatus::Pending).funnel_stage(),
            FunnelStage::Paid
        );
        assert_eq!(
            order(PaymentStatus::Paid, ShippingStatus::Shipped).funnel_stage(),
            FunnelStage::Shipped
        );
        assert_eq!(
            order(PaymentStatus::Paid, ShippingStatus::Delivered).funnel_stage(),
            FunnelStage::Delivered
        );
        // Cancellation wins even if the order had shipped.
        assert_eq!(
            order(PaymentStatus::Cancelled, ShippingStatus::Shipped).funnel_stage(),
            FunnelStage::Cancelled
        );
        // Refunded orders completed payment.
        assert_eq!(
            order(PaymentStatus::Refunded, ShippingStatus::Pending).funnel_stage(),
            FunnelStage::Paid
        );
    }

    #[test]
    fn delivery_days_excludes_undelivered() {
        let mut o = order(PaymentStatus::Paid, ShippingStatus::Shipped);
        assert_eq!(o.delivery_days(), None);

        o.shipping.status = ShippingStatus::Delivered;
        o.shipping.actual_delivery = Some(ts("2025-01-13T12:00:00Z"));
        assert_eq!(o.delivery_days(), Some(3.0));
    }

    #[test]
    fn item_count_sums_quantities() {
        let mut o = order(PaymentStatus::Paid, ShippingStatus::Pending);
        o.items.push(LineItem {
            product_id: "p2".into(),
            name: "Conditioner".into(),
            category: "hair".into(),
            brand: "Acme".into(),
            quantity: 3,
            unit_price: 8.0,
            total: 24.0,
        });
        assert_eq!(o.item_count(), 5);
    }
}
