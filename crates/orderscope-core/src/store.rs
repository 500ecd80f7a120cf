//! Order store abstraction.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::order::Order;
use crate::window::TimeWindow;

/// Read-only adapter over the persisted order records.
///
/// The store only does range/sort/filter retrieval; all group-by and
/// aggregation semantics live in the metrics engine so results are
/// uniform across store implementations. Retry policy, if any, belongs
/// to the implementation; the engine never retries.
///
/// All timestamps are in the canonical zone (UTC). Windows are
/// half-open: an order placed exactly at `window.end()` is excluded.
#[async_trait::async_trait]
pub trait OrderStore: Send + Sync + 'static {
    /// Orders of any status placed within the window.
    async fn orders_in_window(&self, window: &TimeWindow) -> anyhow::Result<Vec<Order>>;

    /// Orders whose payment reached `Paid` (including refund states),
    /// placed within the window.
    async fn paid_orders_in_window(&self, window: &TimeWindow) -> anyhow::Result<Vec<Order>>;

    /// Up to `limit` orders placed at or after `since`, newest first.
    async fn recent_orders(&self, since: DateTime<Utc>, limit: usize)
        -> anyhow::Result<Vec<Order>>;

    /// Orders in a refunded or partially-refunded payment state,
    /// placed within the window.
    async fn refunded_orders_in_window(&self, window: &TimeWindow) -> anyhow::Result<Vec<Order>>;

    /// The subset of `customer_ids` that placed at least one paid order
    /// strictly before `cutoff`. Used to split window customers into
    /// new vs returning.
    async fn customers_with_paid_orders_before(
        &self,
        cutoff: DateTime<Utc>,
        customer_ids: &[String],
    ) -> anyhow::Result<HashSet<String>>;
}
