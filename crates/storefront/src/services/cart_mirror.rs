//! Background copy of each user's cart to the commerce service.
//!
//! The session cart is authoritative. Every successful local mutation is
//! queued here and the request returns without waiting. A single worker
//! drains the queue in order; a failure is logged and remembered per email.
//! A single-line change that succeeds later does not prove the remote copy
//! caught up, so the failure stays until the whole remote cart is rewritten
//! (a clear or a resync). Local state is never rolled back.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{RwLock, mpsc, oneshot};
use tracing::{debug, info, instrument, warn};

use cinnamon_core::{CartSettlement, CartStore, Email, LineItem, OrderType, ProductId, Taken};

use crate::backend::{BackendClient, BackendError, RemoteCartItem};

/// A change to mirror.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorOp {
    /// Insert or replace a line.
    Upsert(RemoteCartItem),
    SetQuantity {
        product_id: ProductId,
        order_type: OrderType,
        quantity: u32,
    },
    Remove {
        product_id: ProductId,
        order_type: OrderType,
    },
    Clear,
    /// Rewrite the remote cart to hold exactly these lines.
    Replace(Vec<RemoteCartItem>),
}

impl MirrorOp {
    #[must_use]
    pub fn upsert(line: &LineItem) -> Self {
        Self::Upsert(RemoteCartItem::from(line))
    }

    /// Resync the remote copy with the whole local cart.
    #[must_use]
    pub fn replace(cart: &CartStore) -> Self {
        Self::Replace(cart.items().iter().map(RemoteCartItem::from).collect())
    }

    /// Changes that mirror what a completed payment did to the cart.
    #[must_use]
    pub fn for_settlement(settlement: &CartSettlement) -> Vec<Self> {
        match settlement {
            CartSettlement::Untouched => Vec::new(),
            CartSettlement::Cleared => vec![Self::Clear],
            CartSettlement::Lines(taken) => taken
                .iter()
                .map(|taken| match taken {
                    Taken::Removed(line) => Self::Remove {
                        product_id: line.product_id,
                        order_type: line.order_type,
                    },
                    Taken::Reduced(line) => Self::SetQuantity {
                        product_id: line.product_id,
                        order_type: line.order_type,
                        quantity: line.quantity,
                    },
                })
                .collect(),
        }
    }

    /// Whether success leaves the remote cart fully in step with the session.
    const fn rewrites_cart(&self) -> bool {
        matches!(self, Self::Clear | Self::Replace(_))
    }

    /// Short name for logs and failure reports.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Upsert(_) => "add",
            Self::SetQuantity { .. } => "update_quantity",
            Self::Remove { .. } => "remove",
            Self::Clear => "clear",
            Self::Replace(_) => "resync",
        }
    }
}

/// One queued change for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorJob {
    pub email: String,
    pub op: MirrorOp,
}

/// The last mirror failure for a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncFailure {
    pub operation: &'static str,
    pub message: String,
    pub at: DateTime<Utc>,
}

enum Command {
    Job(MirrorJob),
    Flush(oneshot::Sender<()>),
}

type FailureMap = Arc<RwLock<HashMap<String, SyncFailure>>>;

/// Handle to the mirror worker. Cheap to clone.
#[derive(Clone)]
pub struct CartMirror {
    sender: mpsc::UnboundedSender<Command>,
    failures: FailureMap,
}

impl CartMirror {
    /// Spawn the worker on the current tokio runtime.
    #[must_use]
    pub fn spawn(backend: BackendClient) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let failures = FailureMap::default();

        info!("Spawning cart mirror worker");
        tokio::spawn(run(backend, receiver, Arc::clone(&failures)));

        Self { sender, failures }
    }

    /// Queue a change for `email`. Never blocks.
    pub fn enqueue(&self, email: &Email, op: MirrorOp) {
        debug!(email = %email, operation = op.name(), "Queueing cart mirror job");
        let job = MirrorJob {
            email: email.as_str().to_string(),
            op,
        };
        if self.sender.send(Command::Job(job)).is_err() {
            warn!("Cart mirror worker is gone; dropping job");
        }
    }

    /// The outstanding failure for `email`, if any.
    pub async fn failure(&self, email: &Email) -> Option<SyncFailure> {
        self.failures.read().await.get(email.as_str()).cloned()
    }

    /// Wait until every job queued before this call has been processed.
    pub async fn flush(&self) {
        let (done, wait) = oneshot::channel();
        if self.sender.send(Command::Flush(done)).is_ok() {
            let _ = wait.await;
        }
    }
}

async fn run(
    backend: BackendClient,
    mut receiver: mpsc::UnboundedReceiver<Command>,
    failures: FailureMap,
) {
    while let Some(command) = receiver.recv().await {
        match command {
            Command::Job(job) => apply(&backend, &failures, job).await,
            Command::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    info!("Cart mirror worker stopped");
}

#[instrument(skip(backend, failures, job), fields(email = %job.email, operation = job.op.name()))]
async fn apply(backend: &BackendClient, failures: &FailureMap, job: MirrorJob) {
    let operation = job.op.name();
    match send(backend, &job).await {
        Ok(()) if job.op.rewrites_cart() => {
            if failures.write().await.remove(&job.email).is_some() {
                info!("Cart mirror recovered");
            }
        }
        Ok(()) => {}
        Err(e) => {
            warn!(error = %e, "Cart mirror failed; local cart kept");
            failures.write().await.insert(
                job.email,
                SyncFailure {
                    operation,
                    message: e.to_string(),
                    at: Utc::now(),
                },
            );
        }
    }
}

async fn send(backend: &BackendClient, job: &MirrorJob) -> Result<(), BackendError> {
    let email = job.email.as_str();
    match &job.op {
        MirrorOp::Upsert(item) => backend.upsert_remote_item(email, item).await,
        MirrorOp::SetQuantity {
            product_id,
            order_type,
            quantity,
        } => {
            backend
                .update_remote_quantity(email, *product_id, *order_type, *quantity)
                .await
        }
        MirrorOp::Remove {
            product_id,
            order_type,
        } => {
            backend
                .remove_remote_item(email, *product_id, *order_type)
                .await
        }
        MirrorOp::Clear => backend.clear_remote_cart(email).await,
        MirrorOp::Replace(items) => {
            backend.clear_remote_cart(email).await?;
            for item in items {
                backend.upsert_remote_item(email, item).await?;
            }
            Ok(())
        }
    }
}

/// Fetch the persisted cart for `email` as cart lines.
///
/// Each line is re-priced from the catalog; a product the catalog no longer
/// lists is dropped.
///
/// # Errors
///
/// Returns an error if the commerce service or the catalog cannot be reached.
pub async fn pull(backend: &BackendClient, email: &Email) -> Result<Vec<LineItem>, BackendError> {
    let items = backend.fetch_remote_cart(email.as_str()).await?;
    let mut lines = Vec::with_capacity(items.len());
    for item in items {
        match backend.get_product(item.product_id).await {
            Ok(product) => lines.push(item.into_line(&product)),
            Err(BackendError::NotFound(_)) => {
                debug!(product_id = %item.product_id, "Dropping saved line for unlisted product");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(lines)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::BackendUrls;

    fn backend(server: &MockServer) -> BackendClient {
        let base = Url::parse(&server.uri()).unwrap();
        BackendClient::new(BackendUrls::single(&base), Duration::from_secs(60))
    }

    fn email() -> Email {
        Email::parse("jane@example.com").unwrap()
    }

    fn line(id: i64, quantity: u32) -> LineItem {
        LineItem {
            product_id: ProductId::new(id),
            name: "Cinnamon Powder".to_string(),
            unit_price: cinnamon_core::Price::usd(rust_decimal::Decimal::from(20)),
            image_ref: None,
            quantity,
            order_type: OrderType::Single,
            added_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_failure_recorded_then_cleared() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/cart/database/jane%40example.com"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/cart/database/jane%40example.com"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let mirror = CartMirror::spawn(backend(&server));

        mirror.enqueue(&email(), MirrorOp::Clear);
        mirror.flush().await;
        let failure = mirror.failure(&email()).await.unwrap();
        assert_eq!(failure.operation, "clear");
        assert!(failure.message.contains("unavailable"));

        mirror.enqueue(&email(), MirrorOp::Clear);
        mirror.flush().await;
        assert!(mirror.failure(&email()).await.is_none());
    }

    #[tokio::test]
    async fn test_line_success_does_not_hide_earlier_failure() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/cart/database/jane%40example.com/items/2/bulk"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/api/cart/database/jane%40example.com/items/1/single"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/cart/database/jane%40example.com"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/cart/database/jane%40example.com/items"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let mirror = CartMirror::spawn(backend(&server));
        mirror.enqueue(
            &email(),
            MirrorOp::Remove {
                product_id: ProductId::new(2),
                order_type: OrderType::Bulk,
            },
        );
        mirror.enqueue(
            &email(),
            MirrorOp::SetQuantity {
                product_id: ProductId::new(1),
                order_type: OrderType::Single,
                quantity: 3,
            },
        );
        mirror.flush().await;
        assert_eq!(mirror.failure(&email()).await.unwrap().operation, "remove");

        let cart = CartStore::restore(vec![line(1, 3)]);
        mirror.enqueue(&email(), MirrorOp::replace(&cart));
        mirror.flush().await;
        assert!(mirror.failure(&email()).await.is_none());
    }

    #[test]
    fn test_settlement_ops() {
        assert!(MirrorOp::for_settlement(&CartSettlement::Untouched).is_empty());
        assert_eq!(
            MirrorOp::for_settlement(&CartSettlement::Cleared),
            vec![MirrorOp::Clear]
        );

        let mut reduced = line(1, 3);
        reduced.quantity = 2;
        let ops = MirrorOp::for_settlement(&CartSettlement::Lines(vec![
            Taken::Reduced(reduced),
            Taken::Removed(line(2, 1)),
        ]));
        assert_eq!(
            ops,
            vec![
                MirrorOp::SetQuantity {
                    product_id: ProductId::new(1),
                    order_type: OrderType::Single,
                    quantity: 2,
                },
                MirrorOp::Remove {
                    product_id: ProductId::new(2),
                    order_type: OrderType::Single,
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_jobs_run_in_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/cart/database/jane%40example.com/items"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/api/cart/database/jane%40example.com/items/1/single"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let mirror = CartMirror::spawn(backend(&server));
        mirror.enqueue(&email(), MirrorOp::upsert(&line(1, 1)));
        mirror.enqueue(
            &email(),
            MirrorOp::SetQuantity {
                product_id: ProductId::new(1),
                order_type: OrderType::Single,
                quantity: 3,
            },
        );
        mirror.flush().await;

        let requests = server.received_requests().await.unwrap();
        let methods: Vec<_> = requests.iter().map(|r| r.method.to_string()).collect();
        assert_eq!(methods, vec!["POST", "PUT"]);
        assert!(mirror.failure(&email()).await.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_service_is_a_failure() {
        let base = Url::parse("http://127.0.0.1:9").unwrap();
        let backend = BackendClient::new(BackendUrls::single(&base), Duration::from_secs(60));
        let mirror = CartMirror::spawn(backend);

        mirror.enqueue(
            &email(),
            MirrorOp::Remove {
                product_id: ProductId::new(2),
                order_type: OrderType::Bulk,
            },
        );
        mirror.flush().await;
        assert_eq!(mirror.failure(&email()).await.unwrap().operation, "remove");
    }
}
