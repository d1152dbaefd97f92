// 🛰️ Simulated MLS feed
//
// MlsClient: fixed delay raced against a timeout, then two canned listings.
// ComparableRefresher: one debounced tokio task per address. Scheduling a
// different address aborts the pending task; results are tagged with the
// address they were fetched for so the consumer can drop stale ones.

use crate::config::MlsConfig;
use crate::entities::{ComparableListing, Condition, ListingStatus};
use crate::error::MlsError;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const MIN_ADDRESS_LEN: usize = 5;

// ============================================================================
// CLIENT
// ============================================================================

#[derive(Debug, Clone)]
pub struct MlsClient {
    delay: Duration,
    timeout: Duration,
}

impl MlsClient {
    pub fn new(delay: Duration, timeout: Duration) -> Self {
        MlsClient { delay, timeout }
    }

    pub fn from_config(config: &MlsConfig) -> Self {
        MlsClient::new(config.delay(), config.timeout())
    }

    pub async fn fetch_comparables(&self, address: &str) -> Result<Vec<ComparableListing>, MlsError> {
        if address.trim().chars().count() < MIN_ADDRESS_LEN {
            return Err(MlsError::AddressRequired);
        }

        debug!(address, "fetching MLS data");
        tokio::time::timeout(self.timeout, tokio::time::sleep(self.delay))
            .await
            .map_err(|_| MlsError::Timeout(self.timeout))?;

        let listings: Vec<_> = canned_listings(Utc::now().timestamp_millis())
            .into_iter()
            .filter(|c| !c.address.trim().is_empty() && c.list_price > 0.0 && c.sqft > 0.0)
            .collect();

        info!(address, count = listings.len(), "MLS comparables received");
        Ok(listings)
    }
}

impl Default for MlsClient {
    fn default() -> Self {
        MlsClient::from_config(&MlsConfig::default())
    }
}

fn canned_listings(base_id: i64) -> Vec<ComparableListing> {
    vec![
        ComparableListing {
            id: base_id + 1,
            address: "2105 Hillwood Dr, Clearwater, FL 33763".to_string(),
            subdivision: "Clearwater Acres".to_string(),
            distance: "0.3 mi".to_string(),
            status: ListingStatus::Active,
            list_price: 395_000.0,
            sold_price: None,
            sold_date: None,
            beds: 3,
            baths: 2.0,
            sqft: 1350.0,
            year: 1974,
            condition: Condition::Good,
            price_per_sqft: 293.0,
            days_on_market: 18,
            latitude: 27.9782,
            longitude: -82.7271,
        },
        ComparableListing {
            id: base_id + 2,
            address: "2050 Hillwood Dr, Clearwater, FL 33763".to_string(),
            subdivision: "Clearwater Acres".to_string(),
            distance: "0.2 mi".to_string(),
            status: ListingStatus::Sold,
            list_price: 410_000.0,
            sold_price: Some(405_000.0),
            sold_date: Some("6/24".to_string()),
            beds: 3,
            baths: 2.5,
            sqft: 1450.0,
            year: 1971,
            condition: Condition::Excellent,
            price_per_sqft: 279.0,
            days_on_market: 12,
            latitude: 27.9772,
            longitude: -82.7261,
        },
    ]
}

/// Keep element 0 (the subject) and replace everything after it.
pub fn merge_comparables(
    existing: &[ComparableListing],
    fetched: Vec<ComparableListing>,
) -> Vec<ComparableListing> {
    existing.first().cloned().into_iter().chain(fetched).collect()
}

// ============================================================================
// REFRESHER
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct MlsUpdate {
    pub address: String,
    pub result: Result<Vec<ComparableListing>, MlsError>,
}

pub struct ComparableRefresher {
    client: Arc<MlsClient>,
    debounce: Duration,
    pending: Option<(String, JoinHandle<()>)>,
    tx: mpsc::UnboundedSender<MlsUpdate>,
}

impl ComparableRefresher {
    pub fn new(client: MlsClient, debounce: Duration) -> (Self, mpsc::UnboundedReceiver<MlsUpdate>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let refresher = ComparableRefresher {
            client: Arc::new(client),
            debounce,
            pending: None,
            tx,
        };
        (refresher, rx)
    }

    pub fn from_config(config: &MlsConfig) -> (Self, mpsc::UnboundedReceiver<MlsUpdate>) {
        ComparableRefresher::new(MlsClient::from_config(config), config.debounce())
    }

    /// Debounced fetch for an address change. Must be called inside a tokio runtime.
    pub fn schedule(&mut self, address: &str) {
        if self.pending_address() == Some(address) {
            return;
        }
        self.spawn(address, self.debounce);
    }

    /// Fetch immediately, replacing any pending request.
    pub fn refresh_now(&mut self, address: &str) {
        self.spawn(address, Duration::ZERO);
    }

    pub fn cancel(&mut self) {
        if let Some((address, handle)) = self.pending.take() {
            if !handle.is_finished() {
                debug!(address = %address, "aborting pending MLS fetch");
            }
            handle.abort();
        }
    }

    /// Address of a fetch that has not yet delivered its result.
    pub fn pending_address(&self) -> Option<&str> {
        self.pending
            .as_ref()
            .filter(|(_, handle)| !handle.is_finished())
            .map(|(address, _)| address.as_str())
    }

    fn spawn(&mut self, address: &str, wait: Duration) {
        self.cancel();

        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        let owned = address.to_string();
        let handle = tokio::spawn(async move {
            if !wait.is_zero() {
                tokio::time::sleep(wait).await;
            }
            let result = client.fetch_comparables(&owned).await;
            if let Err(err) = &result {
                warn!(address = %owned, error = %err, "MLS fetch failed");
            }
            // Receiver gone means the dashboard shut down.
            let _ = tx.send(MlsUpdate { address: owned, result });
        });

        self.pending = Some((address.to_string(), handle));
    }
}

impl Drop for ComparableRefresher {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::sample_comparables;

    fn fast_client() -> MlsClient {
        MlsClient::new(Duration::from_millis(1500), Duration::from_secs(10))
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_returns_two_valid_listings() {
        let listings = fast_client()
            .fetch_comparables("2015 Hillwood Dr, Clearwater, FL 33763")
            .await
            .unwrap();

        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].status, ListingStatus::Active);
        assert_eq!(listings[1].sold_price, Some(405_000.0));
        assert_eq!(listings[1].id, listings[0].id + 1);

        println!("✅ MLS fetch test PASSED");
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_address_rejected() {
        let err = fast_client().fetch_comparables(" abc ").await.unwrap_err();
        assert_eq!(err, MlsError::AddressRequired);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_feed_times_out() {
        let client = MlsClient::new(Duration::from_secs(20), Duration::from_secs(10));
        let err = client.fetch_comparables("2015 Hillwood Dr").await.unwrap_err();
        assert_eq!(err, MlsError::Timeout(Duration::from_secs(10)));
    }

    #[test]
    fn test_merge_keeps_subject_only() {
        let existing = sample_comparables();
        let merged = merge_comparables(&existing, canned_listings(100));

        assert_eq!(merged.len(), 3);
        assert!(merged[0].is_subject());
        assert_eq!(merged[1].id, 101);

        assert_eq!(merge_comparables(&[], canned_listings(0)).len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_address_change_aborts_pending_fetch() {
        let (mut refresher, mut rx) = ComparableRefresher::new(fast_client(), Duration::from_secs(1));

        refresher.schedule("100 First Street");
        tokio::time::sleep(Duration::from_millis(500)).await;
        refresher.schedule("200 Second Street");
        assert_eq!(refresher.pending_address(), Some("200 Second Street"));

        let update = rx.recv().await.unwrap();
        assert_eq!(update.address, "200 Second Street");
        assert_eq!(update.result.unwrap().len(), 2);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(rx.try_recv().is_err(), "aborted fetch must not deliver");
        assert_eq!(refresher.pending_address(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rescheduling_same_address_is_debounced_once() {
        let (mut refresher, mut rx) = ComparableRefresher::new(fast_client(), Duration::from_secs(1));

        refresher.schedule("100 First Street");
        refresher.schedule("100 First Street");

        let update = rx.recv().await.unwrap();
        assert_eq!(update.address, "100 First Street");

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_fetch_is_reported() {
        let (mut refresher, mut rx) = ComparableRefresher::new(fast_client(), Duration::ZERO);
        refresher.refresh_now("abc");

        let update = rx.recv().await.unwrap();
        assert_eq!(update.result, Err(MlsError::AddressRequired));
    }
}
