//! One record-update attempt: resolve the public IP, then upsert through
//! the provider. No local "skip if unchanged" diff is performed; the
//! provider API is idempotent and every invocation is a full upsert.

use crate::{error::Error, ip::IpResolver};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Upserts a single A record. Implementations authenticate internally on
/// every call, so a rotated credential is picked up without a restart.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    fn zone(&self) -> &str;
    fn record(&self) -> &str;

    /// Create-or-update the record to point at `ip`; returns the resulting
    /// record-set representation as the provider reported it.
    async fn upsert_a_record(&self, ip: &str) -> Result<Value, Error>;
}

/// Outcome of one update attempt. Created fresh per attempt, never
/// persisted; one-shot mode prints it as a JSON object.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateResult {
    pub ip: String,
    pub record: String,
    pub zone: String,
    pub updated_at: DateTime<Utc>,
    /// Record set exactly as the provider returned it.
    pub record_set: Value,
}

pub struct RecordUpdater {
    resolver: Arc<dyn IpResolver>,
    provider: Arc<dyn DnsProvider>,
}

impl RecordUpdater {
    pub fn new(resolver: Arc<dyn IpResolver>, provider: Arc<dyn DnsProvider>) -> Self {
        Self { resolver, provider }
    }

    /// Perform one full upsert.
    ///
    /// IP discovery failures abort before any credential or provider
    /// round-trip.
    pub async fn apply(&self) -> Result<UpdateResult, Error> {
        let ip = self.resolver.current_ip().await?.to_string();
        debug!(
            "upserting {}.{} -> {ip}",
            self.provider.record(),
            self.provider.zone()
        );
        let record_set = self.provider.upsert_a_record(&ip).await?;
        Ok(UpdateResult {
            ip,
            record: self.provider.record().to_owned(),
            zone: self.provider.zone().to_owned(),
            updated_at: Utc::now(),
            record_set,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::net::Ipv4Addr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Mutex;

    struct FixedIp(Ipv4Addr);

    #[async_trait]
    impl IpResolver for FixedIp {
        async fn current_ip(&self) -> Result<Ipv4Addr, Error> {
            Ok(self.0)
        }
    }

    struct NoIp;

    #[async_trait]
    impl IpResolver for NoIp {
        async fn current_ip(&self) -> Result<Ipv4Addr, Error> {
            Err(Error::Network("discovery endpoint unreachable".into()))
        }
    }

    /// Remembers the last upserted value, like a real zone would.
    #[derive(Default)]
    struct FakeZone {
        calls: AtomicUsize,
        address: Mutex<Option<String>>,
    }

    #[async_trait]
    impl DnsProvider for FakeZone {
        fn zone(&self) -> &str {
            "z.example.com"
        }
        fn record(&self) -> &str {
            "home"
        }

        async fn upsert_a_record(&self, ip: &str) -> Result<Value, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.address.lock().await = Some(ip.to_owned());
            Ok(json!({
                "name": self.record(),
                "properties": { "TTL": 300, "ARecords": [{ "ipv4Address": ip }] }
            }))
        }
    }

    #[tokio::test]
    async fn successful_update_echoes_ip_and_record() {
        let zone = Arc::new(FakeZone::default());
        let updater = RecordUpdater::new(
            Arc::new(FixedIp(Ipv4Addr::new(203, 0, 113, 7))),
            zone.clone(),
        );

        let result = updater.apply().await.unwrap();
        assert_eq!(result.ip, "203.0.113.7");
        assert_eq!(result.record, "home");
        assert_eq!(result.zone, "z.example.com");
        assert_eq!(
            result.record_set["properties"]["ARecords"][0]["ipv4Address"],
            "203.0.113.7"
        );

        // the printed JSON carries the address, as one-shot callers rely on
        let printed: Value = serde_json::from_str(&serde_json::to_string(&result).unwrap()).unwrap();
        assert_eq!(printed["ip"], "203.0.113.7");
    }

    #[tokio::test]
    async fn ip_failure_never_reaches_the_provider() {
        let zone = Arc::new(FakeZone::default());
        let updater = RecordUpdater::new(Arc::new(NoIp), zone.clone());

        let err = updater.apply().await.unwrap_err();
        assert!(matches!(err, Error::Network(_)));
        assert_eq!(zone.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn double_apply_is_idempotent_at_the_provider() {
        let zone = Arc::new(FakeZone::default());
        let updater = RecordUpdater::new(
            Arc::new(FixedIp(Ipv4Addr::new(198, 51, 100, 4))),
            zone.clone(),
        );

        let first = updater.apply().await.unwrap();
        let second = updater.apply().await.unwrap();

        assert_eq!(zone.calls.load(Ordering::SeqCst), 2);
        assert_eq!(first.ip, second.ip);
        assert_eq!(
            zone.address.lock().await.as_deref(),
            Some("198.51.100.4"),
            "second upsert must leave the address unchanged"
        );
    }
}
