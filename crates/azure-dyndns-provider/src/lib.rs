//! Azure DNS provider – A-record upsert over the management REST API.
//!
//! * Auth via a service-principal client credential (explicit triple or the
//!   `AZURE_*` environment variables).
//! * One `PUT` against the record-sets endpoint; CreateOrUpdate is an
//!   upsert, so there is no create-vs-update branch and no local diff.
//! * All business errors are mapped to [`azure_dyndns_core::Error`].

pub mod credentials;

use async_trait::async_trait;
use azure_dyndns_core::{Config, Error, update::DnsProvider};
use chrono::Utc;
use credentials::{fetch_token, resolve_credentials};
use reqwest::{
    Client,
    header::{CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT},
};
use serde_json::{Value, json};
use tracing::info;

const MANAGEMENT_ROOT: &str = "https://management.azure.com";
const API_VERSION: &str = "2018-05-01";
const RECORD_TTL: u64 = 300;
const CREATED_BY: &str = "azure-dyndns-rs";

pub struct AzureDnsProvider {
    cfg: Config,
    client: Client,
}

impl AzureDnsProvider {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let mut hdr = HeaderMap::new();
        hdr.insert(USER_AGENT, HeaderValue::from_static("azure-dyndns-rs (+github)"));
        hdr.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Ok(Self {
            cfg: cfg.clone(),
            client: Client::builder().default_headers(hdr).build()?,
        })
    }

    /// subscription → resource group → zone → record, one path segment each.
    fn record_set_url(&self) -> String {
        format!(
            "{MANAGEMENT_ROOT}/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Network/dnsZones/{}/A/{}?api-version={API_VERSION}",
            self.cfg.subscription_id,
            self.cfg.resource_group,
            self.cfg.zone_name,
            self.cfg.record_name,
        )
    }
}

fn record_body(ip: &str, updated: &str) -> Value {
    json!({
        "properties": {
            "TTL": RECORD_TTL,
            "ARecords": [ { "ipv4Address": ip } ],
            "metadata": {
                "createdBy": CREATED_BY,
                "updated": updated,
            }
        }
    })
}

#[async_trait]
impl DnsProvider for AzureDnsProvider {
    fn zone(&self) -> &str {
        &self.cfg.zone_name
    }
    fn record(&self) -> &str {
        &self.cfg.record_name
    }

    async fn upsert_a_record(&self, ip: &str) -> Result<Value, Error> {
        let creds = resolve_credentials(&self.cfg)?;
        let token = fetch_token(&self.client, &creds).await?;

        let body = record_body(ip, &Utc::now().to_rfc3339());
        let resp = self
            .client
            .put(self.record_set_url())
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Provider(format!("record upsert request failed: {e}")))?;

        let status = resp.status();
        let v: Value = resp
            .json()
            .await
            .map_err(|e| Error::Provider(format!("malformed record-set response: {e}")))?;
        if !status.is_success() {
            let msg = v["error"]["message"].as_str().unwrap_or("unknown error");
            return Err(Error::Provider(format!("{status}: {msg}")));
        }

        info!("Azure upserted {}.{} -> {ip}", self.cfg.record_name, self.cfg.zone_name);
        Ok(v)
    }
}
