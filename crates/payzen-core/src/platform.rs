//! Platform Management Client
//!
//! Outbound calls to the platform's subscription-management API. These are
//! the only suspension points in the gateway; everything else runs
//! synchronously inside the host request.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::{GatewayError, Result};

/// Billing terms pushed to the platform when a subscription's schedule
/// changes on the host side
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SubscriptionUpdate {
    /// Recurring amount in major currency units
    pub amount: Decimal,
    /// Platform frequency keyword (DAILY, WEEKLY, MONTHLY, YEARLY)
    pub frequency: String,
    pub interval: u32,
    pub end_date: Option<NaiveDate>,
}

/// Platform management operations (Strategy pattern)
#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// Cancel the online subscription attached to a host subscription
    async fn cancel_subscription(&self, subscription_id: u64, order_id: u64) -> Result<()>;

    /// Push updated billing terms for an online subscription
    async fn update_subscription(
        &self,
        subscription_id: u64,
        order_id: u64,
        update: &SubscriptionUpdate,
    ) -> Result<()>;

    /// Client name
    fn name(&self) -> &str;
}

/// REST client posting to the platform's management endpoint
pub struct RestPlatformClient {
    http: reqwest::Client,
    base_url: String,
    shop_id: String,
}

impl RestPlatformClient {
    pub fn new(base_url: impl Into<String>, shop_id: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            shop_id: shop_id.into(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl PlatformClient for RestPlatformClient {
    async fn cancel_subscription(&self, subscription_id: u64, order_id: u64) -> Result<()> {
        let body = serde_json::json!({
            "shopId": self.shop_id,
            "subscriptionId": subscription_id,
            "orderId": order_id,
        });

        tracing::info!(subscription_id, order_id, "Cancelling online subscription");

        self.http
            .post(self.endpoint("Subscription/Cancel"))
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }

    async fn update_subscription(
        &self,
        subscription_id: u64,
        order_id: u64,
        update: &SubscriptionUpdate,
    ) -> Result<()> {
        let body = serde_json::json!({
            "shopId": self.shop_id,
            "subscriptionId": subscription_id,
            "orderId": order_id,
            "update": update,
        });

        tracing::info!(subscription_id, order_id, "Updating online subscription");

        self.http
            .post(self.endpoint("Subscription/Update"))
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }

    fn name(&self) -> &str {
        "RestPlatform"
    }
}

/// A call recorded by [`MockPlatformClient`]
#[derive(Clone, Debug, PartialEq)]
pub enum PlatformCall {
    Cancel {
        subscription_id: u64,
        order_id: u64,
    },
    Update {
        subscription_id: u64,
        order_id: u64,
        update: SubscriptionUpdate,
    },
}

/// Mock platform client recording calls (for testing and demo purposes)
#[derive(Default)]
pub struct MockPlatformClient {
    calls: Mutex<Vec<PlatformCall>>,
    fail: bool,
}

impl MockPlatformClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails with a platform error (for propagation tests)
    pub fn failing() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn calls(&self) -> Vec<PlatformCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: PlatformCall) -> Result<()> {
        if self.fail {
            return Err(GatewayError::Platform("mock failure".into()));
        }
        self.calls.lock().unwrap().push(call);
        Ok(())
    }
}

#[async_trait]
impl PlatformClient for MockPlatformClient {
    async fn cancel_subscription(&self, subscription_id: u64, order_id: u64) -> Result<()> {
        self.record(PlatformCall::Cancel {
            subscription_id,
            order_id,
        })
    }

    async fn update_subscription(
        &self,
        subscription_id: u64,
        order_id: u64,
        update: &SubscriptionUpdate,
    ) -> Result<()> {
        self.record(PlatformCall::Update {
            subscription_id,
            order_id,
            update: update.clone(),
        })
    }

    fn name(&self) -> &str {
        "MockPlatform"
    }
}
