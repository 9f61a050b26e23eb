//! Billing customer records
//!
//! Mirrors the fields selected by the customers query. Everything except
//! `id` is optional on the wire.

use crate::pagination::Record;
use crate::types::OptionStringExt;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A billing customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    /// Customer id (`cus_...`)
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Creation time, unix seconds
    #[serde(default)]
    pub created: Option<i64>,
    #[serde(default)]
    pub account_balance: Option<i64>,
    #[serde(default)]
    pub delinquent: Option<bool>,
    #[serde(default)]
    pub default_source: Option<String>,
    #[serde(default)]
    pub livemode: Option<bool>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub subscriptions: Option<SubscriptionList>,
    #[serde(default)]
    pub discount: Option<Discount>,
}

/// A list of subscriptions with its server-side total
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionList {
    #[serde(default)]
    pub data: Vec<Subscription>,
    #[serde(default)]
    pub total_count: Option<u64>,
}

/// A customer's subscription
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    /// e.g. `active`, `trialing`, `past_due`
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub items: Option<SubscriptionItemList>,
}

/// Line items of a subscription
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionItemList {
    #[serde(default)]
    pub total_count: Option<u64>,
    #[serde(default)]
    pub data: Vec<SubscriptionItem>,
}

/// One subscription line item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionItem {
    pub id: String,
    #[serde(default)]
    pub plan: Option<Plan>,
}

/// Billing plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
}

/// Active discount on a customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discount {
    /// End of the discount, unix seconds
    #[serde(default)]
    pub end: Option<i64>,
    #[serde(default)]
    pub subscription: Option<String>,
}

impl Customer {
    /// Create a customer with only an id
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: None,
            created: None,
            account_balance: None,
            delinquent: None,
            default_source: None,
            livemode: None,
            description: None,
            subscriptions: None,
            discount: None,
        }
    }

    /// First subscription, if any
    pub fn subscription(&self) -> Option<&Subscription> {
        self.subscriptions.as_ref()?.data.first()
    }

    /// Plan of the first item of the first subscription
    pub fn plan(&self) -> Option<&Plan> {
        self.subscription()?.items.as_ref()?.data.first()?.plan.as_ref()
    }

    /// `"No plan"` or `"<name> plan (<status>)"`
    pub fn plan_summary(&self) -> String {
        match self.plan() {
            None => "No plan".to_string(),
            Some(plan) => {
                let name = plan.name.as_deref().unwrap_or(&plan.id);
                let status = self
                    .subscription()
                    .and_then(|s| s.status.as_deref())
                    .unwrap_or("unknown");
                format!("{name} plan ({status})")
            }
        }
    }

    /// Creation time as a UTC timestamp
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.created?, 0)
    }

    /// Email, falling back to the id
    pub fn display_name(&self) -> &str {
        self.email
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .unwrap_or(&self.id)
    }

    /// Description with blank values treated as absent
    pub fn description(&self) -> Option<String> {
        self.description.clone().none_if_empty()
    }

    /// Check if the customer has failed payments outstanding
    pub fn is_delinquent(&self) -> bool {
        self.delinquent.unwrap_or(false)
    }
}

impl Record for Customer {
    fn id(&self) -> &str {
        &self.id
    }
}
