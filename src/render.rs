//! Plain-text presentation of the customer list
//!
//! Consumes a [`PaginationView`] read-only. Rendering is a pure function
//! of the view and the current time.

use crate::customer::Customer;
use crate::pagination::PaginationView;
use chrono::{DateTime, Utc};
use chrono_humanize::{Accuracy, HumanTime, Tense};
use std::fmt::Write as _;

/// Label of the load-more trigger
pub const LOAD_MORE_LABEL: &str = "[Load more]";

/// Progress indicator shown while a fetch is in flight
pub const LOADING_LABEL: &str = "Loading...";

/// "3 days ago" style time relative to `now`
pub fn relative_time(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = (now - at).max(chrono::TimeDelta::zero());
    HumanTime::from(elapsed).to_text_en(Accuracy::Rough, Tense::Past)
}

/// Render one customer as an indented block
pub fn render_customer(customer: &Customer, now: DateTime<Utc>) -> String {
    let mut out = String::from(customer.display_name());
    if customer.is_delinquent() {
        out.push_str(" [DELINQUENT]");
    }

    if let Some(description) = customer.description() {
        let _ = write!(out, "\n  {description}");
    }

    let created = customer
        .created_at()
        .map_or_else(|| "Created at an unknown time".to_string(), |at| {
            format!("Created {}", relative_time(at, now))
        });
    let _ = write!(out, "\n  {created} | {}", customer.plan_summary());

    out
}

/// What the footer under the list shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Footer {
    /// The load-more trigger
    LoadMore,
    /// Progress indicator
    Loading,
    /// Nothing; the list is exhausted
    Hidden,
}

impl Footer {
    /// Pick the footer for a view
    pub fn for_view<R>(view: &PaginationView<R>) -> Self {
        if view.loading {
            Self::Loading
        } else if view.has_next_page {
            Self::LoadMore
        } else {
            Self::Hidden
        }
    }

    /// Text of the footer, if any
    pub fn label(self) -> Option<&'static str> {
        match self {
            Self::LoadMore => Some(LOAD_MORE_LABEL),
            Self::Loading => Some(LOADING_LABEL),
            Self::Hidden => None,
        }
    }
}

/// Render the whole list with its footer and error banner
pub fn render_view(view: &PaginationView<Customer>, now: DateTime<Utc>) -> String {
    let mut blocks: Vec<String> = view
        .items
        .iter()
        .map(|customer| render_customer(customer, now))
        .collect();

    if blocks.is_empty() && !view.loading && !view.has_next_page {
        blocks.push("No customers".to_string());
    }

    if let Some(error) = &view.error {
        blocks.push(format!("Error :( {error}"));
    }

    if let Some(label) = Footer::for_view(view).label() {
        blocks.push(label.to_string());
    }

    blocks.join("\n\n")
}
