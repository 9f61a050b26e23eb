//! GraphQL query client for the customers connection

use crate::customer::Customer;
use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::pagination::{Page, PageFetcher};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

/// Query document for one page of customers
pub const CUSTOMERS_QUERY: &str = r"query StripeCustomersQuery($cursor: String, $limit: Int) {
  stripeCustomers(after: $cursor, limit: $limit) {
    edges {
      node {
        id
        email
        created
        account_balance
        delinquent
        default_source
        livemode
        description
        subscriptions {
          data {
            id
            status
            items {
              total_count
              data {
                id
                plan {
                  id
                  name
                  currency
                }
              }
            }
          }
          total_count
        }
        discount {
          end
          subscription
        }
      }
    }
    pageInfo {
      endCursor
      hasNextPage
    }
  }
}";

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    #[serde(default)]
    data: Option<CustomersData>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CustomersData {
    stripe_customers: Option<Connection>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Connection {
    #[serde(default)]
    edges: Vec<Edge>,
    page_info: PageInfo,
}

#[derive(Debug, Deserialize)]
struct Edge {
    node: Customer,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    #[serde(default)]
    end_cursor: Option<String>,
    #[serde(default)]
    has_next_page: bool,
}

/// Fetches customer pages from a GraphQL endpoint
#[derive(Debug)]
pub struct GraphqlQueryClient {
    http: HttpClient,
    endpoint: String,
}

impl GraphqlQueryClient {
    /// Create a client posting to `endpoint`
    pub fn new(http: HttpClient, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }

    /// The endpoint queries are posted to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Request body for one page
    pub fn request_body(cursor: Option<&str>, limit: u32) -> serde_json::Value {
        json!({
            "query": CUSTOMERS_QUERY,
            "operationName": "StripeCustomersQuery",
            "variables": {
                "cursor": cursor,
                "limit": limit,
            },
        })
    }
}

#[async_trait]
impl PageFetcher<Customer> for GraphqlQueryClient {
    async fn fetch_page(&self, cursor: Option<&str>, limit: u32) -> Result<Page<Customer>> {
        debug!(endpoint = %self.endpoint, ?cursor, limit, "Querying customers");
        let response: GraphqlResponse = self
            .http
            .post_json(&self.endpoint, Self::request_body(cursor, limit))
            .await?;
        decode_page(response)
    }
}

fn decode_page(response: GraphqlResponse) -> Result<Page<Customer>> {
    if !response.errors.is_empty() {
        return Err(Error::graphql(
            response.errors.into_iter().map(|e| e.message).collect(),
        ));
    }

    let connection = response
        .data
        .ok_or_else(|| Error::decode("response has no data"))?
        .stripe_customers
        .ok_or_else(|| Error::decode("response has no stripeCustomers connection"))?;

    Ok(Page::new(
        connection.edges.into_iter().map(|edge| edge.node).collect(),
        connection.page_info.end_cursor,
        connection.page_info.has_next_page,
    ))
}

/// Decode a raw GraphQL response body into a page of customers
pub fn parse_page(body: serde_json::Value) -> Result<Page<Customer>> {
    decode_page(serde_json::from_value(body)?)
}
