//! Query client module
//!
//! Implements the page fetch contract against the billing GraphQL API.
//! The request is a `POST` of the `StripeCustomersQuery` document with
//! `$cursor` and `$limit` variables; the response is a relay-style
//! connection of `edges[].node` plus `pageInfo`.

mod graphql;

pub use graphql::{parse_page, GraphqlQueryClient, CUSTOMERS_QUERY};
