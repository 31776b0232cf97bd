//! Upstream GraphQL access: the one-shot client and the fixed query set

pub mod client;
pub mod queries;

pub use client::{build_http_client, GraphQLClient};
