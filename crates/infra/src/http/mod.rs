//! Shared HTTP client

pub mod client;

pub use client::{endpoint_url, into_api_response, HttpClient, HttpClientBuilder};
