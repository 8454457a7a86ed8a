//! Backend API adapters

pub mod transport;

pub use transport::HttpTransport;
