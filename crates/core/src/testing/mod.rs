//! Hand-written port mocks for tests
//!
//! Available to other crates through the `test-utils` feature.

pub mod mocks;

pub use mocks::{
    MemoryLocation, MemoryStorage, MockTokenEndpoint, MockTransport, RecordedCall,
};
