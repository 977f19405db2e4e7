//! Test utilities for integration testing.
//!
//! This module provides:
//! - Test data factories for creating valid test fixtures
//! - In-memory repository implementations for mocking persistence
//! - Fakes for the payment provider and notification sink
//! - A builder for HTTP-level `AppState`

mod app_state_builder;
mod billing_mocks;
mod factories;
mod provider_mocks;

pub use app_state_builder::*;
pub use billing_mocks::*;
pub use factories::*;
pub use provider_mocks::*;
