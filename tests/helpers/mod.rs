// ABOUTME: Shared helper modules for integration tests
// ABOUTME: Re-exports the axum request helper used by the route test suites

pub mod axum_test;
