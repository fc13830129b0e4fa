//! Integration tests for the package boot lifecycle.
//!
//! These tests are implemented in:
//! `crates/modkit-runtime/tests/package_test.rs`
//!
//! Covered scenarios:
//! - `boot_without_modules_succeeds`: Idle to booted with the reserved properties service
//! - `empty_module_is_recorded_not_added`: Module outcome bookkeeping, repeated boot refused
//! - `executable_module_runs_at_boot`: Deferred execution against the finished container
//! - `erroring_executable_fails_the_boot_in_production`: Failed status, swallowed error
//! - `erroring_executable_propagates_in_debug`: Original error re-raised to the caller
//! - `connected_package_shares_its_services`: Cross-package delegated lookups
//! - `proxy_connection_resolves_once_the_target_boots`: Proxy-then-real transition
