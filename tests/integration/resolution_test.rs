//! Integration tests for service resolution and the event pipeline.
//!
//! These tests are implemented in:
//! `crates/modkit-core/src/container/read_only.rs` (unit suite) and
//! `crates/modkit-runtime/tests/package_test.rs`
//!
//! Covered scenarios:
//! - `singleton_factory_runs_exactly_once`: Cache hit path, same instance returned
//! - `factory_kind_runs_on_every_retrieval`: Independent values per `get`
//! - `extensions_apply_in_registration_order`: Chain order and per-resolution application
//! - `delegated_values_pass_through_local_extensions_uncached`: Cross-container lookups
//! - `listener_recovery_caches_the_supplied_value`: Last-chance recovery on not-found
//! - `veto_prevents_registration_and_notifies_once`: Disable flag and host notification
//! - `listener_staged_module_joins_the_same_pass`: Reentrant module aggregation
