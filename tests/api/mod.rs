//! API and service-level tests

mod pg_repository_tests;
mod thread_tests;
