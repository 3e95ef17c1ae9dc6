//! Unit tests for `quarry_core`.

mod analyzer_tests;
