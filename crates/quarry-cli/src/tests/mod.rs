//! Unit tests for the CLI runtime.

mod runner_tests;
