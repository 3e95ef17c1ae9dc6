//! Unit tests for pattern compilation and matching.
