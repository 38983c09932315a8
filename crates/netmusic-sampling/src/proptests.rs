//! Property-based tests for sample sizing.
