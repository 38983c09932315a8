//! Property-based tests for the decision tree and metrics.
