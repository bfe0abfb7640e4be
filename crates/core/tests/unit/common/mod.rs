//! Unit tests for shared components.
