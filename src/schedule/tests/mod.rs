//! Unit tests for scheduled task registration and dispatch.
