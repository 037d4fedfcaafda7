//! Step definitions for task scheduling scenarios.

pub mod when;
