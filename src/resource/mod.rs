//! Generated game resources: bounded-retry generation and approval review.
//!
//! A submitted resource is generated by [`services::GenerationExecutor`],
//! which retries failed attempts up to a configured budget and then either
//! surfaces a partial artifact for review or removes the resource. Reviewers
//! decide surfaced resources through [`services::ApprovalGate`]. Every
//! persisted transition is announced through [`services::ResourceEvents`].

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
