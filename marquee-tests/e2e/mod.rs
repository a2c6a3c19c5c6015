//! End-to-end tests for Marquee
//!
//! These tests follow complete user workflows: opening the now-playing
//! listing, opening a movie, and typing into search, all against a mock
//! HTTP catalog or an unreachable host.

#[path = "../common.rs"]
mod common;

mod browse_workflow;
