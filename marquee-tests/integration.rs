//! Integration tests for Marquee
//!
//! These tests drive the catalog client, detail lookups, the pager and the
//! search orchestrator against a mock HTTP catalog, checking the requests on
//! the wire and the classified results that come back.

#[path = "common.rs"]
mod common;

#[path = "integration/catalog_http.rs"]
mod catalog_http;
#[path = "integration/detail_lookup.rs"]
mod detail_lookup;
#[path = "integration/pager_http.rs"]
mod pager_http;
#[path = "integration/search_http.rs"]
mod search_http;
#[path = "integration/shared_catalog.rs"]
mod shared_catalog;
