#![allow(clippy::expect_used, clippy::unwrap_used)]
//! Integration tests against a live database.
//!
//! Each test provisions its own uniquely named database and runs the real
//! migrations against it, so tests run in parallel without contention. When
//! no database server is reachable, provisioning returns `None` and the
//! test exits without asserting anything.

mod helpers;

mod calendar;
mod meets;
