//! Integration tests for mte-server.
//!
//! These tests run a real listener on a loopback port and talk to it over
//! TCP:
//! - Protocol behavior per session
//! - Session isolation and concurrency
//! - Limits and shutdown

pub mod common;
