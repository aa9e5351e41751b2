// IP Info Bar - Background Services
// Copyright (C) 2026 Christos A. Daggas
// SPDX-License-Identifier: MIT

//! Services that gather network facts.
//!
//! - Provider: runs the external data script and parses its answer
//! - Cache: reuses a recent answer for a short time

pub mod cache;
pub mod provider;

pub use cache::FactsCache;
pub use provider::{Provider, ScriptProvider};
