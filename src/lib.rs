// Copyright 2026 d4-harvester Contributors
// SPDX-License-Identifier: Apache-2.0

//! Harvester for Wowhead's Diablo 4 database — items, skills, aspects, and
//! bosses scraped into static JSON for the companion site.
//!
//! This library crate exposes the pipeline modules for integration testing;
//! the `d4harvest` binary is a thin clap front end over [`pipeline`].

pub mod browser;
pub mod config;
pub mod extract;
pub mod model;
pub mod output;
pub mod pipeline;
