// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests Module
//!
//! - `naming`: declaration defaults and child naming
//! - `ordering`: plans respect every dependency edge for any topology size
//! - `registry_token`: bearer tokens survive the registry encoding

mod naming;
mod ordering;
mod registry_token;
