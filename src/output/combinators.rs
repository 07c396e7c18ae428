// Copyright (c) 2025 - Cowboy AI, Inc.
//! Output Combinators
//!
//! Free functions for joining several deferred values. All combinators are
//! pure: they build a new output without touching the engine.
//!
//! ```rust,ignore
//! use cim_multicloud_kubernetes::output::combinators::*;
//!
//! let ids = all(vec![subnet_a, subnet_b]);
//! ```

use super::deferred::Output;

/// Join a list of outputs into an output of a list
///
/// Order is preserved. An empty list resolves immediately to `vec![]`.
pub fn all<T>(outputs: Vec<Output<T>>) -> Output<Vec<T>>
where
    T: Clone + Send + Sync + 'static,
{
    outputs
        .into_iter()
        .fold(Output::known(Vec::new()), |acc, next| {
            acc.apply2(next, |mut values, value| {
                values.push(value);
                values
            })
        })
}
