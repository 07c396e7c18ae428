// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resource options: ownership, provider and ordering

use std::collections::BTreeSet;

use crate::graph::NodeId;

/// Options attached to a resource declaration
///
/// # Examples
///
/// ```rust,ignore
/// let opts = ResourceOptions::new()
///     .parent(component.id())
///     .provider(k8s.id())
///     .depends_on(argocd.id())
///     .ignore_changes(["checksum"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceOptions {
    /// Owning component
    pub parent: Option<NodeId>,
    /// Provider the resource is created through
    pub provider: Option<NodeId>,
    /// Explicit ordering constraints
    pub depends_on: BTreeSet<NodeId>,
    /// Input properties the engine must not diff
    pub ignore_changes: Vec<String>,
}

impl ResourceOptions {
    /// Create empty options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the owning component
    pub fn parent(mut self, parent: NodeId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Set the provider
    pub fn provider(mut self, provider: NodeId) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Add an explicit dependency
    pub fn depends_on(mut self, dependency: NodeId) -> Self {
        self.depends_on.insert(dependency);
        self
    }

    /// Add properties the engine must not diff
    pub fn ignore_changes<I, S>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore_changes
            .extend(properties.into_iter().map(Into::into));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_accumulates() {
        let opts = ResourceOptions::new()
            .parent(NodeId::new(0))
            .depends_on(NodeId::new(3))
            .depends_on(NodeId::new(3))
            .ignore_changes(["checksum", "version"]);

        assert_eq!(opts.parent, Some(NodeId::new(0)));
        assert_eq!(opts.depends_on.len(), 1);
        assert_eq!(opts.ignore_changes, vec!["checksum", "version"]);
        assert_eq!(opts.provider, None);
    }
}
