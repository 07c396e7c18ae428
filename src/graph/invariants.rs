// Copyright (c) 2025 - Cowboy AI, Inc.
//! Pure Validation Functions - Graph Invariants
//!
//! # Invariant Categories
//!
//! 1. **Naming**: logical names are non-empty and URN-safe
//! 2. **Ordering**: the dependency relation is acyclic
//! 3. **Ownership**: every owned node appears in exactly one parent's child list
//!
//! All functions are pure and deterministic: ties are broken by declaration
//! order, so the same graph always yields the same order.

use std::collections::{BTreeMap, BTreeSet};

use super::arena::DeclarationGraph;
use super::node::NodeId;
use crate::errors::{DeclarationError, DeclarationResult};

/// Separator used in engine URNs; forbidden inside logical names
const URN_SEPARATOR: &str = "::";

/// Validate a logical resource name
///
/// # Rules
/// - Must not be empty
/// - Must not contain whitespace or control characters
/// - Must not contain `::`
pub fn validate_resource_name(name: &str) -> DeclarationResult<()> {
    if name.is_empty() {
        return Err(DeclarationError::configuration("resource name cannot be empty"));
    }
    if name.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(DeclarationError::primitive(
            name,
            "resource name cannot contain whitespace or control characters",
        ));
    }
    if name.contains(URN_SEPARATOR) {
        return Err(DeclarationError::primitive(
            name,
            format!("resource name cannot contain '{}'", URN_SEPARATOR),
        ));
    }
    Ok(())
}

/// Order nodes so every dependency precedes its dependents (Kahn)
///
/// Fails with [`DeclarationError::DependencyCycle`] naming the nodes on one
/// cycle.
pub fn topological_order(graph: &DeclarationGraph) -> DeclarationResult<Vec<NodeId>> {
    let mut indegree: BTreeMap<NodeId, usize> = BTreeMap::new();
    let mut dependents: BTreeMap<NodeId, Vec<NodeId>> = BTreeMap::new();

    for node in graph.nodes() {
        let dependencies = node.dependencies();
        indegree.insert(node.id, dependencies.len());
        for dependency in dependencies {
            dependents.entry(dependency).or_default().push(node.id);
        }
    }

    let mut ready: BTreeSet<NodeId> = indegree
        .iter()
        .filter(|(_, &count)| count == 0)
        .map(|(&id, _)| id)
        .collect();
    let mut order = Vec::with_capacity(graph.len());

    while let Some(next) = ready.pop_first() {
        order.push(next);
        for &dependent in dependents.get(&next).map(Vec::as_slice).unwrap_or(&[]) {
            if let Some(count) = indegree.get_mut(&dependent) {
                *count -= 1;
                if *count == 0 {
                    ready.insert(dependent);
                }
            }
        }
    }

    if order.len() < graph.len() {
        let resolved: BTreeSet<NodeId> = order.iter().copied().collect();
        let remaining: BTreeSet<NodeId> = graph
            .nodes()
            .iter()
            .map(|node| node.id)
            .filter(|id| !resolved.contains(id))
            .collect();
        return Err(DeclarationError::DependencyCycle {
            nodes: find_cycle(graph, &remaining),
        });
    }

    Ok(order)
}

/// Group nodes into waves; nodes in the same wave share no dependency path
///
/// Wave `n` holds the nodes whose longest dependency chain has length `n`.
pub fn dependency_waves(graph: &DeclarationGraph) -> DeclarationResult<Vec<Vec<NodeId>>> {
    let order = topological_order(graph)?;
    let mut level: BTreeMap<NodeId, usize> = BTreeMap::new();
    let mut waves: Vec<Vec<NodeId>> = Vec::new();

    for id in order {
        let depth = graph
            .node(id)?
            .dependencies()
            .iter()
            .filter_map(|dependency| level.get(dependency))
            .map(|depth| depth + 1)
            .max()
            .unwrap_or(0);
        level.insert(id, depth);
        if waves.len() <= depth {
            waves.resize_with(depth + 1, Vec::new);
        }
        waves[depth].push(id);
    }

    Ok(waves)
}

/// Validate that ownership forms a forest
///
/// # Rules
/// - A node listed as a child names that component as its parent
/// - A node with a parent is listed exactly once across all child lists
pub fn validate_exclusive_ownership(graph: &DeclarationGraph) -> DeclarationResult<()> {
    let mut owners: BTreeMap<NodeId, usize> = BTreeMap::new();

    for node in graph.nodes() {
        for &child in &node.children {
            let owned = graph.node(child)?;
            if owned.parent != Some(node.id) {
                return Err(DeclarationError::primitive(
                    &owned.name,
                    format!("listed as child of {} but owned by another parent", node.name),
                ));
            }
            *owners.entry(child).or_default() += 1;
        }
    }

    for node in graph.nodes() {
        let listed = owners.get(&node.id).copied().unwrap_or(0);
        let expected = usize::from(node.parent.is_some());
        if listed != expected {
            return Err(DeclarationError::primitive(
                &node.name,
                format!("owned {} times, expected {}", listed, expected),
            ));
        }
    }

    Ok(())
}

fn find_cycle(graph: &DeclarationGraph, remaining: &BTreeSet<NodeId>) -> Vec<String> {
    let Some(&start) = remaining.iter().next() else {
        return Vec::new();
    };

    let mut path = vec![start];
    let mut current = start;
    loop {
        let next = graph
            .get(current)
            .map(|node| node.dependencies())
            .unwrap_or_default()
            .into_iter()
            .find(|dependency| remaining.contains(dependency));

        match next {
            Some(next) => {
                if let Some(pos) = path.iter().position(|&seen| seen == next) {
                    let mut cycle: Vec<String> =
                        path[pos..].iter().map(|&id| graph.name_of(id)).collect();
                    cycle.push(graph.name_of(next));
                    return cycle;
                }
                path.push(next);
                current = next;
            }
            None => return path.iter().map(|&id| graph.name_of(id)).collect(),
        }
    }
}
