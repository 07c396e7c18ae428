// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Plan Ordering
//!
//! For any number of spokes, the plan's creation order and its waves must
//! place every node after everything it depends on.

use cim_multicloud_kubernetes::graph::PrimitiveKind;
use cim_multicloud_kubernetes::topology::{ClusterSpec, HubSpokeTopology};
use cim_multicloud_kubernetes::{ProviderId, StackConfig, StackContext};
use proptest::prelude::*;
use std::collections::BTreeMap;

fn spoke_providers() -> impl Strategy<Value = Vec<ProviderId>> {
    prop::collection::vec(
        prop_oneof![Just(ProviderId::Aws), Just(ProviderId::Azure)],
        0..4,
    )
}

fn topology(hub: ProviderId, spokes: &[ProviderId]) -> HubSpokeTopology {
    HubSpokeTopology {
        hub: ClusterSpec::new("hub", hub, "1.33", "westeurope"),
        spokes: spokes
            .iter()
            .enumerate()
            .map(|(i, provider)| {
                ClusterSpec::new(format!("spoke-{}", i + 1), provider.clone(), "1.33", "us-east-1")
            })
            .collect(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Property: Order and waves respect every edge
    #[test]
    fn prop_plan_respects_edges(
        hub in prop_oneof![Just(ProviderId::Aws), Just(ProviderId::Azure)],
        spokes in spoke_providers(),
    ) {
        let mut ctx = StackContext::new(StackConfig::default()).unwrap();
        topology(hub, &spokes).declare(&mut ctx).unwrap();
        let plan = ctx.plan().unwrap();

        prop_assert_eq!(plan.order.len(), plan.graph.len());

        let mut wave_of = BTreeMap::new();
        for (number, wave) in plan.waves.iter().enumerate() {
            for id in wave {
                wave_of.insert(*id, number);
            }
        }
        prop_assert_eq!(wave_of.len(), plan.graph.len());

        for edge in plan.graph.edges() {
            prop_assert!(plan.position(edge.dependency) < plan.position(edge.dependent));
            prop_assert!(wave_of[&edge.dependency] < wave_of[&edge.dependent]);
        }
    }

    /// Property: One registry entry per spoke, two add-ons per hub
    #[test]
    fn prop_role_resources_scale_with_topology(spokes in spoke_providers()) {
        let mut ctx = StackContext::new(StackConfig::default()).unwrap();
        topology(ProviderId::Azure, &spokes).declare(&mut ctx).unwrap();

        prop_assert_eq!(ctx.graph().of_kind(PrimitiveKind::AddOn).len(), 2);
        prop_assert_eq!(
            ctx.graph().of_kind(PrimitiveKind::RegistryEntry).len(),
            spokes.len()
        );
        prop_assert_eq!(ctx.exports().len(), 3 + 2 * spokes.len());
    }
}
