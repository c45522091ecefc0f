use proptest::prelude::*;
use range_topology::prelude::*;
use range_topology::preflight;
use range_topology::Role;

fn role() -> impl Strategy<Value = Role> {
    prop_oneof![Just(Role::Service), Just(Role::JumpboxLocal)]
}

#[test]
fn connecting_same_pair_twice_keeps_both() {
    let mut topology = Topology::new();
    let master = NodeId::master();
    let s = topology.add_node(Role::Service);

    let first = topology.connect(&master, &s).unwrap();
    let second = topology.connect(&master, &s).unwrap();

    assert_ne!(first, second);
    assert_eq!(topology.edge_count(), 2);
}

#[test]
fn serialized_graph_always_has_main_jumpbox() {
    let mut topology = Topology::new();
    let mut master = topology.node(&NodeId::master()).unwrap().clone();
    master.role = None;
    topology.replace_node(master).unwrap();
    topology.add_node(Role::Service);

    let request = DeploymentSerializer::new().serialize(&topology.snapshot());
    let masters: Vec<_> = request.nodes.iter().filter(|n| n.id.as_str() == MASTER_ID).collect();

    assert_eq!(masters.len(), 1);
    assert_eq!(masters[0].role, Role::JumpboxMain);
}

proptest! {
    #[test]
    fn prop_adding_k_nodes_yields_k_plus_one(roles in prop::collection::vec(role(), 0..40)) {
        let mut topology = Topology::new();
        for r in &roles {
            topology.add_node(*r);
        }

        prop_assert_eq!(topology.node_count(), roles.len() + 1);
        prop_assert!(topology.node(&NodeId::master()).is_some());
        prop_assert_eq!(topology.revision(), roles.len() as u64);
    }

    #[test]
    fn prop_delete_selected_removes_exactly_the_selection(
        node_flags in prop::collection::vec(any::<bool>(), 1..12),
        edge_flags in prop::collection::vec((any::<prop::sample::Index>(), any::<prop::sample::Index>(), any::<bool>()), 0..20),
    ) {
        let mut topology = Topology::new();
        for _ in 1..node_flags.len() {
            topology.add_node(Role::Service);
        }
        let ids: Vec<NodeId> = topology.nodes().iter().map(|n| n.id.clone()).collect();

        let mut edges = Vec::new();
        for (a, b, selected) in &edge_flags {
            let edge = topology.connect(a.get(&ids), b.get(&ids)).unwrap();
            edges.push((edge, *selected));
        }
        for (id, selected) in ids.iter().zip(&node_flags) {
            topology.set_node_selected(id, *selected).unwrap();
        }
        for (id, selected) in &edges {
            topology.set_edge_selected(id, *selected).unwrap();
        }

        let removal = topology.delete_selected();

        let kept_nodes: Vec<&NodeId> = ids.iter().zip(&node_flags).filter(|(_, s)| !**s).map(|(id, _)| id).collect();
        let kept_edges: Vec<&EdgeId> = edges.iter().filter(|(_, s)| !*s).map(|(id, _)| id).collect();

        prop_assert_eq!(topology.nodes().iter().map(|n| &n.id).collect::<Vec<_>>(), kept_nodes);
        prop_assert_eq!(topology.edges().iter().map(|e| &e.id).collect::<Vec<_>>(), kept_edges);
        prop_assert_eq!(removal.nodes.len(), node_flags.iter().filter(|s| **s).count());
        prop_assert_eq!(removal.edges.len(), edges.iter().filter(|(_, s)| *s).count());
    }

    #[test]
    fn prop_preflight_reports_every_dangling_endpoint(count in 1usize..8) {
        let mut topology = Topology::new();
        let master = NodeId::master();
        for _ in 0..count {
            let s = topology.add_node(Role::Service);
            topology.connect(&master, &s).unwrap();
            topology.set_node_selected(&s, true).unwrap();
        }
        topology.delete_selected();

        let report = preflight(&topology.snapshot());
        prop_assert_eq!(topology.edge_count(), count);
        prop_assert_eq!(report.issues.len(), count);
    }
}
