use std::collections::HashSet;

use flowvis::{
    run, Feature, ForceParams, GraphSettings, GroupingStrategy, NodeKind, RunOutput,
};

const HEADER: &str = "is_attack,attack_cat,service,proto,state,packets_total,bytes_total";

fn table(rows: &[&str]) -> String {
    let mut t = String::from(HEADER);
    t.push('\n');
    for r in rows {
        t.push_str(r);
        t.push('\n');
    }
    t
}

fn run_with(settings: &GraphSettings, text: &str) -> RunOutput {
    run(settings, &ForceParams::default(), text, |_, _| {}).expect("run succeeds")
}

#[test]
fn three_row_modulo_scenario() {
    let text = table(&[
        "0,other,http,tcp,FIN,10,100",
        "0,other,dns,udp,CON,20,200",
        "1,dos,http,tcp,FIN,30,300",
    ]);
    let settings = GraphSettings {
        max_rows: 10,
        num_source_nodes: 2,
        num_dest_nodes: 2,
        grouping: GroupingStrategy::Modulo,
        ..Default::default()
    };
    let out = run_with(&settings, &text);

    let sources: Vec<_> = out
        .graph
        .node_weights()
        .filter(|n| n.kind == NodeKind::Source)
        .collect();
    let dests: Vec<_> = out
        .graph
        .node_weights()
        .filter(|n| n.kind == NodeKind::Destination)
        .collect();
    assert_eq!(sources.len(), 2);
    assert_eq!(dests.len(), 2);
    assert_eq!(out.graph.edge_count(), 3);

    // rows 1 and 3 both land on dest_1
    let dest_1 = dests.iter().find(|n| n.id == "dest_1").expect("dest_1");
    assert_eq!(dest_1.connection_count, 2);
}

#[test]
fn node_count_bounded_under_modulo_and_sequential() {
    let rows: Vec<String> = (0..200)
        .map(|i| format!("0,other,svc{i},tcp,FIN,{},{}", i + 1, (i + 1) * 10))
        .collect();
    let refs: Vec<&str> = rows.iter().map(String::as_str).collect();
    let text = table(&refs);

    for grouping in [GroupingStrategy::Modulo, GroupingStrategy::Sequential] {
        let settings = GraphSettings {
            num_source_nodes: 7,
            num_dest_nodes: 5,
            grouping,
            ..Default::default()
        };
        let out = run_with(&settings, &text);
        let ids: HashSet<_> = out.graph.node_weights().map(|n| n.id.clone()).collect();
        assert!(
            ids.len() <= 7 + 5,
            "{grouping:?} produced {} distinct ids",
            ids.len()
        );
    }
}

#[test]
fn service_grouping_may_exceed_dest_bound() {
    // one bucket per distinct service, deliberately more than num_dest_nodes
    let rows: Vec<String> = (0..10)
        .map(|i| format!("0,other,svc{i},tcp,FIN,1,1"))
        .collect();
    let refs: Vec<&str> = rows.iter().map(String::as_str).collect();
    let settings = GraphSettings {
        num_source_nodes: 2,
        num_dest_nodes: 3,
        grouping: GroupingStrategy::Service,
        ..Default::default()
    };
    let out = run_with(&settings, &table(&refs));
    let dests = out
        .graph
        .node_weights()
        .filter(|n| n.kind == NodeKind::Destination)
        .count();
    assert_eq!(dests, 10);
}

#[test]
fn filtered_row_has_no_side_effects() {
    let text = table(&["0,other,http,tcp,FIN,50,1000"]);
    let settings = GraphSettings {
        filter_min_packets: 100.0,
        ..Default::default()
    };
    let out = run_with(&settings, &text);
    assert_eq!(out.graph.node_count(), 0);
    assert_eq!(out.graph.edge_count(), 0);
    assert_eq!(out.stats.get(Feature::PacketsTotal).count, 0);
    assert_eq!(out.stats.get(Feature::BytesTotal).sum, 0.0);
}

#[test]
fn attacks_only_keeps_one_of_five_rows() {
    let text = table(&[
        "0,other,http,tcp,FIN,10,100",
        "0,other,http,tcp,FIN,10,100",
        "1,exploits,http,tcp,FIN,10,100",
        "0,other,http,tcp,FIN,10,100",
        "0,other,http,tcp,FIN,10,100",
    ]);
    let settings = GraphSettings {
        show_only_attacks: true,
        ..Default::default()
    };
    let out = run_with(&settings, &text);
    assert_eq!(out.graph.edge_count(), 1);
    assert_eq!(out.render.edges.len(), 1);
    assert!(out.render.edges[0].is_attack);
}

#[test]
fn stats_bound_every_observed_value() {
    let rows: Vec<String> = (0..50)
        .map(|i| format!("0,other,http,tcp,FIN,{},{}", i * 3 + 1, i * 17 + 5))
        .collect();
    let refs: Vec<&str> = rows.iter().map(String::as_str).collect();
    let out = run_with(&GraphSettings::default(), &table(&refs));

    for edge in out.graph.edge_weights() {
        for f in Feature::ALL {
            let v = edge.features.get(f);
            let stat = out.stats.get(f);
            assert!(stat.min <= v && v <= stat.max, "{f:?}: {v} outside range");
        }
    }
}

#[test]
fn render_graph_roundtrips_through_serde() {
    let text = table(&[
        "0,other,http,tcp,FIN,10,100",
        "1,dos,dns,udp,CON,20,200",
    ]);
    let out = run_with(&GraphSettings::default(), &text);
    let json = serde_json::to_string(&out.render).expect("serialize render graph");
    let back: flowvis::RenderGraph = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back.nodes.len(), out.render.nodes.len());
    assert_eq!(back.edges.len(), out.render.edges.len());
    for (a, b) in back.edges.iter().zip(out.render.edges.iter()) {
        assert_eq!(a.source_pos, b.source_pos);
        assert_eq!(a.thickness, b.thickness);
        assert_eq!(a.attack_group, b.attack_group);
    }
}
