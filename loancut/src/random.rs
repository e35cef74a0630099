//! Seeded random graphs for the demo.

use loancut_domain::{Contract, Graph, TimeAssignment};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Builds a graph of `node_count` parties in which each ordered pair
/// carries a contract with probability `5 / node_count`, mixing periodic
/// and continuous compounding, plus a payment time for every contract.
pub fn random_graph(node_count: usize, seed: u64) -> (Graph, TimeAssignment) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut graph = Graph::new(format!("random-{seed}"));
    let mut times = TimeAssignment::new();
    for i in 0..node_count {
        graph
            .add_node(format!("n{i}"))
            .expect("generated node names are unique");
        times.ensure_node(format!("n{i}"));
    }

    let probability = (5.0 / node_count as f64).min(1.0);
    let mut serial = 0usize;
    for from in 0..node_count {
        for to in 0..node_count {
            if from == to || !rng.random_bool(probability) {
                continue;
            }
            let principal = rng.random_range(0.5..5.0);
            let rate = rng.random_range(0.0..0.12);
            let timestamp = rng.random_range(0.0..3.0);
            let name = format!("c{serial}");
            serial += 1;
            let contract = if rng.random_bool(0.5) {
                Contract::continuous(&name, principal, rate, timestamp)
            } else {
                let periods = f64::from(rng.random_range(1u32..=12));
                Contract::periodic(&name, principal, rate, periods, timestamp)
            }
            .expect("generated attributes are in range");

            let lender = graph.node_id(&format!("n{from}")).expect("node exists");
            let debtor = graph.node_id(&format!("n{to}")).expect("node exists");
            graph
                .add_contract(lender, debtor, contract)
                .expect("generated contract names are unique");
            let payment = timestamp + rng.random_range(0.0..2.0);
            times
                .put(format!("n{to}"), &name, payment)
                .expect("generated payment times are finite");
        }
    }

    (graph, times)
}
