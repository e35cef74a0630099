#![warn(clippy::uninlined_format_args)]

mod random;

use std::borrow::Cow;
use std::time::{SystemTime, UNIX_EPOCH};
use std::{env, process};

use loancut_solver::SimplexCutFinder;
use tracing_subscriber::EnvFilter;

type CliResult<T> = Result<T, Cow<'static, str>>;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(err) = run() {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn run() -> CliResult<()> {
    let mut args = env::args().skip(1);
    let node_count: usize = match args.next() {
        Some(raw) => raw
            .parse()
            .map_err(|_| format!("invalid node count '{raw}'"))?,
        None => 10,
    };
    let seed: u64 = match args.next() {
        Some(raw) => raw.parse().map_err(|_| format!("invalid seed '{raw}'"))?,
        None => SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|err| format!("system clock error: {err}"))?
            .as_millis() as u64,
    };
    if node_count < 2 {
        return Err("at least two parties are needed".into());
    }

    println!("nodes: {node_count}, seed: {seed}");
    let (mut graph, times) = random::random_graph(node_count, seed);
    println!(
        "generated {} contracts over {} edges",
        graph.contract_count(),
        graph.edge_count()
    );
    graph.set_cut_finder(Box::new(SimplexCutFinder::new()));

    let base = times
        .maximum_time()
        .max(graph.maximum_timestamp())
        .max(0.0);

    println!(" #     t_eq       retained       original  ratio   reduce  minimize");
    for i in 0..10 {
        let equilibrium_time = base + 2.0 * (i + 1) as f64;
        let solution = graph
            .find_equilibrial_debt_cuts(equilibrium_time, &times)
            .map_err(|err| format!("solve failed at t = {equilibrium_time}: {err}"))?;
        if solution.is_no_solution() {
            return Err(format!(
                "the equilibrium system is over-constrained at t = {equilibrium_time}"
            )
            .into());
        }

        let applied = graph
            .apply_debt_cuts(&solution.cuts, &times)
            .map_err(|err| format!("applying cuts failed: {err}"))?;
        let balanced = applied
            .is_in_equilibrium_at(equilibrium_time)
            .map_err(|err| format!("equilibrium check failed: {err}"))?;
        if !balanced {
            let residual = applied
                .max_equity(equilibrium_time)
                .map_err(|err| format!("equity evaluation failed: {err}"))?;
            return Err(format!(
                "equilibrium failed at t = {equilibrium_time} (max equity {residual})"
            )
            .into());
        }

        let original = graph
            .total_flow_at(equilibrium_time)
            .map_err(|err| format!("flow evaluation failed: {err}"))?;
        let retained = applied
            .total_flow_at(equilibrium_time)
            .map_err(|err| format!("flow evaluation failed: {err}"))?;
        let ratio = if original > 0.0 {
            retained / original
        } else {
            1.0
        };
        println!(
            "{:2} {:8.3} {:14.3} {:14.3}  {:5.3} {:6}us {:7}us",
            i + 1,
            equilibrium_time,
            retained,
            original,
            ratio,
            solution.stats.reduction.as_micros(),
            solution.stats.minimization.as_micros(),
        );
    }

    Ok(())
}
