use agentrisk_core::{
    score, simulate, Disposition, EntropyLevel, Graph, Node, NodeKind, RunRng,
};
use approx::assert_relative_eq;

#[test]
fn reliable_two_node_pipeline_always_succeeds_in_two_steps() {
    // supervisor -> worker, both deterministic with zero failure probability
    let graph = Graph::new(
        vec![
            Node::new("supervisor", NodeKind::Deterministic)
                .with_failure_prob(0.0)
                .with_edges(["worker"]),
            Node::new("worker", NodeKind::Deterministic).with_failure_prob(0.0),
        ],
        "supervisor",
    )
    .unwrap();

    for i in 0..300u64 {
        let outcome = simulate(&graph, 200, RunRng::derive_seed(42, i));
        assert_eq!(outcome.disposition, Disposition::Success);
        assert_eq!(outcome.steps, 2);
        assert_eq!(outcome.retries, 0);
        assert!(!outcome.touched_loop);
        assert_eq!(outcome.path, vec!["supervisor", "worker"]);
    }
}

#[test]
fn self_loop_exhausts_its_budget_after_four_visits() {
    let graph = Graph::new(
        vec![Node::new("refine_agent", NodeKind::Generative)
            .with_failure_prob(0.0)
            .with_loop_cap(3)
            .with_edges(["refine_agent"])],
        "refine_agent",
    )
    .unwrap();

    let outcome = simulate(&graph, 200, 42);
    assert_eq!(outcome.disposition, Disposition::StructuralFailure);
    assert!(outcome.touched_loop);
    assert_eq!(outcome.steps, 4);
    assert_eq!(
        outcome.path,
        vec!["refine_agent"; 4],
        "budget of 3 admits three visits, the fourth terminates"
    );
}

#[test]
fn entropy_example_values() {
    let graph = Graph::new(
        vec![
            Node::new("planner_agent", NodeKind::Generative).with_edges(["writer"]),
            Node::new("writer", NodeKind::Generative).with_edges(["validate"]),
            Node::new("validate", NodeKind::Deterministic),
        ],
        "planner_agent",
    )
    .unwrap();

    let metrics = score(&graph);
    assert_relative_eq!(metrics.coupling_factor, 1.5);
    assert_relative_eq!(metrics.entropy_score, 1.1, epsilon = 1e-12);
    assert_eq!(metrics.entropy_level, EntropyLevel::VeryHigh);
}

#[test]
fn unbounded_cycle_times_out_rather_than_erroring() {
    let graph = Graph::new(
        vec![
            Node::new("draft_agent", NodeKind::Generative)
                .with_failure_prob(0.0)
                .with_edges(["review_agent"]),
            Node::new("review_agent", NodeKind::Generative)
                .with_failure_prob(0.0)
                .with_edges(["draft_agent"]),
        ],
        "draft_agent",
    )
    .unwrap();

    let outcome = simulate(&graph, 25, 7);
    assert_eq!(outcome.disposition, Disposition::Timeout);
    assert_eq!(outcome.steps, 25);
    assert!(outcome.touched_loop);
}

#[test]
fn retries_rescue_a_flaky_node() {
    // Failure probability 0.5 with 8 retries: exhausting all 9 attempts has
    // probability 2^-9, so most seeds succeed.
    let graph = Graph::new(
        vec![Node::new("flaky_agent", NodeKind::Generative)
            .with_failure_prob(0.5)
            .with_max_retries(8)],
        "flaky_agent",
    )
    .unwrap();

    let runs = 500u64;
    let successes = (0..runs)
        .map(|i| simulate(&graph, 10, RunRng::derive_seed(11, i)))
        .filter(|o| o.success())
        .count();
    assert!(
        successes as f64 / runs as f64 > 0.95,
        "retry budget should absorb most failures, got {}/{}",
        successes,
        runs
    );
}

#[test]
fn dispositions_are_mutually_exclusive_and_exhaustive() {
    // gate fails outright, hands off to a terminal, or enters an unbounded
    // spin that only the step cap ends
    let graph = Graph::new(
        vec![
            Node::new("gate_agent", NodeKind::Generative)
                .with_failure_prob(0.25)
                .with_edges(["spin", "done"]),
            Node::new("spin", NodeKind::Deterministic)
                .with_failure_prob(0.0)
                .with_edges(["spin"]),
            Node::new("done", NodeKind::Deterministic).with_failure_prob(0.0),
        ],
        "gate_agent",
    )
    .unwrap();

    let mut counts = [0usize; 3];
    for i in 0..1000u64 {
        let outcome = simulate(&graph, 12, RunRng::derive_seed(99, i));
        match outcome.disposition {
            Disposition::Success => counts[0] += 1,
            Disposition::StructuralFailure => counts[1] += 1,
            Disposition::Timeout => counts[2] += 1,
        }
        if !outcome.timeout() {
            assert!(outcome.steps <= 12);
        }
    }
    assert_eq!(counts.iter().sum::<usize>(), 1000);
    // This topology should exercise all three terminals
    assert!(counts.iter().all(|&c| c > 0), "counts = {:?}", counts);
}
