use agentrisk_io::cli::{
    run_compare_command, run_correlate_command, run_score_command, run_simulate_command, Cli,
    Commands,
};
use clap::Parser;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Simulate {
            graphs,
            results,
            runs,
            seed,
            step_cap,
            write_raw,
            raw_dir,
        } => run_simulate_command(
            &graphs,
            &results,
            runs,
            seed,
            step_cap,
            write_raw,
            raw_dir.as_deref(),
        ),

        Commands::Score {
            graph,
            kind_map,
            drivers,
            report,
        } => run_score_command(&graph, kind_map.as_deref(), drivers, report.as_deref()),

        Commands::Correlate { graphs, results, y } => {
            run_correlate_command(&graphs, &results, y)
        }

        Commands::Compare {
            graph_a,
            graph_b,
            kind_map_a,
            kind_map_b,
        } => run_compare_command(&graph_a, &graph_b, kind_map_a.as_deref(), kind_map_b.as_deref()),
    }
}
