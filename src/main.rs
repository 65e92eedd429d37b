use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use benchboard::api::{build_router, state::AppState};
use benchboard::calculate::compute_stats;
use benchboard::config::AppConfig;
use benchboard::source::{
    find_run, load_artifact, load_benchmark, load_index, load_matches, load_runs,
    resolve_benchmark, source_from_config,
};
use benchboard::view::{format_date, LeaderboardView, RunDetail, ViewState};

#[derive(Parser)]
#[command(name = "benchboard")]
#[command(about = "Benchmark leaderboards, runs and match statistics")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./benchboard.toml")]
    config: PathBuf,

    /// Data root: local directory or http(s) URL holding index.json
    /// (typically the site's `benchmarks/` directory)
    #[arg(long)]
    data: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available benchmarks
    Benchmarks,

    /// Show benchmark metadata and a leaderboard
    Show {
        /// Benchmark id (default: first in the index)
        #[arg(long)]
        benchmark: Option<String>,

        /// Leaderboard set id (default: first set)
        #[arg(long)]
        set: Option<String>,
    },

    /// List runs, newest first
    Runs {
        #[arg(long)]
        benchmark: Option<String>,

        /// Filter by provider/model_name
        #[arg(long)]
        search: Option<String>,

        #[arg(long, default_value = "1")]
        page: u32,

        #[arg(long)]
        page_size: Option<u32>,
    },

    /// Show one run's match detail
    Run {
        #[arg(long)]
        benchmark: Option<String>,

        run_id: String,
    },

    /// Compute match statistics over completed runs
    Stats {
        #[arg(long)]
        benchmark: Option<String>,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Start the API server
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,

        /// Port number
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    if let Some(data) = &cli.data {
        config.data.base = data.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = Some(level.clone());
    }
    config.validate()?;

    // Initialize tracing
    let level = config.log_level.clone().unwrap_or_else(|| "info".to_string());
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&level));
    let json_layer = cli
        .json_logs
        .then(|| tracing_subscriber::fmt::layer().json());
    let text_layer = (!cli.json_logs).then(|| tracing_subscriber::fmt::layer());

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .init();

    tracing::debug!("Starting benchboard v{}", env!("CARGO_PKG_VERSION"));

    let source = source_from_config(&config.data)?;

    match cli.command {
        Commands::Benchmarks => {
            let index = load_index(source.as_ref()).await?;
            if index.benchmarks.is_empty() {
                println!("No benchmarks found.");
                return Ok(());
            }
            println!("=== Benchmarks ({}) ===\n", index.benchmarks.len());
            for b in &index.benchmarks {
                println!("  {:<24} {:<32} {}", b.benchmark_id, b.name, b.path);
            }
        }
        Commands::Show { benchmark, set } => {
            let entry = resolve_benchmark(source.as_ref(), benchmark.as_deref()).await?;
            let data = load_benchmark(source.as_ref(), entry).await?;
            let meta = &data.meta;

            println!(
                "=== {} ===\n",
                meta.name.as_deref().unwrap_or(&data.entry.name)
            );
            let schema = meta
                .schema_version
                .as_ref()
                .map(|v| v.to_string())
                .unwrap_or_else(|| "-".to_string());
            let run_types = if meta.run_types.is_empty() {
                "-".to_string()
            } else {
                meta.run_types.join(", ")
            };
            println!("Schema:    {}", schema);
            println!("Generated: {}", format_date(meta.generated_at.as_deref()));
            println!("Run types: {}", run_types);
            if let Some(description) = &meta.description {
                println!("\n{}", description);
            }
            println!();

            match LeaderboardView::select(&data.leaderboard, set.as_deref()) {
                LeaderboardView::NoData => println!("No leaderboard data found."),
                LeaderboardView::NoEntries { tabs, .. } => {
                    print_tabs(&tabs);
                    println!("No leaderboard entries available.");
                }
                LeaderboardView::Table { tabs, entries, .. } => {
                    print_tabs(&tabs);
                    println!(
                        "{:>4}  {:<28} {:>9} {:>6} {:>5} {:>6} {:>5} {:>8}",
                        "Rank", "Model", "Rating", "Games", "Wins", "Losses", "Draws", "Win Rate"
                    );
                    for e in &entries {
                        println!(
                            "{:>4}  {:<28} {:>9.2} {:>6} {:>5} {:>6} {:>5} {:>7}%",
                            e.rank,
                            e.display_name,
                            e.rating,
                            e.games_played,
                            e.wins,
                            e.losses,
                            e.draws,
                            e.win_rate
                        );
                    }
                }
            }
        }
        Commands::Runs {
            benchmark,
            search,
            page,
            page_size,
        } => {
            let entry = resolve_benchmark(source.as_ref(), benchmark.as_deref()).await?;
            let list = load_runs(source.as_ref(), &entry).await?;

            let mut view = ViewState::new(page_size.unwrap_or(config.view.default_page_size));
            view.select_benchmark(&entry.benchmark_id);
            if let Some(search) = search {
                view.set_search(search);
            }
            view.pagination.page = page.max(1);
            let page = view.page(&list.runs);

            println!("{} | {}\n", page.count_label, page.page_label);
            if list.skipped > 0 {
                println!("({} run lines could not be parsed)\n", list.skipped);
            }
            if page.runs.is_empty() {
                println!("No runs available.");
            }
            for run in &page.runs {
                println!("  [{}] {}", run.match_type, run.title);
                println!(
                    "    id: {}  status: {}  created: {}",
                    run.run_id, run.status, run.created
                );
            }
        }
        Commands::Run { benchmark, run_id } => {
            let entry = resolve_benchmark(source.as_ref(), benchmark.as_deref()).await?;
            let runs = load_runs(source.as_ref(), &entry).await?.runs;
            let run = find_run(&runs, &run_id)?;
            let record = load_artifact(source.as_ref(), &entry, run).await?;
            let detail = RunDetail::from(&record);

            println!("=== Run {} ===\n", run.run_id);
            println!("Match:     {}", detail.matchup);
            println!("Status:    {}", detail.status);
            println!("Winner:    {}", detail.winner);
            println!("Rounds:    {}", detail.rounds);
            println!("Created:   {}", detail.created);
            println!("Completed: {}", detail.completed);
        }
        Commands::Stats { benchmark, json } => {
            let entry = resolve_benchmark(source.as_ref(), benchmark.as_deref()).await?;
            let list = load_runs(source.as_ref(), &entry).await?;
            let loaded = load_matches(
                source.clone(),
                &entry,
                &list.runs,
                config.data.max_concurrent_fetches,
            )
            .await;
            let report = compute_stats(&loaded.matches).with_benchmark(&entry.benchmark_id);

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
                return Ok(());
            }

            println!(
                "=== Match Stats: {} ({} matches) ===",
                entry.name, report.total_matches
            );
            if loaded.failed > 0 {
                println!("({} artifacts could not be loaded)", loaded.failed);
            }
            if list.skipped > 0 {
                println!("({} run lines could not be parsed)", list.skipped);
            }
            for view in &report.views {
                println!("\n{}", view.title);
                if view.ranking.is_empty() {
                    println!("  No data");
                }
                for (i, e) in view.ranking.entries().iter().enumerate() {
                    println!("  {}. {:<32} {}", i + 1, e.label, e.display);
                }
            }
        }
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            config.validate()?;

            let state = AppState::new(source, &config);
            let app = build_router(state);
            let addr = format!("{}:{}", config.server.host, config.server.port);
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("Failed to bind {}", addr))?;
            tracing::info!("Dashboard: http://{}", addr);
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}

fn print_tabs(tabs: &[benchboard::view::LeaderboardTab]) {
    if tabs.len() < 2 {
        return;
    }
    let labels: Vec<String> = tabs
        .iter()
        .map(|t| {
            if t.active {
                format!("[{}]", t.label)
            } else {
                t.label.clone()
            }
        })
        .collect();
    println!("Sets: {}\n", labels.join("  "));
}
