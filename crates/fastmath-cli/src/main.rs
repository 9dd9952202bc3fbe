//! fastmath CLI: play the drill, simulate runs, and inspect recorded runs.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "fastmath", version, about = "Adaptive multiplication drill")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a run in the terminal
    Play {
        /// Player name (defaults to the config's player)
        #[arg(long)]
        player: Option<String>,

        /// Mark the run as played by a teacher
        #[arg(long, conflicts_with = "student")]
        teacher: bool,

        /// Mark the run as played by a student
        #[arg(long)]
        student: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Directory run records are written to
        #[arg(long)]
        records: Option<PathBuf>,

        /// Seed for question selection
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Run simulated players against the engine
    Simulate {
        /// Number of runs
        #[arg(long, default_value = "1")]
        runs: u32,

        /// Probability that each keystroke is right first time
        #[arg(long, default_value = "0.9")]
        accuracy: f64,

        /// Mean seconds the simulated player thinks before answering
        #[arg(long, default_value = "1.5")]
        think_time: f64,

        /// End a run explicitly after this many correct answers
        #[arg(long, default_value = "200")]
        max_questions: u32,

        /// Seed for both the engine and the simulated player
        #[arg(long)]
        seed: Option<u64>,

        /// Player name recorded on the runs
        #[arg(long, default_value = "Simulated Player")]
        player: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Directory run records are written to
        #[arg(long)]
        records: Option<PathBuf>,
    },

    /// Show the best run per player
    Leaderboard {
        /// Directory of run records
        #[arg(long)]
        records: PathBuf,

        /// Which players to show: all, students, teachers
        #[arg(long, default_value = "all")]
        scope: String,

        /// Time window: alltime, monthly
        #[arg(long, default_value = "alltime")]
        period: String,

        /// Maximum rows to show
        #[arg(long, default_value = "10")]
        limit: usize,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Render a per-fact heat-map as HTML
    Heatmap {
        /// Directory of run records
        #[arg(long)]
        records: PathBuf,

        /// Metric: attempts, mistake_count, incorrect_count, mistake_rate, avg_time, total_time
        #[arg(long, default_value = "mistake_count")]
        metric: String,

        /// Only include runs by this player
        #[arg(long)]
        player: Option<String>,

        /// Only include runs from this day (YYYY-MM-DD, UTC)
        #[arg(long)]
        date: Option<String>,

        /// Output HTML file
        #[arg(long, default_value = "fastmath-heatmap.html")]
        output: PathBuf,
    },

    /// Create a starter fastmath.toml
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fastmath=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Play {
            player,
            teacher,
            student,
            config,
            records,
            seed,
        } => commands::play::execute(player, teacher, student, config, records, seed),
        Commands::Simulate {
            runs,
            accuracy,
            think_time,
            max_questions,
            seed,
            player,
            config,
            records,
        } => commands::simulate::execute(
            runs,
            accuracy,
            think_time,
            max_questions,
            seed,
            player,
            config,
            records,
        ),
        Commands::Leaderboard {
            records,
            scope,
            period,
            limit,
            format,
        } => commands::leaderboard::execute(records, scope, period, limit, format),
        Commands::Heatmap {
            records,
            metric,
            player,
            date,
            output,
        } => commands::heatmap::execute(records, metric, player, date, output),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
