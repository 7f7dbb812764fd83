//! table-migrate CLI - connect, browse and migrate tables between two endpoints.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use table_migrate::{
    validate_connection, Config, Delay, Endpoint, MigrateError, MigrationSession, NoDelay,
    Record, TokioDelay,
};
use tracing::{info, Level};
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Parser)]
#[command(name = "table-migrate")]
#[command(about = "Copy tables between a source and a target database")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file (built-in demo tables when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output JSON result to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    /// Print progress updates as JSON lines to stderr
    #[arg(long)]
    progress: bool,

    /// Skip simulated connection and transfer latency
    #[arg(long)]
    instant: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that a connection string is acceptable
    Check {
        /// Connection string to check
        connection: String,
    },

    /// Connect to an endpoint and list its tables
    Tables {
        /// Endpoint to connect
        #[arg(long, value_enum)]
        endpoint: EndpointArg,

        /// Connection string for the endpoint
        #[arg(long)]
        connection: String,
    },

    /// Connect to an endpoint and show a table's rows
    Preview {
        /// Endpoint to connect
        #[arg(long, value_enum)]
        endpoint: EndpointArg,

        /// Connection string for the endpoint
        #[arg(long)]
        connection: String,

        /// Table to preview
        #[arg(long)]
        table: String,
    },

    /// Copy every row of a source table over a target table
    Migrate {
        /// Source connection string
        #[arg(long, env = "SOURCE_DATABASE_URL")]
        source_connection: String,

        /// Target connection string
        #[arg(long, env = "TARGET_DATABASE_URL")]
        target_connection: String,

        /// Table to read from the source
        #[arg(long)]
        source_table: String,

        /// Table to replace on the target
        #[arg(long)]
        target_table: String,

        /// Print the target table's rows after migrating
        #[arg(long)]
        show_target: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum EndpointArg {
    Source,
    Target,
}

impl From<EndpointArg> for Endpoint {
    fn from(arg: EndpointArg) -> Self {
        match arg {
            EndpointArg::Source => Endpoint::Source,
            EndpointArg::Target => Endpoint::Target,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<(), MigrateError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format);

    // Check does not need a session
    if let Commands::Check { connection } = &cli.command {
        let descriptor = validate_connection(connection)?;
        if cli.output_json {
            println!("{}", serde_json::json!({ "valid": true }));
        } else {
            println!("Connection string OK: {}", descriptor);
        }
        return Ok(());
    }

    let config = match &cli.config {
        Some(path) => {
            let config = Config::load(path)?;
            info!("Loaded configuration from {:?}", path);
            config
        }
        None => Config::default(),
    };

    let delay: Arc<dyn Delay> = if cli.instant {
        Arc::new(NoDelay)
    } else {
        Arc::new(TokioDelay)
    };
    let session = MigrationSession::with_delay(&config, delay);

    match cli.command {
        Commands::Check { .. } => unreachable!(), // Handled above

        Commands::Tables {
            endpoint,
            connection,
        } => {
            let endpoint = Endpoint::from(endpoint);
            let tables = session.connect(endpoint, &connection).await?;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&tables)?);
            } else {
                match session.data_source(endpoint).connection().await {
                    Some(active) => println!(
                        "Tables on {} (connected at {}):",
                        endpoint,
                        active.connected_at.format("%Y-%m-%d %H:%M:%S UTC")
                    ),
                    None => println!("Tables on {}:", endpoint),
                }
                for table in &tables {
                    println!("  {}", table);
                }
            }
        }

        Commands::Preview {
            endpoint,
            connection,
            table,
        } => {
            let endpoint = Endpoint::from(endpoint);
            session.connect(endpoint, &connection).await?;
            let rows = session.preview(endpoint, &table).await?;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                print_rows(&format!("{}.{}", endpoint, table), &rows);
            }
        }

        Commands::Migrate {
            source_connection,
            target_connection,
            source_table,
            target_table,
            show_target,
        } => {
            session
                .connect(Endpoint::Source, &source_connection)
                .await?;
            session
                .connect(Endpoint::Target, &target_connection)
                .await?;

            let progress = cli.progress;
            let result = session
                .migrate(&source_table, &target_table, |percent| {
                    if progress {
                        eprintln!("{}", serde_json::json!({ "progress": percent }));
                    }
                })
                .await?;

            let target_rows = if show_target {
                Some(session.preview(Endpoint::Target, &target_table).await?)
            } else {
                None
            };

            if cli.output_json {
                match target_rows {
                    Some(rows) => println!(
                        "{}",
                        serde_json::to_string_pretty(
                            &serde_json::json!({ "result": result, "rows": rows })
                        )?
                    ),
                    None => println!("{}", result.to_json()?),
                }
            } else {
                println!("\nMigration completed!");
                println!("  {} -> {}", source_table, target_table);
                println!("  Records: {}", result.records_count);
                if let Some(rows) = target_rows {
                    print_rows(&format!("target.{}", target_table), &rows);
                }
            }
        }
    }

    Ok(())
}

fn print_rows(label: &str, rows: &[Record]) {
    if rows.is_empty() {
        println!("{}: no rows", label);
        return;
    }
    println!("{}: {} rows", label, rows.len());
    for row in rows {
        let fields: Vec<String> = row
            .fields()
            .filter_map(|f| row.get(f).map(|v| format!("{}={}", f, v)))
            .collect();
        println!("  {}", fields.join(", "));
    }
}

fn setup_logging(verbosity: &str, format: &str) {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Logs go to stderr so --output-json keeps stdout parseable
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(std::io::stderr);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
