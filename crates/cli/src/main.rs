mod state_commands;

use std::path::PathBuf;

use {
    clap::{Parser, Subcommand},
    tokio_util::sync::CancellationToken,
    tracing::{info, warn},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "promoter", about = "Promoter: channel directory and promotion-list bot")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Directory to look for promoter.toml in, instead of the defaults.
    #[arg(long, global = true, env = "PROMOTER_CONFIG_DIR")]
    config_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the bot: Telegram polling and scheduled promotion lists.
    Serve,
    #[command(flatten)]
    State(state_commands::StateAction),
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Cancel `token` on the first ctrl-c.
fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("ctrl-c received"),
            Err(e) => warn!(error = %e, "failed to listen for ctrl-c"),
        }
        token.cancel();
    });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    if let Some(dir) = &cli.config_dir {
        promoter_config::set_config_dir(dir.clone());
    }
    let config = promoter_config::discover_and_load()?;

    match cli.command {
        Commands::Serve => {
            info!(version = env!("CARGO_PKG_VERSION"), "promoter starting");
            let cancel = CancellationToken::new();
            cancel_on_ctrl_c(cancel.clone());
            promoter_gateway::start_service(config, cancel).await
        },
        Commands::State(action) => state_commands::handle_state(action, &config).await,
    }
}
