use std::sync::Arc;

use {
    anyhow::{Context, Result},
    promoter_broadcast::{BroadcastEngine, Broadcaster},
    promoter_channels::{ChannelPlugin, InboundEvent},
    promoter_config::{PromoterConfig, TOKEN_ENV},
    promoter_cron::Scheduler,
    promoter_directory::Directory,
    promoter_store::PersistentStore,
    promoter_telegram::TelegramPlugin,
    tokio::sync::mpsc,
    tokio_util::sync::CancellationToken,
    tracing::{info, warn},
};

use crate::{handlers::handle_event, job::ScheduledBroadcast, state::GatewayState};

const EVENT_QUEUE: usize = 256;

/// Open the state file named by `config`, seeding a fresh document from the
/// bootstrap section when none exists yet.
pub fn open_directory(config: &PromoterConfig) -> Result<Directory> {
    let store = PersistentStore::new(config.storage.data_file.clone())
        .with_bootstrap(config.bootstrap.admin(), config.bootstrap.settings());
    let path = store.path().display().to_string();
    Directory::open(store).with_context(|| format!("failed to open state file {path}"))
}

/// Run the bot until `cancel` fires: Telegram polling, event routing and the
/// periodic promotion lists.
pub async fn start_service(config: PromoterConfig, cancel: CancellationToken) -> Result<()> {
    let token = config
        .telegram
        .token
        .as_ref()
        .with_context(|| format!("telegram.token is not set; add it to promoter.toml or set {TOKEN_ENV}"))?;
    if config.bootstrap.admin().is_none() {
        warn!("bootstrap.admin_id is not set; nobody can moderate a fresh state file");
    }

    let directory = Arc::new(open_directory(&config)?);
    let settings = directory.settings().await;

    let mut plugin = TelegramPlugin::new(token);
    let outbound = plugin.outbound();
    let links = plugin.links();
    let broadcaster = Arc::new(Broadcaster::new(
        Arc::clone(&directory),
        Arc::clone(&outbound),
        Arc::clone(&links),
        BroadcastEngine::new(config.broadcast.send_delay()),
    ));

    let (events_tx, mut events) = mpsc::channel::<InboundEvent>(EVENT_QUEUE);
    plugin.start(events_tx).await?;
    let state = GatewayState::new(
        Arc::clone(&directory),
        Arc::clone(&broadcaster),
        outbound,
        links,
        cancel.clone(),
    )
    .with_bot_handle(plugin.bot_handle());

    let scheduler = Scheduler::new(settings.broadcast_interval())?.spawn(
        Arc::new(ScheduledBroadcast::new(Arc::clone(&broadcaster))),
        cancel.clone(),
    );

    // Startup banner.
    let lines = [
        format!("promoter v{}", env!("CARGO_PKG_VERSION")),
        format!("channel: {} ({})", plugin.name(), plugin.id()),
        format!("state: {}", directory.store().path().display()),
        format!(
            "promotion lists every {}h, {} per list",
            settings.broadcast_interval_hours, settings.max_entities_per_list
        ),
    ];
    let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) + 4;
    info!("┌{}┐", "─".repeat(width));
    for line in &lines {
        info!("│  {:<w$}│", line, w = width - 2);
    }
    info!("└{}┘", "─".repeat(width));

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            event = events.recv() => match event {
                Some(event) => {
                    let state = state.clone();
                    tokio::spawn(async move { handle_event(&state, event).await });
                },
                None => {
                    warn!("inbound event stream closed");
                    break;
                },
            },
        }
    }

    info!("shutting down");
    cancel.cancel();
    plugin.stop().await?;
    scheduler.join().await?;
    Ok(())
}
