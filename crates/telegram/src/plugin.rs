use std::sync::Arc;

use {
    anyhow::Result,
    async_trait::async_trait,
    promoter_channels::{ChannelOutbound, ChannelPlugin, InboundEvent, InviteLinkResolver},
    secrecy::{ExposeSecret, Secret},
    teloxide::{
        Bot,
        dispatching::{Dispatcher, ShutdownToken},
        dptree,
        requests::Requester,
    },
    tokio::{sync::mpsc, task::JoinHandle},
    tracing::{info, warn},
};

use crate::{handlers, outbound::TelegramOutbound};

/// Telegram channel plugin. Receives updates by long polling.
pub struct TelegramPlugin {
    bot: Bot,
    outbound: Arc<TelegramOutbound>,
    username: Option<String>,
    shutdown: Option<ShutdownToken>,
    task: Option<JoinHandle<()>>,
}

impl TelegramPlugin {
    pub fn new(token: &Secret<String>) -> Self {
        let bot = Bot::new(token.expose_secret().clone());
        Self {
            outbound: Arc::new(TelegramOutbound::new(bot.clone())),
            bot,
            username: None,
            shutdown: None,
            task: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

#[async_trait]
impl ChannelPlugin for TelegramPlugin {
    fn id(&self) -> &str {
        "telegram"
    }

    fn name(&self) -> &str {
        "Telegram"
    }

    async fn start(&mut self, events: mpsc::Sender<InboundEvent>) -> Result<()> {
        if self.is_running() {
            warn!("telegram polling already running");
            return Ok(());
        }

        let me = self.bot.get_me().await?;
        self.username = me.user.username.clone();

        let mut dispatcher = Dispatcher::builder(self.bot.clone(), handlers::schema())
            .dependencies(dptree::deps![events])
            .build();
        self.shutdown = Some(dispatcher.shutdown_token());
        self.task = Some(tokio::spawn(async move {
            dispatcher.dispatch().await;
        }));

        info!(username = self.username.as_deref().unwrap_or("-"), "telegram polling started");
        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        if let Some(token) = self.shutdown.take() {
            match token.shutdown() {
                Ok(done) => done.await,
                Err(e) => warn!(error = ?e, "telegram dispatcher was not running"),
            }
        }
        if let Some(task) = self.task.take() {
            task.await?;
        }
        info!("telegram polling stopped");
        Ok(())
    }

    fn outbound(&self) -> Arc<dyn ChannelOutbound> {
        self.outbound.clone()
    }

    fn links(&self) -> Arc<dyn InviteLinkResolver> {
        self.outbound.clone()
    }

    fn bot_handle(&self) -> Option<String> {
        self.username.clone()
    }
}
