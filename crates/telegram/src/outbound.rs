use {
    async_trait::async_trait,
    promoter_channels::{
        ActionButton, ButtonTarget, ChannelOutbound, InviteLinkResolver, ResolveError, SendError,
    },
    promoter_common::ChatId,
    teloxide::{
        Bot,
        payloads::{AnswerCallbackQuerySetters, SendMessageSetters},
        requests::Requester,
        types::{self, InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup},
    },
    tracing::{debug, warn},
    url::Url,
};

/// Outbound adapter backed by a teloxide [`Bot`].
#[derive(Clone)]
pub struct TelegramOutbound {
    bot: Bot,
}

impl TelegramOutbound {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

fn reply_keyboard(rows: &[Vec<String>]) -> KeyboardMarkup {
    KeyboardMarkup::new(
        rows.iter()
            .map(|row| row.iter().map(|label| KeyboardButton::new(label.clone())).collect::<Vec<_>>())
            .collect::<Vec<_>>(),
    )
}

fn inline_button(button: &ActionButton) -> Option<InlineKeyboardButton> {
    match &button.target {
        ButtonTarget::Callback(action) => Some(InlineKeyboardButton::callback(
            button.label.clone(),
            action.callback_data(),
        )),
        ButtonTarget::Url(raw) => match Url::parse(raw) {
            Ok(url) => Some(InlineKeyboardButton::url(button.label.clone(), url)),
            Err(e) => {
                warn!(url = %raw, error = %e, "dropping button with invalid url");
                None
            },
        },
    }
}

/// All buttons of one message share a row.
fn inline_keyboard(actions: &[ActionButton]) -> InlineKeyboardMarkup {
    let row = actions.iter().filter_map(inline_button).collect::<Vec<_>>();
    InlineKeyboardMarkup::new(vec![row])
}

#[async_trait]
impl ChannelOutbound for TelegramOutbound {
    async fn send_text(&self, to: ChatId, text: &str) -> Result<(), SendError> {
        self.bot
            .send_message(types::ChatId(to.0), text)
            .await
            .map(|_| ())
            .map_err(|e| SendError::new(to, e.to_string()))
    }

    async fn send_menu(&self, to: ChatId, text: &str, rows: &[Vec<String>]) -> Result<(), SendError> {
        self.bot
            .send_message(types::ChatId(to.0), text)
            .reply_markup(reply_keyboard(rows))
            .await
            .map(|_| ())
            .map_err(|e| SendError::new(to, e.to_string()))
    }

    async fn send_with_actions(
        &self,
        to: ChatId,
        text: &str,
        actions: &[ActionButton],
    ) -> Result<(), SendError> {
        self.bot
            .send_message(types::ChatId(to.0), text)
            .reply_markup(inline_keyboard(actions))
            .await
            .map(|_| ())
            .map_err(|e| SendError::new(to, e.to_string()))
    }

    async fn acknowledge(&self, callback_id: &str, text: &str) -> Result<(), SendError> {
        debug!(callback_id, "answering callback query");
        self.bot
            .answer_callback_query(callback_id.to_string())
            .text(text)
            .await
            .map(|_| ())
            .map_err(|e| SendError::new(ChatId(0), e.to_string()))
    }
}

#[async_trait]
impl InviteLinkResolver for TelegramOutbound {
    async fn resolve_invite_link(&self, chat: ChatId) -> Result<String, ResolveError> {
        self.bot
            .export_chat_invite_link(types::ChatId(chat.0))
            .await
            .map_err(|e| ResolveError::new(chat, e.to_string()))
    }
}
