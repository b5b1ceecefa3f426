//! Translation of Telegram updates into platform-neutral events.

use {
    promoter_channels::{CallbackAction, ChatInfo, InboundEvent, UserProfile},
    promoter_common::{ChatId, EntityKind, UserId},
    teloxide::{
        RequestError,
        dispatching::{UpdateFilterExt, UpdateHandler},
        dptree,
        types::{CallbackQuery, Chat, Message, MessageKind, MessageOrigin, Update, User},
    },
    tokio::sync::mpsc,
    tracing::{debug, warn},
};

/// Build the dispatcher tree: messages and callback queries, nothing else.
pub fn schema() -> UpdateHandler<RequestError> {
    dptree::entry()
        .branch(Update::filter_message().endpoint(on_message))
        .branch(Update::filter_callback_query().endpoint(on_callback))
}

async fn on_message(msg: Message, events: mpsc::Sender<InboundEvent>) -> Result<(), RequestError> {
    if let Some(event) = translate_message(&msg) {
        forward(&events, event).await;
    }
    Ok(())
}

async fn on_callback(q: CallbackQuery, events: mpsc::Sender<InboundEvent>) -> Result<(), RequestError> {
    if let Some(event) = translate_callback(&q) {
        forward(&events, event).await;
    }
    Ok(())
}

async fn forward(events: &mpsc::Sender<InboundEvent>, event: InboundEvent) {
    if events.send(event).await.is_err() {
        debug!("event receiver gone, dropping telegram update");
    }
}

pub fn profile(user: &User) -> UserProfile {
    UserProfile {
        id: UserId(user.id.0 as i64),
        handle: user.username.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
    }
}

fn chat_info(chat: &Chat) -> ChatInfo {
    ChatInfo {
        id: ChatId(chat.id.0),
        title: chat.title().unwrap_or_default().to_string(),
        kind: entity_kind(chat.is_channel()),
    }
}

pub fn entity_kind(is_channel: bool) -> EntityKind {
    if is_channel {
        EntityKind::Channel
    } else {
        EntityKind::Group
    }
}

/// The channel or group a message was forwarded from, if any. Forwards
/// from users carry no chat.
fn forwarded_chat(msg: &Message) -> Option<&Chat> {
    match msg.forward_origin()? {
        MessageOrigin::Channel { chat, .. } => Some(chat),
        MessageOrigin::Chat { sender_chat, .. } => Some(sender_chat),
        MessageOrigin::User { .. } | MessageOrigin::HiddenUser { .. } => None,
    }
}

/// `/start`, optionally addressed as `/start@botname` or with a payload.
pub fn is_start_command(text: &str) -> bool {
    text.split_whitespace()
        .next()
        .and_then(|cmd| cmd.split('@').next())
        .is_some_and(|cmd| cmd == "/start")
}

pub fn translate_message(msg: &Message) -> Option<InboundEvent> {
    let here = ChatId(msg.chat.id.0);

    if matches!(
        msg.kind,
        MessageKind::GroupChatCreated(_) | MessageKind::SupergroupChatCreated(_)
    ) {
        return Some(InboundEvent::AddedToGroup { chat: here });
    }

    // Registration and menus only happen in private chats with the bot.
    if !msg.chat.is_private() {
        return None;
    }
    let from = msg.from.as_ref()?;

    if let Some(origin) = forwarded_chat(msg) {
        if origin.is_private() {
            return None;
        }
        return Some(InboundEvent::ForwardedChat {
            chat: chat_info(origin),
            from: profile(from),
            reply_to: here,
        });
    }

    let text = msg.text()?;
    if is_start_command(text) {
        return Some(InboundEvent::Start {
            user: profile(from),
            chat: here,
        });
    }
    Some(InboundEvent::MenuSelection {
        user: UserId(from.id.0 as i64),
        chat: here,
        label: text.trim().to_string(),
    })
}

pub fn translate_callback(q: &CallbackQuery) -> Option<InboundEvent> {
    let data = q.data.as_deref()?;
    let action = match data.parse::<CallbackAction>() {
        Ok(action) => action,
        Err(e) => {
            warn!(error = %e, "ignoring callback query");
            return None;
        },
    };
    let from = UserId(q.from.id.0 as i64);
    Some(InboundEvent::ModerationCallback {
        action,
        from,
        callback_id: q.id.to_string(),
        reply_to: Some(from.chat()),
    })
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        promoter_channels::CallbackAction,
        promoter_common::Verdict,
        rstest::rstest,
        serde_json::{Value, json},
    };

    fn private_chat() -> Value {
        json!({"id": 42, "type": "private", "first_name": "Ana"})
    }

    fn sender() -> Value {
        json!({"id": 42, "is_bot": false, "first_name": "Ana", "username": "ana"})
    }

    fn message(chat: Value, extra: Value) -> Message {
        let mut raw = json!({
            "message_id": 1,
            "date": 1_700_000_000,
            "chat": chat,
            "from": sender(),
        });
        if let (Some(raw), Some(extra)) = (raw.as_object_mut(), extra.as_object()) {
            raw.extend(extra.clone());
        }
        serde_json::from_value(raw).unwrap()
    }

    fn ana() -> UserProfile {
        UserProfile {
            id: UserId(42),
            handle: Some("ana".into()),
            first_name: "Ana".into(),
            last_name: None,
        }
    }

    #[rstest]
    #[case("/start", true)]
    #[case("/start@promoter_bot", true)]
    #[case("/start ref42", true)]
    #[case("  /start", true)]
    #[case("/started", false)]
    #[case("start", false)]
    #[case("", false)]
    fn test_is_start_command(#[case] text: &str, #[case] expected: bool) {
        assert_eq!(is_start_command(text), expected);
    }

    #[test]
    fn test_entity_kind() {
        assert_eq!(entity_kind(true), EntityKind::Channel);
        assert_eq!(entity_kind(false), EntityKind::Group);
    }

    #[test]
    fn test_forwarded_channel_post_registers_channel() {
        let msg = message(
            private_chat(),
            json!({
                "text": "hello",
                "forward_origin": {
                    "type": "channel",
                    "date": 1_699_999_000,
                    "message_id": 5,
                    "chat": {"id": -1001, "type": "channel", "title": "Chan"},
                },
            }),
        );
        assert_eq!(
            translate_message(&msg),
            Some(InboundEvent::ForwardedChat {
                chat: ChatInfo {
                    id: ChatId(-1001),
                    title: "Chan".into(),
                    kind: EntityKind::Channel,
                },
                from: ana(),
                reply_to: ChatId(42),
            })
        );
    }

    #[test]
    fn test_forwarded_group_message_registers_group() {
        let msg = message(
            private_chat(),
            json!({
                "text": "hi all",
                "forward_origin": {
                    "type": "chat",
                    "date": 1_699_999_000,
                    "sender_chat": {"id": -1002, "type": "supergroup", "title": "Grp"},
                },
            }),
        );
        let Some(InboundEvent::ForwardedChat { chat, .. }) = translate_message(&msg) else {
            panic!("expected a forwarded chat");
        };
        assert_eq!(chat.id, ChatId(-1002));
        assert_eq!(chat.kind, EntityKind::Group);
    }

    #[test]
    fn test_forward_from_user_is_plain_text() {
        let msg = message(
            private_chat(),
            json!({
                "text": "hello",
                "forward_origin": {
                    "type": "user",
                    "date": 1_699_999_000,
                    "sender_user": {"id": 7, "is_bot": false, "first_name": "Bo"},
                },
            }),
        );
        assert!(matches!(
            translate_message(&msg),
            Some(InboundEvent::MenuSelection { .. })
        ));
    }

    #[test]
    fn test_group_created_service_message() {
        let msg = message(
            json!({"id": -55, "type": "group", "title": "New"}),
            json!({"group_chat_created": true}),
        );
        assert_eq!(
            translate_message(&msg),
            Some(InboundEvent::AddedToGroup { chat: ChatId(-55) })
        );
    }

    #[test]
    fn test_group_chatter_is_ignored() {
        let msg = message(
            json!({"id": -55, "type": "supergroup", "title": "Grp"}),
            json!({"text": "📁 My Channels"}),
        );
        assert_eq!(translate_message(&msg), None);
    }

    #[test]
    fn test_private_text_maps_to_start_or_menu() {
        let start = message(private_chat(), json!({"text": "/start"}));
        assert_eq!(
            translate_message(&start),
            Some(InboundEvent::Start {
                user: ana(),
                chat: ChatId(42),
            })
        );

        let menu = message(private_chat(), json!({"text": " 📁 My Channels "}));
        assert_eq!(
            translate_message(&menu),
            Some(InboundEvent::MenuSelection {
                user: UserId(42),
                chat: ChatId(42),
                label: "📁 My Channels".into(),
            })
        );
    }

    fn callback(data: &str) -> CallbackQuery {
        serde_json::from_value(json!({
            "id": "cb-1",
            "from": sender(),
            "chat_instance": "ci",
            "data": data,
        }))
        .unwrap()
    }

    #[test]
    fn test_callback_data_translates_to_moderation() {
        assert_eq!(
            translate_callback(&callback("approve_-100")),
            Some(InboundEvent::ModerationCallback {
                action: CallbackAction::new(Verdict::Approve, ChatId(-100)),
                from: UserId(42),
                callback_id: "cb-1".into(),
                reply_to: Some(ChatId(42)),
            })
        );
        assert_eq!(translate_callback(&callback("bogus")), None);
    }
}
