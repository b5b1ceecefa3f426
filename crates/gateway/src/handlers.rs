//! Inbound event routing.

use std::fmt::Write;

use {
    promoter_broadcast::LINK_UNAVAILABLE,
    promoter_channels::{ActionButton, CallbackAction, ChatInfo, InboundEvent, UserProfile},
    promoter_common::{ChatId, Entity, EntityKind, UserId, Verdict},
    promoter_directory::{DirectoryError, NewRegistration},
    tracing::{debug, error, info, warn},
};

use crate::{
    menu::{MenuAction, keyboard},
    state::GatewayState,
};

// ── Reply texts ──────────────────────────────────────────────────────────────

const WELCOME: &str = "Welcome! Choose an option:";
const ADMIN_PANEL: &str = "Admin panel:";
const ADDED_TO_GROUP: &str = "I was added to a new group! To finish the registration, forward a message from this group to me in a private chat.";
const ADD_CHAT: &str = "Where do you want to add me? After adding me as an administrator, forward any message from the chat to me here.";
const SUBMITTED: &str = "Registration submitted for approval! You will be notified once it is approved.";
const ALREADY_REGISTERED: &str = "This chat is already registered in our system.";
const ADMIN_ONLY: &str = "This option is only available to administrators.";
const INTERNAL_ERROR: &str = "Something went wrong, please try again later.";
const NO_PENDING: &str = "There are no pending registrations.";
const NO_CHANNELS: &str = "No approved channels found at the moment.";
const NO_FEATURED: &str = "No featured channels at the moment.";
const NO_PROTECTED_USERS: &str = "No protected users found.";
const SENDING_LISTS: &str = "Processing and sending promotion lists. This may take a few minutes...";

/// How many channels the featured menu shows at most.
pub const FEATURED_COUNT: usize = 5;

/// Route one inbound event.
pub async fn handle_event(state: &GatewayState, event: InboundEvent) {
    match event {
        InboundEvent::Start { user, chat } => on_start(state, user, chat).await,
        InboundEvent::ForwardedChat {
            chat,
            from,
            reply_to,
        } => on_forwarded_chat(state, chat, from, reply_to).await,
        InboundEvent::MenuSelection { user, chat, label } => match MenuAction::from_label(&label) {
            Some(action) => on_menu(state, action, user, chat).await,
            None => debug!(%user, label = %label, "ignoring unrecognized text"),
        },
        InboundEvent::ModerationCallback {
            action,
            from,
            callback_id,
            reply_to,
        } => on_moderation(state, action, from, &callback_id, reply_to).await,
        InboundEvent::AddedToGroup { chat } => {
            info!(%chat, "added to a group");
            state.reply(chat, ADDED_TO_GROUP).await;
        },
    }
}

fn failure_text(e: &DirectoryError) -> &'static str {
    match e {
        DirectoryError::Duplicate(_) => ALREADY_REGISTERED,
        DirectoryError::PermissionDenied(_) => ADMIN_ONLY,
        DirectoryError::NotFound(_) => "Registration not found.",
        DirectoryError::Store(e) => {
            error!(error = %e, "state could not be saved");
            INTERNAL_ERROR
        },
    }
}

async fn on_start(state: &GatewayState, user: UserProfile, chat: ChatId) {
    let id = user.id;
    if let Err(e) = state.directory.record_user(user.into()).await {
        error!(user = %id, error = %e, "failed to record user");
    }

    let (text, rows) = if state.directory.is_admin(id).await {
        (ADMIN_PANEL, keyboard(&MenuAction::ADMIN))
    } else {
        (WELCOME, keyboard(&MenuAction::USER))
    };
    if let Err(e) = state.outbound.send_menu(chat, text, &rows).await {
        warn!(%chat, error = %e, "menu send failed");
    }
}

async fn on_forwarded_chat(state: &GatewayState, chat: ChatInfo, from: UserProfile, reply_to: ChatId) {
    let registration = NewRegistration {
        id: chat.id,
        title: chat.title,
        kind: chat.kind,
        registrant_id: from.id,
        registrant_handle: from.handle,
    };
    let text = match state.directory.register(registration).await {
        Ok(entity) => {
            info!(chat = %entity.id, kind = %entity.kind, registrant = %from.id, "registration submitted");
            SUBMITTED
        },
        Err(e) => failure_text(&e),
    };
    state.reply(reply_to, text).await;
}

async fn on_menu(state: &GatewayState, action: MenuAction, user: UserId, chat: ChatId) {
    debug!(%user, %action, "menu selection");
    if action.requires_admin() && !state.directory.is_admin(user).await {
        state.reply(chat, ADMIN_ONLY).await;
        return;
    }
    let result = match action {
        MenuAction::MyChannels => my_registrations(state, user, chat, EntityKind::Channel).await,
        MenuAction::MyGroups => my_registrations(state, user, chat, EntityKind::Group).await,
        MenuAction::SearchChannels => search_channels(state, chat).await,
        MenuAction::FeaturedChannels => featured_channels(state, chat).await,
        MenuAction::AddChat => {
            add_chat(state, chat).await;
            Ok(())
        },
        MenuAction::Moderate => moderate(state, user, chat).await,
        MenuAction::Network => network(state, user, chat).await,
        MenuAction::ProtectedUsers => protected_users(state, user, chat).await,
        MenuAction::SendLists => {
            start_send_lists(state, user, chat).await;
            Ok(())
        },
    };
    if let Err(e) = result {
        state.reply(chat, failure_text(&e)).await;
    }
}

// ── Member menu ──────────────────────────────────────────────────────────────

async fn my_registrations(
    state: &GatewayState,
    user: UserId,
    chat: ChatId,
    kind: EntityKind,
) -> Result<(), DirectoryError> {
    let mine = state.directory.registrations_of(user, kind).await;
    let noun = match kind {
        EntityKind::Channel => "channels",
        EntityKind::Group => "groups",
    };
    if mine.is_empty() {
        state
            .reply(chat, &format!("You don't have any registered {noun} yet."))
            .await;
        return Ok(());
    }

    let mut text = match kind {
        EntityKind::Channel => "Your Channels:\n\n".to_string(),
        EntityKind::Group => "Your Groups:\n\n".to_string(),
    };
    for entity in &mine.approved {
        let _ = writeln!(text, "✅ {} (Active)", entity.title);
    }
    for entity in &mine.pending {
        let _ = writeln!(text, "⏳ {} (Awaiting approval)", entity.title);
    }
    state.reply(chat, &text).await;
    Ok(())
}

async fn link_lines(state: &GatewayState, text: &mut String, marker: &str, entities: &[Entity]) {
    for entity in entities {
        match state.invite_link(entity.id).await {
            Some(link) => {
                let _ = writeln!(text, "{marker} {} - {link}", entity.title);
            },
            None => {
                let _ = writeln!(text, "{marker} {} {LINK_UNAVAILABLE}", entity.title);
            },
        }
    }
}

async fn search_channels(state: &GatewayState, chat: ChatId) -> Result<(), DirectoryError> {
    let channels = state.directory.approved_of_kind(EntityKind::Channel).await;
    if channels.is_empty() {
        state.reply(chat, NO_CHANNELS).await;
        return Ok(());
    }
    let mut text = "Approved Channels:\n\n".to_string();
    link_lines(state, &mut text, EntityKind::Channel.marker(), &channels).await;
    state.reply(chat, &text).await;
    Ok(())
}

async fn featured_channels(state: &GatewayState, chat: ChatId) -> Result<(), DirectoryError> {
    let featured = state
        .directory
        .featured(EntityKind::Channel, FEATURED_COUNT)
        .await;
    if featured.is_empty() {
        state.reply(chat, NO_FEATURED).await;
        return Ok(());
    }
    let mut text = "Featured Channels:\n\n".to_string();
    link_lines(state, &mut text, "⭐", &featured).await;
    state.reply(chat, &text).await;
    Ok(())
}

/// Deep links that open the "add bot to group/channel" picker.
fn add_chat_buttons(bot: &str) -> [ActionButton; 2] {
    [
        ActionButton::url("👥 Add Group", format!("https://t.me/{bot}?startgroup=true")),
        ActionButton::url("📺 Add Channel", format!("https://t.me/{bot}?startchannel=true")),
    ]
}

async fn add_chat(state: &GatewayState, chat: ChatId) {
    let Some(bot) = state.bot_handle.as_deref() else {
        state.reply(chat, ADD_CHAT).await;
        return;
    };
    if let Err(e) = state
        .outbound
        .send_with_actions(chat, ADD_CHAT, &add_chat_buttons(bot))
        .await
    {
        warn!(%chat, error = %e, "add-chat reply failed");
    }
}

// ── Admin menu ───────────────────────────────────────────────────────────────

fn registration_card(entity: &Entity) -> String {
    let registrant = entity
        .registrant_handle
        .as_deref()
        .map(|h| format!("@{h}"))
        .unwrap_or_else(|| "N/A".to_string());
    format!(
        "New Registration:\n\nName: {}\nType: {}\nRegistered by: {registrant}",
        entity.title, entity.kind
    )
}

async fn moderate(state: &GatewayState, user: UserId, chat: ChatId) -> Result<(), DirectoryError> {
    let pending = state.directory.list_pending(user).await?;
    if pending.is_empty() {
        state.reply(chat, NO_PENDING).await;
        return Ok(());
    }
    for entity in &pending {
        let buttons = [
            ActionButton::callback("✅ Approve", CallbackAction::new(Verdict::Approve, entity.id)),
            ActionButton::callback("❌ Reject", CallbackAction::new(Verdict::Reject, entity.id)),
        ];
        if let Err(e) = state
            .outbound
            .send_with_actions(chat, &registration_card(entity), &buttons)
            .await
        {
            warn!(%chat, entity = %entity.id, error = %e, "moderation card send failed");
        }
    }
    Ok(())
}

async fn network(state: &GatewayState, user: UserId, chat: ChatId) -> Result<(), DirectoryError> {
    let overview = state.directory.network_overview(user).await?;
    let mut text = format!(
        "Partner Network:\n\nTotal approved partners: {}\nApproved groups: {}\nApproved channels: {}\n",
        overview.total(),
        overview.groups.len(),
        overview.channels.len()
    );
    if !overview.groups.is_empty() {
        text.push_str("\nApproved groups:\n");
        for title in &overview.groups {
            let _ = writeln!(text, "- {title}");
        }
    }
    if !overview.channels.is_empty() {
        text.push_str("\nApproved channels:\n");
        for title in &overview.channels {
            let _ = writeln!(text, "- {title}");
        }
    }
    state.reply(chat, &text).await;
    Ok(())
}

async fn protected_users(state: &GatewayState, user: UserId, chat: ChatId) -> Result<(), DirectoryError> {
    let users = state.directory.protected_users(user).await?;
    if users.is_empty() {
        state.reply(chat, NO_PROTECTED_USERS).await;
        return Ok(());
    }
    let mut text = format!("Protected Users:\n\nTotal users: {}\n\n", users.len());
    for u in &users {
        let handle = u
            .handle
            .as_deref()
            .map(|h| format!("@{h}"))
            .unwrap_or_else(|| "N/A".to_string());
        let _ = writeln!(text, "- ID: {}, Name: {}, Username: {handle}", u.id, u.full_name());
    }
    state.reply(chat, &text).await;
    Ok(())
}

async fn start_send_lists(state: &GatewayState, user: UserId, chat: ChatId) {
    state.reply(chat, SENDING_LISTS).await;
    info!(admin = %user, "manual promotion list run requested");

    let state = state.clone();
    tokio::spawn(async move { send_lists(&state, chat).await });
}

/// Run one distribution and report the outcome to `chat`.
pub(crate) async fn send_lists(state: &GatewayState, chat: ChatId) {
    let text = match state.broadcaster.run(&state.cancel).await {
        Ok(outcome) if outcome.batches == 0 => "No approved partners to send lists to.".to_string(),
        Ok(outcome) if outcome.cancelled => format!(
            "Sending stopped early: {} delivered, {} failed.",
            outcome.delivered, outcome.failed
        ),
        Ok(outcome) => format!(
            "Promotion lists sent! {} list(s), {} delivered, {} failed.",
            outcome.batches, outcome.delivered, outcome.failed
        ),
        Err(e) => {
            error!(error = %e, "manual promotion list run failed");
            format!("Promotion lists could not be sent: {e}")
        },
    };
    state.reply(chat, &text).await;
}

// ── Moderation buttons ───────────────────────────────────────────────────────

async fn on_moderation(
    state: &GatewayState,
    action: CallbackAction,
    from: UserId,
    callback_id: &str,
    reply_to: Option<ChatId>,
) {
    let ack = match state.directory.decide(from, action.entity, action.verdict).await {
        Ok(intent) => {
            let to = intent.recipient.chat();
            if let Err(e) = state.outbound.send_text(to, &intent.message()).await {
                warn!(%to, error = %e, "registrant notification failed");
            }
            if let Some(admin_chat) = reply_to {
                state.reply(admin_chat, &intent.admin_summary()).await;
            }
            "Done."
        },
        Err(e) => {
            debug!(%from, %action, error = %e, "moderation refused");
            failure_text(&e)
        },
    };
    if let Err(e) = state.outbound.acknowledge(callback_id, ack).await {
        debug!(error = %e, "callback acknowledgement failed");
    }
}
