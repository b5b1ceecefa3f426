//! Offline operator commands against the state file. They act as the
//! configured bootstrap admin and never contact Telegram.

use std::fmt::Write;

use {
    anyhow::{Context, Result},
    clap::Subcommand,
    promoter_broadcast::{build_batches, render_batch},
    promoter_channels::OfflineLinks,
    promoter_common::{ChatId, UserId, Verdict},
    promoter_config::PromoterConfig,
    promoter_directory::Directory,
};

#[derive(Subcommand)]
pub enum StateAction {
    /// List registrations awaiting moderation.
    Pending,
    /// Approve a pending registration.
    Approve {
        /// Chat id of the registration.
        #[arg(allow_hyphen_values = true)]
        id: ChatId,
    },
    /// Reject a pending registration.
    Reject {
        /// Chat id of the registration.
        #[arg(allow_hyphen_values = true)]
        id: ChatId,
    },
    /// Show the approved network.
    Network,
    /// Show the protected-user roster.
    Users,
    /// Render the next promotion lists without sending them.
    Preview,
}

pub async fn handle_state(action: StateAction, config: &PromoterConfig) -> Result<()> {
    let actor = config
        .bootstrap
        .admin()
        .context("bootstrap.admin_id must be set to use offline commands")?;
    let directory = promoter_gateway::open_directory(config)?;
    let output = run(action, &directory, actor).await?;
    print!("{output}");
    Ok(())
}

async fn run(action: StateAction, directory: &Directory, actor: UserId) -> Result<String> {
    let mut out = String::new();
    match action {
        StateAction::Pending => {
            let pending = directory.list_pending(actor).await?;
            if pending.is_empty() {
                out.push_str("no pending registrations\n");
            }
            for e in &pending {
                let by = e
                    .registrant_handle
                    .as_deref()
                    .map(|h| format!("@{h}"))
                    .unwrap_or_else(|| "-".to_string());
                writeln!(
                    out,
                    "{}\t{}\t{}\tby {} ({by})\t{}",
                    e.id,
                    e.kind,
                    e.title,
                    e.registrant_id,
                    e.registered_at.format("%Y-%m-%d %H:%M")
                )?;
            }
        },
        StateAction::Approve { id } => decide(&mut out, directory, actor, id, Verdict::Approve).await?,
        StateAction::Reject { id } => decide(&mut out, directory, actor, id, Verdict::Reject).await?,
        StateAction::Network => {
            let overview = directory.network_overview(actor).await?;
            writeln!(
                out,
                "{} approved: {} channels, {} groups",
                overview.total(),
                overview.channels.len(),
                overview.groups.len()
            )?;
            for title in &overview.channels {
                writeln!(out, "📺 {title}")?;
            }
            for title in &overview.groups {
                writeln!(out, "👥 {title}")?;
            }
        },
        StateAction::Users => {
            let users = directory.protected_users(actor).await?;
            writeln!(out, "{} protected users", users.len())?;
            for u in &users {
                let handle = u.handle.as_deref().map(|h| format!("@{h}")).unwrap_or_default();
                writeln!(out, "{}\t{}\t{handle}", u.id, u.full_name())?;
            }
        },
        StateAction::Preview => {
            let (approved, settings) = directory.distribution_snapshot().await;
            let batches = build_batches(&approved, settings.max_entities_per_list);
            if batches.is_empty() {
                out.push_str("no approved entities, nothing to send\n");
            }
            for batch in &batches {
                let rendered = render_batch(batch, &OfflineLinks).await;
                writeln!(out, "{}", rendered.text)?;
            }
            writeln!(
                out,
                "{} list(s) for {} recipient(s)",
                batches.len(),
                approved.len()
            )?;
        },
    }
    Ok(out)
}

async fn decide(
    out: &mut String,
    directory: &Directory,
    actor: UserId,
    id: ChatId,
    verdict: Verdict,
) -> Result<()> {
    let intent = directory.decide(actor, id, verdict).await?;
    writeln!(out, "{}", intent.admin_summary())?;
    writeln!(
        out,
        "registrant {} was not notified; offline commands do not send messages",
        intent.recipient
    )?;
    Ok(())
}
