//! Menu labels shown on the reply keyboards.

use std::fmt;

/// A menu entry selected by sending its label as plain text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuAction {
    SearchChannels,
    MyChannels,
    MyGroups,
    FeaturedChannels,
    AddChat,
    Moderate,
    Network,
    ProtectedUsers,
    SendLists,
}

impl MenuAction {
    pub const USER: [MenuAction; 5] = [
        MenuAction::SearchChannels,
        MenuAction::MyChannels,
        MenuAction::MyGroups,
        MenuAction::FeaturedChannels,
        MenuAction::AddChat,
    ];

    pub const ADMIN: [MenuAction; 4] = [
        MenuAction::Moderate,
        MenuAction::Network,
        MenuAction::ProtectedUsers,
        MenuAction::SendLists,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::SearchChannels => "🔍 Search Channels",
            Self::MyChannels => "📁 My Channels",
            Self::MyGroups => "👥 My Groups",
            Self::FeaturedChannels => "⭐ Featured Channels",
            Self::AddChat => "➕ Add Chat",
            Self::Moderate => "⏳ Moderate Registrations",
            Self::Network => "🌐 View Network",
            Self::ProtectedUsers => "🛡️ Protected Users",
            Self::SendLists => "📢 Send Lists",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::USER
            .into_iter()
            .chain(Self::ADMIN)
            .find(|action| action.label() == label)
    }

    pub fn requires_admin(self) -> bool {
        Self::ADMIN.contains(&self)
    }
}

impl fmt::Display for MenuAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Keyboard rows, two buttons per row.
pub fn keyboard(actions: &[MenuAction]) -> Vec<Vec<String>> {
    actions
        .chunks(2)
        .map(|row| row.iter().map(|a| a.label().to_string()).collect())
        .collect()
}
