use serde::Serialize;

use crate::error::{BuddyError, Result};

/// What the side panel shows.
///
/// `Chat` is only reachable once a chunk is selected; everything else is a
/// plain display toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    NoSelection,
    List,
    Chat,
}

/// A mode the user can ask for with the toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelMode {
    List,
    Chat,
}

impl std::str::FromStr for PanelMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "list" => Ok(Self::List),
            "chat" => Ok(Self::Chat),
            _ => Err(format!("Unknown mode '{s}'. Valid modes: list, chat")),
        }
    }
}

impl ViewMode {
    pub fn chat_enabled(self) -> bool {
        !matches!(self, Self::NoSelection)
    }

    /// A chunk was (re)selected: the list is brought forward.
    pub fn on_select(self) -> Self {
        Self::List
    }

    pub fn on_clear(self) -> Self {
        Self::NoSelection
    }

    pub fn request(self, target: PanelMode) -> Result<Self> {
        match (self, target) {
            (Self::NoSelection, PanelMode::Chat) => Err(BuddyError::Validation(
                "Select a chunk before opening the chat".to_string(),
            )),
            (Self::NoSelection, PanelMode::List) => Ok(Self::NoSelection),
            (_, PanelMode::List) => Ok(Self::List),
            (_, PanelMode::Chat) => Ok(Self::Chat),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Chat => "Chat",
            Self::List | Self::NoSelection => "Chunks",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_disallowed_without_selection() {
        let mode = ViewMode::default();
        assert!(!mode.chat_enabled());
        assert!(mode.request(PanelMode::Chat).is_err());
        assert_eq!(mode.request(PanelMode::List).unwrap(), ViewMode::NoSelection);
    }

    #[test]
    fn test_toggle_after_selection() {
        let mode = ViewMode::NoSelection.on_select();
        assert_eq!(mode, ViewMode::List);
        let mode = mode.request(PanelMode::Chat).unwrap();
        assert_eq!(mode, ViewMode::Chat);
        assert_eq!(mode.label(), "Chat");
        assert_eq!(mode.request(PanelMode::List).unwrap(), ViewMode::List);
    }

    #[test]
    fn test_select_from_chat_returns_to_list() {
        assert_eq!(ViewMode::Chat.on_select(), ViewMode::List);
        assert_eq!(ViewMode::Chat.on_clear(), ViewMode::NoSelection);
    }

    #[test]
    fn test_parse_panel_mode() {
        assert_eq!("LIST".parse::<PanelMode>().unwrap(), PanelMode::List);
        assert_eq!("chat".parse::<PanelMode>().unwrap(), PanelMode::Chat);
        assert!("grid".parse::<PanelMode>().is_err());
    }
}
