//! Decides, once per session, whether the user creates new media or edits an
//! existing catalog entry.

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::domain::entry::MediaKind;

pub mod resume;

/// Catalog entry the navigation layer asked to edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditTarget {
    Mix(String),
    Album(String),
    Video(String),
}

/// Query keys in the order they are honoured.
const QUERY_KEYS: [&str; 3] = ["mixId", "albumId", "videoId"];

impl EditTarget {
    pub fn for_kind(kind: MediaKind, id: impl Into<String>) -> Self {
        match kind {
            MediaKind::Single => EditTarget::Mix(id.into()),
            MediaKind::Album => EditTarget::Album(id.into()),
            MediaKind::Video => EditTarget::Video(id.into()),
        }
    }

    pub fn id(&self) -> &str {
        match self {
            EditTarget::Mix(id) | EditTarget::Album(id) | EditTarget::Video(id) => id,
        }
    }

    pub fn kind(&self) -> MediaKind {
        match self {
            EditTarget::Mix(_) => MediaKind::Single,
            EditTarget::Album(_) => MediaKind::Album,
            EditTarget::Video(_) => MediaKind::Video,
        }
    }

    /// Reads `mixId`, `albumId` or `videoId` from a query string such as `?albumId=42`.
    ///
    /// The identifiers are mutually exclusive; if several are present the first
    /// one in that order wins. Values are percent-decoded, blank values count as absent.
    pub fn from_query(query: &str) -> Option<Self> {
        let pairs: Vec<(String, String)> =
            form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
                .map(|(key, value)| (key.into_owned(), value.trim().to_string()))
                .filter(|(_, value)| !value.is_empty())
                .collect();

        let found: Vec<Self> = QUERY_KEYS
            .iter()
            .filter_map(|key| {
                let (_, value) = pairs.iter().find(|(k, _)| k == key)?;
                Some(match *key {
                    "mixId" => EditTarget::Mix(value.clone()),
                    "albumId" => EditTarget::Album(value.clone()),
                    _ => EditTarget::Video(value.clone()),
                })
            })
            .collect();

        if found.len() > 1 {
            log::warn!("query {query} names several edit targets, using {:?}", found[0]);
        }
        found.into_iter().next()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MusicTab {
    Single,
    Album,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActiveTab {
    Music(MusicTab),
    Video,
}

impl ActiveTab {
    pub fn for_kind(kind: MediaKind) -> Self {
        match kind {
            MediaKind::Single => ActiveTab::Music(MusicTab::Single),
            MediaKind::Album => ActiveTab::Music(MusicTab::Album),
            MediaKind::Video => ActiveTab::Video,
        }
    }

    pub fn kind(&self) -> MediaKind {
        match self {
            ActiveTab::Music(MusicTab::Single) => MediaKind::Single,
            ActiveTab::Music(MusicTab::Album) => MediaKind::Album,
            ActiveTab::Video => MediaKind::Video,
        }
    }
}

impl Default for ActiveTab {
    fn default() -> Self {
        ActiveTab::Music(MusicTab::Single)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionMode {
    Create,
    Edit,
}

/// Mode and tab of the current upload session.
///
/// The mode is fixed when the session starts; leaving and re-entering is the
/// only way to change it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    mode: SessionMode,
    tab: ActiveTab,
    target: Option<EditTarget>,
}

impl Default for EditSession {
    fn default() -> Self {
        Self::resolve(None)
    }
}

impl EditSession {
    pub fn resolve(target: Option<EditTarget>) -> Self {
        let session = match target {
            Some(target) => Self {
                mode: SessionMode::Edit,
                tab: ActiveTab::for_kind(target.kind()),
                target: Some(target),
            },
            None => Self {
                mode: SessionMode::Create,
                tab: ActiveTab::default(),
                target: None,
            },
        };
        log::info!(
            "upload session resolved: {:?} on {:?} tab",
            session.mode,
            session.tab
        );
        session
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn tab(&self) -> ActiveTab {
        self.tab
    }

    pub fn editing_id(&self) -> Option<&str> {
        self.target.as_ref().map(EditTarget::id)
    }

    pub fn active_kind(&self) -> MediaKind {
        self.tab.kind()
    }

    /// While editing, switching between single, album and video is not allowed.
    pub fn tabs_locked(&self) -> bool {
        self.mode == SessionMode::Edit
    }

    /// Switches the active tab; returns whether the switch happened.
    pub fn select_tab(&mut self, tab: ActiveTab) -> bool {
        if self.tabs_locked() && tab != self.tab {
            log::debug!("tab switch to {tab:?} ignored while editing");
            return false;
        }
        self.tab = tab;
        true
    }
}
