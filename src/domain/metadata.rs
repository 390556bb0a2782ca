use serde::{Deserialize, Serialize};

/// Value of a select box: kept as a list for the form widgets,
/// but holds at most one value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection(Vec<String>);

impl Selection {
    pub fn of(value: impl Into<String>) -> Self {
        let mut selection = Self::default();
        selection.select(value);
        selection
    }

    /// Replaces the current value. Blank input clears the selection.
    pub fn select(&mut self, value: impl Into<String>) {
        let value = value.into();
        self.0.clear();
        if !value.trim().is_empty() {
            self.0.push(value);
        }
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn selected(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MusicMetadata {
    pub genre: Selection,
    pub release_type: Selection,
    pub unlock_cost: Selection,
    pub allow_sponsorship: Selection,
    pub release_year: String,
}

/// Videos have no genre or release year.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub release_type: Selection,
    pub unlock_cost: Selection,
    pub allow_sponsorship: Selection,
}

/// Role of an artist credited on a whole album.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArtistRole {
    #[default]
    Primary,
    Featured,
    Producer,
    Composer,
}

impl std::str::FromStr for ArtistRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "primary" => Ok(Self::Primary),
            "featured" | "feature" => Ok(Self::Featured),
            "producer" => Ok(Self::Producer),
            "composer" => Ok(Self::Composer),
            other => Err(anyhow::anyhow!("unknown artist role '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryArtist {
    pub id: String,
    pub name: String,
    pub role: ArtistRole,
}

/// Drops the empty feature-artist slots a form leaves behind.
pub fn filled_names(names: &[String]) -> Vec<String> {
    names
        .iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
