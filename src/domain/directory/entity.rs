//! Directory entities: teams, accounts and their public keys

use serde::{Deserialize, Serialize};

/// A team in the remote organization, as returned by the directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: u64,
    pub slug: String,
    #[serde(default)]
    pub name: String,
}

impl Team {
    /// Whether this team is the one addressed by `team_ref`
    pub fn matches(&self, team_ref: &TeamRef) -> bool {
        (team_ref.id != 0 && self.id == team_ref.id)
            || (!team_ref.name.is_empty() && self.slug == team_ref.name)
    }
}

/// How a team is addressed in configuration: by slug, by numeric id, or both.
///
/// An empty name or a zero id is ignored when matching.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRef {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub id: u64,
}

impl TeamRef {
    pub fn new(name: impl Into<String>, id: u64) -> Self {
        Self {
            name: name.into(),
            id,
        }
    }

    pub fn by_name(name: impl Into<String>) -> Self {
        Self::new(name, 0)
    }

    pub fn by_id(id: u64) -> Self {
        Self::new(String::new(), id)
    }

    /// A reference with neither a name nor an id addresses no team
    pub fn is_configured(&self) -> bool {
        !self.name.is_empty() || self.id != 0
    }
}

impl std::fmt::Display for TeamRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.name, self.id)
    }
}

/// A remote account (team member)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub login: String,
    #[serde(default)]
    pub id: u64,
}

/// A public key registered to an account. `key` is the full credential line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKey {
    #[serde(default)]
    pub id: u64,
    pub key: String,
}

/// Joins keys into the blob delivered to the SSH daemon, preserving order
pub fn join_keys(keys: &[PublicKey]) -> String {
    keys.iter()
        .map(|k| k.key.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
