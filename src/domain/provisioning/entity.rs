//! Local OS account description

use serde::{Deserialize, Serialize};

/// A local account to provision for a team member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalAccount {
    pub name: String,
    pub gid: Option<u32>,
    pub groups: Vec<String>,
    pub shell: String,
}

impl LocalAccount {
    /// Creates an account description; the name is lower-cased so it
    /// matches the lower-cased names the SSH daemon looks up.
    pub fn new(name: &str, gid: Option<u32>, groups: Vec<String>, shell: impl Into<String>) -> Self {
        Self {
            name: name.to_lowercase(),
            gid,
            groups,
            shell: shell.into(),
        }
    }
}
