use serde::{Deserialize, Serialize};

/// The three edge relations that can be toggled on and off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    /// user -> user
    Follow,
    /// user -> post
    Like,
    /// user -> group
    GroupMembership,
}

impl RelationKind {
    pub const ALL: [RelationKind; 3] = [
        RelationKind::Follow,
        RelationKind::Like,
        RelationKind::GroupMembership,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::Follow => "follow",
            RelationKind::Like => "like",
            RelationKind::GroupMembership => "group_membership",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "follow" => Some(RelationKind::Follow),
            "like" => Some(RelationKind::Like),
            "group_membership" | "membership" => Some(RelationKind::GroupMembership),
            _ => None,
        }
    }
}
