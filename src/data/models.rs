//! Data models for the migration record

use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Suffix of listing links that point at a pending follow request
const PENDING_REQUEST_SUFFIX: &str = "/request";

fn user_link_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"/users/(\d+)").expect("valid user link regex"))
}

/// Stable identifier of a followed account (the numeric pixiv user id)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationshipId(String);

impl RelationshipId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Normalize a listing link such as `/en/users/123` to its bare id.
    ///
    /// Returns `None` for pending follow requests and for links that do not
    /// carry a user id.
    pub fn from_link(link: &str) -> Option<Self> {
        if link.ends_with(PENDING_REQUEST_SUFFIX) {
            return None;
        }
        user_link_pattern()
            .captures(link)
            .and_then(|caps| caps.get(1))
            .map(|m| Self(m.as_str().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for RelationshipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RelationshipId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Remove duplicates, keeping the first occurrence of each id
pub fn dedup_ids(ids: impl IntoIterator<Item = RelationshipId>) -> Vec<RelationshipId> {
    let mut seen = HashSet::new();
    ids.into_iter()
        .filter(|id| seen.insert(id.clone()))
        .collect()
}

/// Visibility class of a follow relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisibilityTier {
    Public,
    Private,
}

impl VisibilityTier {
    /// Tiers in the order they are extracted and replayed
    pub const ALL: [VisibilityTier; 2] = [VisibilityTier::Public, VisibilityTier::Private];

    pub fn as_str(&self) -> &'static str {
        match self {
            VisibilityTier::Public => "public",
            VisibilityTier::Private => "private",
        }
    }
}

impl fmt::Display for VisibilityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-tier completion flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    pub public: bool,
    pub private: bool,
}

impl Completion {
    pub fn is_done(&self, tier: VisibilityTier) -> bool {
        match tier {
            VisibilityTier::Public => self.public,
            VisibilityTier::Private => self.private,
        }
    }

    pub fn mark_done(&mut self, tier: VisibilityTier) {
        match tier {
            VisibilityTier::Public => self.public = true,
            VisibilityTier::Private => self.private = true,
        }
    }

    pub fn all_done(&self) -> bool {
        self.public && self.private
    }
}

/// Persisted migration state: the extracted follow lists plus completion flags.
///
/// Field names match the on-disk backup artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupRecord {
    pub public_followers: Vec<RelationshipId>,
    pub private_followers: Vec<RelationshipId>,
    pub done: Completion,
}

impl BackupRecord {
    /// Fresh record from extraction results; nothing replayed yet
    pub fn extracted(public: Vec<RelationshipId>, private: Vec<RelationshipId>) -> Self {
        Self {
            public_followers: public,
            private_followers: private,
            done: Completion::default(),
        }
    }

    pub fn ids(&self, tier: VisibilityTier) -> &[RelationshipId] {
        match tier {
            VisibilityTier::Public => &self.public_followers,
            VisibilityTier::Private => &self.private_followers,
        }
    }

    pub fn ids_mut(&mut self, tier: VisibilityTier) -> &mut Vec<RelationshipId> {
        match tier {
            VisibilityTier::Public => &mut self.public_followers,
            VisibilityTier::Private => &mut self.private_followers,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.public_followers.is_empty() && self.private_followers.is_empty()
    }

    pub fn total(&self) -> usize {
        self.public_followers.len() + self.private_followers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[&str]) -> Vec<RelationshipId> {
        raw.iter().map(|s| RelationshipId::from(*s)).collect()
    }

    #[test]
    fn test_from_link_extracts_user_id() {
        assert_eq!(
            RelationshipId::from_link("/en/users/12345"),
            Some(RelationshipId::new("12345"))
        );
        assert_eq!(
            RelationshipId::from_link("https://www.pixiv.net/en/users/42"),
            Some(RelationshipId::new("42"))
        );
    }

    #[test]
    fn test_from_link_drops_pending_requests() {
        assert_eq!(RelationshipId::from_link("/en/users/12345/request"), None);
    }

    #[test]
    fn test_from_link_ignores_sub_pages() {
        assert_eq!(
            RelationshipId::from_link("/en/users/777/illustrations"),
            Some(RelationshipId::new("777"))
        );
        assert_eq!(RelationshipId::from_link("/en/users/"), None);
        assert_eq!(RelationshipId::from_link("/en/artworks/1"), None);
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let deduped = dedup_ids(ids(&["3", "1", "3", "2", "1"]));
        assert_eq!(deduped, ids(&["3", "1", "2"]));
    }

    #[test]
    fn test_completion_flags_per_tier() {
        let mut done = Completion::default();
        assert!(!done.is_done(VisibilityTier::Public));

        done.mark_done(VisibilityTier::Public);
        assert!(done.is_done(VisibilityTier::Public));
        assert!(!done.is_done(VisibilityTier::Private));
        assert!(!done.all_done());

        done.mark_done(VisibilityTier::Private);
        assert!(done.all_done());
    }

    #[test]
    fn test_record_serializes_to_artifact_shape() {
        let record = BackupRecord::extracted(ids(&["10", "20"]), ids(&["30"]));
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "public_followers": ["10", "20"],
                "private_followers": ["30"],
                "done": { "public": false, "private": false }
            })
        );
    }

    #[test]
    fn test_record_tier_accessors() {
        let mut record = BackupRecord::extracted(ids(&["1"]), ids(&["2", "3"]));
        assert_eq!(record.ids(VisibilityTier::Private).len(), 2);
        assert_eq!(record.total(), 3);

        record.ids_mut(VisibilityTier::Public).clear();
        assert!(record.ids(VisibilityTier::Public).is_empty());
        assert!(!record.is_empty());
    }
}
