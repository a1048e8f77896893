//! Recently used tools: a tiny most-recent-first list with a TTL.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const RECENT_CAPACITY: usize = 3;
/// Entries older than this are dropped on load.
pub const RECENT_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// The tools served by this site.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Tool {
    Abidos,
    Dispatch,
    Auction,
}

impl Tool {
    pub fn id(&self) -> &'static str {
        match self {
            Tool::Abidos => "abidos",
            Tool::Dispatch => "dispatch",
            Tool::Auction => "auction",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Tool::Abidos => "Abidos Calculator",
            Tool::Dispatch => "Dispatch Efficiency",
            Tool::Auction => "Auction Bid Calculator",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Tool::Abidos => "🪓",
            Tool::Dispatch => "📋",
            Tool::Auction => "💰",
        }
    }

    pub fn url(&self) -> &'static str {
        match self {
            Tool::Abidos => "/abidoscalculator",
            Tool::Dispatch => "/dispatch",
            Tool::Auction => "/auction",
        }
    }

    pub fn visit(&self, now_ms: i64) -> ToolVisit {
        ToolVisit {
            id: self.id().to_string(),
            name: self.name().to_string(),
            icon: self.icon().to_string(),
            url: self.url().to_string(),
            last_visited: now_ms,
        }
    }
}

/// One persisted entry; `last_visited` is unix milliseconds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolVisit {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub url: String,
    pub last_visited: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecentTools {
    entries: Vec<ToolVisit>,
}

impl RecentTools {
    pub fn from_entries(entries: Vec<ToolVisit>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[ToolVisit] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Move (or insert) the visit to the front, evicting beyond capacity.
    pub fn visit(&mut self, visit: ToolVisit) {
        self.entries.retain(|entry| entry.id != visit.id);
        self.entries.insert(0, visit);
        self.entries.truncate(RECENT_CAPACITY);
    }

    /// Drop expired entries. Returns true when anything was removed.
    pub fn prune(&mut self, now_ms: i64) -> bool {
        let cutoff = now_ms - RECENT_TTL.as_millis() as i64;
        let before = self.entries.len();
        self.entries.retain(|entry| entry.last_visited > cutoff);
        self.entries.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY_MS: i64 = 24 * 60 * 60 * 1000;

    #[test]
    fn visit_moves_to_front_and_caps() {
        let mut recent = RecentTools::default();
        recent.visit(Tool::Abidos.visit(1));
        recent.visit(Tool::Dispatch.visit(2));
        recent.visit(Tool::Auction.visit(3));
        recent.visit(Tool::Abidos.visit(4));

        let ids: Vec<&str> = recent.entries().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["abidos", "auction", "dispatch"]);
        assert_eq!(recent.entries()[0].last_visited, 4);

        recent.visit(ToolVisit {
            id: "other".into(),
            name: "Other".into(),
            icon: "?".into(),
            url: "/other".into(),
            last_visited: 5,
        });
        assert_eq!(recent.entries().len(), RECENT_CAPACITY);
        assert_eq!(recent.entries()[2].id, "auction");
    }

    #[test]
    fn prune_drops_week_old_entries() {
        let now = 30 * DAY_MS;
        let mut recent = RecentTools::from_entries(vec![
            Tool::Abidos.visit(now - DAY_MS),
            Tool::Dispatch.visit(now - 7 * DAY_MS),
        ]);
        assert!(recent.prune(now));
        assert_eq!(recent.entries().len(), 1);
        assert!(!recent.prune(now));
    }

    #[test]
    fn persisted_layout_is_a_plain_list() {
        let recent = RecentTools::from_entries(vec![Tool::Dispatch.visit(42)]);
        let json = serde_json::to_value(&recent).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!([{
                "id": "dispatch",
                "name": "Dispatch Efficiency",
                "icon": "📋",
                "url": "/dispatch",
                "lastVisited": 42
            }])
        );
    }
}
