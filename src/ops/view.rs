//! Derived display order: search filter plus sort. Never persisted.

use std::cmp::Ordering;
use std::str::FromStr;

use crate::model::project::{Project, ProjectStatus};

/// Sort options offered by `list` and `export`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    Name,
    Tech,
    Status,
}

impl SortKey {
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::Tech => "tech",
            SortKey::Status => "status",
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "name" => Ok(SortKey::Name),
            "tech" => Ok(SortKey::Tech),
            "status" => Ok(SortKey::Status),
            _ => Err(format!(
                "unknown sort '{}' (expected: name, tech, status)",
                s
            )),
        }
    }
}

/// Case-insensitive substring match against the project name only.
/// An empty term matches everything.
pub fn matches_search(project: &Project, term: &str) -> bool {
    let term = term.trim();
    term.is_empty() || project.name.to_lowercase().contains(&term.to_lowercase())
}

/// Case-insensitive text order, exact string as tie-break
fn text_cmp(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

pub fn compare(a: &Project, b: &Project, key: SortKey) -> Ordering {
    match key {
        SortKey::Name => text_cmp(&a.name, &b.name),
        SortKey::Tech => text_cmp(&a.tech, &b.tech),
        SortKey::Status => ProjectStatus::rank(a.status).cmp(&ProjectStatus::rank(b.status)),
    }
}

/// Filter by `search` and stably sort by `key`.
pub fn filter_and_sort<'a, I>(projects: I, search: &str, key: SortKey) -> Vec<&'a Project>
where
    I: IntoIterator<Item = &'a Project>,
{
    let mut visible: Vec<&Project> = projects
        .into_iter()
        .filter(|p| matches_search(p, search))
        .collect();
    visible.sort_by(|a, b| compare(a, b, key));
    visible
}
