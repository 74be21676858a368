use serde::Serialize;

use crate::model::project::Project;
use crate::model::session::UserInfo;
use crate::ops::stats::DashboardStats;
use crate::store::SyncStatus;
use crate::util::unicode::fit_padded;

/// Characters of an id shown in listings; any unique prefix resolves
pub const SHORT_ID_LEN: usize = 8;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct ProjectJson<'a> {
    #[serde(flatten)]
    pub project: &'a Project,
    pub sync: SyncStatus,
}

#[derive(Serialize)]
pub struct MutationJson<'a> {
    pub action: &'static str,
    pub id: &'a str,
    pub sync: SyncStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize)]
pub struct StatsJson<'a> {
    pub total: usize,
    pub most_used_tech: Option<&'a str>,
    pub unique_techs: usize,
}

impl<'a> From<&'a DashboardStats> for StatsJson<'a> {
    fn from(s: &'a DashboardStats) -> Self {
        StatsJson {
            total: s.total,
            most_used_tech: s.most_used_tech.as_deref(),
            unique_techs: s.unique_techs,
        }
    }
}

#[derive(Serialize)]
pub struct WhoamiJson<'a> {
    pub logged_in: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<&'a UserInfo>,
}

#[derive(Serialize)]
pub struct SignupJson<'a> {
    pub message: Option<&'a str>,
    pub user_id: Option<&'a str>,
}

#[derive(Serialize)]
pub struct PullJson {
    pub count: usize,
}

#[derive(Serialize)]
pub struct ExportJson<'a> {
    pub path: &'a str,
    pub format: &'static str,
    pub projects: usize,
    pub pages: usize,
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(SHORT_ID_LEN) {
        Some((i, _)) => &id[..i],
        None => id,
    }
}

/// Marker for entries the server has not confirmed
pub fn sync_marker(sync: SyncStatus) -> &'static str {
    match sync {
        SyncStatus::Confirmed => " ",
        SyncStatus::Pending => "*",
        SyncStatus::Failed => "!",
    }
}

fn status_label(project: &Project) -> &'static str {
    project.status.map_or("N/A", |s| s.as_str())
}

/// One listing row: sync marker, short id, name, status, tech
pub fn format_project_row(project: &Project, sync: SyncStatus) -> String {
    format!(
        "{}{} {} {} {}",
        sync_marker(sync),
        fit_padded(short_id(&project.id), SHORT_ID_LEN),
        fit_padded(&project.name, 28),
        fit_padded(status_label(project), 11),
        project.tech_tags().join(", ")
    )
    .trim_end()
    .to_string()
}

pub fn format_project_detail(project: &Project, sync: SyncStatus) -> Vec<String> {
    let mut lines = vec![
        format!("{} ({})", project.name, project.id),
        format!("status: {}", status_label(project)),
    ];
    let tags = project.tech_tags();
    if !tags.is_empty() {
        lines.push(format!("tech: {}", tags.join(", ")));
    }
    if let Some(url) = &project.url {
        lines.push(format!("url: {}", url));
    }
    if let Some(d) = project.start_date {
        lines.push(format!("start: {}", d));
    }
    if let Some(d) = project.end_date {
        lines.push(format!("end: {}", d));
    }
    lines.push(format!(
        "sync: {}",
        match sync {
            SyncStatus::Pending => "pending",
            SyncStatus::Confirmed => "confirmed",
            SyncStatus::Failed => "failed",
        }
    ));
    if !project.description.is_empty() {
        lines.push("description:".to_string());
        for line in project.description.lines() {
            lines.push(format!("  {}", line));
        }
    }
    lines
}

pub fn format_stats(stats: &DashboardStats) -> Vec<String> {
    vec![
        format!("Total projects: {}", stats.total),
        format!(
            "Most used tech: {}",
            stats.most_used_tech.as_deref().unwrap_or("N/A")
        ),
        format!("Unique techs:   {}", stats.unique_techs),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::project::{ProjectDraft, ProjectStatus};

    fn sample() -> Project {
        let mut draft = ProjectDraft::new("MeetingMind");
        draft.tech = "FastAPI,  Whisper".into();
        draft.status = Some(ProjectStatus::Completed);
        draft.description = "Summarizer\nwith emotion analysis".into();
        draft.into_project("6650f1c2a9e4b1d2c3f4a5b6".into())
    }

    #[test]
    fn row_shows_short_id_and_marker() {
        let row = format_project_row(&sample(), SyncStatus::Failed);
        assert!(row.starts_with("!6650f1c2 MeetingMind"));
        assert!(row.contains("Completed"));
        assert!(row.ends_with("FastAPI, Whisper"));
    }

    #[test]
    fn detail_indents_description() {
        let lines = format_project_detail(&sample(), SyncStatus::Confirmed);
        assert_eq!(lines[0], "MeetingMind (6650f1c2a9e4b1d2c3f4a5b6)");
        assert!(lines.contains(&"sync: confirmed".to_string()));
        assert_eq!(lines.last().unwrap(), "  with emotion analysis");
    }

    #[test]
    fn stats_show_na_without_tags() {
        let stats = DashboardStats {
            total: 0,
            most_used_tech: None,
            unique_techs: 0,
        };
        assert_eq!(format_stats(&stats)[1], "Most used tech: N/A");
    }
}
