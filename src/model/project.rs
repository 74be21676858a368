use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Project lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectStatus {
    Planned,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 3] = [
        ProjectStatus::Planned,
        ProjectStatus::InProgress,
        ProjectStatus::Completed,
    ];

    /// The label used on the wire and in reports
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectStatus::Planned => "Planned",
            ProjectStatus::InProgress => "In Progress",
            ProjectStatus::Completed => "Completed",
        }
    }

    /// Exact wire label lookup. Anything else is an unknown status.
    pub fn from_label(label: &str) -> Option<ProjectStatus> {
        ProjectStatus::ALL.into_iter().find(|s| s.as_str() == label)
    }

    /// Parse user input: case-insensitive, accepts `in-progress`, `in_progress`
    /// and `in progress` for the middle state.
    pub fn parse(s: &str) -> Result<ProjectStatus, String> {
        let norm = s.trim().to_lowercase().replace(['-', '_'], " ");
        match norm.as_str() {
            "planned" => Ok(ProjectStatus::Planned),
            "in progress" => Ok(ProjectStatus::InProgress),
            "completed" => Ok(ProjectStatus::Completed),
            _ => Err(format!(
                "unknown status '{}' (expected: planned, in-progress, completed)",
                s
            )),
        }
    }

    /// Display rank used by the status sort. Unknown/missing sorts last.
    pub fn rank(status: Option<ProjectStatus>) -> u8 {
        match status {
            Some(ProjectStatus::InProgress) => 0,
            Some(ProjectStatus::Planned) => 1,
            Some(ProjectStatus::Completed) => 2,
            None => 3,
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tracked project record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Temporary (locally generated) until the server assigns one
    pub id: String,
    pub name: String,
    /// Comma-separated technology tags
    #[serde(default)]
    pub tech: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_status"
    )]
    pub status: Option<ProjectStatus>,
    #[serde(default)]
    pub description: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_string"
    )]
    pub url: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_date"
    )]
    pub start_date: Option<NaiveDate>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_date"
    )]
    pub end_date: Option<NaiveDate>,
}

/// A project that has not been given an identifier yet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectDraft {
    pub name: String,
    pub tech: String,
    pub status: Option<ProjectStatus>,
    pub description: String,
    pub url: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Rejected local input
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("project name must not be empty")]
    EmptyName,
    #[error("end date {end} is before start date {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },
}

impl ProjectDraft {
    pub fn new(name: impl Into<String>) -> Self {
        ProjectDraft {
            name: name.into(),
            status: Some(ProjectStatus::Planned),
            ..Default::default()
        }
    }

    /// Attach an identifier, producing a full project
    pub fn into_project(self, id: String) -> Project {
        Project {
            id,
            name: self.name,
            tech: self.tech,
            status: self.status,
            description: self.description,
            url: self.url,
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(&self.name, self.start_date, self.end_date)
    }
}

impl Project {
    /// Tech tags split on commas, trimmed, empties dropped
    pub fn tech_tags(&self) -> Vec<&str> {
        split_tech(&self.tech)
    }

    pub fn is_completed(&self) -> bool {
        self.status == Some(ProjectStatus::Completed)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(&self.name, self.start_date, self.end_date)
    }
}

/// Split a comma-separated tech string into trimmed, non-empty tags
pub fn split_tech(tech: &str) -> Vec<&str> {
    tech.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}

fn validate_fields(
    name: &str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if let (Some(start), Some(end)) = (start, end)
        && end < start
    {
        return Err(ValidationError::EndBeforeStart { start, end });
    }
    Ok(())
}

/// Parse a `YYYY-MM-DD` date. Longer timestamps are cut to their date part.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    let date_part = s.get(..10).unwrap_or(s);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

// ---------------------------------------------------------------------------
// Lenient deserializers for server-provided fields
// ---------------------------------------------------------------------------

fn lenient_status<'de, D: Deserializer<'de>>(d: D) -> Result<Option<ProjectStatus>, D::Error> {
    let raw: Option<String> = Option::deserialize(d)?;
    Ok(raw.as_deref().and_then(ProjectStatus::from_label))
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let raw: Option<String> = Option::deserialize(d)?;
    Ok(raw.filter(|s| !s.trim().is_empty()))
}

fn lenient_date<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
    let raw: Option<String> = Option::deserialize(d)?;
    Ok(raw.as_deref().and_then(parse_date))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn status_labels_round_trip_through_from_label() {
        for s in ProjectStatus::ALL {
            assert_eq!(ProjectStatus::from_label(s.as_str()), Some(s));
        }
        assert_eq!(ProjectStatus::from_label("in progress"), None);
    }

    #[test]
    fn status_parse_accepts_cli_spellings() {
        assert_eq!(ProjectStatus::parse("in-progress"), Ok(ProjectStatus::InProgress));
        assert_eq!(ProjectStatus::parse("In Progress"), Ok(ProjectStatus::InProgress));
        assert_eq!(ProjectStatus::parse("in_progress"), Ok(ProjectStatus::InProgress));
        assert_eq!(ProjectStatus::parse("COMPLETED"), Ok(ProjectStatus::Completed));
        assert!(ProjectStatus::parse("done").is_err());
    }

    #[test]
    fn status_rank_puts_unknown_last() {
        let mut ranks: Vec<_> = [
            None,
            Some(ProjectStatus::Completed),
            Some(ProjectStatus::Planned),
            Some(ProjectStatus::InProgress),
        ]
        .into_iter()
        .map(ProjectStatus::rank)
        .collect();
        ranks.sort();
        assert_eq!(ranks, vec![0, 1, 2, 3]);
        assert!(ProjectStatus::rank(None) > ProjectStatus::rank(Some(ProjectStatus::Completed)));
    }

    #[test]
    fn tech_tags_trim_and_drop_empties() {
        let mut p = ProjectDraft::new("x").into_project("1".into());
        p.tech = " React, TypeScript ,, Redux Toolkit ,".into();
        assert_eq!(p.tech_tags(), vec!["React", "TypeScript", "Redux Toolkit"]);
    }

    #[test]
    fn deserialize_camel_case_fields() {
        let json = r#"{
            "id": "3",
            "name": "MeetingMind",
            "tech": "FastAPI, Whisper",
            "status": "Completed",
            "description": "Summarizer",
            "url": "https://example.com/",
            "startDate": "2024-06-10",
            "endDate": "2024-06-24"
        }"#;
        let p: Project = serde_json::from_str(json).unwrap();
        assert_eq!(p.status, Some(ProjectStatus::Completed));
        assert_eq!(p.start_date, Some(date("2024-06-10")));
        assert_eq!(p.end_date, Some(date("2024-06-24")));
        assert_eq!(p.url.as_deref(), Some("https://example.com/"));
    }

    #[test]
    fn deserialize_is_lenient_about_server_noise() {
        let json = r#"{
            "id": "9",
            "name": "Odd",
            "status": "Archived",
            "url": "",
            "startDate": "",
            "endDate": "2024-06-24T10:00:00Z"
        }"#;
        let p: Project = serde_json::from_str(json).unwrap();
        assert_eq!(p.status, None);
        assert_eq!(p.url, None);
        assert_eq!(p.start_date, None);
        assert_eq!(p.end_date, Some(date("2024-06-24")));
        assert_eq!(p.tech, "");
        assert_eq!(p.description, "");
    }

    #[test]
    fn serialize_uses_wire_labels_and_skips_absent_fields() {
        let mut p = ProjectDraft::new("Tracker").into_project("1".into());
        p.status = Some(ProjectStatus::InProgress);
        let value = serde_json::to_value(&p).unwrap();
        assert_eq!(value["status"], "In Progress");
        assert!(value.get("url").is_none());
        assert!(value.get("startDate").is_none());
    }

    #[test]
    fn validate_rejects_blank_name_and_reversed_dates() {
        assert_eq!(ProjectDraft::new("  ").validate(), Err(ValidationError::EmptyName));

        let mut draft = ProjectDraft::new("Resume Builder");
        draft.start_date = Some(date("2024-05-15"));
        draft.end_date = Some(date("2024-05-05"));
        assert!(matches!(
            draft.validate(),
            Err(ValidationError::EndBeforeStart { .. })
        ));

        draft.end_date = Some(date("2024-05-15"));
        assert!(draft.validate().is_ok());
    }
}
