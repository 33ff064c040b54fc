use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

/// Error code reported when no credential was supplied.
pub const NO_TOKEN: &str = "no_token";

/// One Woodpecker pipeline run, normalized from the API payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pipeline {
    pub id: i64,
    /// Sequence number within the repository
    pub number: i64,
    pub status: String,
    /// Trigger kind (e.g., "push", "pull_request", "cron")
    pub event: String,
    pub branch: String,
    /// First line of the commit or trigger message
    pub message: String,
    pub author: String,
    /// Short commit SHA (at most 7 characters)
    pub commit: String,
    pub created: i64,
    pub started: i64,
    pub finished: i64,
    /// `finished - started` in seconds, 0 while either end is unknown.
    /// Clock skew between agents can make this negative; it is not clamped.
    pub duration: i64,
    pub steps: Vec<Step>,
}

impl Pipeline {
    /// Pipeline is still in flight and worth step-level detail.
    pub fn is_active(&self) -> bool {
        matches!(self.status.as_str(), "running" | "pending")
    }

    pub fn is_failing(&self) -> bool {
        matches!(self.status.as_str(), "failure" | "error")
    }
}

/// A single executed unit of a pipeline's workflow tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Step {
    pub name: String,
    pub state: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// An active repository with its most recent pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Repo {
    pub id: i64,
    pub name: String,
    pub full_name: String,
    pub active: bool,
    pub last_pipeline: Option<Pipeline>,
    /// Web UI link to the last pipeline, or to the repository if it never built
    pub link: String,
}

impl Repo {
    /// `created` of the last pipeline, 0 when the repository never built.
    pub fn last_activity(&self) -> i64 {
        self.last_pipeline.as_ref().map_or(0, |p| p.created)
    }
}

/// Envelope printed in the default mode (and, with `error` set, when no token
/// was supplied).
#[derive(Debug, Serialize)]
pub struct StatusReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub repos: Vec<Repo>,
    pub running: usize,
    pub failing: usize,
    #[serde(serialize_with = "iso_millis")]
    pub timestamp: DateTime<Utc>,
}

impl StatusReport {
    /// Builds the summary for an already sorted and enriched repo list.
    ///
    /// Repositories without a pipeline, or with a status that is neither
    /// active nor failing (`success`, `killed`, `skipped`, ...), count toward
    /// neither total.
    pub fn new(repos: Vec<Repo>, timestamp: DateTime<Utc>) -> Self {
        let running = count_where(&repos, Pipeline::is_active);
        let failing = count_where(&repos, Pipeline::is_failing);

        Self {
            error: None,
            repos,
            running,
            failing,
            timestamp,
        }
    }

    pub fn no_token(timestamp: DateTime<Utc>) -> Self {
        Self {
            error: Some(NO_TOKEN.to_string()),
            repos: Vec::new(),
            running: 0,
            failing: 0,
            timestamp,
        }
    }
}

/// Envelope printed in recent-pipelines mode.
#[derive(Debug, Serialize)]
pub struct PipelinesReport {
    pub pipelines: Vec<Pipeline>,
    #[serde(serialize_with = "iso_millis")]
    pub timestamp: DateTime<Utc>,
}

fn count_where(repos: &[Repo], predicate: impl Fn(&Pipeline) -> bool) -> usize {
    repos
        .iter()
        .filter(|repo| repo.last_pipeline.as_ref().is_some_and(&predicate))
        .count()
}

fn iso_millis<S: Serializer>(timestamp: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&timestamp.to_rfc3339_opts(SecondsFormat::Millis, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn pipeline(status: &str) -> Pipeline {
        Pipeline {
            id: 1,
            number: 1,
            status: status.to_string(),
            event: "push".to_string(),
            branch: "main".to_string(),
            message: String::new(),
            author: String::new(),
            commit: String::new(),
            created: 0,
            started: 0,
            finished: 0,
            duration: 0,
            steps: Vec::new(),
        }
    }

    fn repo(id: i64, status: Option<&str>) -> Repo {
        Repo {
            id,
            name: format!("repo-{id}"),
            full_name: format!("org/repo-{id}"),
            active: true,
            last_pipeline: status.map(pipeline),
            link: String::new(),
        }
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 30, 0).unwrap()
    }

    #[test]
    fn test_counts_running_and_failing() {
        let repos = vec![
            repo(1, Some("running")),
            repo(2, Some("pending")),
            repo(3, Some("failure")),
            repo(4, Some("error")),
            repo(5, Some("success")),
            repo(6, Some("killed")),
            repo(7, Some("skipped")),
            repo(8, None),
        ];

        let report = StatusReport::new(repos, fixed_time());

        assert_eq!(report.running, 2);
        assert_eq!(report.failing, 2);
        assert_eq!(report.repos.len(), 8);
        assert!(report.error.is_none());
    }

    #[test]
    fn test_empty_repo_list() {
        let report = StatusReport::new(Vec::new(), fixed_time());
        assert_eq!(report.running, 0);
        assert_eq!(report.failing, 0);
    }

    #[test]
    fn test_no_token_envelope() {
        let report = StatusReport::no_token(fixed_time());
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "error": "no_token",
                "repos": [],
                "running": 0,
                "failing": 0,
                "timestamp": "2026-10-19T12:30:00.000Z",
            })
        );
    }

    #[test]
    fn test_default_envelope_has_no_error_key() {
        let report = StatusReport::new(vec![repo(1, Some("success"))], fixed_time());
        let json = serde_json::to_value(&report).unwrap();

        assert!(json.get("error").is_none());
        assert_eq!(json["timestamp"], "2026-10-19T12:30:00.000Z");
        assert_eq!(json["repos"][0]["last_pipeline"]["steps"], serde_json::json!([]));
    }

    #[test]
    fn test_repo_without_pipeline_serializes_null() {
        let json = serde_json::to_value(repo(9, None)).unwrap();
        assert!(json["last_pipeline"].is_null());
    }

    #[test]
    fn test_step_kind_serializes_as_type() {
        let step = Step {
            name: "build".to_string(),
            state: "running".to_string(),
            kind: "commands".to_string(),
        };
        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(json["type"], "commands");
        assert!(json.get("kind").is_none());
    }

    #[test]
    fn test_pipelines_report_shape() {
        let report = PipelinesReport {
            pipelines: vec![pipeline("success")],
            timestamp: fixed_time(),
        };
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["pipelines"].as_array().unwrap().len(), 1);
        assert_eq!(json["timestamp"], "2026-10-19T12:30:00.000Z");
        assert!(json.get("repos").is_none());
    }
}
