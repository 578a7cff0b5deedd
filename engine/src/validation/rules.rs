use std::sync::LazyLock;

use regex_lite::Regex;
use serde_json::Value;

use super::{IssueSource, ValidationIssue};
use crate::record::vocabulary::{SEX_ACRONYMS, is_recognized_sex};

/// Date+time with fractional seconds, date+time, or date+hour:minute.
/// Unanchored, so a trailing zone designator (`Z`, `+02:00`) is accepted.
#[allow(clippy::expect_used)] // literal pattern; failure is a programming error
static DATE_OF_BIRTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(\d{4}-[01]\d-[0-3]\dT[0-2]\d:[0-5]\d:[0-5]\d\.\d+)|(\d{4}-[01]\d-[0-3]\dT[0-2]\d:[0-5]\d:[0-5]\d)|(\d{4}-[01]\d-[0-3]\dT[0-2]\d:[0-5]\d)",
    )
    .expect("date of birth pattern compiles")
});

/// Cross-field rules the schema cannot express. Every rule runs; results
/// accumulate.
pub fn validate_rules(candidate: &Value) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    check_subject_sex(candidate, &mut issues);
    check_task_cameras(candidate, &mut issues);
    check_video_file_cameras(candidate, &mut issues);
    check_date_of_birth(candidate, &mut issues);
    issues
}

fn rule_issue(
    field_id: impl Into<String>,
    top_level_field: &str,
    instance_path: impl Into<String>,
    message: String,
) -> ValidationIssue {
    ValidationIssue {
        source: IssueSource::Rule,
        field_id: field_id.into(),
        top_level_field: Some(top_level_field.to_string()),
        instance_path: instance_path.into(),
        message,
    }
}

fn check_subject_sex(candidate: &Value, issues: &mut Vec<ValidationIssue>) {
    let sex = candidate.pointer("/subject/sex");
    if sex.and_then(Value::as_str).is_some_and(is_recognized_sex) {
        return;
    }
    let shown = match sex {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "(missing)".to_string(),
    };
    issues.push(rule_issue(
        "subject-sex",
        "subject",
        "/subject/sex",
        format!(
            "Key: subject.sex | Error: Subject's sex is limited to one from - {} (must be capitalized). Your value is: {shown}",
            SEX_ACRONYMS.join(",")
        ),
    ));
}

fn cameras_defined(candidate: &Value) -> bool {
    candidate
        .get("cameras")
        .and_then(Value::as_array)
        .is_some_and(|cameras| !cameras.is_empty())
}

/// A camera reference counts when it is a non-empty list, a number, or a
/// non-blank string.
fn references_camera(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Array(ids)) => !ids.is_empty(),
        Some(Value::Number(_)) => true,
        Some(Value::String(s)) => !s.trim().is_empty(),
        _ => false,
    }
}

fn first_camera_reference(candidate: &Value, collection: &str) -> Option<usize> {
    candidate
        .get(collection)?
        .as_array()?
        .iter()
        .position(|item| references_camera(item.get("camera_id")))
}

fn check_task_cameras(candidate: &Value, issues: &mut Vec<ValidationIssue>) {
    if cameras_defined(candidate) {
        return;
    }
    if let Some(index) = first_camera_reference(candidate, "tasks") {
        issues.push(rule_issue(
            format!("tasks-camera_id-{index}"),
            "tasks",
            format!("/tasks/{index}/camera_id"),
            "Key: tasks.camera_id | Error: There is tasks camera_id, but no camera object with ids. No data is loaded".to_string(),
        ));
    }
}

fn check_video_file_cameras(candidate: &Value, issues: &mut Vec<ValidationIssue>) {
    if cameras_defined(candidate) {
        return;
    }
    if let Some(index) = first_camera_reference(candidate, "associated_video_files") {
        issues.push(rule_issue(
            format!("associated_video_files-camera_id-{index}"),
            "associated_video_files",
            format!("/associated_video_files/{index}/camera_id"),
            "Key: associated_video_files.camera_id | Error: There is associated_video_files camera_id, but no camera object with ids. No data is loaded".to_string(),
        ));
    }
}

fn check_date_of_birth(candidate: &Value, issues: &mut Vec<ValidationIssue>) {
    let Some(date_of_birth) = candidate
        .pointer("/subject/date_of_birth")
        .and_then(Value::as_str)
        .map(str::trim)
    else {
        return;
    };
    if date_of_birth.is_empty() || DATE_OF_BIRTH.is_match(date_of_birth) {
        return;
    }
    issues.push(rule_issue(
        "subject-date_of_birth",
        "subject",
        "/subject/date_of_birth",
        "Key: subject.date_of_birth | Error: Date of Birth must be a valid ISO 8601 format"
            .to_string(),
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn fields(issues: &[ValidationIssue]) -> Vec<String> {
        issues.iter().map(|i| i.field_id.clone()).collect()
    }

    #[test]
    fn test_accepts_recognized_subject() {
        let issues = validate_rules(&json!({
            "subject": {"sex": "F", "date_of_birth": "2023-04-01T10:20:30.000Z"},
        }));
        assert!(issues.is_empty(), "{issues:?}");
    }

    #[test]
    fn test_unknown_sex_implicates_subject() {
        let issues = validate_rules(&json!({"subject": {"sex": "Unknown"}}));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].top_level_field.as_deref(), Some("subject"));
        assert!(issues[0].message.contains("Your value is: Unknown"));
    }

    #[test]
    fn test_missing_subject_is_reported() {
        let issues = validate_rules(&json!({}));
        assert_eq!(fields(&issues), vec!["subject-sex"]);
        assert!(issues[0].message.contains("(missing)"));
    }

    #[test]
    fn test_task_camera_without_cameras() {
        let issues = validate_rules(&json!({
            "subject": {"sex": "M"},
            "tasks": [{"camera_id": []}, {"camera_id": [0]}],
        }));
        assert_eq!(fields(&issues), vec!["tasks-camera_id-1"]);
        assert_eq!(issues[0].top_level_field.as_deref(), Some("tasks"));
    }

    #[test]
    fn test_task_camera_with_empty_cameras_list() {
        let issues = validate_rules(&json!({
            "subject": {"sex": "M"},
            "cameras": [],
            "tasks": [{"camera_id": [0]}],
        }));
        assert_eq!(fields(&issues), vec!["tasks-camera_id-0"]);
    }

    #[test]
    fn test_camera_references_pass_when_cameras_defined() {
        let issues = validate_rules(&json!({
            "subject": {"sex": "M"},
            "cameras": [{"id": 0}],
            "tasks": [{"camera_id": [0]}],
            "associated_video_files": [{"name": "v", "camera_id": 0}],
        }));
        assert!(issues.is_empty());
    }

    #[test]
    fn test_video_file_camera_without_cameras() {
        let issues = validate_rules(&json!({
            "subject": {"sex": "M"},
            "associated_video_files": [{"name": "v", "camera_id": 2}],
        }));
        assert_eq!(fields(&issues), vec!["associated_video_files-camera_id-0"]);
    }

    #[test]
    fn test_date_of_birth_formats() {
        for ok in [
            "2023-04-01T10:20:30.123",
            "2023-04-01T10:20:30",
            "2023-04-01T10:20",
            " 2023-04-01T10:20 ",
            "",
            "   ",
        ] {
            let issues = validate_rules(&json!({"subject": {"sex": "M", "date_of_birth": ok}}));
            assert!(issues.is_empty(), "{ok:?} should be accepted");
        }

        let issues =
            validate_rules(&json!({"subject": {"sex": "M", "date_of_birth": "04/01/2023"}}));
        assert_eq!(fields(&issues), vec!["subject-date_of_birth"]);
        assert_eq!(issues[0].top_level_field.as_deref(), Some("subject"));
    }

    #[test]
    fn test_rules_accumulate() {
        let issues = validate_rules(&json!({
            "subject": {"sex": "x", "date_of_birth": "yesterday"},
            "tasks": [{"camera_id": [1]}],
            "associated_video_files": [{"camera_id": 1}],
        }));
        assert_eq!(issues.len(), 4);
    }
}
