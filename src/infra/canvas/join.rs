use serde::Deserialize;
use std::collections::HashMap;

use crate::analytics::aggregate::UNKNOWN_SECTION;
use crate::services::gradebook_api::SubmissionRecord;

#[derive(Debug, Clone, Deserialize)]
pub struct RawUser {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub login_id: Option<String>,
    #[serde(default)]
    pub sis_user_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawSection {
    pub id: u64,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawEnrollment {
    #[serde(default)]
    pub user: Option<RawUser>,
    #[serde(default)]
    pub course_section_id: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawSubmission {
    #[serde(default)]
    pub user_id: Option<u64>,
    #[serde(default)]
    pub user: Option<RawUser>,
    #[serde(default)]
    pub submitted_at: Option<String>,
    #[serde(default)]
    pub missing: Option<bool>,
    #[serde(default)]
    pub workflow_state: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
}

struct EnrolledStudent<'a> {
    sis_user_id: Option<&'a str>,
    login_id: Option<&'a str>,
    section_id: Option<u64>,
}

/// Flattens raw Canvas submissions into dashboard records.
///
/// Enrollments supply the SIS id and login (submission `user` objects often
/// lack the SIS id); sections supply the section name, falling back to
/// `"Unknown Section"`.
pub fn join_submissions(
    submissions: &[RawSubmission],
    enrollments: &[RawEnrollment],
    sections: &[RawSection],
) -> Vec<SubmissionRecord> {
    let section_names: HashMap<u64, &str> =
        sections.iter().map(|s| (s.id, s.name.as_str())).collect();

    let students: HashMap<u64, EnrolledStudent<'_>> = enrollments
        .iter()
        .filter_map(|e| {
            let user = e.user.as_ref()?;
            Some((
                user.id?,
                EnrolledStudent {
                    sis_user_id: user.sis_user_id.as_deref(),
                    login_id: user.login_id.as_deref(),
                    section_id: e.course_section_id,
                },
            ))
        })
        .collect();

    submissions
        .iter()
        .map(|s| {
            let enrolled = s.user_id.and_then(|id| students.get(&id));
            let section_name = enrolled
                .and_then(|e| e.section_id)
                .and_then(|id| section_names.get(&id).copied())
                .unwrap_or(UNKNOWN_SECTION);

            SubmissionRecord {
                user_id: s.user_id,
                user_name: s.user.as_ref().and_then(|u| u.name.clone()),
                login_id: enrolled
                    .and_then(|e| e.login_id)
                    .map(str::to_string)
                    .or_else(|| s.user.as_ref().and_then(|u| u.login_id.clone())),
                sis_user_id: enrolled.and_then(|e| e.sis_user_id).map(str::to_string),
                section_name: Some(section_name.to_string()),
                submitted: s.submitted_at.as_deref().is_some_and(|t| !t.is_empty()),
                missing: s.missing.unwrap_or(false),
                workflow_state: s.workflow_state.clone(),
                score: s.score,
                major: None,
            }
        })
        .collect()
}
