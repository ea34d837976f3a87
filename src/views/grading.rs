use crate::export::format_number;
use crate::services::gradebook_api::SubmissionDetail;
use crate::views::{Node, format_timestamp};

pub fn grading_page(detail: &SubmissionDetail) -> Vec<Node> {
    let student = detail
        .user
        .as_ref()
        .and_then(|u| u.name.clone())
        .unwrap_or_else(|| "Unknown Student".to_string());

    let mut nodes = vec![Node::Heading(student)];
    if let Some(at) = &detail.submitted_at {
        nodes.push(Node::Line(format!("Submitted: {}", format_timestamp(at))));
    }
    nodes.push(Node::Line(format!("Attempt: {}", detail.attempt.unwrap_or(1))));
    nodes.push(Node::Blank);
    nodes.extend(content(detail));
    nodes.push(Node::Blank);

    nodes.push(Node::Line(format!(
        "Current score: {}",
        detail
            .score
            .map(format_number)
            .unwrap_or_else(|| "not graded".to_string())
    )));
    if let Some(last) = detail.submission_comments.last() {
        nodes.push(Node::Line(format!("Last comment: {}", last.comment)));
    }
    nodes
}

fn content(detail: &SubmissionDetail) -> Vec<Node> {
    match detail.submission_type.as_deref() {
        Some("online_text_entry") if detail.body.is_some() => vec![
            Node::Heading("Submission Text".into()),
            Node::Line(detail.body.clone().unwrap_or_default()),
        ],
        Some("online_upload") if !detail.attachments.is_empty() => {
            let mut nodes = vec![Node::Heading("Attachments".into())];
            nodes.extend(detail.attachments.iter().map(|a| {
                let name = a
                    .filename
                    .as_deref()
                    .or(a.display_name.as_deref())
                    .unwrap_or("attachment");
                Node::Line(format!("{name}: {}", a.url.as_deref().unwrap_or("")))
            }));
            nodes
        }
        Some("online_url") if detail.url.is_some() => vec![
            Node::Heading("Submitted URL".into()),
            Node::Line(detail.url.clone().unwrap_or_default()),
        ],
        _ => vec![Node::Notice("No submission content available".into())],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::gradebook_api::{Attachment, SubmissionComment, UserRef};

    #[test]
    fn test_upload_lists_attachments_and_last_comment() {
        let detail = SubmissionDetail {
            user: Some(UserRef {
                name: Some("Ada Lovelace".into()),
            }),
            attempt: Some(2),
            submission_type: Some("online_upload".into()),
            attachments: vec![Attachment {
                url: Some("https://files.test/1".into()),
                filename: None,
                display_name: Some("notes.pdf".into()),
            }],
            score: Some(9.5),
            submission_comments: vec![
                SubmissionComment { comment: "first".into() },
                SubmissionComment { comment: "latest".into() },
            ],
            ..Default::default()
        };

        let nodes = grading_page(&detail);
        assert_eq!(nodes[0], Node::Heading("Ada Lovelace".into()));
        assert!(nodes.contains(&Node::Line("Attempt: 2".into())));
        assert!(nodes.contains(&Node::Line("notes.pdf: https://files.test/1".into())));
        assert!(nodes.contains(&Node::Line("Current score: 9.5".into())));
        assert_eq!(nodes.last(), Some(&Node::Line("Last comment: latest".into())));
    }

    #[test]
    fn test_empty_submission() {
        let nodes = grading_page(&SubmissionDetail::default());
        assert_eq!(nodes[0], Node::Heading("Unknown Student".into()));
        assert!(nodes.contains(&Node::Notice("No submission content available".into())));
        assert!(nodes.contains(&Node::Line("Current score: not graded".into())));
    }
}
