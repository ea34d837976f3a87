use crate::analytics::SubmissionStatus;
use crate::analytics::aggregate::UNKNOWN_SECTION;
use crate::controllers::SubmissionsPage;
use crate::export::{format_average, format_number};
use crate::program::UNKNOWN_PROGRAM;
use crate::views::{EMPTY_CELL, Node, Table, format_timestamp};

pub const ROSTER_HINT: &str = "Import a roster to see analytics by program.";

pub fn submissions_page(page: &SubmissionsPage) -> Vec<Node> {
    let mut nodes = assignment_info(page);
    nodes.push(Node::Blank);
    nodes.extend(section_cards(page));
    nodes.push(Node::Blank);
    nodes.extend(submission_table(page));
    nodes.push(Node::Blank);
    nodes.extend(program_table(page));
    nodes
}

fn assignment_info(page: &SubmissionsPage) -> Vec<Node> {
    let a = &page.assignment;
    let title = if a.name.is_empty() { "Assignment" } else { a.name.as_str() };
    vec![
        Node::Heading(title.to_string()),
        Node::Line(format!(
            "Due: {}",
            a.due_at
                .as_ref()
                .map(format_timestamp)
                .unwrap_or_else(|| EMPTY_CELL.to_string())
        )),
        Node::Line(format!(
            "Points: {}",
            a.points_possible
                .map(format_number)
                .unwrap_or_else(|| EMPTY_CELL.to_string())
        )),
    ]
}

/// Per-section cards; the unknown-section bucket is not shown.
fn section_cards(page: &SubmissionsPage) -> Vec<Node> {
    let mut table = Table::new(["SECTION", "STUDENTS", "GRADED", "AVERAGE"]);
    for s in &page.analytics.by_section {
        if s.section == UNKNOWN_SECTION {
            continue;
        }
        table.push_row([
            s.section.clone(),
            s.total_students.to_string(),
            s.graded.to_string(),
            format_average(s.average_score),
        ]);
    }
    vec![Node::Heading("Sections".into()), Node::Table(table)]
}

/// Raw submissions, sorted by student name. Unknown programs stay visible.
fn submission_table(page: &SubmissionsPage) -> Vec<Node> {
    let mut rows: Vec<[String; 5]> = page
        .submissions
        .iter()
        .map(|s| {
            [
                s.user_name.clone().unwrap_or_else(|| "Unknown".to_string()),
                s.user_id.map(|id| id.to_string()).unwrap_or_default(),
                s.major.clone().unwrap_or_else(|| UNKNOWN_PROGRAM.to_string()),
                SubmissionStatus::of(s).to_string(),
                s.score
                    .map(format_number)
                    .unwrap_or_else(|| EMPTY_CELL.to_string()),
            ]
        })
        .collect();
    rows.sort_by(|a, b| a[0].cmp(&b[0]));

    let mut table = Table::new(["STUDENT", "USER ID", "PROGRAM", "STATUS", "SCORE"]);
    for row in rows {
        table.push_row(row);
    }
    vec![Node::Heading("Submissions".into()), Node::Table(table)]
}

fn program_table(page: &SubmissionsPage) -> Vec<Node> {
    let mut nodes = vec![Node::Heading("Analytics by program".into())];
    if !page.roster_loaded {
        nodes.push(Node::Notice(ROSTER_HINT.into()));
        return nodes;
    }

    let mut table = Table::new(["PROGRAM", "STUDENTS", "GRADED", "AVERAGE SCORE"]);
    for g in page.program_groups() {
        table.push_row([
            g.program.clone(),
            g.students.to_string(),
            g.graded.to_string(),
            format_average(g.average()),
        ]);
    }
    nodes.push(Node::Table(table));
    nodes
}
