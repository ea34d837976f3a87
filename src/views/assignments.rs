use crate::controllers::AssignmentsPage;
use crate::export::format_number;
use crate::services::gradebook_api::Assignment;
use crate::views::{Node, Table, format_day};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum AssignmentTab {
    /// Assignments with ungraded submissions.
    Needs,
    /// Everything else.
    Graded,
}

pub fn assignment_list(page: &AssignmentsPage, tab: AssignmentTab) -> Vec<Node> {
    let title = page
        .course_title
        .clone()
        .unwrap_or_else(|| format!("Course {}", page.course_id));

    let (label, items, empty) = match tab {
        AssignmentTab::Needs => (
            "Needs grading",
            &page.needs_grading,
            "Nothing needs grading.",
        ),
        AssignmentTab::Graded => ("Graded", &page.graded, "No graded assignments yet."),
    };

    let mut nodes = vec![
        Node::Heading(title),
        Node::Line(format!(
            "{label}  [needs grading: {} | graded: {}]",
            page.needs_grading.len(),
            page.graded.len()
        )),
        Node::Blank,
    ];

    if items.is_empty() {
        nodes.push(Node::Notice(empty.into()));
        return nodes;
    }

    let mut table = Table::new(["ID", "ASSIGNMENT", "DUE", "POINTS", ""]);
    for a in items {
        table.push_row(assignment_row(a));
    }
    nodes.push(Node::Table(table));
    nodes
}

fn assignment_row(a: &Assignment) -> [String; 5] {
    let due = a
        .due_at
        .as_ref()
        .map(format_day)
        .unwrap_or_else(|| "No due date".to_string());
    let badge = match a.needs_grading_count.unwrap_or(0) {
        0 => String::new(),
        n => format!("{n} need grading"),
    };
    [
        a.id.to_string(),
        a.name.clone(),
        due,
        format!("{} pts", format_number(a.points_possible.unwrap_or(0.0))),
        badge,
    ]
}
