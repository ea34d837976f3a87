use crate::services::gradebook_api::Course;
use crate::views::{EMPTY_CELL, Node, Table};

pub fn course_list(courses: &[Course]) -> Vec<Node> {
    let mut table = Table::new(["ID", "COURSE", "CODE", "STUDENTS", "TERM"]);
    for c in courses {
        table.push_row([
            c.id.to_string(),
            c.name.clone(),
            c.course_code.clone().unwrap_or_default(),
            format!("{} students", c.total_students.unwrap_or(0)),
            c.term_name().unwrap_or(EMPTY_CELL).to_string(),
        ]);
    }

    vec![
        Node::Heading("Courses".into()),
        Node::Table(table),
        Node::Blank,
        Node::Notice("open a course with `assignments --course-id <ID>`".into()),
    ]
}
