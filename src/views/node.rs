use std::fmt::Write;

/// A virtual display node.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Heading(String),
    Line(String),
    /// Muted hint or empty-state text.
    Notice(String),
    Table(Table),
    Blank,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                let len = cell.chars().count();
                match widths.get_mut(i) {
                    Some(w) => *w = (*w).max(len),
                    None => widths.push(len),
                }
            }
        }
        widths
    }
}

/// Renders nodes as plain text, one node per line (tables span several).
pub fn render_text(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        match node {
            Node::Heading(text) => {
                let _ = writeln!(out, "{text}");
                let _ = writeln!(out, "{}", "=".repeat(text.chars().count()));
            }
            Node::Line(text) => {
                let _ = writeln!(out, "{text}");
            }
            Node::Notice(text) => {
                let _ = writeln!(out, "({text})");
            }
            Node::Table(table) => render_table(&mut out, table),
            Node::Blank => {
                let _ = writeln!(out);
            }
        }
    }
    out
}

fn render_table(out: &mut String, table: &Table) {
    let widths = table.widths();
    let line = |out: &mut String, cells: &[String]| {
        let padded: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(i, w)| {
                let cell = cells.get(i).map(String::as_str).unwrap_or("");
                let pad = w.saturating_sub(cell.chars().count());
                format!("{cell}{}", " ".repeat(pad))
            })
            .collect();
        let _ = writeln!(out, "{}", padded.join("  ").trim_end());
    };

    line(&mut *out, &table.headers);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let _ = writeln!(out, "{}", rule.join("  "));
    for row in &table.rows {
        line(&mut *out, row);
    }
}
