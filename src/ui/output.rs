use crate::sql::{QueryResult, SchemaSnapshot, SqlValue};
use crate::ui::highlight::CodeRenderer;
use colored::*;

/// Print the final answer, highlighting any fenced code it contains.
pub fn display_answer(content: &str) {
    let renderer = CodeRenderer::new();
    println!("{}", renderer.render_markdown(content).trim_end());
}

/// Print a generated SQL statement in a boxed block.
pub fn display_sql(statement: &str) {
    let renderer = CodeRenderer::new();
    print!("{}", renderer.render_block("SQL", statement, Some("sql")));
}

pub fn display_table(result: &QueryResult) {
    println!("{}", format_table(result));
    println!(
        "{}",
        format!(
            "({} row{})",
            result.rows.len(),
            if result.rows.len() == 1 { "" } else { "s" }
        )
        .dimmed()
    );
}

pub fn display_schema(schema: &SchemaSnapshot) {
    if schema.is_empty() {
        println!("{}", "No tables found.".yellow());
        return;
    }
    println!("{}", "Tables:".bold());
    for table in schema.tables() {
        println!("  {}", table.cyan());
    }
}

pub fn display_error(message: &str) {
    eprintln!("{} {}", "Error:".red(), message);
}

fn cell(value: &SqlValue) -> String {
    match value {
        SqlValue::Null => "NULL".to_string(),
        SqlValue::Text(t) => t.clone(),
        other => other.to_string(),
    }
}

/// Column-aligned plain-text table.
pub fn format_table(result: &QueryResult) -> String {
    let rows: Vec<Vec<String>> = result
        .rows
        .iter()
        .map(|row| row.iter().map(cell).collect())
        .collect();

    let mut widths: Vec<usize> = result.columns.iter().map(|c| c.chars().count()).collect();
    for row in &rows {
        for (idx, value) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(idx) {
                *width = (*width).max(value.chars().count());
            }
        }
    }

    let format_row = |values: &[String]| -> String {
        values
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!("{:<width$}", v, width = *w))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![format_row(&result.columns)];
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    for row in &rows {
        lines.push(format_row(row));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_table_aligns_columns() {
        let result = QueryResult {
            columns: vec!["country".into(), "n".into()],
            rows: vec![
                vec![SqlValue::Text("USA".into()), SqlValue::Integer(13)],
                vec![SqlValue::Text("Canada".into()), SqlValue::Null],
            ],
        };

        assert_eq!(
            format_table(&result),
            "country | n\n--------+-----\nUSA     | 13\nCanada  | NULL"
        );
    }
}
