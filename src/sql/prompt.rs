use super::database::SchemaSnapshot;

/// Prompt asking for one SQL query restricted to the listed tables.
pub fn build_sql_prompt(schema: &SchemaSnapshot, user_input: &str) -> String {
    format!(
        "Using ONLY the table schema provided, write a SQL query to answer the user's request. \
         You MUST ONLY use the tables in the schema. Do not make up tables or abbreviate or change tables:\n\
         Tables: {}\n\
         User Input: {}\n\
         SQL Query:",
        schema.render(),
        user_input
    )
}
