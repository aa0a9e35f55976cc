pub mod highlight;
pub mod output;

pub use output::{
    display_answer, display_error, display_schema, display_sql, display_table, format_table,
};
