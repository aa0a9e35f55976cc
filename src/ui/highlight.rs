use colored::*;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Style, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::{as_24_bit_terminal_escaped, LinesWithEndings};

const MAX_RULE_WIDTH: usize = 60;

/// Renders code blocks as boxed, syntax-highlighted terminal output.
pub struct CodeRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
}

impl Default for CodeRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeRenderer {
    pub fn new() -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
        }
    }

    pub fn highlight(&self, code: &str, lang: Option<&str>) -> String {
        let Some(theme) = self.theme_set.themes.get("Solarized (dark)") else {
            return code.to_string();
        };

        let syntax = lang
            .and_then(|lang| {
                self.syntax_set
                    .find_syntax_by_token(lang)
                    .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            })
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let mut highlighter = HighlightLines::new(syntax, theme);
        let mut output = String::new();

        for line in LinesWithEndings::from(code) {
            match highlighter.highlight_line(line, &self.syntax_set) {
                Ok(ranges) => {
                    let ranges: Vec<(Style, &str)> = ranges;
                    output.push_str(&as_24_bit_terminal_escaped(&ranges[..], false));
                }
                Err(_) => output.push_str(line),
            }
        }

        // Reset colors so following output is not tinted
        output.push_str("\x1b[0m");
        output
    }

    /// One boxed block with a label in the header.
    pub fn render_block(&self, label: &str, code: &str, lang: Option<&str>) -> String {
        let width = rule_width();
        let header_rule = "─".repeat(width.saturating_sub(label.chars().count() + 4));
        let mut code = code.to_string();
        if !code.ends_with('\n') {
            code.push('\n');
        }

        format!(
            "{}[{}]{}\n{}{}\n",
            "┌─".dimmed(),
            label.cyan(),
            header_rule.dimmed(),
            self.highlight(&code, lang),
            format!("└{}", "─".repeat(width.saturating_sub(1))).dimmed()
        )
    }

    /// Text with ``` fenced blocks boxed and highlighted. An unterminated
    /// fence runs to the end of the content.
    pub fn render_markdown(&self, content: &str) -> String {
        let mut output = String::new();
        let mut rest = content;

        while let Some(start) = rest.find("```") {
            output.push_str(&rest[..start]);
            let after = &rest[start + 3..];

            let (lang_line, body) = after.split_once('\n').unwrap_or((after, ""));
            let lang = lang_line.trim();
            let lang = (!lang.is_empty()).then_some(lang);

            let (code, remaining) = match body.find("```") {
                Some(end) => (&body[..end], &body[end + 3..]),
                None => (body, ""),
            };

            output.push_str(&self.render_block(lang.unwrap_or("code"), code, lang));
            rest = remaining.strip_prefix('\n').unwrap_or(remaining);
        }

        output.push_str(rest);
        output
    }
}

fn rule_width() -> usize {
    terminal_size::terminal_size()
        .map(|(terminal_size::Width(w), _)| w as usize)
        .unwrap_or(MAX_RULE_WIDTH)
        .clamp(10, MAX_RULE_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_passes_through() {
        colored::control::set_override(false);
        let renderer = CodeRenderer::new();
        assert_eq!(renderer.render_markdown("no code here"), "no code here");
    }

    #[test]
    fn test_fenced_block_is_boxed() {
        colored::control::set_override(false);
        let renderer = CodeRenderer::new();
        let out = renderer.render_markdown("before\n```sql\nSELECT 1;\n```\nafter");
        assert!(out.starts_with("before\n┌─[sql]"));
        assert!(out.contains("SELECT"));
        assert!(out.ends_with("after"));
    }

    #[test]
    fn test_unterminated_fence() {
        colored::control::set_override(false);
        let renderer = CodeRenderer::new();
        let out = renderer.render_markdown("```\nraw");
        assert!(out.contains("[code]"));
        assert!(out.contains("raw"));
    }
}
