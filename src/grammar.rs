/// The markup class assigned to a single line of script text.
///
/// Every line maps to exactly one class; lines matching no markup prefix are
/// `Plain` and belong to an ordinary code cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass {
    /// A shell-command line (`#!` or `# !`).
    Command,
    /// A markdown line (`#|` or `# |`).
    Markdown,
    /// A cell-split marker (`#-` or `# -`).
    Split,
    /// Anything else.
    Plain,
}

/// The comment-markup dialect shared by both conversion directions.
///
/// A `Grammar` is an immutable configuration value handed to the pipelines
/// rather than process-wide state, so alternate dialects can be exercised in
/// isolation.  Classification checks the prefix lists in fixed priority
/// order (command, markdown, split) and within each list the first matching
/// prefix wins.
#[derive(Debug, Clone)]
pub struct Grammar {
    command_prefixes: Vec<String>,
    markdown_prefixes: Vec<String>,
    split_prefixes: Vec<String>,
    split_marker: String,
}

impl Default for Grammar {
    fn default() -> Self {
        Grammar::new(
            &["#!", "# !"],
            &["#|", "# |"],
            &["#-", "# -"],
            "#-------------------------------",
        )
    }
}

impl Grammar {
    /// Build a dialect from its prefix lists and the marker line emitted for
    /// cell splits on the render pass.
    ///
    /// The marker must itself classify as `Split` or rendered output would
    /// not survive a round trip.
    pub fn new(command: &[&str], markdown: &[&str], split: &[&str], split_marker: &str) -> Self {
        Grammar {
            command_prefixes: command.iter().map(|s| s.to_string()).collect(),
            markdown_prefixes: markdown.iter().map(|s| s.to_string()).collect(),
            split_prefixes: split.iter().map(|s| s.to_string()).collect(),
            split_marker: split_marker.to_string(),
        }
    }

    /// Classify one raw line of script text.
    ///
    /// This is pure and total: no side effects, and every input maps to
    /// exactly one class.
    pub fn classify(&self, line: &str) -> LineClass {
        if matched_prefix(line, &self.command_prefixes).is_some() {
            LineClass::Command
        } else if matched_prefix(line, &self.markdown_prefixes).is_some() {
            LineClass::Markdown
        } else if matched_prefix(line, &self.split_prefixes).is_some() {
            LineClass::Split
        } else {
            LineClass::Plain
        }
    }

    /// Extract the markdown content of a line classified `Markdown`.
    ///
    /// The matched prefix ends at the `|` delimiter; everything after it is
    /// kept verbatim, including any leading space.  The author's leading
    /// whitespace is trimmed again when the cell is rendered back, so keeping
    /// it here costs nothing and preserves intra-cell indentation.
    pub fn markdown_content<'l>(&self, line: &'l str) -> &'l str {
        strip_matched_prefix(line, &self.markdown_prefixes).unwrap_or(line)
    }

    /// Extract the command content of a line classified `Command`.
    ///
    /// The matched prefix ends at the `!` delimiter.  One further leading `!`
    /// in the remainder is dropped, undoing the shell-invocation marker a
    /// notebook-side command cell may have originally carried, and the kept
    /// text is re-prefixed with `!` so the cell runs as a shell command when
    /// the notebook is executed.
    pub fn command_content(&self, line: &str) -> String {
        let rest = strip_matched_prefix(line, &self.command_prefixes).unwrap_or(line);
        let rest = rest.strip_prefix('!').unwrap_or(rest);
        format!("!{}", rest)
    }

    /// The canonical prefix (plus a space) applied to markdown lines on the
    /// render pass.
    pub fn markdown_marker(&self) -> &str {
        &self.markdown_prefixes[0]
    }

    /// The canonical prefix (plus a space) applied to command lines on the
    /// render pass.
    pub fn command_marker(&self) -> &str {
        &self.command_prefixes[0]
    }

    /// The marker line reinserted between adjacent code cells on the render
    /// pass.
    pub fn split_marker(&self) -> &str {
        &self.split_marker
    }
}

fn matched_prefix<'g>(line: &str, prefixes: &'g [String]) -> Option<&'g str> {
    prefixes
        .iter()
        .map(|p| p.as_str())
        .find(|p| line.starts_with(*p))
}

fn strip_matched_prefix<'l>(line: &'l str, prefixes: &[String]) -> Option<&'l str> {
    matched_prefix(line, prefixes).map(|p| &line[p.len()..])
}
