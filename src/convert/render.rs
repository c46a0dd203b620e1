use std::io;

use crate::grammar::Grammar;
use crate::notebook::{CellType, Notebook};

/// Render a notebook back into the comment-tagged script dialect.
///
/// Cells are walked in document order: markdown lines regain the markdown
/// prefix, command lines regain the command prefix, plain code (and raw
/// content) is emitted verbatim.  When the previous cell and the current cell
/// are both code cells and the current one is not a command cell, the script
/// has no structural delimiter to keep them apart, so the canonical split
/// marker plus a blank line is reinserted first.
///
/// Every rendered line has trailing whitespace stripped and exactly one
/// newline appended, whatever the original line ending was, and every cell's
/// output is terminated with exactly one blank line.
pub fn notebook_to_script<O>(
    notebook: &Notebook,
    grammar: &Grammar,
    output: &mut O,
) -> Result<(), io::Error>
where
    O: io::Write,
{
    debug!("Rendering {} cells to script.", notebook.cells.len());

    let mut last_was_code = false;
    for cell in &notebook.cells {
        let command = cell.is_command();

        if last_was_code && cell.cell_type == CellType::Code && !command {
            writeln!(output, "{}", grammar.split_marker())?;
            writeln!(output)?;
        }

        for line in cell.source.lines() {
            let line = match cell.cell_type {
                CellType::Markdown => {
                    format!("{} {}", grammar.markdown_marker(), line.trim_start())
                }
                CellType::Code if command => {
                    format!("{} {}", grammar.command_marker(), strip_shell_marker(&line))
                }
                _ => line,
            };
            writeln!(output, "{}", line.trim_end())?;
        }
        writeln!(output)?;

        last_was_code = cell.cell_type == CellType::Code;
    }

    Ok(())
}

/// Drop one leading `!` (and the whitespace around it) from a command line so
/// the command prefix does not double the shell marker up on the next parse.
fn strip_shell_marker(line: &str) -> &str {
    let line = line.trim_start();
    match line.strip_prefix('!') {
        Some(rest) => rest.trim_start(),
        None => line,
    }
}
