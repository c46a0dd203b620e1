use std::mem;

use crate::grammar::{Grammar, LineClass};
use crate::notebook::Cell;

/// Accumulates classified script lines into not-yet-materialized cell
/// content.
///
/// Three buffers are held at once: markdown, command and code.  At most one
/// of markdown/command is being appended to per line group, while the code
/// buffer picks up every plain line.  Classifying the current line decides
/// which pending buffers are forced out as cells before the line's content is
/// appended.  A buffer only materializes a cell when its trimmed content is
/// non-empty, so runs of bare markup lines produce nothing.
///
/// The accumulator exclusively owns its buffers for the duration of one
/// conversion pass; every pass starts from a fresh instance.
pub struct Accumulator<'g> {
    grammar: &'g Grammar,
    markdown: String,
    command: String,
    code: String,
    cells: Vec<Cell>,
}

impl<'g> Accumulator<'g> {
    pub fn new(grammar: &'g Grammar) -> Self {
        Accumulator {
            grammar,
            markdown: String::new(),
            command: String::new(),
            code: String::new(),
            cells: Vec::new(),
        }
    }

    /// Feed one script line, without its line terminator.
    pub fn push_line(&mut self, line: &str) {
        match self.grammar.classify(line) {
            LineClass::Markdown => {
                self.flush_code();
                let content = self.grammar.markdown_content(line);
                self.markdown.push_str(content);
                self.markdown.push('\n');
            }
            LineClass::Command => {
                self.flush_code();
                self.flush_markdown();
                let content = self.grammar.command_content(line);
                self.command.push_str(&content);
                self.command.push('\n');
            }
            LineClass::Split => {
                // A split marker carries no content of its own: it forces
                // every pending buffer out so the following lines start a
                // fresh cell.
                self.flush_code();
                self.flush_markdown();
                self.flush_command();
            }
            LineClass::Plain => {
                self.flush_markdown();
                self.flush_command();
                self.code.push_str(line);
                self.code.push('\n');
            }
        }
    }

    /// Flush the remaining buffers and hand back the materialized cells.
    ///
    /// End-of-input flush order is markdown, command, code.
    pub fn finish(mut self) -> Vec<Cell> {
        self.flush_markdown();
        self.flush_command();
        self.flush_code();
        self.cells
    }

    fn flush_markdown(&mut self) {
        let content = mem::take(&mut self.markdown);
        let content = content.trim();
        if !content.is_empty() {
            debug!("Materializing markdown cell ({} bytes).", content.len());
            self.cells.push(Cell::markdown(content));
        }
    }

    fn flush_command(&mut self) {
        let content = mem::take(&mut self.command);
        let content = content.trim();
        if !content.is_empty() {
            debug!("Materializing command cell ({} bytes).", content.len());
            self.cells.push(Cell::command(content));
        }
    }

    fn flush_code(&mut self) {
        let content = mem::take(&mut self.code);
        let content = content.trim();
        if !content.is_empty() {
            debug!("Materializing code cell ({} bytes).", content.len());
            self.cells.push(Cell::code(content));
        }
    }
}

#[cfg(test)]
mod test {
    use super::Accumulator;
    use crate::grammar::Grammar;
    use crate::notebook::{Cell, CellType, Source};

    fn accumulate(lines: &[&str]) -> Vec<Cell> {
        let grammar = Grammar::default();
        let mut accumulator = Accumulator::new(&grammar);
        for line in lines {
            accumulator.push_line(line);
        }
        accumulator.finish()
    }

    fn text(cell: &Cell) -> &str {
        match &cell.source {
            Source::Text(text) => text,
            Source::Lines(_) => panic!("freshly accumulated cells hold joined text"),
        }
    }

    #[test]
    fn code_markdown_code() {
        let cells = accumulate(&["x = 1", "#|hello", "y = 2"]);

        assert_eq!(cells.len(), 3);
        assert_eq!(cells[0].cell_type, CellType::Code);
        assert_eq!(text(&cells[0]), "x = 1");
        assert_eq!(cells[1].cell_type, CellType::Markdown);
        assert_eq!(text(&cells[1]), "hello");
        assert_eq!(cells[2].cell_type, CellType::Code);
        assert_eq!(text(&cells[2]), "y = 2");
    }

    #[test]
    fn command_then_code() {
        let cells = accumulate(&["#! pip install numpy", "import numpy"]);

        assert_eq!(cells.len(), 2);
        assert!(cells[0].is_command());
        assert_eq!(text(&cells[0]), "! pip install numpy");
        assert_eq!(cells[1].cell_type, CellType::Code);
        assert!(!cells[1].is_command());
        assert_eq!(text(&cells[1]), "import numpy");
    }

    #[test]
    fn split_forces_code_cell_boundary() {
        // Conformance: a split marker between two code groups yields two
        // cells, not one.
        let cells = accumulate(&["x = 1", "#-------------------------------", "y = 2"]);

        assert_eq!(cells.len(), 2);
        assert_eq!(text(&cells[0]), "x = 1");
        assert_eq!(text(&cells[1]), "y = 2");

        // The short marker spelling behaves identically.
        ////////////////////////////////////////
        let cells = accumulate(&["x = 1", "# -", "y = 2"]);
        assert_eq!(cells.len(), 2);
    }

    #[test]
    fn multi_line_accumulation() {
        // Adjacent lines of one class merge into a single cell.
        ////////////////////////////////////////
        let cells = accumulate(&["#| # Title", "#| some text", "#|   indented"]);

        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].cell_type, CellType::Markdown);
        assert_eq!(text(&cells[0]), "# Title\n some text\n   indented");

        // Blank lines inside a code group stay inside one cell.
        ////////////////////////////////////////
        let cells = accumulate(&["x = 1", "", "y = 2"]);
        assert_eq!(cells.len(), 1);
        assert_eq!(text(&cells[0]), "x = 1\n\ny = 2");

        // Command runs merge too, one newline apart.
        ////////////////////////////////////////
        let cells = accumulate(&["#! pip install a", "#! pip install b"]);
        assert_eq!(cells.len(), 1);
        assert_eq!(text(&cells[0]), "! pip install a\n! pip install b");
    }

    #[test]
    fn empty_buffers_produce_no_cells() {
        assert!(accumulate(&[]).is_empty());
        assert!(accumulate(&[""]).is_empty());
        assert!(accumulate(&["   ", "\t"]).is_empty());
        // Markup lines whose content is empty or whitespace-only.
        assert!(accumulate(&["#|", "#| ", "# |\t"]).is_empty());
        assert!(accumulate(&["#-", "# -----"]).is_empty());
    }

    #[test]
    fn markdown_flushes_before_command() {
        // A markdown run does not flush a pending command buffer; whichever
        // line finally forces both out materializes the markdown cell first.
        let cells = accumulate(&["#! pip install a", "#| note", "#! pip install b"]);

        assert_eq!(cells.len(), 2);
        assert_eq!(cells[0].cell_type, CellType::Markdown);
        assert_eq!(text(&cells[0]), "note");
        assert!(cells[1].is_command());
        assert_eq!(text(&cells[1]), "! pip install a\n! pip install b");
    }

    #[test]
    fn end_of_input_flush_order() {
        let cells = accumulate(&["x = 1", "#! ls", "#| note"]);

        assert_eq!(cells.len(), 3);
        assert_eq!(cells[0].cell_type, CellType::Code);
        assert_eq!(cells[1].cell_type, CellType::Markdown);
        assert!(cells[2].is_command());
    }
}
