use std::fs;
use std::io;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::grammar::Grammar;
use crate::notebook::{self, Notebook};

pub mod accumulator;
pub mod render;

use self::accumulator::Accumulator;
pub use self::render::notebook_to_script;

/// Build a notebook from script text.
///
/// The input is consumed line by line; each line is classified against the
/// grammar and accumulated into cells.
pub fn script_to_notebook<I>(input: &mut I, grammar: &Grammar) -> Result<Notebook, io::Error>
where
    I: io::BufRead,
{
    debug!("Accumulating script lines into cells.");

    let mut accumulator = Accumulator::new(grammar);
    for line in io::BufRead::lines(input.by_ref()) {
        accumulator.push_line(&line?);
    }
    Ok(Notebook::new(accumulator.finish()))
}

/// Convert a script file into a notebook file, returning the path written.
///
/// With no explicit output path the script's extension is swapped for
/// `.ipynb`; an explicit output path lacking that extension gains it as a
/// suffix.
pub fn convert_script(
    script: &Path,
    output: Option<&Path>,
    grammar: &Grammar,
    validate: bool,
) -> Result<PathBuf, io::Error> {
    info!("Converting script {}.", script.display());

    let file = fs::File::open(script)?;
    let mut reader = io::BufReader::new(file);
    let mut notebook = script_to_notebook(&mut reader, grammar)?;
    if validate {
        notebook::validate(&mut notebook);
    }

    let path = output_path(script, output, "ipynb");
    notebook::write_notebook(&path, &notebook)?;
    Ok(path)
}

/// Convert a notebook file into a script file, returning the path written.
pub fn convert_notebook(
    path: &Path,
    output: Option<&Path>,
    grammar: &Grammar,
) -> Result<PathBuf, io::Error> {
    info!("Converting notebook {}.", path.display());

    let notebook = notebook::read_notebook(path)?;

    let script = output_path(path, output, "py");
    let file = fs::File::create(&script)?;
    let mut writer = io::BufWriter::new(file);
    render::notebook_to_script(&notebook, grammar, &mut writer)?;
    writer.flush()?;
    Ok(script)
}

fn output_path(input: &Path, output: Option<&Path>, extension: &str) -> PathBuf {
    match output {
        Some(path) if path.extension().map_or(false, |e| e == extension) => path.to_path_buf(),
        Some(path) => {
            let mut raw = path.as_os_str().to_os_string();
            raw.push(".");
            raw.push(extension);
            PathBuf::from(raw)
        }
        None => input.with_extension(extension),
    }
}

#[cfg(test)]
mod test {
    use std::path::{Path, PathBuf};

    use super::{notebook_to_script, output_path, script_to_notebook};
    use crate::grammar::Grammar;
    use crate::notebook::CellType;

    const SCRIPT: &str = "\
#| # A title
#| Some *markdown*.

#! pip install numpy

import numpy as np

x = np.ones(3)

#-------------------------------

y = np.zeros(3)
";

    fn to_notebook(script: &str, grammar: &Grammar) -> crate::Notebook {
        script_to_notebook(&mut script.as_bytes(), grammar).unwrap()
    }

    fn to_script(notebook: &crate::Notebook, grammar: &Grammar) -> String {
        let mut output = Vec::new();
        notebook_to_script(notebook, grammar, &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn cell_sequence() {
        let grammar = Grammar::default();
        let notebook = to_notebook(SCRIPT, &grammar);

        let types: Vec<_> = notebook
            .cells
            .iter()
            .map(|cell| (cell.cell_type, cell.is_command()))
            .collect();
        assert_eq!(
            types,
            vec![
                (CellType::Markdown, false),
                (CellType::Code, true),
                (CellType::Code, false),
                (CellType::Code, false),
            ]
        );
    }

    #[test]
    fn round_trip_is_idempotent() {
        // Converting script -> notebook -> script twice must yield
        // byte-identical output on the second pass.
        let grammar = Grammar::default();

        let first = to_script(&to_notebook(SCRIPT, &grammar), &grammar);
        let second = to_script(&to_notebook(&first, &grammar), &grammar);
        assert_eq!(first, second);

        // The fixed point separates each adjacent pair of code cells with
        // exactly one marker: command/import and import-group/y-group.
        let markers = second
            .lines()
            .filter(|line| *line == "#-------------------------------")
            .count();
        assert_eq!(markers, 2);
    }

    #[test]
    fn round_trip_with_alternate_dialect() {
        let grammar = Grammar::new(&[";;!"], &[";;|"], &[";;-"], ";;----");
        let script = ";;| title\n\nx = 1\n\n;;----\n\ny = 2\n";

        let first = to_script(&to_notebook(script, &grammar), &grammar);
        let second = to_script(&to_notebook(&first, &grammar), &grammar);
        assert_eq!(first, second);
        assert!(second.contains(";;----\n"));
    }

    #[test]
    fn output_paths() {
        // Default: swap the input extension.
        ////////////////////////////////////////
        assert_eq!(
            output_path(Path::new("demo.py"), None, "ipynb"),
            PathBuf::from("demo.ipynb")
        );
        assert_eq!(
            output_path(Path::new("dir/demo.ipynb"), None, "py"),
            PathBuf::from("dir/demo.py")
        );

        // Explicit output: keep it, appending the extension if absent.
        ////////////////////////////////////////
        assert_eq!(
            output_path(Path::new("demo.py"), Some(Path::new("out.ipynb")), "ipynb"),
            PathBuf::from("out.ipynb")
        );
        assert_eq!(
            output_path(Path::new("demo.py"), Some(Path::new("out")), "ipynb"),
            PathBuf::from("out.ipynb")
        );
        assert_eq!(
            output_path(Path::new("demo.py"), Some(Path::new("out.v2")), "ipynb"),
            PathBuf::from("out.v2.ipynb")
        );
    }
}
