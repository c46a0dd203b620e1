use std::fs;
use std::io;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Map, Value};

/// Notebook format version written on every fresh conversion.
pub const NBFORMAT: u32 = 4;
pub const NBFORMAT_MINOR: u32 = 2;

/// A notebook document: an ordered sequence of cells plus fixed metadata.
///
/// A notebook is constructed fresh per conversion call, fully materialized in
/// memory, and serialized once.  On read, nothing beyond `cells[].cell_type`
/// and `cells[].source` is required; every other field falls back to its
/// default and unknown fields are ignored.
///
/// Struct fields are declared in the key order nbformat itself emits
/// (alphabetical), so serialization is stable and diff-friendly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notebook {
    #[serde(default)]
    pub cells: Vec<Cell>,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default = "default_nbformat")]
    pub nbformat: u32,
    #[serde(default = "default_nbformat_minor")]
    pub nbformat_minor: u32,
}

impl Notebook {
    /// A fresh notebook holding the given cells, carrying the fixed python3
    /// kernel metadata and format version.
    pub fn new(cells: Vec<Cell>) -> Notebook {
        Notebook {
            cells,
            metadata: Metadata::python3(),
            nbformat: NBFORMAT,
            nbformat_minor: NBFORMAT_MINOR,
        }
    }
}

fn default_nbformat() -> u32 {
    NBFORMAT
}

fn default_nbformat_minor() -> u32 {
    NBFORMAT_MINOR
}

/// The structural kind of a cell.
///
/// Command cells are not a distinct kind: they are code cells carrying a
/// `command` entry in `metadata.tags`, which keeps the container format
/// untouched while letting the renderer distinguish them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellType {
    Code,
    Markdown,
    Raw,
}

/// One unit of notebook content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    pub cell_type: CellType,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub execution_count: Option<Option<u64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Vec<Value>>,
    #[serde(default)]
    pub source: Source,
}

impl Cell {
    /// A fresh code cell with a nullable execution count and no outputs.
    pub fn code(content: &str) -> Cell {
        Cell {
            cell_type: CellType::Code,
            execution_count: Some(None),
            id: None,
            metadata: Map::new(),
            outputs: Some(Vec::new()),
            source: Source::Text(content.to_string()),
        }
    }

    /// A fresh markdown cell.
    pub fn markdown(content: &str) -> Cell {
        Cell {
            cell_type: CellType::Markdown,
            execution_count: None,
            id: None,
            metadata: Map::new(),
            outputs: None,
            source: Source::Text(content.to_string()),
        }
    }

    /// A fresh code cell tagged as a shell-command cell.
    pub fn command(content: &str) -> Cell {
        let mut cell = Cell::code(content);
        cell.metadata
            .insert("tags".to_string(), json!(["command"]));
        cell.metadata
            .insert("collapsed".to_string(), Value::Bool(false));
        cell
    }

    /// Whether this is a code cell tagged as a shell-command cell.
    pub fn is_command(&self) -> bool {
        self.cell_type == CellType::Code
            && self
                .metadata
                .get("tags")
                .and_then(Value::as_array)
                .map_or(false, |tags| {
                    tags.iter().any(|tag| tag.as_str() == Some("command"))
                })
    }
}

/// Distinguishes an absent field from a present-but-null one, so that code
/// cells can carry `"execution_count": null` while markdown cells omit the
/// key entirely.
fn nullable<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Cell content, either as the joined string the accumulator produces or as
/// the line list the on-disk format prefers.  Both shapes parse and both
/// serialize; the validator normalizes to the line list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Source {
    Text(String),
    Lines(Vec<String>),
}

impl Default for Source {
    fn default() -> Self {
        Source::Text(String::new())
    }
}

impl Source {
    /// Content as lines with line endings preserved.
    pub fn lines(&self) -> Vec<String> {
        match self {
            Source::Text(text) => split_keepends(text),
            Source::Lines(lines) => lines.clone(),
        }
    }

    /// Convert the joined form into the line-list form in place.
    pub fn normalize(&mut self) {
        if let Source::Text(text) = self {
            let lines = split_keepends(text);
            *self = Source::Lines(lines);
        }
    }
}

/// Split into lines keeping each line's terminator, as python's
/// `str.splitlines(keepends=True)` does for `\n`-terminated text.
fn split_keepends(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut start = 0;
    for (index, byte) in text.bytes().enumerate() {
        if byte == b'\n' {
            lines.push(text[start..=index].to_string());
            start = index + 1;
        }
    }
    if start < text.len() {
        lines.push(text[start..].to_string());
    }
    lines
}

/// Notebook-level metadata.  Only the kernel and language descriptors are
/// modeled; anything else a foreign notebook carries is kept verbatim.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kernelspec: Option<KernelSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_info: Option<LanguageInfo>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Metadata {
    /// The fixed metadata written on every fresh conversion: a python3
    /// kernel and the matching language descriptor.
    pub fn python3() -> Metadata {
        Metadata {
            kernelspec: Some(KernelSpec {
                display_name: "Python 3".to_string(),
                language: "python".to_string(),
                name: "python3".to_string(),
            }),
            language_info: Some(LanguageInfo {
                codemirror_mode: CodemirrorMode {
                    name: "ipython".to_string(),
                    version: 3,
                },
                file_extension: ".py".to_string(),
                mimetype: "text/x-python".to_string(),
                name: "python".to_string(),
                nbconvert_exporter: "python".to_string(),
                pygments_lexer: "ipython3".to_string(),
                version: "3.8.0".to_string(),
            }),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KernelSpec {
    pub display_name: String,
    pub language: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageInfo {
    pub codemirror_mode: CodemirrorMode,
    pub file_extension: String,
    pub mimetype: String,
    pub name: String,
    pub nbconvert_exporter: String,
    pub pygments_lexer: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodemirrorMode {
    pub name: String,
    pub version: u32,
}

/// Normalize the shape of every materialized cell.
///
/// Code cells gain their nullable execution count and empty output list if
/// absent; markdown and raw cells lose both if present; the ephemeral
/// per-cell identifier is stripped so output is deterministic; string-shaped
/// sources are split into line lists with line endings preserved.
pub fn validate(notebook: &mut Notebook) {
    debug!("Validating {} cells.", notebook.cells.len());

    for cell in &mut notebook.cells {
        cell.id = None;

        match cell.cell_type {
            CellType::Code => {
                if cell.execution_count.is_none() {
                    cell.execution_count = Some(None);
                }
                if cell.outputs.is_none() {
                    cell.outputs = Some(Vec::new());
                }
            }
            CellType::Markdown | CellType::Raw => {
                cell.execution_count = None;
                cell.outputs = None;
            }
        }

        cell.source.normalize();
    }
}

/// Read and parse a notebook file.
pub fn read_notebook(path: &Path) -> Result<Notebook, io::Error> {
    debug!("Reading notebook from {}.", path.display());

    let file = fs::File::open(path)?;
    let notebook = serde_json::from_reader(io::BufReader::new(file))?;
    Ok(notebook)
}

/// Serialize a notebook to disk in a single write.
///
/// Keys come out in a stable order with nbformat's single-space indentation
/// so that freshly converted notebooks diff cleanly.
pub fn write_notebook(path: &Path, notebook: &Notebook) -> Result<(), io::Error> {
    debug!("Writing notebook to {}.", path.display());

    let file = fs::File::create(path)?;
    let mut writer = io::BufWriter::new(file);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b" ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);
    notebook.serialize(&mut serializer)?;
    writer.write_all(b"\n")?;
    writer.flush()
}
