//! Chat transcripts on disk, rendered into a [`MemoryDocument`].
//!
//! A transcript is a JSON (or JSON5) object with a `nodes` array. Strings
//! are text nodes; objects are elements with `tag`, optional `class` and
//! optional `children`:
//!
//! ```json
//! { "nodes": [
//!     { "tag": "div", "class": ["message-content"], "children": ["hi ", { "tag": "b", "children": ["there"] }] }
//! ] }
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use walkdir::WalkDir;

use crate::document::MemoryDocument;
use crate::model::ElementId;

#[derive(Debug, thiserror::Error)]
pub enum TranscriptError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid JSON5 in {path}: {source}")]
    Json5 {
        path: PathBuf,
        source: json5::Error,
    },
    #[error("failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },
    #[error("text node at top level of {0}; wrap it in an element")]
    TopLevelText(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Transcript {
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum NodeSpec {
    Text(String),
    Element {
        tag: String,
        #[serde(default)]
        class: Vec<String>,
        #[serde(default)]
        children: Vec<NodeSpec>,
    },
}

pub fn parse_json(raw: &str, path: &Path) -> Result<Transcript, TranscriptError> {
    serde_json::from_str(raw).map_err(|source| TranscriptError::Json {
        path: path.to_path_buf(),
        source,
    })
}

pub fn parse_json5(raw: &str, path: &Path) -> Result<Transcript, TranscriptError> {
    json5::from_str(raw).map_err(|source| TranscriptError::Json5 {
        path: path.to_path_buf(),
        source,
    })
}

pub fn read_transcript(path: &Path) -> Result<Transcript, TranscriptError> {
    let raw = std::fs::read_to_string(path).map_err(|source| TranscriptError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    if has_extension(path, "json5") {
        parse_json5(&raw, path)
    } else {
        parse_json(&raw, path)
    }
}

/// Loads a transcript file, or every `.json`/`.json5` file under a directory
/// in path order, into one document.
pub fn load(path: &Path) -> Result<MemoryDocument, TranscriptError> {
    let mut doc = MemoryDocument::new();
    for file in transcript_files(path)? {
        let transcript = read_transcript(&file)?;
        render_into(&mut doc, &transcript, &file)?;
    }
    Ok(doc)
}

pub fn transcript_files(path: &Path) -> Result<Vec<PathBuf>, TranscriptError> {
    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path).follow_links(false) {
        let entry = entry.map_err(|source| TranscriptError::Walk {
            path: path.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_file()
            && (has_extension(entry.path(), "json") || has_extension(entry.path(), "json5"))
        {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

pub fn render_into(
    doc: &mut MemoryDocument,
    transcript: &Transcript,
    origin: &Path,
) -> Result<(), TranscriptError> {
    for node in &transcript.nodes {
        match node {
            NodeSpec::Text(_) => return Err(TranscriptError::TopLevelText(origin.to_path_buf())),
            NodeSpec::Element { .. } => render_node(doc, None, node),
        }
    }
    Ok(())
}

fn render_node(doc: &mut MemoryDocument, parent: Option<ElementId>, node: &NodeSpec) {
    match (node, parent) {
        (NodeSpec::Text(text), Some(parent)) => {
            doc.append_text(parent, text);
        }
        (NodeSpec::Text(_), None) => {}
        (NodeSpec::Element { tag, class, children }, _) => {
            let classes: Vec<&str> = class.iter().map(String::as_str).collect();
            let id = doc.append_element(parent, tag, &classes);
            for child in children {
                render_node(doc, Some(id), child);
            }
        }
    }
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::{parse_json, parse_json5, render_into, NodeSpec, TranscriptError};
    use crate::document::MemoryDocument;
    use crate::source::TextSource;

    #[test]
    fn strings_become_text_nodes() {
        let transcript = parse_json(
            r#"{"nodes":[{"tag":"div","class":["message-content"],"children":["hi ",{"tag":"b","children":["there"]}]}]}"#,
            Path::new("inline.json"),
        )
        .unwrap();

        let mut doc = MemoryDocument::new();
        render_into(&mut doc, &transcript, Path::new("inline.json")).unwrap();
        let container = doc.searchable_containers("message-content")[0];
        assert_eq!(doc.text_content(container.element()), "hi there");
    }

    #[test]
    fn json5_allows_comments_and_trailing_commas() {
        let transcript = parse_json5(
            "{ nodes: [ // one message\n { tag: 'p', children: ['x',], }, ], }",
            Path::new("inline.json5"),
        )
        .unwrap();
        assert!(matches!(&transcript.nodes[0], NodeSpec::Element { tag, .. } if tag == "p"));
    }

    #[test]
    fn rejects_top_level_text() {
        let transcript = parse_json(r#"{"nodes":["loose"]}"#, Path::new("loose.json")).unwrap();
        let mut doc = MemoryDocument::new();
        let result = render_into(&mut doc, &transcript, Path::new("loose.json"));
        assert!(matches!(result, Err(TranscriptError::TopLevelText(_))));
    }
}
