//! Distance matrix sources.
//!
//! Supported inputs:
//! - in-memory rows,
//! - JSON, either `[[..], ..]` or `{"matrix": [[..], ..]}`,
//! - TSPLIB XML (`<graph><vertex><edge cost="..">j</edge>..</vertex>..</graph>`),
//! - TSPLIB text with `EDGE_WEIGHT_TYPE: EXPLICIT` and `EDGE_WEIGHT_FORMAT: FULL_MATRIX`.
//!
//! Every source is validated by [`DistanceMatrix::from_rows`].

use crate::error::{AcoError, AcoResult};
use crate::matrix::DistanceMatrix;
use serde::Deserialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Anything that can produce raw distance rows.
pub trait DistanceSource {
    fn rows(self) -> AcoResult<Vec<Vec<f64>>>;
}

/// An in-memory matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Rows(pub Vec<Vec<f64>>);

impl DistanceSource for Rows {
    fn rows(self) -> AcoResult<Vec<Vec<f64>>> {
        Ok(self.0)
    }
}

impl DistanceSource for Vec<Vec<f64>> {
    fn rows(self) -> AcoResult<Vec<Vec<f64>>> {
        Ok(self)
    }
}

/// A JSON file on disk.
#[derive(Debug, Clone)]
pub struct JsonFile(pub PathBuf);

impl DistanceSource for JsonFile {
    fn rows(self) -> AcoResult<Vec<Vec<f64>>> {
        let file = std::fs::File::open(&self.0)?;
        json_reader(std::io::BufReader::new(file))
    }
}

/// A TSPLIB XML instance on disk.
#[derive(Debug, Clone)]
pub struct XmlFile(pub PathBuf);

impl DistanceSource for XmlFile {
    fn rows(self) -> AcoResult<Vec<Vec<f64>>> {
        let content = std::fs::read_to_string(&self.0)?;
        parse_tsplib_xml(&content)
    }
}

/// A TSPLIB full-matrix instance on disk.
#[derive(Debug, Clone)]
pub struct TsplibFile(pub PathBuf);

impl DistanceSource for TsplibFile {
    fn rows(self) -> AcoResult<Vec<Vec<f64>>> {
        let content = std::fs::read_to_string(&self.0)?;
        parse_tsplib(&content)
    }
}

/// Loads and validates a matrix from `source`.
pub fn load_distance_matrix<S: DistanceSource>(source: S) -> AcoResult<DistanceMatrix> {
    let matrix = DistanceMatrix::from_rows(source.rows()?)?;
    debug!(cities = matrix.len(), "distance matrix loaded");
    Ok(matrix)
}

/// Picks the format from the extension: `.json` is JSON, `.xml` is TSPLIB XML and
/// anything else TSPLIB text.
pub fn load_path(path: impl AsRef<Path>) -> AcoResult<DistanceMatrix> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase());
    match extension.as_deref() {
        Some("json") => load_distance_matrix(JsonFile(path.to_path_buf())),
        Some("xml") => load_distance_matrix(XmlFile(path.to_path_buf())),
        _ => load_distance_matrix(TsplibFile(path.to_path_buf())),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonMatrix {
    Rows(Vec<Vec<f64>>),
    Wrapped { matrix: Vec<Vec<f64>> },
}

/// Reads rows from JSON.
pub fn json_reader<R: Read>(reader: R) -> AcoResult<Vec<Vec<f64>>> {
    let rows = match serde_json::from_reader(reader)? {
        JsonMatrix::Rows(rows) | JsonMatrix::Wrapped { matrix: rows } => rows,
    };
    Ok(rows)
}

/// Parses a TSPLIB XML instance.
///
/// Vertex `i` is the `i`-th `<vertex>` of `<graph>`; each `<edge>` names its target city
/// as text and its cost in the `cost` attribute. Costs are truncated toward zero and
/// missing edges are left at `0`, which matrix validation then rejects.
pub fn parse_tsplib_xml(content: &str) -> AcoResult<Vec<Vec<f64>>> {
    let doc = roxmltree::Document::parse(content)?;
    let line_of = |node: roxmltree::Node| xml_line(&doc, node);

    let root = doc.root_element();
    let graph = if root.has_tag_name("graph") {
        root
    } else {
        root.children()
            .find(|node| node.has_tag_name("graph"))
            .ok_or_else(|| AcoError::parse(line_of(root), "missing <graph> element"))?
    };

    let vertices: Vec<_> = graph
        .children()
        .filter(|node| node.has_tag_name("vertex"))
        .collect();
    let n = vertices.len();
    let mut rows = vec![vec![0.0; n]; n];

    for (origin, vertex) in vertices.iter().enumerate() {
        for edge in vertex.children().filter(|node| node.has_tag_name("edge")) {
            let line = line_of(edge);
            let text = edge.text().unwrap_or_default().trim();
            let destination: usize = text
                .parse()
                .map_err(|_| AcoError::parse(line, format!("invalid edge target: {text:?}")))?;
            if destination >= n {
                return Err(AcoError::parse(
                    line,
                    format!("edge target {destination} out of range for {n} vertices"),
                ));
            }
            let cost = edge
                .attribute("cost")
                .ok_or_else(|| AcoError::parse(line, "edge without cost"))?;
            let cost: f64 = cost
                .parse()
                .map_err(|_| AcoError::parse(line, format!("invalid cost: {cost}")))?;
            rows[origin][destination] = cost.trunc();
        }
    }

    Ok(rows)
}

fn xml_line(doc: &roxmltree::Document<'_>, node: roxmltree::Node<'_, '_>) -> usize {
    doc.text_pos_at(node.range().start).row as usize
}

/// Parses a TSPLIB explicit full-matrix instance.
///
/// Weights are truncated toward zero to whole numbers.
pub fn parse_tsplib(content: &str) -> AcoResult<Vec<Vec<f64>>> {
    let mut dimension: Option<usize> = None;
    let mut weights: Vec<f64> = Vec::new();
    let mut in_edge_weight_section = false;

    for (line_num, line) in content.lines().enumerate() {
        let line_no = line_num + 1;
        let line = line.trim();

        if line.is_empty() {
            continue;
        }
        if line == "EOF" {
            break;
        }
        if line == "EDGE_WEIGHT_SECTION" {
            in_edge_weight_section = true;
            continue;
        }

        if in_edge_weight_section {
            if line.starts_with(|c: char| c.is_ascii_alphabetic()) {
                // Next section, e.g. DISPLAY_DATA_SECTION.
                in_edge_weight_section = false;
                continue;
            }
            for part in line.split_whitespace() {
                let weight: f64 = part
                    .parse()
                    .map_err(|_| AcoError::parse(line_no, format!("invalid weight: {part}")))?;
                weights.push(weight.trunc());
            }
            continue;
        }

        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match key.trim() {
            "DIMENSION" => {
                let n = value
                    .parse::<usize>()
                    .map_err(|_| AcoError::parse(line_no, format!("invalid dimension: {value}")))?;
                dimension = Some(n);
            }
            "EDGE_WEIGHT_TYPE" if value != "EXPLICIT" => {
                return Err(AcoError::parse(
                    line_no,
                    format!("unsupported EDGE_WEIGHT_TYPE {value}, expected EXPLICIT"),
                ));
            }
            "EDGE_WEIGHT_FORMAT" if value != "FULL_MATRIX" => {
                return Err(AcoError::parse(
                    line_no,
                    format!("unsupported EDGE_WEIGHT_FORMAT {value}, expected FULL_MATRIX"),
                ));
            }
            _ => {}
        }
    }

    let n = dimension.ok_or_else(|| AcoError::parse(0, "missing DIMENSION"))?;
    if n == 0 {
        return Ok(Vec::new());
    }
    if weights.len() != n * n {
        return Err(AcoError::parse(
            0,
            format!("expected {} edge weights for dimension {n}, found {}", n * n, weights.len()),
        ));
    }

    Ok(weights.chunks(n).map(<[f64]>::to_vec).collect())
}
