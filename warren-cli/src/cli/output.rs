//! Result rendering: JSON payloads, per-degree reports, and GraphML.
//!
//! GraphML output is deterministic (nodes and edges sorted) so runs can be
//! diffed and tests can assert on content.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use quick_xml::escape::escape;

use warren_core::{ChannelGraph, ExperimentResult, hop_channel_frequencies};

use super::commands::CliError;

const REPORT_CHANNEL_LIMIT: usize = 100;

pub(super) fn write_json(path: &Path, result: &ExperimentResult) -> Result<(), CliError> {
    let file = create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), result).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}

pub(super) fn write_degree_report(
    path: &Path,
    result: &ExperimentResult,
    degrees: usize,
) -> Result<(), CliError> {
    let file = create(path)?;
    let mut writer = BufWriter::new(file);
    render_degree_report(&mut writer, result, degrees).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// One block per degree: the most common channels at that hop, strongest
/// first, capped at a fixed report width.
pub(super) fn render_degree_report(
    writer: &mut impl Write,
    result: &ExperimentResult,
    degrees: usize,
) -> io::Result<()> {
    writeln!(writer, "{}", csv_field(result.seed_title()))?;
    writeln!(writer)?;
    for degree in 0..degrees {
        writeln!(writer, "{degree}. degree")?;
        let frequencies = hop_channel_frequencies(result.trails(), degree);
        for (channel, count) in frequencies.into_iter().take(REPORT_CHANNEL_LIMIT) {
            writeln!(writer, "{},{count}", csv_field(channel.title()))?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

pub(super) fn write_graphml(path: &Path, graph: &ChannelGraph) -> Result<(), CliError> {
    let file = create(path)?;
    let mut writer = BufWriter::new(file);
    render_graphml(&mut writer, graph).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub(super) fn render_graphml(writer: &mut impl Write, graph: &ChannelGraph) -> io::Result<()> {
    writeln!(writer, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(
        writer,
        r#"<graphml xmlns="http://graphml.graphdrawing.org/xmlns">"#
    )?;
    writeln!(
        writer,
        r#"  <key id="label" for="node" attr.name="label" attr.type="string"/>"#
    )?;
    writeln!(
        writer,
        r#"  <key id="weight" for="edge" attr.name="weight" attr.type="long"/>"#
    )?;
    writeln!(writer, r#"  <graph edgedefault="directed">"#)?;

    let mut nodes: Vec<_> = graph.nodes().collect();
    nodes.sort_by(|left, right| left.0.cmp(right.0));
    for (id, title) in nodes {
        writeln!(
            writer,
            r#"    <node id="{}"><data key="label">{}</data></node>"#,
            escape(id.as_str()),
            escape(title)
        )?;
    }

    let mut edges: Vec<_> = graph.edges().collect();
    edges.sort_by(|left, right| (left.0, left.1).cmp(&(right.0, right.1)));
    for (from, to, weight) in edges {
        writeln!(
            writer,
            r#"    <edge source="{}" target="{}"><data key="weight">{weight}</data></edge>"#,
            escape(from.as_str()),
            escape(to.as_str())
        )?;
    }

    writeln!(writer, "  </graph>")?;
    writeln!(writer, "</graphml>")
}

fn csv_field(raw: &str) -> String {
    if raw.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_owned()
    }
}

fn create(path: &Path) -> Result<File, CliError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| CliError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    File::create(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}
