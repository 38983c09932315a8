//! GEXF export for visualization tools (Gephi and friends).
//!
//! Node attributes: `type`, plus `singer`, `album`, `comment_num` and
//! `play_list` on tracks that have them. Edge attributes: `type`,
//! `timestamp`, and `liked_count` on like edges.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use netmusic_core::{Error, Result};
use petgraph::visit::EdgeRef;

use crate::types::GraphData;

const NODE_ATTRIBUTES: [(&str, &str); 5] = [
    ("type", "string"),
    ("singer", "string"),
    ("album", "string"),
    ("comment_num", "long"),
    ("play_list", "string"),
];

const EDGE_ATTRIBUTES: [(&str, &str); 3] = [
    ("type", "string"),
    ("timestamp", "long"),
    ("liked_count", "long"),
];

/// Write `graph` as GEXF 1.2 to `path`, creating parent directories.
pub fn save_gexf(graph: &GraphData, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::io_with_path(e, parent))?;
    }
    let file = File::create(path).map_err(|e| Error::io_with_path(e, path))?;
    let mut writer = BufWriter::new(file);
    write_gexf(graph, &mut writer)
        .and_then(|()| writer.flush())
        .map_err(|e| Error::io_with_path(e, path))?;
    log::info!(
        "Exported {} nodes and {} edges to {}",
        graph.node_count(),
        graph.edge_count(),
        path.display()
    );
    Ok(())
}

/// Write `graph` as GEXF 1.2.
pub fn write_gexf<W: Write>(graph: &GraphData, w: &mut W) -> io::Result<()> {
    writeln!(w, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(w, r#"<gexf xmlns="http://gexf.net/1.2" version="1.2">"#)?;
    writeln!(w, "  <meta>")?;
    writeln!(w, "    <creator>netmusic</creator>")?;
    writeln!(w, "  </meta>")?;
    writeln!(w, r#"  <graph mode="static" defaultedgetype="directed">"#)?;
    write_attribute_decls(w, "node", &NODE_ATTRIBUTES)?;
    write_attribute_decls(w, "edge", &EDGE_ATTRIBUTES)?;

    writeln!(w, "    <nodes>")?;
    for node in graph.iter_nodes() {
        let id = escape(&node.id);
        writeln!(w, r#"      <node id="{id}" label="{id}">"#)?;
        let mut values = vec![(0, node.node_type().name().to_string())];
        if let Some(info) = node.track_info() {
            let optional = [
                info.singer.clone(),
                info.album.clone(),
                info.comment_num.map(|n| n.to_string()),
                info.play_list.clone(),
            ];
            for (offset, value) in optional.into_iter().enumerate() {
                if let Some(value) = value {
                    values.push((offset + 1, value));
                }
            }
        }
        write_attvalues(w, &values)?;
        writeln!(w, "      </node>")?;
    }
    writeln!(w, "    </nodes>")?;

    writeln!(w, "    <edges>")?;
    for (i, edge) in graph.graph.edge_references().enumerate() {
        let source = escape(&graph.graph[edge.source()].id);
        let target = escape(&graph.graph[edge.target()].id);
        let data = edge.weight();
        writeln!(
            w,
            r#"      <edge id="{i}" source="{source}" target="{target}">"#
        )?;
        let mut values = vec![
            (0, data.relationship.name().to_string()),
            (1, data.timestamp.to_string()),
        ];
        if let Some(liked) = data.liked_count {
            values.push((2, liked.to_string()));
        }
        write_attvalues(w, &values)?;
        writeln!(w, "      </edge>")?;
    }
    writeln!(w, "    </edges>")?;

    writeln!(w, "  </graph>")?;
    writeln!(w, "</gexf>")?;
    Ok(())
}

fn write_attribute_decls<W: Write>(
    w: &mut W,
    class: &str,
    attributes: &[(&str, &str)],
) -> io::Result<()> {
    writeln!(w, r#"    <attributes class="{class}">"#)?;
    for (id, (title, kind)) in attributes.iter().enumerate() {
        writeln!(
            w,
            r#"      <attribute id="{id}" title="{title}" type="{kind}"/>"#
        )?;
    }
    writeln!(w, "    </attributes>")
}

fn write_attvalues<W: Write>(w: &mut W, values: &[(usize, String)]) -> io::Result<()> {
    writeln!(w, "        <attvalues>")?;
    for (id, value) in values {
        writeln!(
            w,
            r#"          <attvalue for="{id}" value="{}"/>"#,
            escape(value)
        )?;
    }
    writeln!(w, "        </attvalues>")
}

/// Escape the five XML special characters and replace characters XML 1.0
/// cannot represent (control characters other than tab, newline and
/// carriage return, and U+FFFE/U+FFFF) with U+FFFD.
fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' | '\n' | '\r' => out.push(c),
            c if c < '\u{20}' || c == '\u{FFFE}' || c == '\u{FFFF}' => {
                out.push(char::REPLACEMENT_CHARACTER)
            }
            c => out.push(c),
        }
    }
    out
}

// ============================================================================
// Tests
// ============================================================================
