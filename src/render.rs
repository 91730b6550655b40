//! Render rule families as Graphviz.
//!
//! Each rule gets its own cluster: accepting states are double circles,
//! start and end jumps are dashed edges, and a nested family is drawn
//! as clusters inside the rule that uses it.

use std::io::Write;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use dot_writer::{Attributes, DotWriter, Scope, Shape};

use crate::automaton::{Automaton, Family};

fn state_id(prefix: &str, state: usize) -> String {
    format!("{prefix}_s{state}")
}

fn symbol_label(c: char) -> String {
    // Escape twice: once for the symbol itself, once for the DOT string.
    c.escape_debug()
        .to_string()
        .replace('\\', r"\\")
        .replace('"', r#"\""#)
}

fn range_label(range: &RangeInclusive<char>) -> String {
    if range.start() == range.end() {
        symbol_label(*range.start())
    } else {
        format!("{}-{}", symbol_label(*range.start()), symbol_label(*range.end()))
    }
}

fn legend(rule: usize, automaton: &Automaton) -> maud::PreEscaped<String> {
    maud::html!(
        table border="0" {
            tr { td align="left" { b { "#" (rule) } } td align="left" { (automaton.name().unwrap_or("")) } }
            tr { td align="left" { "states" } td align="left" { (automaton.states()) } }
            tr { td align="left" { "accepting" } td align="left" { (automaton.accepting().len()) } }
            @if !automaton.nested().is_empty() {
                tr { td align="left" { "nested" } td align="left" { (automaton.nested().len()) " rules" } }
            }
        }
    )
}

fn render_rules(graph: &mut Scope, family: &Family, prefix: &str) {
    for (rule, automaton) in family.iter().enumerate() {
        let prefix = format!("{prefix}_{rule}");
        let mut cluster = graph.cluster();
        cluster.set_label(automaton.name().unwrap_or(&prefix));

        {
            let mut node = cluster.node_named(format!("{prefix}_legend"));
            node.set_shape(Shape::None);
            node.set_html(&format!("<{}>", legend(rule, automaton).into_string()));
        }
        for state in 0..automaton.states() {
            let shape = if automaton.is_accepting(state) {
                "doublecircle"
            } else {
                "circle"
            };
            let mut node = cluster.node_named(state_id(&prefix, state));
            node.set_label(&state.to_string());
            node.set("shape", shape, false);
        }

        for state in 0..automaton.states() {
            let from = state_id(&prefix, state);
            for (range, to) in automaton.transitions(state) {
                cluster
                    .edge(&from, state_id(&prefix, to))
                    .attributes()
                    .set_label(&range_label(&range));
            }
            let jumps = [
                ("start", automaton.start_jump(state)),
                ("end", automaton.end_jump(state)),
            ];
            for (kind, to) in jumps {
                if let Some(to) = to {
                    cluster
                        .edge(&from, state_id(&prefix, to))
                        .attributes()
                        .set_label(kind)
                        .set("style", "dashed", false);
                }
            }
        }

        if !automaton.nested().is_empty() {
            render_rules(&mut cluster, automaton.nested(), &prefix);
        }
    }
}

/// Render the family into a Graphviz graph.
pub fn render_family(family: &Family) -> Vec<u8> {
    let mut outbuf = Vec::new();
    {
        let mut writer = DotWriter::from(&mut outbuf);
        let mut graph = writer.digraph();
        graph.set("rankdir", "LR", false);
        graph.node_attributes().set_font("monospace");
        render_rules(&mut graph, family, "rule");
    }
    outbuf
}

/// Run `dot -Tsvg` over DOT source.
fn dot_to_svg(gv: &[u8]) -> Result<String, String> {
    let mut child = Command::new("dot")
        .arg("-Tsvg")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| format!("cannot run dot: {e}"))?;
    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(gv)
            .map_err(|e| format!("cannot write DOT source to dot: {e}"))?;
    }
    let output = child
        .wait_with_output()
        .map_err(|e| format!("dot did not finish: {e}"))?;
    if !output.status.success() {
        return Err(format!(
            "dot exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        ));
    }
    String::from_utf8(output.stdout).map_err(|e| format!("dot wrote invalid UTF-8: {e}"))
}

/// Write DOT source to a temporary file that outlives the process.
fn keep_source(gv: &[u8]) -> std::io::Result<PathBuf> {
    let mut file = tempfile::Builder::new()
        .prefix("lexish-")
        .suffix(".dot")
        .tempfile()?;
    file.write_all(gv)?;
    let (_, path) = file.keep().map_err(|e| e.error)?;
    Ok(path)
}

/// Render the family as SVG, using the `dot` command.
///
/// If `dot` fails, or `LEXISH_SAVE_GRAPH` is set, the DOT source is kept in a
/// temporary file and its path logged.
pub fn render_svg(family: &Family) -> Result<String, String> {
    let gv = render_family(family);
    let svg = dot_to_svg(&gv);
    if svg.is_err() || std::env::var_os("LEXISH_SAVE_GRAPH").is_some() {
        match keep_source(&gv) {
            Ok(path) => tracing::info!(
                "DOT source for {} rules kept in {}",
                family.len(),
                path.display()
            ),
            Err(e) => tracing::warn!("could not keep DOT source: {e}"),
        }
    }
    svg
}
