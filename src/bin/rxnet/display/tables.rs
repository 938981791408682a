use std::io::{self, Write};
use std::path::Path;

use rxn_ledger::{DedupStatus, Provenance, ReactionNetwork, State, StateId};

use crate::util::text::truncate;

const INDENT: &str = "      ";

const BOX_INNER_WIDTH: usize = 62;
const SAFE_TABLE_WIDTH: usize = BOX_INNER_WIDTH - INDENT.len();

/// Outcome of admitting one input file.
pub struct IngestRow {
    pub source: String,
    pub formula: String,
    pub id: StateId,
    pub is_new: bool,
}

pub fn print_network_summary(out: &mut impl Write, network: &ReactionNetwork, snapshot: &Path) -> io::Result<()> {
    let rows = vec![
        ("Snapshot", snapshot.display().to_string()),
        ("States", network.state_count().to_string()),
        ("Merged Aliases", network.merged_aliases().len().to_string()),
        ("Pathways", network.pathway_count().to_string()),
        ("Reactions", network.reaction_count().to_string()),
        ("Ensembles", network.ensemble_count().to_string()),
        ("Provenance", network.provenance_count().to_string()),
    ];

    print_kv_table(out, "Network Summary", &rows)
}

pub fn print_states(out: &mut impl Write, network: &ReactionNetwork, limit: usize) -> io::Result<()> {
    let states = network.states();
    let rows: Vec<[String; 4]> = states
        .iter()
        .take(limit)
        .map(|state| {
            [
                state.id().to_string(),
                state.formula().to_string(),
                state.kind().to_string(),
                electronic_label(state),
            ]
        })
        .collect();

    let widths = [36usize, 10, 16, 7];
    print_grid(out, "States", ["Id", "Formula", "Kind", "Q / M"], widths, &rows)?;

    if states.len() > limit {
        writeln!(out, "{}({} more states)", INDENT, states.len() - limit)?;
    }
    Ok(())
}

pub fn print_ingest_results(out: &mut impl Write, results: &[IngestRow]) -> io::Result<()> {
    let source_w = SAFE_TABLE_WIDTH.saturating_sub(10 + 8 + 12 + 8);
    let rows: Vec<[String; 4]> = results
        .iter()
        .map(|row| {
            [
                row.source.clone(),
                row.formula.clone(),
                short_id(row.id),
                if row.is_new { "new" } else { "merged" }.to_string(),
            ]
        })
        .collect();

    print_grid(
        out,
        "Ingested Structures",
        ["Source", "Formula", "State", "Result"],
        [source_w, 10, 8, 6],
        &rows,
    )
}

pub fn print_lineage(
    out: &mut impl Write,
    network: &ReactionNetwork,
    chain: &[Provenance],
    alternates: &[Provenance],
) -> io::Result<()> {
    if let Some(object) = chain.first() {
        if object.object_type().is_state() {
            let id = StateId::from(object.object_id());
            let status = match network.status_of(id) {
                DedupStatus::Canonical => "canonical".to_string(),
                DedupStatus::Merged(into) => format!("merged into {into}"),
                DedupStatus::Proposed => "not committed".to_string(),
            };
            writeln!(out, "{}{} {} ({})", INDENT, object.object_type(), id, status)?;
        }
    }

    for (depth, record) in chain.iter().enumerate() {
        let marker = if depth == 0 { "●" } else { "└─" };
        writeln!(
            out,
            "{}{}{} {} {} via {}",
            INDENT,
            "   ".repeat(depth.saturating_sub(1)),
            marker,
            record.object_type(),
            record.object_id(),
            describe_origin(record)
        )?;
    }

    if !alternates.is_empty() {
        writeln!(out)?;
        writeln!(out, "{}Alternate derivations:", INDENT)?;
        for record in alternates {
            writeln!(out, "{}  · {} ({})", INDENT, describe_origin(record), record.id())?;
        }
    }
    Ok(())
}

fn describe_origin(record: &Provenance) -> String {
    let mut text = record.origin().to_string();
    if let Some(method) = record.calc_method() {
        text.push_str(&format!(" [{method}"));
        if let Some(level) = record.level_of_theory() {
            text.push_str(&format!(" / {level}"));
        }
        text.push(']');
    }
    if let Some(path) = record.path() {
        text.push_str(&format!(" from {}", path.display()));
    }
    text
}

fn electronic_label(state: &State) -> String {
    format!("{:+} / {}", state.charge(), state.spin_multiplicity())
}

fn short_id(id: StateId) -> String {
    id.to_string().chars().take(8).collect()
}

fn print_grid<const N: usize>(
    out: &mut impl Write,
    title: &str,
    headers: [&str; N],
    widths: [usize; N],
    rows: &[[String; N]],
) -> io::Result<()> {
    let rule = |left: &str, mid: &str, right: &str| {
        let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
        format!("{INDENT}{left}{}{right}", segments.join(mid))
    };
    let line = |cells: &[String]| {
        let padded: Vec<String> = cells
            .iter()
            .zip(widths)
            .map(|(cell, w)| format!(" {:<w$} ", truncate(cell, w), w = w))
            .collect();
        format!("{INDENT}│{}│", padded.join("│"))
    };

    writeln!(out, "{}┌─ {} ─┐", INDENT, truncate(title, SAFE_TABLE_WIDTH - 6))?;
    writeln!(out, "{}", rule("┌", "┬", "┐"))?;
    writeln!(out, "{}", line(&headers.map(str::to_string)[..]))?;
    writeln!(out, "{}", rule("├", "┼", "┤"))?;
    for row in rows {
        writeln!(out, "{}", line(&row[..]))?;
    }
    writeln!(out, "{}", rule("└", "┴", "┘"))
}

fn print_kv_table(out: &mut impl Write, title: &str, rows: &[(&str, String)]) -> io::Result<()> {
    let key_w = 16usize;
    let sep_overhead = 6;
    let val_w = SAFE_TABLE_WIDTH.saturating_sub(key_w + sep_overhead);

    writeln!(out, "{}┌─ {} ─┐", INDENT, truncate(title, SAFE_TABLE_WIDTH - 6))?;
    writeln!(
        out,
        "{}┌{k_line}┬{v_line}┐",
        INDENT,
        k_line = "─".repeat(key_w + 2),
        v_line = "─".repeat(val_w + 2)
    )?;
    writeln!(
        out,
        "{}│ {:<key_w$} │ {:>val_w$} │",
        INDENT,
        "Metric",
        "Value",
        key_w = key_w,
        val_w = val_w
    )?;
    writeln!(
        out,
        "{}├{k_line}┼{v_line}┤",
        INDENT,
        k_line = "─".repeat(key_w + 2),
        v_line = "─".repeat(val_w + 2)
    )?;

    for (key, val) in rows {
        writeln!(
            out,
            "{}│ {:<key_w$} │ {:>val_w$} │",
            INDENT,
            truncate(key, key_w),
            truncate(val, val_w),
            key_w = key_w,
            val_w = val_w
        )?;
    }

    writeln!(
        out,
        "{}└{k_line}┴{v_line}┘",
        INDENT,
        k_line = "─".repeat(key_w + 2),
        v_line = "─".repeat(val_w + 2)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_rows_have_equal_width() {
        let mut buf = Vec::new();
        let rows = vec![["H2".to_string(), "a much longer cell value".to_string()]];
        print_grid(&mut buf, "T", ["A", "B"], [4, 8], &rows).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let widths: Vec<usize> = text.lines().skip(1).map(|l| l.chars().count()).collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]), "{text}");
        assert!(text.contains("a much …"));
    }

    #[test]
    fn summary_lists_counts() {
        let network = ReactionNetwork::default();
        let mut buf = Vec::new();
        print_network_summary(&mut buf, &network, Path::new("net.json")).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("States"));
        assert!(text.contains("net.json"));
    }
}
