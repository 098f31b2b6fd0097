//! Stats dump rendering for runs without an output handler.

use zkcheck_core::ClusterSnapshot;

/// One block per node: a `Server:` header, right-aligned keys, a blank line.
pub fn render_text(snapshot: &ClusterSnapshot) -> String {
    let mut out = String::new();
    for (node, record) in snapshot.iter() {
        out.push_str(&format!("Server: {node}\n"));
        for (key, value) in record {
            out.push_str(&format!("{key:>30}   {value}\n"));
        }
        out.push('\n');
    }
    out
}

pub fn render_json(snapshot: &ClusterSnapshot) -> serde_json::Result<String> {
    let mut out = serde_json::to_string_pretty(snapshot)?;
    out.push('\n');
    Ok(out)
}
