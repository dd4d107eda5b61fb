//! Full-fidelity JSON dump.

use crate::model::Issue;

/// Pretty-printed array of every issue, non-ASCII kept as-is.
///
/// No timestamp goes into the body, so the same issues always render to the
/// same bytes.
pub(super) fn render(issues: &[Issue]) -> Result<Vec<u8>, serde_json::Error> {
    let mut out = serde_json::to_vec_pretty(issues)?;
    out.push(b'\n');
    Ok(out)
}
