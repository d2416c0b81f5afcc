//! Plain text finding lines

use crate::reporting::Finding;

/// Render `Found: <status> <url>`
pub fn generate(finding: &Finding) -> String {
    format!("Found: {} {}", finding.status, finding.url)
}
