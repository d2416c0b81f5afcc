//! JSON finding lines
//!
//! One compact object per line, suitable for piping into `jq`.

use crate::reporting::Finding;

/// Generate a single-line JSON object
pub fn generate(finding: &Finding) -> Result<String, serde_json::Error> {
    serde_json::to_string(finding)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_json_line() {
        let finding = Finding {
            status: 200,
            url: "http://example.com/.git/".into(),
            word: ".git/".into(),
        };

        let json = generate(&finding).unwrap();
        assert!(!json.contains('\n'));

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["status"], 200);
        assert_eq!(value["url"], "http://example.com/.git/");
        assert_eq!(value["word"], ".git/");
    }
}
