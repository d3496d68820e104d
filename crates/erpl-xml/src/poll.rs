// SPDX-License-Identifier: MIT OR Apache-2.0
//! Poll-status parsing for the async operation protocol (§4.2, §4.3).

use erpl_error::{Error, ErrorKind};

use crate::generic::harvest_fields;
use crate::tree::parse_xml_tree;

/// The normalized status of a polled async operation body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollBodyStatus {
    /// `adtcore:status == "completed"`.
    Completed,
    /// `adtcore:status == "failed"`.
    Failed {
        /// `adtcore:progress`, appended to the failure description when present.
        description: String,
    },
    /// Anything else (still running, or an unrecognized status string).
    Other(String),
}

/// Parse a poll-status body (the payload returned while polling a `Location` URL).
pub fn parse_poll_status(xml: &str) -> Result<PollBodyStatus, Error> {
    let tree = parse_xml_tree(xml).map_err(|e| e.into_error("Poll", "", ErrorKind::Internal))?;
    let fields = harvest_fields(&tree);
    let status = fields.get("status").cloned().unwrap_or_default();
    match status.as_str() {
        "completed" => Ok(PollBodyStatus::Completed),
        "failed" => {
            let mut description = "operation failed".to_string();
            if let Some(progress) = fields.get("progress") {
                description = format!("{description}: {progress}");
            }
            Ok(PollBodyStatus::Failed { description })
        }
        other => Ok(PollBodyStatus::Other(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_status_appends_progress() {
        let xml = r#"<job adtcore:status="failed" adtcore:progress="object ZFOO"/>"#;
        match parse_poll_status(xml).unwrap() {
            PollBodyStatus::Failed { description } => {
                assert!(description.contains("object ZFOO"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn completed_status_recognized() {
        let xml = r#"<job adtcore:status="completed"/>"#;
        assert_eq!(parse_poll_status(xml).unwrap(), PollBodyStatus::Completed);
    }
}
