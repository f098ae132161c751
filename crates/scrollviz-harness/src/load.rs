#![forbid(unsafe_code)]

//! JSON loaders for the dataset and the narrative configuration.
//!
//! The dataset is a JSON array of records:
//!
//! ```json
//! [{"subject":1,"treatment":0,"visit":1,"dlqi":16,"bsa":30.5,"easi":20,"itch":6}]
//! ```
//!
//! Config files may set any subset of [`NarrativeConfig`] fields; the rest
//! keep their defaults.

use std::fs;
use std::path::Path;

use scrollviz_mediation::{NarrativeConfig, Record};
use tracing::debug;

use crate::error::HarnessError;

pub fn parse_records(json: &str) -> Result<Vec<Record>, HarnessError> {
    Ok(serde_json::from_str(json)?)
}

/// Read a dataset file.
pub fn load_records(path: &Path) -> Result<Vec<Record>, HarnessError> {
    let records = parse_records(&fs::read_to_string(path)?)?;
    debug!(path = %path.display(), rows = records.len(), "dataset loaded");
    Ok(records)
}

pub fn parse_config(json: &str) -> Result<NarrativeConfig, HarnessError> {
    Ok(serde_json::from_str(json)?)
}

/// Read a narrative config file.
pub fn load_config(path: &Path) -> Result<NarrativeConfig, HarnessError> {
    parse_config(&fs::read_to_string(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrollviz_mediation::{Arm, Visit};

    #[test]
    fn records_decode_arm_codes() {
        let records = parse_records(
            r#"[
                {"subject":1,"treatment":0,"visit":1,"dlqi":16,"bsa":30.5,"easi":20,"itch":6},
                {"subject":2,"treatment":1,"visit":1,"dlqi":11,"bsa":12,"easi":8.25,"itch":5}
            ]"#,
        )
        .expect("valid dataset");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].treatment, Arm::Placebo);
        assert_eq!(records[1].treatment, Arm::Treatment);
        assert_eq!(records[1].easi, 8.25);
    }

    #[test]
    fn unknown_arm_is_a_json_error() {
        let err = parse_records(r#"[{"subject":1,"treatment":4,"visit":1,"dlqi":1,"bsa":1,"easi":1,"itch":1}]"#)
            .expect_err("arm 4 does not exist");
        assert!(matches!(err, HarnessError::Json(_)));
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config = parse_config(r#"{"visit":0,"marker_radius":4}"#).expect("valid config");
        assert_eq!(config.visit, Visit::Baseline);
        assert_eq!(config.marker_radius, 4.0);
        assert_eq!(config.transition_ms, NarrativeConfig::default().transition_ms);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_records(Path::new("/nonexistent/scrollviz/data.json")).expect_err("no such file");
        assert!(matches!(err, HarnessError::Io(_)));
    }
}
