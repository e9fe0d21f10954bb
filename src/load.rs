//! JSON token-stream input layer.
//!
//! A submission file holds named units, each an ordered token list produced
//! by a language frontend. Units are concatenated into one sequence with a
//! boundary token inserted between consecutive units, so matches can never
//! bridge two files of the same submission.
//!
//! ```json
//! {
//!   "name": "submission-17",
//!   "units": [
//!     { "name": "Main.java", "tokens": [ { "code": 3, "line": 1, "column": 0 } ] }
//!   ]
//! }
//! ```

use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::models::{Token, TokenSequence, BOUNDARY_CODE};

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("submission {0:?} has no units")]
    NoUnits(String),
    #[error("unit {unit:?} in submission {submission:?} has no tokens")]
    EmptyUnit { submission: String, unit: String },
    #[error("unit {unit:?} uses the reserved boundary code at token {position}")]
    ReservedCode { unit: String, position: usize },
}

#[derive(Debug, Deserialize)]
struct SubmissionFile {
    #[serde(default)]
    name: Option<String>,
    units: Vec<UnitFile>,
}

#[derive(Debug, Deserialize)]
struct UnitFile {
    name: String,
    tokens: Vec<RawToken>,
}

#[derive(Debug, Deserialize)]
struct RawToken {
    code: u32,
    #[serde(default)]
    line: u32,
    #[serde(default)]
    column: u32,
}

/// Load one submission file into a boundary-separated token sequence.
///
/// The sequence name comes from the file's `name` field, falling back to the
/// file stem.
pub fn load_submission(path: &Path) -> Result<TokenSequence, LoadError> {
    let text = fs::read_to_string(path)?;
    let file: SubmissionFile = serde_json::from_str(&text)?;

    let name = file.name.unwrap_or_else(|| {
        path.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string())
    });

    if file.units.is_empty() {
        return Err(LoadError::NoUnits(name));
    }

    let mut tokens = Vec::new();
    for (u, unit) in file.units.iter().enumerate() {
        if unit.tokens.is_empty() {
            return Err(LoadError::EmptyUnit {
                submission: name,
                unit: unit.name.clone(),
            });
        }
        if u > 0 {
            tokens.push(Token::boundary(u as u32 - 1));
        }
        for (position, raw) in unit.tokens.iter().enumerate() {
            if raw.code == BOUNDARY_CODE {
                return Err(LoadError::ReservedCode {
                    unit: unit.name.clone(),
                    position,
                });
            }
            tokens.push(Token::new(raw.code, u as u32, raw.line, raw.column));
        }
    }

    Ok(TokenSequence::new(name, tokens))
}

/// Load every `*.json` submission in a directory, sorted by file name so
/// batch runs see a reproducible order.
pub fn load_submission_dir(dir: &Path) -> Result<Vec<TokenSequence>, LoadError> {
    let mut paths: Vec<_> = fs::read_dir(dir)?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .map(|entry| entry.path())
        .filter(|p| p.extension().map(|e| e == "json").unwrap_or(false))
        .collect();
    paths.sort();

    paths.iter().map(|p| load_submission(p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("tokentile-load-{}-{}", std::process::id(), name));
        let mut f = File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_units_with_separators() {
        let path = write_temp(
            "two-units.json",
            r#"{
                "name": "sub-a",
                "units": [
                    { "name": "a.x", "tokens": [ { "code": 1, "line": 1 }, { "code": 2, "line": 2 } ] },
                    { "name": "b.x", "tokens": [ { "code": 3 } ] }
                ]
            }"#,
        );
        let seq = load_submission(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(seq.name(), "sub-a");
        let codes: Vec<u32> = seq.tokens().iter().map(|t| t.code).collect();
        assert_eq!(codes, vec![1, 2, BOUNDARY_CODE, 3]);
        assert_eq!(seq.unit_count(), 2);
        assert_eq!(seq.tokens()[0].line, 1);
        assert_eq!(seq.tokens()[3].unit, 1);
    }

    #[test]
    fn name_falls_back_to_file_stem() {
        let path = write_temp(
            "stem-name.json",
            r#"{ "units": [ { "name": "a.x", "tokens": [ { "code": 7 } ] } ] }"#,
        );
        let seq = load_submission(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert!(seq.name().starts_with("tokentile-load-"));
        assert!(seq.name().ends_with("stem-name"));
    }

    #[test]
    fn reserved_code_is_rejected() {
        let path = write_temp(
            "reserved.json",
            &format!(
                r#"{{ "units": [ {{ "name": "a.x", "tokens": [ {{ "code": {} }} ] }} ] }}"#,
                BOUNDARY_CODE
            ),
        );
        let err = load_submission(&path).unwrap_err();
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(err, LoadError::ReservedCode { position: 0, .. }));
    }

    #[test]
    fn empty_units_are_rejected() {
        let no_units = write_temp("no-units.json", r#"{ "name": "s", "units": [] }"#);
        assert!(matches!(
            load_submission(&no_units).unwrap_err(),
            LoadError::NoUnits(_)
        ));
        std::fs::remove_file(&no_units).unwrap();

        let empty_unit = write_temp(
            "empty-unit.json",
            r#"{ "name": "s", "units": [ { "name": "a.x", "tokens": [] } ] }"#,
        );
        assert!(matches!(
            load_submission(&empty_unit).unwrap_err(),
            LoadError::EmptyUnit { .. }
        ));
        std::fs::remove_file(&empty_unit).unwrap();
    }
}
