//! ---
//! osr_section: "04-result-analysis"
//! osr_subsection: "module"
//! osr_type: "source"
//! osr_scope: "code"
//! osr_description: "Parsing and aggregation of regression test results."
//! osr_version: "v0.1.0"
//! osr_owner: "tbd"
//! ---
//! Discovery of result files by name.
//!
//! The regression runner writes `<test>.<type>_<X.Y.Z>_out[_<tag>].osw`; the
//! tag is added by stability reruns (`CUSTOMTAG`).

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;
use walkdir::WalkDir;

use crate::errors::{AnalysisError, Result};
use crate::matrix::Matrix;
use crate::model::{ColumnKey, FileType, ResultFileKey, RowKey};

static RESULT_FILE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<test>.+?)\.(?P<ftype>osm|rb|py)_(?P<version>\d+\.\d+\.\d+)_out(?:_(?P<tag>.+?))?\.osw$")
        .expect("valid result file regex")
});

/// Which result files take part in an analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TagSelection {
    /// Regular runs only.
    #[default]
    Untagged,
    /// Custom-tagged stability reruns only.
    Tagged,
    All,
}

impl TagSelection {
    pub fn from_flags(tagged: bool, all: bool) -> Self {
        match (tagged, all) {
            (_, true) => TagSelection::All,
            (true, false) => TagSelection::Tagged,
            (false, false) => TagSelection::Untagged,
        }
    }

    pub fn accepts(&self, key: &ResultFileKey) -> bool {
        match self {
            TagSelection::Untagged => key.tag.is_none(),
            TagSelection::Tagged => key.tag.is_some(),
            TagSelection::All => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedFile {
    pub key: ResultFileKey,
    pub path: PathBuf,
}

/// Parse a bare file name; `None` when it does not follow the result grammar.
pub fn parse_result_filename(name: &str) -> Option<ResultFileKey> {
    let caps = RESULT_FILE_RE.captures(name)?;
    let file_type = FileType::from_str(&caps["ftype"]).ok()?;
    Some(ResultFileKey {
        test: caps["test"].to_owned(),
        file_type,
        version: caps["version"].to_owned(),
        tag: caps.name("tag").map(|m| m.as_str().to_owned()),
    })
}

/// Result files directly inside `dir`, sorted by file name.
pub fn locate_result_files(dir: &Path, selection: TagSelection) -> Result<Vec<LocatedFile>> {
    let mut located = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if !name.ends_with(".osw") {
            continue;
        }
        match parse_result_filename(name) {
            Some(key) if selection.accepts(&key) => located.push(LocatedFile {
                key,
                path: entry.into_path(),
            }),
            Some(_) => {}
            None => debug!(file = name, "skipping file outside the result naming scheme"),
        }
    }
    debug!(dir = %dir.display(), count = located.len(), ?selection, "located result files");
    Ok(located)
}

/// Distinct OpenStudio versions among `files`.
pub fn openstudio_versions(files: &[LocatedFile]) -> BTreeSet<String> {
    files.iter().map(|f| f.key.version.clone()).collect()
}

/// Arrange located files into a (test, type) x (E+, OS, tag) matrix.
pub fn build_file_matrix(
    files: &[LocatedFile],
    versions: &BTreeMap<String, String>,
) -> Result<Matrix<PathBuf>> {
    let mut cells: BTreeMap<(RowKey, ColumnKey), PathBuf> = BTreeMap::new();
    for file in files {
        let energyplus = versions
            .get(&file.key.version)
            .ok_or_else(|| AnalysisError::UnmappedVersion(file.key.version.clone()))?;
        let row = RowKey::new(file.key.test.clone(), file.key.file_type);
        let column = ColumnKey::new(energyplus.clone(), file.key.version.clone(), file.key.tag.clone());
        cells.insert((row, column), file.path.clone());
    }

    let rows: BTreeSet<RowKey> = cells.keys().map(|(row, _)| row.clone()).collect();
    let columns: BTreeSet<ColumnKey> = cells.keys().map(|(_, col)| col.clone()).collect();
    let mut matrix = Matrix::empty(rows.into_iter().collect(), columns.into_iter().collect());
    for ((row, column), path) in cells {
        matrix.set_by_key(&row, &column, Some(path));
    }
    Ok(matrix)
}
