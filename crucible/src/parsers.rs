//! Dataset type parsers.
//!
//! A parser reads a dataset's files before upload. It decides which files
//! get uploaded and adds scientific metadata and keywords it finds in them
//! to whatever the user gave.

mod lammps;

pub use lammps::{read_lammps_version, LammpsInput, DEFAULT_LAMMPS_LOG};

use crate::errors::{ParseError, UnknownDatasetType};
use camino::Utf8PathBuf;
use serde_json::{Map, Value};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Kinds of datasets which have a parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatasetType {
    /// Generic upload: files are sent as given, nothing is extracted.
    Base,
    /// LAMMPS molecular dynamics simulation, described by its input script.
    Lammps,
}

impl DatasetType {
    pub const ALL: [DatasetType; 2] = [DatasetType::Base, DatasetType::Lammps];

    pub fn name(self) -> &'static str {
        match self {
            DatasetType::Base => "base",
            DatasetType::Lammps => "lammps",
        }
    }

    /// Measurement recorded for the dataset when the user does not give one.
    pub fn measurement(self) -> &'static str {
        match self {
            DatasetType::Base => "base",
            DatasetType::Lammps => "LAMMPS",
        }
    }

    pub fn data_format(self) -> Option<&'static str> {
        match self {
            DatasetType::Base => None,
            DatasetType::Lammps => Some("LAMMPS"),
        }
    }

    /// Read `files` and merge what they say into the user's `metadata` and
    /// `keywords`. Extracted metadata replaces user values of the same key.
    pub fn parse(
        self,
        files: &[Utf8PathBuf],
        metadata: Map<String, Value>,
        keywords: Vec<String>,
    ) -> Result<ParsedDataset, ParseError> {
        let mut parsed = ParsedDataset {
            files: files.to_vec(),
            measurement: self.measurement().to_string(),
            data_format: self.data_format().map(String::from),
            scientific_metadata: metadata,
            keywords,
        };
        match self {
            DatasetType::Base => {}
            DatasetType::Lammps => lammps::parse(&mut parsed)?,
        }
        Ok(parsed)
    }
}

impl Display for DatasetType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Case-insensitive.
impl FromStr for DatasetType {
    type Err = UnknownDatasetType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownDatasetType {
                given: s.to_string(),
                available: available_types(),
            })
    }
}

/// Names of all dataset types, sorted and comma-separated.
pub fn available_types() -> String {
    let mut names: Vec<&str> = DatasetType::ALL.iter().map(|t| t.name()).collect();
    names.sort_unstable();
    names.join(", ")
}

/// A dataset ready to be created: its files, metadata, and keywords.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDataset {
    /// Files to upload. The first one is the main file.
    pub files: Vec<Utf8PathBuf>,
    pub measurement: String,
    pub data_format: Option<String>,
    pub scientific_metadata: Map<String, Value>,
    pub keywords: Vec<String>,
}

impl ParsedDataset {
    /// Merge `metadata` into the scientific metadata, replacing existing values.
    pub fn add_metadata(&mut self, metadata: Map<String, Value>) {
        self.scientific_metadata.extend(metadata)
    }

    /// Append keywords which are not already present.
    pub fn add_keywords<S: Into<String>>(&mut self, keywords: impl IntoIterator<Item = S>) {
        for keyword in keywords {
            let keyword = keyword.into();
            if !self.keywords.contains(&keyword) {
                self.keywords.push(keyword);
            }
        }
    }
}
