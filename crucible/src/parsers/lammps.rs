//! LAMMPS simulations: an input script, the data file it reads, and a log.

use super::ParsedDataset;
use crate::errors::ParseError;
use camino::{Utf8Path, Utf8PathBuf};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::io::BufRead;

/// Log file LAMMPS writes when the input script does not name one.
pub const DEFAULT_LAMMPS_LOG: &str = "log.lammps";

const KEYWORDS: [&str; 2] = ["LAMMPS", "molecular dynamics"];

/// What a LAMMPS input script says about the other files of a run.
///
/// File names are relative to `root`, the directory of the input script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LammpsInput {
    pub root: Utf8PathBuf,
    pub input_file: String,
    pub data_file: Option<String>,
    pub dump_files: Vec<String>,
    /// Never empty: defaults to [DEFAULT_LAMMPS_LOG].
    pub log_files: Vec<String>,
}

impl LammpsInput {
    /// Read an input script.
    pub fn read(path: &Utf8Path) -> Result<Self, ParseError> {
        let script = fs_err::read_to_string(path)?;
        let path = path.canonicalize_utf8()?;
        let root = path.parent().map(Utf8Path::to_path_buf).unwrap_or_default();
        let input_file = path.file_name().unwrap_or(path.as_str()).to_string();
        Self::parse(&script, root, input_file).map_err(|(line, message)| ParseError::Syntax {
            file: path,
            line,
            message,
        })
    }

    /// Parse the text of an input script. Errors carry a 1-based line number.
    ///
    /// Only the commands `read_data`, `variable`, `dump` and `log` are looked
    /// at. `{name}` and `${name}` in dump and log file names are replaced by
    /// the first value of the variable.
    pub fn parse(
        script: &str,
        root: Utf8PathBuf,
        input_file: String,
    ) -> Result<Self, (usize, String)> {
        let mut input = Self {
            root,
            input_file,
            data_file: None,
            dump_files: Vec::new(),
            log_files: Vec::new(),
        };
        let mut variables = HashMap::new();
        for (i, line) in script.lines().enumerate() {
            input
                .parse_line(line, &mut variables)
                .map_err(|message| (i + 1, message))?;
        }
        if input.log_files.is_empty() {
            input.log_files.push(DEFAULT_LAMMPS_LOG.to_string());
        }
        Ok(input)
    }

    fn parse_line(
        &mut self,
        line: &str,
        variables: &mut HashMap<String, String>,
    ) -> Result<(), String> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let word = |n: usize| {
            words
                .get(n)
                .copied()
                .ok_or_else(|| format!("expected at least {} words: {}", n + 1, line.trim()))
        };
        if line.starts_with("read_data") {
            self.data_file = Some(word(1)?.to_string());
        }
        if line.starts_with("variable") {
            variables.insert(word(1)?.to_string(), word(3)?.to_string());
        }
        if line.starts_with("dump ") {
            self.dump_files.push(substitute(word(5)?, variables)?);
        }
        if line.starts_with("log ") {
            self.log_files.push(substitute(word(1)?, variables)?);
        }
        Ok(())
    }

    pub fn to_metadata(&self) -> Map<String, Value> {
        let mut metadata = Map::new();
        metadata.insert("root".to_string(), self.root.as_str().into());
        metadata.insert("input_file".to_string(), self.input_file.as_str().into());
        if let Some(data_file) = &self.data_file {
            metadata.insert("data_file".to_string(), data_file.as_str().into());
        }
        metadata.insert("dump_files".to_string(), self.dump_files.clone().into());
        metadata.insert("log_files".to_string(), self.log_files.clone().into());
        metadata
    }
}

/// Replace variable references in a file name.
fn substitute(template: &str, variables: &HashMap<String, String>) -> Result<String, String> {
    let template = template.replace('$', "");
    let mut expanded = String::with_capacity(template.len());
    let mut rest = template.as_str();
    while let Some(start) = rest.find('{') {
        expanded.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let end = after
            .find('}')
            .ok_or_else(|| format!("unclosed '{{' in \"{template}\""))?;
        let name = &after[..end];
        let value = variables
            .get(name)
            .ok_or_else(|| format!("undefined variable \"{name}\""))?;
        expanded.push_str(value);
        rest = &after[end + 1..];
    }
    expanded.push_str(rest);
    Ok(expanded)
}

/// The LAMMPS version is the first line of a log file.
pub fn read_lammps_version(log_file: &Utf8Path) -> Result<String, ParseError> {
    let mut first_line = String::new();
    std::io::BufReader::new(fs_err::File::open(log_file)?).read_line(&mut first_line)?;
    Ok(first_line.trim().to_string())
}

/// The first file is the input script. Only it and its data file are uploaded.
pub(super) fn parse(dataset: &mut ParsedDataset) -> Result<(), ParseError> {
    let script = dataset.files.first().ok_or(ParseError::NoFiles)?;
    let input = LammpsInput::read(script)?;
    let data_file = input
        .data_file
        .as_deref()
        .ok_or_else(|| ParseError::NoDataFile(script.clone()))?;
    let log_file = input.root.join(&input.log_files[0]);
    let version = read_lammps_version(&log_file)?;

    dataset.files = vec![input.root.join(&input.input_file), input.root.join(data_file)];
    let mut metadata = input.to_metadata();
    metadata.insert("lammps_version".to_string(), version.into());
    dataset.add_metadata(metadata);
    dataset.add_keywords(KEYWORDS);
    Ok(())
}
