use crate::config::{ConfigKey, CrucibleConfig};
use camino::{Utf8Path, Utf8PathBuf};
use clap::Subcommand;
use color_eyre::eyre::{bail, Result, WrapErr};
use crucible::types::{DatasetId, DatasetIdRef};
use crucible::CrucibleClient;
use serde::Serialize;

#[derive(Subcommand)]
pub enum DatasetCommand {
    /// Print a dataset record
    Get {
        /// Dataset unique ID (mfid)
        dsid: DatasetId,

        /// Include scientific metadata
        #[clap(short, long)]
        metadata: bool,
    },

    /// List datasets
    List {
        /// Only list datasets of this project
        #[clap(short, long)]
        project: Option<String>,
    },

    /// Download a file of a dataset
    Download {
        /// Dataset unique ID (mfid)
        dsid: DatasetId,

        /// Name of the file in the dataset
        file: String,

        /// Where to save the file. Defaults to the dataset's directory under
        /// cache_dir, or the current directory if cache_dir is not set.
        #[clap(short, long)]
        output: Option<Utf8PathBuf>,
    },
}

pub async fn dataset_cmd(
    client: &CrucibleClient,
    config: &CrucibleConfig,
    command: DatasetCommand,
) -> Result<()> {
    match command {
        DatasetCommand::Get { dsid, metadata } => {
            match client.get_dataset(&dsid, metadata).await? {
                Some(dataset) => print_json(&dataset),
                None => bail!("Dataset {} not found", dsid),
            }
        }
        DatasetCommand::List { project } => {
            let filters: Vec<(&str, &str)> = project
                .as_deref()
                .map(|p| ("project_id", p))
                .into_iter()
                .collect();
            print_json(&client.list_datasets(&filters).await?)
        }
        DatasetCommand::Download { dsid, file, output } => {
            let output = output.unwrap_or_else(|| {
                download_path(config.get(ConfigKey::CacheDir), &dsid, &file)
            });
            if let Some(parent) = output.parent().filter(|p| !p.as_str().is_empty()) {
                fs_err::create_dir_all(parent)?;
            }
            client
                .download_dataset(&dsid, &file, &output)
                .await
                .wrap_err_with(|| format!("Could not download {file} of dataset {dsid}"))?;
            println!("{output}");
            Ok(())
        }
    }
}

/// Default location of a downloaded file: `{cache_dir}/{dsid}/{name}`.
fn download_path(cache_dir: Option<&str>, dsid: &DatasetIdRef, file: &str) -> Utf8PathBuf {
    let name = Utf8Path::new(file).file_name().unwrap_or(file);
    match cache_dir {
        Some(cache_dir) => Utf8Path::new(cache_dir).join(dsid.as_str()).join(name),
        None => Utf8PathBuf::from(name),
    }
}

pub fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[rstest]
    #[case(Some("/var/cache/crucible"), "scan.dm4", "/var/cache/crucible/0t3q9z/scan.dm4")]
    #[case(Some("/var/cache/crucible"), "api-uploads/scan.dm4", "/var/cache/crucible/0t3q9z/scan.dm4")]
    #[case(None, "api-uploads/scan.dm4", "scan.dm4")]
    fn test_download_path(
        #[case] cache_dir: Option<&str>,
        #[case] file: &str,
        #[case] expected: &str,
    ) {
        let dsid = DatasetId::from_static("0t3q9z");
        assert_eq!(download_path(cache_dir, &dsid, file), expected)
    }
}
