use crate::config::CrucibleConfig;
use crate::request::{check_failed, wait_with_spinner};
use camino::{Utf8Path, Utf8PathBuf};
use clap::Args;
use color_eyre::eyre::{bail, eyre, Result, WrapErr};
use color_eyre::owo_colors::OwoColorize;
use crucible::models::{NewAssociatedFile, NewDataset};
use crucible::parsers::DatasetType;
use crucible::types::{DatasetId, IngestorName, ProjectId, RequestType};
use crucible::{sha256_file, CrucibleClient, RequestHandle, WaitPolicy};
use serde_json::{Map, Value};

/// Files this large or larger cannot be sent through the upload endpoint.
pub const MAX_UPLOAD_SIZE: u64 = 100_000_000;

/// Directory on the server where uploaded files land.
const UPLOAD_DIR: &str = "api-uploads";

const DEFAULT_INGESTOR: &str = "ApiUploadIngestor";

#[derive(Args)]
pub struct UploadArgs {
    /// Files to upload. The first file is the dataset's main file.
    #[clap(required = true)]
    files: Vec<Utf8PathBuf>,

    /// Dataset type (case-insensitive): base, lammps.
    /// Its parser picks the files to upload and extracts metadata and keywords from them.
    #[clap(short = 't', long = "type")]
    dataset_type: Option<DatasetType>,

    /// Project ID. Defaults to current_project from config.
    #[clap(short, long)]
    project: Option<String>,

    /// Dataset name
    #[clap(short = 'n', long)]
    name: Option<String>,

    /// Dataset unique ID (mfid). Assigned by Crucible if not given.
    #[clap(long, visible_alias = "unique-id")]
    mfid: Option<DatasetId>,

    /// Owner ORCID. Defaults to orcid_id from config.
    #[clap(long)]
    orcid: Option<String>,

    /// Scientific metadata, as JSON or the path of a JSON file
    #[clap(long)]
    metadata: Option<String>,

    /// Comma-separated keywords
    #[clap(short, long)]
    keywords: Option<String>,

    /// Measurement type
    #[clap(short, long)]
    measurement: Option<String>,

    /// Session name, for grouping related datasets
    #[clap(long)]
    session: Option<String>,

    /// Make the dataset public
    #[clap(long)]
    public: bool,

    /// Name of the instrument which produced the data. Registered if new.
    #[clap(long)]
    instrument: Option<String>,

    /// Data format
    #[clap(long)]
    data_format: Option<String>,

    /// Ingestion class to process the main file with
    #[clap(long, default_value = DEFAULT_INGESTOR)]
    ingestor: IngestorName,

    /// Do not wait for ingestion to finish
    #[clap(long)]
    no_wait: bool,

    /// Actually upload. Without this option, only a summary is printed.
    #[clap(short, long)]
    upload: bool,
}

pub async fn upload(
    client: impl FnOnce() -> Result<CrucibleClient>,
    config: &CrucibleConfig,
    args: UploadArgs,
) -> Result<()> {
    let project = args
        .project
        .clone()
        .or_else(|| config.current_project.clone())
        .ok_or_else(|| {
            eyre!(
                "Project ID required. Use {} or run `{}`",
                "--project".bold(),
                "crucible config set current_project YOUR_PROJECT_ID".bold()
            )
        })?;
    let metadata = args
        .metadata
        .as_deref()
        .map(parse_metadata)
        .transpose()?
        .unwrap_or_default();
    let keywords = args.keywords.as_deref().map(split_keywords).unwrap_or_default();
    let owner_orcid = args.orcid.clone().or_else(|| config.orcid_id.clone());

    let dataset_type = args.dataset_type.unwrap_or(DatasetType::Base);
    let parsed = dataset_type
        .parse(&args.files, metadata, keywords)
        .wrap_err_with(|| format!("Could not read files as a {dataset_type} dataset"))?;
    let sizes = check_files(&parsed.files)?;

    eprintln!("Project: {}", project.bold());
    eprintln!("Dataset type: {}", dataset_type);
    for (file, size) in parsed.files.iter().zip(&sizes) {
        eprintln!("  {} ({} bytes)", file, size);
    }
    if !parsed.keywords.is_empty() {
        eprintln!("  keywords: {}", parsed.keywords.join(", "));
    }
    if !parsed.scientific_metadata.is_empty() {
        eprintln!("  metadata:");
        for (key, value) in &parsed.scientific_metadata {
            eprintln!("    {}: {}", key, brief(value));
        }
    }
    if !args.upload {
        eprintln!(
            "{}",
            format!("Nothing was uploaded. Use {} to upload.", "--upload".bold()).dimmed()
        );
        return Ok(());
    }

    let client = client()?;
    let instrument_id = if let Some(name) = &args.instrument {
        client
            .get_or_add_instrument(name, None, None)
            .await
            .wrap_err_with(|| format!("Could not register instrument \"{name}\""))?
            .id
    } else {
        None
    };
    let main_file = parsed
        .files
        .first()
        .ok_or_else(|| eyre!("No files to upload"))?;
    let main_name = server_path(main_file)?;
    let mut new = NewDataset {
        unique_id: args.mfid.clone(),
        dataset_name: args.name.clone(),
        public: args.public,
        owner_orcid: owner_orcid.map(Into::into),
        project_id: Some(ProjectId::from(project)),
        instrument_id,
        measurement: args.measurement.clone().or(Some(parsed.measurement.clone())),
        session_name: args.session.clone(),
        data_format: args.data_format.clone().or(parsed.data_format.clone()),
        file_to_upload: Some(main_name.clone()),
        ..Default::default()
    };
    client
        .resolve_owner(&mut new)
        .await
        .wrap_err("Could not find the dataset owner in Crucible")?;
    let scientific_metadata = Some(&parsed.scientific_metadata)
        .filter(|m| !m.is_empty())
        .map(|m| Value::Object(m.clone()));
    let created = client
        .create_dataset_with_metadata(&new, scientific_metadata.as_ref(), &parsed.keywords)
        .await
        .wrap_err("Could not create dataset")?;
    let dsid = created.dsid;
    println!("{dsid}");

    let files: Vec<&Utf8Path> = parsed.files.iter().map(|f| f.as_path()).collect();
    client
        .upload_dataset(&dsid, &files)
        .await
        .wrap_err("Upload failed")?;
    for (file, size) in parsed.files.iter().zip(sizes).skip(1) {
        let associated = NewAssociatedFile {
            filename: server_path(file)?,
            size,
            sha256_hash: sha256_file(file).await?,
        };
        client.add_associated_file(&dsid, &associated).await?;
    }

    let request = client
        .request_ingestion(&dsid, Some(main_name.as_str()), Some(&*args.ingestor))
        .await
        .wrap_err("Could not request ingestion")?;
    let handle = RequestHandle::new(dsid, request.id, RequestType::Ingest);
    if args.no_wait {
        eprintln!("Requested ingestion: {}", handle.request_id);
        return Ok(());
    }
    let status = wait_with_spinner(&client, &handle, WaitPolicy::default()).await?;
    eprintln!("Ingestion {}", status.status.bold());
    check_failed(&status)
}

/// Check that files exist and are small enough to upload. Returns their sizes.
fn check_files(files: &[Utf8PathBuf]) -> Result<Vec<u64>> {
    files
        .iter()
        .map(|file| -> Result<u64> {
            let size = fs_err::metadata(file)?.len();
            if size >= MAX_UPLOAD_SIZE {
                bail!("{file} is too large to upload ({size} bytes, limit is {MAX_UPLOAD_SIZE})")
            }
            Ok(size)
        })
        .collect()
}

/// Where an uploaded file is found on the server.
fn server_path(file: &Utf8Path) -> Result<String> {
    let name = file
        .file_name()
        .ok_or_else(|| eyre!("\"{file}\" is not a file"))?;
    Ok(format!("{UPLOAD_DIR}/{name}"))
}

/// Metadata is read from a file if the argument is a path to one,
/// otherwise the argument itself is parsed as JSON. It must be an object.
fn parse_metadata(arg: &str) -> Result<Map<String, Value>> {
    let path = Utf8Path::new(arg);
    let value: Value = if path.is_file() {
        let content = fs_err::read_to_string(path)?;
        serde_json::from_str(&content).wrap_err_with(|| format!("Invalid JSON in {path}"))?
    } else {
        serde_json::from_str(arg).wrap_err("Invalid JSON given to --metadata")?
    };
    match value {
        Value::Object(metadata) => Ok(metadata),
        _ => bail!("--metadata must be a JSON object"),
    }
}

/// Short form of a metadata value for the summary.
fn brief(value: &Value) -> String {
    let full = value.to_string();
    match value {
        Value::Array(items) if full.len() > 80 => format!("<{} items>", items.len()),
        Value::Object(fields) if full.len() > 80 => format!("<{} fields>", fields.len()),
        _ => full,
    }
}

fn split_keywords(arg: &str) -> Vec<String> {
    arg.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(String::from)
        .collect()
}
