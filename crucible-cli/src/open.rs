use crate::config::CrucibleConfig;
use clap::{Args, ValueEnum};
use color_eyre::eyre::{bail, Result, WrapErr};
use color_eyre::owo_colors::OwoColorize;

#[derive(Args)]
pub struct OpenArgs {
    /// Unique ID (mfid) of the sample or dataset to open
    mfid: Option<String>,

    /// Project ID. Defaults to current_project from config when an mfid is given.
    #[clap(short, long)]
    project: Option<String>,

    /// Kind of resource
    #[clap(short = 't', long = "type", value_enum, default_value_t = ResourceKind::Sample)]
    kind: ResourceKind,

    /// Print the URL instead of opening a web browser
    #[clap(long)]
    print_url: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceKind {
    Sample,
    Dataset,
    Main,
}

impl ResourceKind {
    /// Graph Explorer route segment for this kind.
    fn route(self) -> &'static str {
        match self {
            ResourceKind::Sample => "sample-graph",
            ResourceKind::Dataset => "dataset",
            ResourceKind::Main => "",
        }
    }
}

pub fn open(config: &CrucibleConfig, args: OpenArgs) -> Result<()> {
    let project = if args.mfid.is_some() {
        args.project.or_else(|| config.current_project.clone())
    } else {
        args.project
    };
    if args.mfid.is_some() && project.is_none() {
        bail!(
            "A project ID is required to open a specific resource. Use {} or run `{}`",
            "--project".bold(),
            "crucible config set current_project YOUR_PROJECT_ID".bold()
        )
    }
    let url = explorer_url(
        config.graph_explorer_url(),
        project.as_deref(),
        args.mfid.as_deref(),
        args.kind,
    );
    if args.print_url {
        println!("{url}");
        return Ok(());
    }
    eprintln!("Opening in browser: {}", url.cyan());
    webbrowser::open(&url).wrap_err_with(|| format!("Could not open a web browser. URL: {url}"))
}

fn explorer_url(
    base: &str,
    project: Option<&str>,
    mfid: Option<&str>,
    kind: ResourceKind,
) -> String {
    let base = base.trim_end_matches('/');
    match (project, mfid) {
        (None, _) => base.to_string(),
        (Some(project), None) => format!("{base}/{project}"),
        (Some(project), Some(mfid)) => match kind.route() {
            "" => format!("{base}/{project}/{mfid}"),
            route => format!("{base}/{project}/{route}/{mfid}"),
        },
    }
}
