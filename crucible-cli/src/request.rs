use crate::dataset::print_json;
use clap::{Args, Subcommand};
use color_eyre::eyre::{bail, Result};
use color_eyre::owo_colors::OwoColorize;
use crucible::models::RequestStatus;
use crucible::types::{DatasetId, RequestId, RequestType};
use crucible::{
    CancellationToken, CrucibleClient, RequestHandle, RequestWaiter, WaitPolicy,
    DEFAULT_POLL_INTERVAL,
};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

#[derive(Subcommand)]
pub enum RequestCommand {
    /// Print the current status of a processing request
    Status(RequestArgs),

    /// Wait for a processing request to complete or fail
    Wait {
        #[clap(flatten)]
        request: RequestArgs,

        /// Seconds between status queries
        #[clap(short, long, default_value_t = DEFAULT_POLL_INTERVAL.as_secs_f64())]
        interval: f64,

        /// Give up after this many seconds
        #[clap(long)]
        timeout: Option<f64>,
    },
}

#[derive(Args)]
pub struct RequestArgs {
    /// Dataset unique ID (mfid)
    dsid: DatasetId,

    /// Processing request ID
    reqid: RequestId,

    /// Kind of processing request
    #[clap(short = 't', long = "type", value_enum, default_value_t = RequestKind::Ingest)]
    request_type: RequestKind,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
#[value(rename_all = "snake_case")]
pub enum RequestKind {
    Ingest,
    ScicatUpdate,
    GoogleDriveTransfer,
}

impl From<RequestKind> for RequestType {
    fn from(value: RequestKind) -> Self {
        match value {
            RequestKind::Ingest => RequestType::Ingest,
            RequestKind::ScicatUpdate => RequestType::ScicatUpdate,
            RequestKind::GoogleDriveTransfer => RequestType::GoogleDriveTransfer,
        }
    }
}

impl RequestArgs {
    fn handle(self) -> RequestHandle {
        RequestHandle::new(self.dsid, self.reqid, self.request_type.into())
    }
}

pub async fn request_cmd(client: &CrucibleClient, command: RequestCommand) -> Result<()> {
    match command {
        RequestCommand::Status(args) => {
            print_json(&client.get_request_status(&args.handle()).await?)
        }
        RequestCommand::Wait {
            request,
            interval,
            timeout,
        } => {
            let policy = wait_policy(interval, timeout)?;
            let status = wait_with_spinner(client, &request.handle(), policy).await?;
            print_json(&status)?;
            check_failed(&status)
        }
    }
}

fn wait_policy(interval: f64, timeout: Option<f64>) -> Result<WaitPolicy> {
    let interval = Duration::try_from_secs_f64(interval)?;
    let policy = WaitPolicy::unbounded(interval);
    if let Some(timeout) = timeout {
        Ok(policy.timeout(Duration::try_from_secs_f64(timeout)?))
    } else {
        Ok(policy)
    }
}

/// Wait for a request while showing a spinner. Ctrl-C stops waiting.
pub async fn wait_with_spinner(
    client: &CrucibleClient,
    handle: &RequestHandle,
    policy: WaitPolicy,
) -> Result<RequestStatus> {
    let spinner = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr())
        .with_style(ProgressStyle::default_spinner());
    spinner.set_message(format!("Waiting for {handle}..."));
    spinner.enable_steady_tick(Duration::from_millis(120));

    let token = CancellationToken::new();
    let on_ctrl_c = token.clone();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_ctrl_c.cancel();
        }
    });
    let result = RequestWaiter::new(client, policy)
        .cancel_on(token)
        .wait(handle)
        .await;
    ctrl_c.abort();
    spinner.finish_and_clear();
    Ok(result?)
}

/// A failed request is reported as an error so that the exit code is non-zero.
pub fn check_failed(status: &RequestStatus) -> Result<()> {
    if status.is_failed() {
        bail!(
            "Request {}: {}",
            "failed".red(),
            status.error_message.as_deref().unwrap_or("no error message")
        )
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[rstest]
    fn test_wait_policy() {
        let policy = wait_policy(2.5, Some(60.0)).unwrap();
        assert_eq!(policy.poll_interval(), Duration::from_millis(2500));
        assert_eq!(policy.get_timeout(), Some(Duration::from_secs(60)));
        assert_eq!(wait_policy(1.0, None).unwrap().get_timeout(), None);
        assert!(wait_policy(-1.0, None).is_err());
    }

    #[rstest]
    #[case("failed", true)]
    #[case("completed", false)]
    fn test_check_failed(#[case] status: &str, #[case] is_err: bool) {
        let status: RequestStatus =
            serde_json::from_value(serde_json::json!({ "status": status })).unwrap();
        assert_eq!(check_failed(&status).is_err(), is_err);
    }

    #[rstest]
    #[case(RequestKind::Ingest, "ingest")]
    #[case(RequestKind::ScicatUpdate, "scicat_update")]
    #[case(RequestKind::GoogleDriveTransfer, "google_drive_transfer")]
    fn test_request_kind(#[case] kind: RequestKind, #[case] expected: &str) {
        assert_eq!(RequestType::from(kind).as_str(), expected);
    }
}
