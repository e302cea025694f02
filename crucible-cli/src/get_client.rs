use crate::config::CrucibleConfig;
use color_eyre::eyre::{Error, Result, WrapErr};
use color_eyre::owo_colors::OwoColorize;
use crucible::reqwest::Response;
use crucible::types::ApiUrl;
use crucible::CrucibleClient;
use reqwest_retry::{
    policies::ExponentialBackoff, RetryTransientMiddleware, Retryable, RetryableStrategy,
};

/// Connection options given on the command line.
pub struct Credentials {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub retries: Option<u32>,
}

impl Credentials {
    /// Command-line options take precedence over environment variables,
    /// which take precedence over the config file.
    pub fn get_client(&self, config: &CrucibleConfig) -> Result<CrucibleClient> {
        let url = match &self.api_url {
            Some(url) => ApiUrl::new(url.to_string())
                .wrap_err_with(|| format!("Invalid --api-url: {url}"))?,
            None => config.api_url()?,
        };
        let api_key = self
            .api_key
            .as_deref()
            .or(config.api_key.as_deref())
            .ok_or_else(|| {
                Error::msg(format!(
                    "No API key. Either use the {} option, or run `{}`",
                    "--api-key".bold(),
                    "crucible config init".bold()
                ))
            })?;
        log::debug!("using Crucible API at {url}");
        let builder = CrucibleClient::build(url, api_key)?;
        let client = if let Some(retries) = self.retries {
            builder.with(retry_strategy(retries)).connect()
        } else {
            builder.connect()
        };
        Ok(client)
    }
}

fn retry_strategy(retries: u32) -> impl reqwest_middleware::Middleware {
    let policy = ExponentialBackoff::builder().build_with_max_retries(retries);
    RetryTransientMiddleware::new_with_policy_and_strategy(policy, RetryStrategy)
}

/// - Client errors are fatal
/// - Everything else can be retried
struct RetryStrategy;
impl RetryableStrategy for RetryStrategy {
    fn handle(
        &self,
        res: &std::result::Result<Response, reqwest_middleware::Error>,
    ) -> Option<Retryable> {
        if let Ok(response) = res {
            if response.status().is_server_error() {
                Some(Retryable::Transient)
            } else if response.status().is_client_error() {
                Some(Retryable::Fatal)
            } else {
                None
            }
        } else {
            Some(Retryable::Transient)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[rstest]
    fn test_flag_overrides_config() {
        let config = CrucibleConfig {
            api_key: Some("file-key".to_string()),
            api_url: Some("https://example.org/api".to_string()),
            ..Default::default()
        };
        let credentials = Credentials {
            api_url: Some("http://localhost:8000/testapi".to_string()),
            api_key: None,
            retries: Some(2),
        };
        let client = credentials.get_client(&config).unwrap();
        assert_eq!(client.url().as_str(), "http://localhost:8000/testapi");
    }

    #[rstest]
    fn test_missing_api_key() {
        let credentials = Credentials {
            api_url: None,
            api_key: None,
            retries: None,
        };
        assert!(credentials
            .get_client(&CrucibleConfig::default())
            .is_err());
    }

    #[rstest]
    fn test_invalid_url() {
        let credentials = Credentials {
            api_url: Some("crucible.lbl.gov".to_string()),
            api_key: Some("key".to_string()),
            retries: None,
        };
        assert!(credentials
            .get_client(&CrucibleConfig::default())
            .is_err());
    }
}
