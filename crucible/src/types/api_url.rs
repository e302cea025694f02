//! NewType for the base URL of a Crucible API deployment.

use crate::errors::InvalidApiUrl;
use aliri_braid::braid;

/// An [ApiUrl] is the base URL of a Crucible API, e.g.
/// `https://crucible.lbl.gov/testapi`
///
/// A trailing slash is tolerated; it is dropped when endpoint paths are joined.
#[braid(validator, serde)]
pub struct ApiUrl(String);

impl aliri_braid::Validator for ApiUrl {
    type Error = InvalidApiUrl;

    fn validate(s: &str) -> Result<(), Self::Error> {
        let rest = s
            .strip_prefix("http://")
            .or_else(|| s.strip_prefix("https://"))
            .ok_or_else(|| InvalidApiUrl::Protocol(s.to_string()))?;
        if rest.trim_end_matches('/').is_empty() {
            Err(InvalidApiUrl::MissingHost(s.to_string()))
        } else {
            Ok(())
        }
    }
}

impl ApiUrlRef {
    /// Join an endpoint path onto this base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
