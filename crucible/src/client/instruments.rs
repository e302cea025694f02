use super::CrucibleClient;
use crate::errors::CrucibleError;
use crate::models::*;

impl CrucibleClient {
    pub async fn list_instruments(&self, limit: u32) -> Result<Vec<Instrument>, CrucibleError> {
        self.send(self.get("instruments").query(&[("limit", limit)]))
            .await
    }

    /// Find an instrument. When several match, the last one is returned.
    pub async fn get_instrument(
        &self,
        query: &InstrumentQuery,
    ) -> Result<Option<Instrument>, CrucibleError> {
        let found: Vec<Instrument> = self
            .send(self.get("instruments").query(&[query.as_param()]))
            .await?;
        Ok(found.into_iter().last())
    }

    /// Find an instrument by name, or register it. A new instrument's owner
    /// is "undefined" and its location is empty unless given.
    pub async fn get_or_add_instrument(
        &self,
        name: &str,
        location: Option<&str>,
        owner: Option<&str>,
    ) -> Result<Instrument, CrucibleError> {
        let query = InstrumentQuery::Name(name.to_string());
        if let Some(found) = self.get_instrument(&query).await? {
            return Ok(found);
        }
        let new = NewInstrument {
            instrument_name: name.to_string(),
            location: location.unwrap_or_default().to_string(),
            owner: owner.unwrap_or("undefined").to_string(),
        };
        self.send(self.post("instruments").json(&new)).await
    }
}
