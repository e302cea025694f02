use super::CrucibleClient;
use crate::errors::CrucibleError;
use crate::models::*;
use crate::types::*;
use serde::Serialize;
use serde_json::Value;

impl CrucibleClient {
    pub async fn get_sample(&self, id: &SampleIdRef) -> Result<Option<Sample>, CrucibleError> {
        self.send_optional(self.get(&format!("samples/{}", id)))
            .await
    }

    pub async fn list_samples<Q: Serialize + ?Sized>(
        &self,
        filters: &Q,
    ) -> Result<Vec<Sample>, CrucibleError> {
        self.send(self.get("samples").query(filters)).await
    }

    pub async fn add_sample(&self, sample: &NewSample) -> Result<Sample, CrucibleError> {
        self.send(self.post("samples").json(sample)).await
    }

    /// Link an existing sample to an existing dataset.
    pub async fn add_sample_to_dataset(
        &self,
        sample: &SampleIdRef,
        dsid: &DatasetIdRef,
    ) -> Result<Option<Value>, CrucibleError> {
        self.send_optional(self.post(&format!("datasets/{}/samples/{}", dsid, sample)))
            .await
    }
}
