use tracing::{debug, trace};

use crate::domain::{object_key, GroupName, PeerRecord, RegistryError};
use crate::ports::PutOptions;
use crate::service::BucketRegistry;

impl BucketRegistry {
    /// Encode `records` and overwrite the local node's object.
    pub(crate) async fn try_write(
        &self,
        records: &[PeerRecord],
        group: &GroupName,
    ) -> Result<String, RegistryError> {
        let key = object_key(&self.config.prefix, group, &self.local_address);
        let body = self.codec.encode(records)?;
        trace!(%key, bytes = body.len(), "new member list content");

        let options = PutOptions {
            content_type: self.codec.content_type().to_string(),
            grant_bucket_owner_full_control: self.config.write.grant_bucket_owner_full_control,
            kms_key_id: self.config.write.kms_key_id.clone(),
        };
        self.store.put(&key, body, &options).await?;

        debug!(%key, records = records.len(), "wrote member list");
        Ok(key)
    }
}
