use tracing::{error, trace, warn};

use crate::domain::{object_key, GroupName, ListingMode, NodeAddress, RegistryError};
use crate::ports::RegistryOp;
use crate::service::BucketRegistry;

/// Outcome of a bulk removal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct RemoveAllReport {
    pub deleted: usize,
    pub failed: usize,
}

impl BucketRegistry {
    pub(crate) async fn try_remove(
        &self,
        group: &GroupName,
        address: &NodeAddress,
    ) -> Result<(), RegistryError> {
        let key = object_key(&self.config.prefix, group, address);
        self.store.delete(&key).await?;
        trace!(%key, "removed");
        Ok(())
    }

    /// List the group and delete every object. A failed delete is logged and
    /// the rest continue; a failed listing aborts.
    pub(crate) async fn try_remove_all(
        &self,
        group: &GroupName,
        report: &mut RemoveAllReport,
    ) -> Result<(), RegistryError> {
        let prefix = self.prefix_for(group);

        // Deleting while paginating shifts page boundaries; list everything first.
        let mut keys = Vec::new();
        let mut continuation: Option<String> = None;
        loop {
            let page = self
                .store
                .list_page(&prefix, continuation.as_deref())
                .await?;
            trace!(%prefix, entries = page.objects.len(), "got object listing");
            keys.extend(page.objects.into_iter().map(|o| o.key));

            if self.config.listing == ListingMode::SinglePage {
                break;
            }
            match page.next_continuation {
                Some(next) if continuation.as_deref() == Some(next.as_str()) => {
                    warn!(%prefix, token = %next, "continuation token did not advance, ending listing");
                    break;
                }
                Some(next) => continuation = Some(next),
                None => break,
            }
        }

        for key in keys {
            match self.store.delete(&key).await {
                Ok(()) => {
                    trace!(%key, "removing");
                    report.deleted += 1;
                }
                Err(e) => {
                    error!(%key, error = %e, "failed deleting object");
                    self.metrics.record_error(RegistryOp::RemoveAll, &RegistryError::from(e));
                    report.failed += 1;
                }
            }
        }
        Ok(())
    }
}
