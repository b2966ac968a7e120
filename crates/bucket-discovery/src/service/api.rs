use async_trait::async_trait;
use std::collections::HashSet;
use tracing::error;

use crate::domain::{NodeAddress, PeerRecord};
use crate::ports::{DiscoveryBackend, OpOutcome, RegistryOp, ResponseSink};
use crate::service::remove::RemoveAllReport;
use crate::service::BucketRegistry;

#[async_trait]
impl DiscoveryBackend for BucketRegistry {
    async fn read_all(
        &self,
        known_members: Option<&HashSet<NodeAddress>>,
        group: &str,
        sink: &mut (dyn ResponseSink + Send),
    ) {
        self.read_with_report(known_members, group, sink).await;
    }

    async fn write(&self, records: &[PeerRecord], group: &str) {
        let Some(group) = self.resolve_group(group, RegistryOp::Write) else {
            return;
        };

        let outcome = match self.try_write(records, &group).await {
            Ok(_) => OpOutcome::Success,
            Err(e) => {
                error!(backend = %self.name, %group, error = %e, "failed to update member list");
                self.metrics.record_error(RegistryOp::Write, &e);
                OpOutcome::Failure
            }
        };
        self.metrics.record_operation(RegistryOp::Write, outcome);
    }

    async fn remove(&self, group: &str, address: &NodeAddress) {
        let Some(group) = self.resolve_group(group, RegistryOp::Remove) else {
            return;
        };

        let outcome = match self.try_remove(&group, address).await {
            Ok(()) => OpOutcome::Success,
            Err(e) => {
                error!(backend = %self.name, %group, %address, error = %e, "failure removing data");
                self.metrics.record_error(RegistryOp::Remove, &e);
                OpOutcome::Failure
            }
        };
        self.metrics.record_operation(RegistryOp::Remove, outcome);
    }

    async fn remove_all(&self, group: &str) {
        let Some(group) = self.resolve_group(group, RegistryOp::RemoveAll) else {
            return;
        };

        let mut report = RemoveAllReport::default();
        let outcome = match self.try_remove_all(&group, &mut report).await {
            Ok(()) if report.failed > 0 => OpOutcome::Partial,
            Ok(()) => OpOutcome::Success,
            Err(e) => {
                error!(backend = %self.name, %group, error = %e, "failed deleting all objects");
                self.metrics.record_error(RegistryOp::RemoveAll, &e);
                OpOutcome::Failure
            }
        };
        self.metrics.record_operation(RegistryOp::RemoveAll, outcome);
    }

    fn backend_name(&self) -> &str {
        &self.name
    }
}
