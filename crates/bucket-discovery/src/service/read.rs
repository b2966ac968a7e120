use std::collections::HashSet;
use tracing::{debug, error, trace, warn};

use crate::domain::{GroupName, ListingMode, NodeAddress, PeerRecord, RegistryError};
use crate::ports::{OpOutcome, RegistryOp, ResponseSink};
use crate::service::BucketRegistry;

/// What happened during one `read_all` round.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadReport {
    /// Listing pages consumed.
    pub pages: usize,
    /// Records submitted to the sink.
    pub delivered: usize,
    /// Records registered in the discovery cache.
    pub cached: usize,
    /// Zero-length objects skipped without a fetch.
    pub skipped_empty: usize,
    /// Objects whose fetch failed.
    pub skipped_failed: usize,
    /// Processing stopped on an object that parsed to nothing (or not at all).
    pub stopped_early: bool,
}

impl ReadReport {
    /// Some objects could not be fetched; the round delivered a subset.
    pub fn is_partial(&self) -> bool {
        self.skipped_failed > 0
    }
}

impl BucketRegistry {
    /// `read_all` that also reports what the round did.
    ///
    /// Same best-effort semantics: nothing is returned as an error.
    pub async fn read_with_report(
        &self,
        known_members: Option<&HashSet<NodeAddress>>,
        group: &str,
        sink: &mut (dyn ResponseSink + Send),
    ) -> ReadReport {
        let mut report = ReadReport::default();
        let Some(group) = self.resolve_group(group, RegistryOp::ReadAll) else {
            return report;
        };

        let outcome = match self
            .try_read_all(known_members, &group, sink, &mut report)
            .await
        {
            Ok(()) if report.is_partial() => OpOutcome::Partial,
            Ok(()) => OpOutcome::Success,
            Err(e) => {
                error!(
                    backend = %self.name,
                    prefix = %self.prefix_for(&group),
                    delivered = report.delivered,
                    error = %e,
                    "failed getting member list"
                );
                self.metrics.record_error(RegistryOp::ReadAll, &e);
                OpOutcome::Failure
            }
        };
        self.metrics.record_operation(RegistryOp::ReadAll, outcome);
        self.metrics
            .record_read_round(report.delivered, report.cached);
        report
    }

    /// Page through the group listing and feed records into `sink`.
    ///
    /// Returns `Err` only when a listing call fails. Records delivered before
    /// that stay delivered; `report` reflects everything done so far.
    pub(crate) async fn try_read_all(
        &self,
        known_members: Option<&HashSet<NodeAddress>>,
        group: &GroupName,
        sink: &mut (dyn ResponseSink + Send),
        report: &mut ReadReport,
    ) -> Result<(), RegistryError> {
        let prefix = self.prefix_for(group);
        trace!(%prefix, "getting entries");

        let mut continuation: Option<String> = None;
        loop {
            let page = self
                .store
                .list_page(&prefix, continuation.as_deref())
                .await?;
            report.pages += 1;
            trace!(%prefix, entries = page.objects.len(), page = report.pages, "got object listing");

            for summary in &page.objects {
                if summary.size == 0 {
                    trace!(key = %summary.key, "skipping object as it is empty");
                    report.skipped_empty += 1;
                    continue;
                }

                trace!(key = %summary.key, "fetching data for object");
                let payload = match self.store.get(&summary.key).await {
                    Ok(payload) => payload,
                    Err(e) => {
                        warn!(key = %summary.key, error = %e, "failed to fetch object, skipping");
                        self.metrics.record_error(RegistryOp::ReadAll, &RegistryError::from(e));
                        report.skipped_failed += 1;
                        continue;
                    }
                };

                let records = match self.codec.decode(&payload) {
                    Ok(records) => records,
                    Err(e) => {
                        warn!(key = %summary.key, error = %e, "undecodable member list, ending round");
                        self.metrics.record_error(RegistryOp::ReadAll, &RegistryError::from(e));
                        report.stopped_early = true;
                        return Ok(());
                    }
                };
                if records.is_empty() {
                    debug!(%prefix, key = %summary.key, "fetched member list is empty, ending round");
                    report.stopped_early = true;
                    return Ok(());
                }

                for record in records {
                    self.accept(record, known_members, sink, report);
                }
            }

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

        debug!(%prefix, delivered = report.delivered, pages = report.pages, "fetched update for member list");
        Ok(())
    }

    /// Filter into the sink; cache every non-self record regardless.
    fn accept<S: ResponseSink + ?Sized>(
        &self,
        record: PeerRecord,
        known_members: Option<&HashSet<NodeAddress>>,
        sink: &mut S,
        report: &mut ReadReport,
    ) {
        if record.address != self.local_address {
            self.cache.add_possible_member(
                record.address,
                record.logical_name.clone(),
                record.physical_addr.clone(),
            );
            report.cached += 1;
            trace!(peer = %record, "added possible member");
        }

        if known_members.map_or(true, |members| members.contains(&record.address)) {
            trace!(peer = %record, filtered = known_members.is_some(), "added member");
            let is_coordinator = record.is_coordinator;
            sink.add_response(record, is_coordinator);
            report.delivered += 1;
        }
    }
}
