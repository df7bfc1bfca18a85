//! Prometheus metrics of the agreement core.
//!
//! [`CoreMetrics`] owns its own [`Registry`]; an embedding process can
//! encode it with [`CoreMetrics::encode_text`] or merge it into a larger
//! exposition.

use prometheus::{
    register_histogram_with_registry, register_int_counter_with_registry,
    register_int_gauge_with_registry, Encoder, Histogram, HistogramOpts, IntCounter, IntGauge,
    Opts, Registry, TextEncoder,
};

use crate::NodeError;

pub struct CoreMetrics {
    pub registry: Registry,

    // ── Votes ───────────────────────────────────────────────────────────
    /// Votes handed to the core, singly or inside state messages.
    pub votes_received: IntCounter,
    /// Votes or state messages refused with a consensus error.
    pub votes_rejected_invalid: IntCounter,
    pub rounds_committed: IntCounter,
    pub rounds_rejected: IntCounter,
    /// Equivocations seen by the vote storage so far.
    pub equivocations_recorded: IntGauge,
    /// Counted votes carried by each decided answer.
    pub answer_votes: Histogram,

    // ── Ordering ────────────────────────────────────────────────────────
    pub proposals_received: IntCounter,
    /// Proposals released to voting.
    pub proposals_emitted: IntCounter,
    pub commit_events: IntCounter,
    pub pending_proposals: IntGauge,
    pub last_committed_height: IntGauge,
}

impl CoreMetrics {
    pub fn new() -> Result<Self, NodeError> {
        let registry = Registry::new();

        let votes_received = register_int_counter_with_registry!(
            Opts::new("yac_votes_received_total", "Total votes received"),
            registry
        )?;
        let votes_rejected_invalid = register_int_counter_with_registry!(
            Opts::new(
                "yac_votes_rejected_invalid_total",
                "Total vote deliveries refused as invalid"
            ),
            registry
        )?;
        let rounds_committed = register_int_counter_with_registry!(
            Opts::new("yac_rounds_committed_total", "Rounds decided with a commit"),
            registry
        )?;
        let rounds_rejected = register_int_counter_with_registry!(
            Opts::new("yac_rounds_rejected_total", "Rounds decided with a reject"),
            registry
        )?;
        let equivocations_recorded = register_int_gauge_with_registry!(
            Opts::new(
                "yac_equivocations_recorded",
                "Equivocating votes detected since start"
            ),
            registry
        )?;
        let answer_votes = register_histogram_with_registry!(
            HistogramOpts::new("yac_answer_votes", "Votes carried by a decided answer")
                .buckets(prometheus::exponential_buckets(1.0, 2.0, 10)?),
            registry
        )?;

        let proposals_received = register_int_counter_with_registry!(
            Opts::new("yac_proposals_received_total", "Total proposals received"),
            registry
        )?;
        let proposals_emitted = register_int_counter_with_registry!(
            Opts::new(
                "yac_proposals_emitted_total",
                "Proposals released to voting"
            ),
            registry
        )?;
        let commit_events = register_int_counter_with_registry!(
            Opts::new("yac_commit_events_total", "Total commit events received"),
            registry
        )?;
        let pending_proposals = register_int_gauge_with_registry!(
            Opts::new("yac_pending_proposals", "Proposals waiting for release"),
            registry
        )?;
        let last_committed_height = register_int_gauge_with_registry!(
            Opts::new("yac_last_committed_height", "Height of the last committed block"),
            registry
        )?;

        Ok(Self {
            registry,
            votes_received,
            votes_rejected_invalid,
            rounds_committed,
            rounds_rejected,
            equivocations_recorded,
            answer_votes,
            proposals_received,
            proposals_emitted,
            commit_events,
            pending_proposals,
            last_committed_height,
        })
    }

    /// Encode every metric in the Prometheus text exposition format.
    pub fn encode_text(&self) -> Result<String, NodeError> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| NodeError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_every_metric() {
        let metrics = CoreMetrics::new().unwrap();
        metrics.votes_received.inc();
        metrics.answer_votes.observe(3.0);
        let names: Vec<String> = metrics
            .registry
            .gather()
            .iter()
            .map(|f| f.get_name().to_string())
            .collect();
        for expected in [
            "yac_votes_received_total",
            "yac_rounds_committed_total",
            "yac_pending_proposals",
            "yac_last_committed_height",
            "yac_answer_votes",
        ] {
            assert!(names.iter().any(|n| n == expected), "missing {expected}");
        }
    }

    #[test]
    fn text_encoding_contains_values() {
        let metrics = CoreMetrics::new().unwrap();
        metrics.last_committed_height.set(17);
        let text = metrics.encode_text().unwrap();
        assert!(text.contains("yac_last_committed_height 17"));
    }

    #[test]
    fn separate_instances_do_not_collide() {
        let a = CoreMetrics::new().unwrap();
        let b = CoreMetrics::new().unwrap();
        a.commit_events.inc();
        assert_eq!(a.commit_events.get(), 1);
        assert_eq!(b.commit_events.get(), 0);
    }
}
