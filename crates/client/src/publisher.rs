//! Publish loop
//!
//! Reads one aggregate sample per interval, encodes it and publishes it on
//! the configured topic. Failures are logged and counted; nothing is retried.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use roadpulse_protocol::encode_sample;
use roadpulse_sources::MultiStreamReader;

use crate::channel::Channel;

/// Publisher settings
#[derive(Debug, Clone)]
pub struct PublisherConfig {
    /// Topic every sample is published on
    pub topic: String,
    /// Delay between samples
    pub interval: Duration,
    /// Stop after this many ticks (`None` runs until cancelled)
    pub max_samples: Option<u64>,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            topic: "agent_data/1".into(),
            interval: Duration::from_millis(500),
            max_samples: None,
        }
    }
}

/// Counters reported when the loop exits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishStats {
    /// Samples acknowledged by the listener
    pub published: u64,
    /// Publishes that errored or were not acknowledged as accepted
    pub publish_failures: u64,
    /// Ticks where no sample could be read or encoded
    pub read_failures: u64,
}

impl PublishStats {
    /// Ticks processed so far
    #[inline]
    pub fn ticks(&self) -> u64 {
        self.published + self.publish_failures + self.read_failures
    }
}

/// Timer-driven publisher
#[derive(Debug, Clone)]
pub struct Publisher {
    config: PublisherConfig,
}

impl Publisher {
    pub fn new(config: PublisherConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PublisherConfig {
        &self.config
    }

    /// Run until cancelled or until `max_samples` ticks have passed
    ///
    /// On exit the channel is closed and the reader is stopped.
    pub async fn run<C: Channel + ?Sized>(
        &self,
        channel: &mut C,
        reader: &mut MultiStreamReader,
        cancel: CancellationToken,
    ) -> PublishStats {
        let mut stats = PublishStats::default();

        info!(
            topic = %self.config.topic,
            interval_ms = self.config.interval.as_millis() as u64,
            max_samples = ?self.config.max_samples,
            "publisher started"
        );

        loop {
            if let Some(max) = self.config.max_samples
                && stats.ticks() >= max
            {
                break;
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.config.interval) => {}
            }

            self.tick(channel, reader, &mut stats).await;

            if cancel.is_cancelled() {
                break;
            }
        }

        if let Err(e) = channel.close().await {
            warn!(error = %e, "failed to close channel");
        }
        reader.stop();

        info!(
            published = stats.published,
            publish_failures = stats.publish_failures,
            read_failures = stats.read_failures,
            "publisher stopped"
        );

        stats
    }

    async fn tick<C: Channel + ?Sized>(
        &self,
        channel: &mut C,
        reader: &mut MultiStreamReader,
        stats: &mut PublishStats,
    ) {
        let sample = match reader.next() {
            Ok(sample) => sample,
            Err(e) => {
                warn!(error = %e, "failed to read sample");
                stats.read_failures += 1;
                return;
            }
        };

        let payload = match encode_sample(&sample) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "failed to encode sample");
                stats.read_failures += 1;
                return;
            }
        };

        match channel.publish(&self.config.topic, payload).await {
            Ok(()) => {
                stats.published += 1;
                debug!(topic = %self.config.topic, count = stats.published, "sample published");
            }
            Err(e) => {
                stats.publish_failures += 1;
                warn!(topic = %self.config.topic, error = %e, "failed to publish sample");
            }
        }
    }
}
