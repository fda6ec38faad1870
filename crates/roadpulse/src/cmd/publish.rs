//! Publish command - replay recorded feeds
//!
//! Loads every configured feed, connects to the channel listener and
//! publishes one aggregate sample per interval until Ctrl+C or `--count`.

use anyhow::{Context, Result};
use clap::Args;
use tokio_util::sync::CancellationToken;
use tracing::info;

use roadpulse_client::{Publisher, PublisherConfig as ReplayConfig, TcpChannel};
use roadpulse_config::{ColumnType, Config, SourceEntry};
use roadpulse_sources::{FieldType, MultiStreamReader, RowSchema, SourceSpec};

use crate::cmd::serve::wait_for_shutdown;

/// Publish command arguments
#[derive(Args, Debug)]
pub struct PublishArgs {
    /// Stop after this many samples
    #[arg(short = 'n', long)]
    pub count: Option<u64>,

    /// Override `publisher.topic`
    #[arg(short, long)]
    pub topic: Option<String>,
}

/// Run the publish command
pub async fn run(args: PublishArgs, config: Config) -> Result<()> {
    let mut publisher_config = config.publisher;
    if let Some(topic) = args.topic {
        publisher_config.topic = topic;
    }

    let mut reader = MultiStreamReader::open(source_specs(&publisher_config.sources))
        .context("failed to load recorded feeds")?;
    for report in reader.load_reports() {
        info!(
            source = %report.source_id,
            rows = report.rows_loaded,
            skipped = report.rows_skipped,
            "feed loaded"
        );
    }

    let mut channel = TcpChannel::connect(
        publisher_config.channel_address.clone(),
        publisher_config.ack_timeout,
    )
    .await
    .with_context(|| {
        format!(
            "failed to connect to channel listener at {}",
            publisher_config.channel_address
        )
    })?;

    let publisher = Publisher::new(ReplayConfig {
        topic: publisher_config.topic,
        interval: publisher_config.interval,
        max_samples: args.count,
    });
    info!(
        addr = channel.addr(),
        topic = %publisher.config().topic,
        interval = ?publisher.config().interval,
        max_samples = ?publisher.config().max_samples,
        "publishing"
    );

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        wait_for_shutdown().await;
        info!("shutdown signal received, stopping publisher...");
        signal_cancel.cancel();
    });

    let stats = publisher.run(&mut channel, &mut reader, cancel).await;
    info!(
        published = stats.published,
        publish_failures = stats.publish_failures,
        read_failures = stats.read_failures,
        "publisher finished"
    );
    Ok(())
}

/// Turn configured feeds into reader declarations
fn source_specs(entries: &[SourceEntry]) -> Vec<SourceSpec> {
    entries
        .iter()
        .map(|entry| {
            let fields = entry
                .schema
                .iter()
                .map(|column| match column {
                    ColumnType::Int => FieldType::Int,
                    ColumnType::Float => FieldType::Float,
                })
                .collect();
            SourceSpec::new(entry.id.as_str(), &entry.path, RowSchema::new(fields))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use roadpulse_config::PublisherConfig;
    use std::io::Write;

    #[test]
    fn test_source_specs_from_config() {
        let specs = source_specs(&PublisherConfig::default().sources);

        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].id.as_str(), "accel");
        assert_eq!(specs[0].schema, RowSchema::uniform(FieldType::Int, 3));
        assert_eq!(specs[1].id.as_str(), "gps");
        assert_eq!(specs[1].schema, RowSchema::uniform(FieldType::Float, 2));
    }

    #[test]
    fn test_configured_feeds_open() {
        let dir = tempfile::tempdir().unwrap();
        let accel = dir.path().join("accelerometer.csv");
        let gps = dir.path().join("gps.csv");
        writeln!(std::fs::File::create(&accel).unwrap(), "X,Y,Z\n1,2,3\n4,5,6").unwrap();
        writeln!(std::fs::File::create(&gps).unwrap(), "longitude,latitude\n30.5,50.4").unwrap();

        let entries = vec![
            SourceEntry::new("accel", &accel, vec![ColumnType::Int; 3]),
            SourceEntry::new("gps", &gps, vec![ColumnType::Float; 2]),
        ];
        let mut reader = MultiStreamReader::open(source_specs(&entries)).unwrap();

        assert_eq!(reader.len("accel"), Some(2));
        let sample = reader.next().unwrap();
        assert_eq!(sample.accelerometer().z, 3.0);
        assert_eq!(sample.gps().latitude, 50.4);
    }
}
