//! JSON encoding for samples and records
//!
//! The encoder is transport-neutral: it produces `Bytes` that the publisher
//! hands to the message channel and that the distributor pushes to observers.

use bytes::Bytes;

use crate::Result;
use crate::record::PersistedRecord;
use crate::sample::AggregateSample;

/// Encode a sample to its wire form
pub fn encode_sample(sample: &AggregateSample) -> Result<Bytes> {
    Ok(Bytes::from(serde_json::to_vec(sample)?))
}

/// Decode a sample from its wire form
pub fn decode_sample(data: &[u8]) -> Result<AggregateSample> {
    Ok(serde_json::from_slice(data)?)
}

/// Encode the observer view of a persisted record
pub fn encode_record(record: &PersistedRecord) -> Result<Bytes> {
    Ok(Bytes::from(serde_json::to_vec(record)?))
}
