//! Tests for channel frames

use bytes::Bytes;

use crate::error::ProtocolError;
use crate::frame::{AckStatus, ChannelFrame, MAX_FRAME_SIZE, read_length_prefix};

#[test]
fn test_publish_frame_layout() {
    let frame = ChannelFrame::Publish {
        topic: "agent_data/7".into(),
        payload: Bytes::from_static(b"{}"),
    };
    let encoded = frame.encode();

    // 4 prefix + 1 type + 4 + 12 topic + 4 + 2 payload
    assert_eq!(encoded.len(), 27);
    assert_eq!(read_length_prefix(&encoded).unwrap(), 23);
    assert_eq!(encoded[4], 0x01);

    let decoded = ChannelFrame::decode(encoded.slice(4..)).unwrap();
    assert_eq!(decoded, frame);
}

#[test]
fn test_ack_frame_statuses() {
    for status in [
        AckStatus::Accepted,
        AckStatus::Rejected,
        AckStatus::StoreFailed,
        AckStatus::ProtocolError,
    ] {
        let encoded = ChannelFrame::Ack(status).encode();
        assert_eq!(encoded.len(), 6);
        let decoded = ChannelFrame::decode(encoded.slice(4..)).unwrap();
        assert_eq!(decoded, ChannelFrame::Ack(status));
    }
}

#[test]
fn test_ack_status_success() {
    assert!(AckStatus::Accepted.is_success());
    assert!(!AckStatus::Rejected.is_success());
    assert!(!AckStatus::StoreFailed.is_success());
    assert!(AckStatus::from_u8(9).is_err());
}

#[test]
fn test_decode_empty_frame() {
    let result = ChannelFrame::decode(Bytes::new());
    assert!(matches!(result, Err(ProtocolError::FrameTooShort { .. })));
}

#[test]
fn test_decode_unknown_type() {
    let result = ChannelFrame::decode(Bytes::from_static(&[0x7f]));
    assert!(matches!(result, Err(ProtocolError::UnknownFrameType(0x7f))));
}

#[test]
fn test_decode_truncated_publish() {
    // Topic claims 10 bytes but only 3 follow
    let body = Bytes::from_static(&[0x01, 0, 0, 0, 10, b'a', b'b', b'c']);
    let result = ChannelFrame::decode(body);
    assert!(matches!(result, Err(ProtocolError::FrameTooShort { .. })));
}

#[test]
fn test_length_prefix_bounds() {
    assert!(read_length_prefix(&[0, 0]).is_err());
    assert!(read_length_prefix(&[0, 0, 0, 0]).is_err());
    assert!(matches!(
        read_length_prefix(&(MAX_FRAME_SIZE + 1).to_be_bytes()),
        Err(ProtocolError::FrameTooLarge { .. })
    ));
    assert_eq!(read_length_prefix(&[0, 0, 1, 0]).unwrap(), 256);
}
