/*
 * SPDX-FileCopyrightText: 2025 Sven Shi
 * SPDX-License-Identifier: GPL-3.0-or-later
 */

//! Wire format for persisted cache records.
//!
//! A record is two big-endian unsigned 64-bit UNIX-second timestamps
//! (stored-time, expiration-time) followed by the DNS message in its
//! on-wire encoding.

use crate::core::error::{Error, Result};
use crate::pkg::pool::{self, PooledBuf};
use hickory_proto::op::Message;
use hickory_proto::serialize::binary::{BinDecodable, BinEncodable};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub const HEADER_LEN: usize = 16;

/// Packs a record into a pooled buffer. The buffer goes back to the pool
/// when the caller drops it, after the store completed or failed.
pub fn pack(stored_at: SystemTime, expires_at: SystemTime, msg: &Message) -> Result<PooledBuf> {
    let wire = msg.to_bytes()?;
    let mut buf = pool::acquire(HEADER_LEN + wire.len());
    buf.extend_from_slice(&unix_secs(stored_at).to_be_bytes());
    buf.extend_from_slice(&unix_secs(expires_at).to_be_bytes());
    buf.extend_from_slice(&wire);
    Ok(buf)
}

/// Unpacks a record. Fails with [`Error::CorruptRecord`] when the input is
/// shorter than the timestamp header or the payload does not decode.
pub fn unpack(data: &[u8]) -> Result<(SystemTime, SystemTime, Message)> {
    if data.len() < HEADER_LEN {
        return Err(Error::CorruptRecord(format!(
            "record too short: {} bytes",
            data.len()
        )));
    }
    let stored_at = secs_to_time(read_be_u64(&data[..8]));
    let expires_at = secs_to_time(read_be_u64(&data[8..HEADER_LEN]));
    let msg = Message::from_bytes(&data[HEADER_LEN..])
        .map_err(|e| Error::CorruptRecord(format!("undecodable payload: {e}")))?;
    Ok((stored_at, expires_at, msg))
}

fn read_be_u64(data: &[u8]) -> u64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(data);
    u64::from_be_bytes(raw)
}

fn unix_secs(t: SystemTime) -> u64 {
    // Pre-epoch times collapse to 0; whole-second truncation otherwise.
    t.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn secs_to_time(secs: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hickory_proto::op::{Message, Query};
    use hickory_proto::rr::rdata::A;
    use hickory_proto::rr::{Name, RData, Record, RecordType};
    use std::net::Ipv4Addr;
    use std::str::FromStr;

    fn sample_response() -> Message {
        let name = Name::from_str("example.com.").unwrap();
        let mut msg = Message::new();
        msg.set_id(0xBEEF);
        msg.add_query(Query::query(name.clone(), RecordType::A));
        msg.add_answer(Record::from_rdata(
            name,
            60,
            RData::A(A(Ipv4Addr::new(93, 184, 216, 34))),
        ));
        msg
    }

    #[test]
    fn round_trip() {
        let msg = sample_response();
        let stored_at = UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let expires_at = UNIX_EPOCH + Duration::from_secs(1_700_000_060);

        let packed = pack(stored_at, expires_at, &msg).unwrap();
        assert_eq!(packed.len(), HEADER_LEN + msg.to_bytes().unwrap().len());

        let (got_stored, got_expires, got_msg) = unpack(&packed).unwrap();
        assert_eq!(got_stored, stored_at);
        assert_eq!(got_expires, expires_at);
        assert_eq!(got_msg.to_bytes().unwrap(), msg.to_bytes().unwrap());
    }

    #[test]
    fn timestamps_truncate_to_whole_seconds() {
        let msg = sample_response();
        let stored_at = UNIX_EPOCH + Duration::new(1_700_000_000, 900_000_000);
        let expires_at = UNIX_EPOCH + Duration::new(1_700_000_060, 123_456_789);

        let packed = pack(stored_at, expires_at, &msg).unwrap();
        let (got_stored, got_expires, _) = unpack(&packed).unwrap();
        assert_eq!(got_stored, UNIX_EPOCH + Duration::from_secs(1_700_000_000));
        assert_eq!(got_expires, UNIX_EPOCH + Duration::from_secs(1_700_000_060));
    }

    #[test]
    fn too_short_input_is_corrupt() {
        let err = unpack(&[0u8; HEADER_LEN - 1]).unwrap_err();
        assert!(matches!(err, Error::CorruptRecord(msg) if msg.contains("too short")));
        assert!(matches!(unpack(b"x").unwrap_err(), Error::CorruptRecord(_)));
    }

    #[test]
    fn undecodable_payload_is_corrupt() {
        // Valid header, empty payload: no DNS header to decode.
        let err = unpack(&[0u8; HEADER_LEN]).unwrap_err();
        assert!(matches!(err, Error::CorruptRecord(_)));
    }
}
