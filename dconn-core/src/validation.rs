//! Wire-payload validation and decoding for the remote row/column protocol
//!
//! Pure functions with no I/O: the transport hands over a complete response
//! body and these routines either reject it with a [`ProtocolError`] or
//! copy the decoded values into the caller's buffer.

use crate::byte_order::Endianness;
use crate::error::ProtocolError;

/// Validate the framing of a wire payload and return the declared count.
///
/// Checks, in order: the body holds at least the 4-byte count header, the
/// body length is a multiple of 4, and `4 + 4 * declared == body length`.
pub fn validate_wire_payload(body: &[u8], host: Endianness) -> Result<u32, ProtocolError> {
    let len = body.len();
    if len < 4 {
        return Err(ProtocolError::TruncatedBody { len });
    }
    if len % 4 != 0 {
        return Err(ProtocolError::UnalignedBody { len });
    }
    let mut declared: u32 = bytemuck::pod_read_unaligned(&body[0..4]);
    if host.is_big() {
        declared = declared.swap_bytes();
    }
    if 4 + 4 * (declared as usize) != len {
        return Err(ProtocolError::CountMismatch { declared, len });
    }
    Ok(declared)
}

/// Decode a validated wire payload into the caller's buffer.
///
/// `buffer.len()` is the element count the caller expects; a declared
/// count that differs is a protocol violation. Values are interpreted in
/// the host's native byte order and swapped in place when the host is
/// big-endian, matching the protocol's assumed (never negotiated)
/// convention.
pub fn decode_wire_values(
    body: &[u8],
    host: Endianness,
    buffer: &mut [f32],
) -> Result<(), ProtocolError> {
    let declared = validate_wire_payload(body, host)? as usize;
    if declared != buffer.len() {
        return Err(ProtocolError::UnexpectedCount {
            expected: buffer.len(),
            actual: declared,
        });
    }
    for (value, chunk) in buffer.iter_mut().zip(body[4..].chunks_exact(4)) {
        let mut bits: u32 = bytemuck::pod_read_unaligned(chunk);
        if host.is_big() {
            bits = bits.swap_bytes();
        }
        *value = f32::from_bits(bits);
    }
    Ok(())
}

/// Encode values into a wire payload as a host with the given byte order
/// would produce it. Exists for tests and loopback fixtures.
pub fn encode_wire_values(values: &[f32], host: Endianness) -> Vec<u8> {
    let mut body = Vec::with_capacity(4 + 4 * values.len());
    let mut count = values.len() as u32;
    if host.is_big() {
        count = count.swap_bytes();
    }
    body.extend_from_slice(&count.to_ne_bytes());
    for value in values {
        let mut bits = value.to_bits();
        if host.is_big() {
            bits = bits.swap_bytes();
        }
        body.extend_from_slice(&bits.to_ne_bytes());
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_truncated_body() {
        assert_eq!(
            validate_wire_payload(&[0u8; 3], Endianness::Little),
            Err(ProtocolError::TruncatedBody { len: 3 })
        );
    }

    #[test]
    fn rejects_unaligned_body() {
        // 10 bytes is not congruent to 0 mod 4
        assert_eq!(
            validate_wire_payload(&[0u8; 10], Endianness::Little),
            Err(ProtocolError::UnalignedBody { len: 10 })
        );
    }

    #[test]
    fn declared_count_must_fit_body() {
        // declared 3 elements, body 16 bytes: consistent
        let good = encode_wire_values(&[1.0, 2.0, 3.0], Endianness::Little);
        assert_eq!(good.len(), 16);
        assert_eq!(validate_wire_payload(&good, Endianness::Little), Ok(3));

        // 15 bytes cannot frame 3 elements
        assert_eq!(
            validate_wire_payload(&good[0..15], Endianness::Little),
            Err(ProtocolError::UnalignedBody { len: 15 })
        );

        // aligned but wrong declared count
        let mut bad = good.clone();
        bad.extend_from_slice(&[0u8; 4]);
        assert_eq!(
            validate_wire_payload(&bad, Endianness::Little),
            Err(ProtocolError::CountMismatch { declared: 3, len: 20 })
        );
    }

    #[test]
    fn decode_rejects_unexpected_count() {
        let body = encode_wire_values(&[1.0, 2.0, 3.0], Endianness::Little);
        let mut buffer = [0.0f32; 4];
        assert_eq!(
            decode_wire_values(&body, Endianness::Little, &mut buffer),
            Err(ProtocolError::UnexpectedCount {
                expected: 4,
                actual: 3
            })
        );
    }

    #[test]
    fn decode_round_trips_on_both_endiannesses() {
        let values = [0.25f32, -8.5, 1.0e-7, 123456.0];
        for host in [Endianness::Little, Endianness::Big] {
            let body = encode_wire_values(&values, host);
            let mut buffer = [0.0f32; 4];
            decode_wire_values(&body, host, &mut buffer).unwrap();
            assert_eq!(buffer, values);
        }
    }

    #[test]
    fn swapped_payload_decodes_through_big_endian_path() {
        // swap(swap(x)) == x: a little-endian body swapped once decodes
        // identically through the big-endian branch
        let values = [3.0f32, -1.5];
        let mut body = encode_wire_values(&values, Endianness::Little);
        crate::byte_order::swap_words_in_place(&mut body);
        let mut buffer = [0.0f32; 2];
        decode_wire_values(&body, Endianness::Big, &mut buffer).unwrap();
        assert_eq!(buffer, values);
    }
}
