//! Fixed-point IMU packet decoder.
//!
//! Payload layout (little-endian):
//! ```text
//! ┌────────┬────────┬────────┬────────┬────────┬────────┬────────┬───────────┐
//! │ rot x  │ rot y  │ rot z  │ rot w  │ grav x │ grav y │ grav z │ reserved  │
//! │ i16    │ i16    │ i16    │ i16    │ i16    │ i16    │ i16    │ 6+ bytes  │
//! └────────┴────────┴────────┴────────┴────────┴────────┴────────┴───────────┘
//! ```
//! The trailing reserved bytes are required to be present but are not parsed.

use tracing::trace;

use crate::error::{DecodeError, Result};
use crate::event::{Gravity, Rotation};

/// Minimum IMU payload length, reserved bytes included.
pub const MIN_IMU_PAYLOAD: usize = 20;

/// Bytes holding the seven i16 fields.
pub const IMU_FIELDS_LEN: usize = 14;

const FIELD_COUNT: usize = 7;
const ROTATION_DIVISOR: f64 = 180.0;
const ROTATION_SCALE: f64 = 0.01;
const GRAVITY_DIVISOR: f64 = 256.0;

/// Decode an IMU payload into rotation and gravity.
///
/// Pure: the same bytes always produce the same values.
pub fn decode_imu_packet(payload: &[u8]) -> Result<(Rotation, Gravity)> {
    if payload.len() < MIN_IMU_PAYLOAD {
        return Err(DecodeError::TooShort {
            len: payload.len(),
            min: MIN_IMU_PAYLOAD,
        });
    }

    let [rx, ry, rz, rw, gx, gy, gz] = unpack_fields(payload)?;
    trace!(rx, ry, rz, rw, gx, gy, gz, "imu fields");

    let rotation = Rotation {
        x: f64::from(rx) / ROTATION_DIVISOR * ROTATION_SCALE,
        y: f64::from(ry) / ROTATION_DIVISOR * ROTATION_SCALE,
        z: f64::from(rz) / ROTATION_DIVISOR * ROTATION_SCALE * -1.0,
        w: f64::from(rw) / ROTATION_DIVISOR * ROTATION_SCALE * -1.0,
    };
    let gravity = Gravity {
        x: f64::from(gx) / GRAVITY_DIVISOR,
        y: f64::from(gy) / GRAVITY_DIVISOR,
        z: f64::from(gz) / GRAVITY_DIVISOR,
    };

    Ok((rotation, gravity))
}

fn unpack_fields(payload: &[u8]) -> Result<[i16; FIELD_COUNT]> {
    let fields = payload.get(..IMU_FIELDS_LEN).ok_or_else(|| {
        DecodeError::MalformedBinary(format!(
            "need {IMU_FIELDS_LEN} bytes for {FIELD_COUNT} fields, got {}",
            payload.len()
        ))
    })?;

    let mut out = [0i16; FIELD_COUNT];
    for (slot, pair) in out.iter_mut().zip(fields.chunks_exact(2)) {
        let bytes: [u8; 2] = pair
            .try_into()
            .map_err(|_| DecodeError::MalformedBinary("odd field width".to_string()))?;
        *slot = i16::from_le_bytes(bytes);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn packet(fields: [i16; 7]) -> Vec<u8> {
        let mut bytes: Vec<u8> = fields.iter().flat_map(|v| v.to_le_bytes()).collect();
        bytes.extend_from_slice(b"000000");
        bytes
    }

    #[test]
    fn zero_packet_decodes_to_zero() {
        let (rotation, gravity) = decode_imu_packet(&packet([0; 7])).unwrap();
        assert_eq!(rotation.x, 0.0);
        assert_eq!(rotation.y, 0.0);
        assert_eq!(rotation.z.abs(), 0.0);
        assert_eq!(rotation.w.abs(), 0.0);
        assert_eq!(gravity, Gravity { x: 0.0, y: 0.0, z: 0.0 });
    }

    #[test]
    fn rotation_scale() {
        let (rotation, _) = decode_imu_packet(&packet([180, 0, 0, 0, 0, 0, 0])).unwrap();
        assert_eq!(rotation.x, 0.01);
    }

    #[test]
    fn gravity_scale() {
        let (_, gravity) = decode_imu_packet(&packet([0, 0, 0, 0, 256, -512, 128])).unwrap();
        assert_eq!(gravity.x, 1.0);
        assert_eq!(gravity.y, -2.0);
        assert_eq!(gravity.z, 0.5);
    }

    #[test]
    fn z_and_w_are_negated() {
        let (rotation, _) = decode_imu_packet(&packet([0, 0, 180, -180, 0, 0, 0])).unwrap();
        assert_eq!(rotation.z, -0.01);
        assert_eq!(rotation.w, 0.01);
    }

    #[test]
    fn matches_formulas_for_arbitrary_fields() {
        let fields = [1234, -4321, 17, -32768, 32767, -1, 999];
        let (rotation, gravity) = decode_imu_packet(&packet(fields)).unwrap();

        assert_eq!(rotation.x, 1234.0 / 180.0 * 0.01);
        assert_eq!(rotation.y, -4321.0 / 180.0 * 0.01);
        assert_eq!(rotation.z, 17.0 / 180.0 * 0.01 * -1.0);
        assert_eq!(rotation.w, -32768.0 / 180.0 * 0.01 * -1.0);
        assert_eq!(gravity.x, 32767.0 / 256.0);
        assert_eq!(gravity.y, -1.0 / 256.0);
        assert_eq!(gravity.z, 999.0 / 256.0);
    }

    #[test]
    fn decoding_is_deterministic() {
        let bytes = packet([5, 6, 7, 8, 9, 10, 11]);
        assert_eq!(
            decode_imu_packet(&bytes).unwrap(),
            decode_imu_packet(&bytes).unwrap()
        );
    }

    #[test]
    fn reserved_bytes_are_ignored() {
        let mut a = packet([1, 2, 3, 4, 5, 6, 7]);
        let mut b = a.clone();
        a[14..].copy_from_slice(&[0xFF; 6]);
        b.extend_from_slice(b"extra");
        assert_eq!(decode_imu_packet(&a).unwrap(), decode_imu_packet(&b).unwrap());
    }

    #[test]
    fn short_payload_is_rejected() {
        for len in [0, 1, 14, 19] {
            let err = decode_imu_packet(&vec![0u8; len]).unwrap_err();
            assert_eq!(err, DecodeError::TooShort { len, min: 20 });
        }
    }

    #[test]
    fn exactly_minimum_length_decodes() {
        assert!(decode_imu_packet(&[0u8; MIN_IMU_PAYLOAD]).is_ok());
    }
}
