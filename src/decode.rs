//! Decode-into-shape capability used for frames and error payloads.

use crate::error::Error;
use serde::de::DeserializeOwned;

/// Decodes raw payload bytes into a caller-chosen shape.
pub trait Decoder {
    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, Error>;
}

/// serde_json decoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDecoder;

impl Decoder for JsonDecoder {
    #[inline]
    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, Error> {
        serde_json::from_slice(bytes).map_err(|e| Error::parse(e.to_string()))
    }
}

/// simd-json decoder. Copies the payload since simd-json parses in place.
#[cfg(feature = "simd-json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct SimdJsonDecoder;

#[cfg(feature = "simd-json")]
impl Decoder for SimdJsonDecoder {
    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, Error> {
        let mut scratch = bytes.to_vec();
        simd_json::serde::from_slice(&mut scratch).map_err(|e| Error::parse(e.to_string()))
    }
}
