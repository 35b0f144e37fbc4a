//! Typed serialization contract for record keys and values.
//!
//! Every key and value crosses the wire as raw bytes; a [`Serde`] pairs the
//! serializer and deserializer for one Rust type. Producers and consumers
//! are parameterized by a [`SerdePair`] at construction, so one streaming
//! engine serves arbitrary wire-safe payload types.
//!
//! ## Built-in codecs
//!
//! | codec         | type     | encoding                          |
//! |---------------|----------|-----------------------------------|
//! | [`I32Serde`]  | `i32`    | 4-byte big-endian                 |
//! | [`I64Serde`]  | `i64`    | 8-byte big-endian                 |
//! | [`F32Serde`]  | `f32`    | 4-byte big-endian IEEE-754        |
//! | [`F64Serde`]  | `f64`    | 8-byte big-endian IEEE-754        |
//! | [`StringSerde`] | `String` | UTF-8, length-implicit          |
//! | [`BytesSerde`]  | `Bytes`  | raw passthrough                 |
//! | [`UnitSerde`]   | `()`     | zero bytes (keyless streams)    |
//!
//! Fixed-width decoders validate the input length before touching a single
//! byte; a mismatch is a [`SerializationError`], never a truncation or a
//! zero-pad. All codecs are stateless and freely shared across concurrent
//! producers and consumers.

use std::sync::Arc;

use bytes::Bytes;
use thiserror::Error;

/// Raised when a payload cannot be decoded as the requested type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerializationError {
    /// The input length does not match the codec's fixed width.
    #[error("payload length mismatch: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// The input is not valid UTF-8.
    #[error("payload is not valid UTF-8")]
    InvalidUtf8,
}

/// Encodes a `T` into wire bytes. Infallible: every value of a supported
/// type has an encoding.
pub trait Serializer<T>: Send + Sync {
    fn serialize(&self, value: &T) -> Vec<u8>;
}

/// Decodes wire bytes back into a `T`.
pub trait Deserializer<T>: Send + Sync {
    fn deserialize(&self, data: &[u8]) -> Result<T, SerializationError>;
}

/// A paired serializer/deserializer for one type.
///
/// Blanket-implemented for anything that provides both halves.
pub trait Serde<T>: Serializer<T> + Deserializer<T> {}

impl<T, S> Serde<T> for S where S: Serializer<T> + Deserializer<T> {}

/// The key/value serde pair a producer or consumer is constructed with.
pub struct SerdePair<K, V> {
    pub(crate) key: Arc<dyn Serde<K>>,
    pub(crate) value: Arc<dyn Serde<V>>,
}

impl<K, V> SerdePair<K, V> {
    pub fn new<KS, VS>(key: KS, value: VS) -> Self
    where
        KS: Serde<K> + 'static,
        VS: Serde<V> + 'static,
    {
        Self {
            key: Arc::new(key),
            value: Arc::new(value),
        }
    }
}

impl<K, V> Clone for SerdePair<K, V> {
    fn clone(&self) -> Self {
        Self {
            key: Arc::clone(&self.key),
            value: Arc::clone(&self.value),
        }
    }
}

impl<V> SerdePair<(), V> {
    /// Pair for keyless streams: unit keys, caller-chosen values.
    pub fn keyless<VS>(value: VS) -> Self
    where
        VS: Serde<V> + 'static,
    {
        Self::new(UnitSerde, value)
    }
}

/// Big-endian `i32` codec, exactly 4 bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct I32Serde;

impl Serializer<i32> for I32Serde {
    fn serialize(&self, value: &i32) -> Vec<u8> {
        value.to_be_bytes().to_vec()
    }
}

impl Deserializer<i32> for I32Serde {
    fn deserialize(&self, data: &[u8]) -> Result<i32, SerializationError> {
        let bytes: [u8; 4] = data
            .try_into()
            .map_err(|_| SerializationError::InvalidLength {
                expected: 4,
                actual: data.len(),
            })?;
        Ok(i32::from_be_bytes(bytes))
    }
}

/// Big-endian `i64` codec, exactly 8 bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct I64Serde;

impl Serializer<i64> for I64Serde {
    fn serialize(&self, value: &i64) -> Vec<u8> {
        value.to_be_bytes().to_vec()
    }
}

impl Deserializer<i64> for I64Serde {
    fn deserialize(&self, data: &[u8]) -> Result<i64, SerializationError> {
        let bytes: [u8; 8] = data
            .try_into()
            .map_err(|_| SerializationError::InvalidLength {
                expected: 8,
                actual: data.len(),
            })?;
        Ok(i64::from_be_bytes(bytes))
    }
}

/// Big-endian IEEE-754 `f32` codec, exactly 4 bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct F32Serde;

impl Serializer<f32> for F32Serde {
    fn serialize(&self, value: &f32) -> Vec<u8> {
        value.to_be_bytes().to_vec()
    }
}

impl Deserializer<f32> for F32Serde {
    fn deserialize(&self, data: &[u8]) -> Result<f32, SerializationError> {
        let bytes: [u8; 4] = data
            .try_into()
            .map_err(|_| SerializationError::InvalidLength {
                expected: 4,
                actual: data.len(),
            })?;
        Ok(f32::from_be_bytes(bytes))
    }
}

/// Big-endian IEEE-754 `f64` codec, exactly 8 bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct F64Serde;

impl Serializer<f64> for F64Serde {
    fn serialize(&self, value: &f64) -> Vec<u8> {
        value.to_be_bytes().to_vec()
    }
}

impl Deserializer<f64> for F64Serde {
    fn deserialize(&self, data: &[u8]) -> Result<f64, SerializationError> {
        let bytes: [u8; 8] = data
            .try_into()
            .map_err(|_| SerializationError::InvalidLength {
                expected: 8,
                actual: data.len(),
            })?;
        Ok(f64::from_be_bytes(bytes))
    }
}

/// UTF-8 string codec; consumes the whole buffer.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringSerde;

impl Serializer<String> for StringSerde {
    fn serialize(&self, value: &String) -> Vec<u8> {
        value.as_bytes().to_vec()
    }
}

impl Deserializer<String> for StringSerde {
    fn deserialize(&self, data: &[u8]) -> Result<String, SerializationError> {
        std::str::from_utf8(data)
            .map(str::to_owned)
            .map_err(|_| SerializationError::InvalidUtf8)
    }
}

/// Raw-bytes codec; consumes the whole buffer.
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesSerde;

impl Serializer<Bytes> for BytesSerde {
    fn serialize(&self, value: &Bytes) -> Vec<u8> {
        value.to_vec()
    }
}

impl Deserializer<Bytes> for BytesSerde {
    fn deserialize(&self, data: &[u8]) -> Result<Bytes, SerializationError> {
        Ok(Bytes::copy_from_slice(data))
    }
}

/// Zero-byte codec for keyless streams.
///
/// Encodes `()` to an empty buffer; decoding requires an empty buffer back.
/// A non-empty payload means the stream is keyed and the caller picked the
/// wrong serde.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnitSerde;

impl Serializer<()> for UnitSerde {
    fn serialize(&self, _value: &()) -> Vec<u8> {
        Vec::new()
    }
}

impl Deserializer<()> for UnitSerde {
    fn deserialize(&self, data: &[u8]) -> Result<(), SerializationError> {
        if !data.is_empty() {
            return Err(SerializationError::InvalidLength {
                expected: 0,
                actual: data.len(),
            });
        }
        Ok(())
    }
}
