use core::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::{ArbiterId, Decimal, DecodeError, IdCodec};

/// Serialized as a quoted decimal string, so JavaScript clients (53-bit
/// numbers) read it without loss.
impl Serialize for ArbiterId {
    fn serialize<S>(&self, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.collect_str(self)
    }
}

/// Accepts a decimal string or a bare non-negative integer.
impl<'de> Deserialize<'de> for ArbiterId {
    fn deserialize<D>(d: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        d.deserialize_any(DecimalVisitor)
    }
}

struct DecimalVisitor;

impl de::Visitor<'_> for DecimalVisitor {
    type Value = ArbiterId;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a non-negative 63-bit integer or a decimal string")
    }

    #[inline]
    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Decimal::decode(v).map_err(E::custom)
    }

    #[inline]
    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        ArbiterId::try_from(v).map_err(E::custom)
    }

    #[inline]
    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        ArbiterId::try_from(v).map_err(E::custom)
    }
}

/// Decodes a string field with codec `C`.
fn deserialize_with<'de, C, D>(d: D, expecting: &'static str) -> Result<ArbiterId, D::Error>
where
    C: IdCodec,
    D: Deserializer<'de>,
{
    struct CodecVisitor<C> {
        expecting: &'static str,
        codec: core::marker::PhantomData<C>,
    }

    impl<C> de::Visitor<'_> for CodecVisitor<C>
    where
        C: IdCodec,
    {
        type Value = ArbiterId;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str(self.expecting)
        }

        #[inline]
        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            C::decode(v).map_err(|e: DecodeError| E::custom(e))
        }
    }

    d.deserialize_str(CodecVisitor::<C> {
        expecting,
        codec: core::marker::PhantomData,
    })
}

/// Serde adapter storing an [`ArbiterId`] as a JSON number (`i64`).
///
/// Only safe with consumers that read 64-bit integers exactly.
pub mod as_int {
    use super::{Deserialize, Deserializer, Serialize, Serializer};
    use crate::ArbiterId;

    /// # Errors
    ///
    /// Returns an error if the underlying serializer fails.
    pub fn serialize<S>(id: &ArbiterId, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        id.as_i64().serialize(s)
    }

    /// # Errors
    ///
    /// Returns an error if the value is not an integer or is negative.
    pub fn deserialize<'de, D>(d: D) -> Result<ArbiterId, D::Error>
    where
        D: Deserializer<'de>,
    {
        let n = i64::deserialize(d)?;
        ArbiterId::try_from(n).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter storing an [`ArbiterId`] as a [`Base58`](crate::Base58)
/// string.
pub mod as_base58 {
    use super::{Deserializer, Serializer, deserialize_with};
    use crate::{ArbiterId, Base58};

    /// # Errors
    ///
    /// Returns an error if the underlying serializer fails.
    pub fn serialize<S>(id: &ArbiterId, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_str(&id.to_base58())
    }

    /// # Errors
    ///
    /// Returns an error if the field is not a valid base58 id.
    pub fn deserialize<'de, D>(d: D) -> Result<ArbiterId, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserialize_with::<Base58, D>(d, "a base58 encoded id")
    }
}

/// Serde adapter storing an [`ArbiterId`] as a [`Base64`](crate::Base64)
/// string.
pub mod as_base64 {
    use super::{Deserializer, Serializer, deserialize_with};
    use crate::{ArbiterId, Base64};

    /// # Errors
    ///
    /// Returns an error if the underlying serializer fails.
    pub fn serialize<S>(id: &ArbiterId, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_str(&id.to_base64())
    }

    /// # Errors
    ///
    /// Returns an error if the field is not a valid base64 id.
    pub fn deserialize<'de, D>(d: D) -> Result<ArbiterId, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserialize_with::<Base64, D>(d, "an unpadded URL-safe base64 id")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(PartialEq, Eq, Debug, Serialize, Deserialize)]
    struct Row {
        id: ArbiterId,
    }

    #[test]
    fn serializes_as_quoted_decimal() {
        let row = Row {
            id: ArbiterId::from_raw(9_007_199_254_740_993),
        };
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"id":"9007199254740993"}"#);
        assert_eq!(serde_json::from_str::<Row>(&json).unwrap(), row);
    }

    #[test]
    fn deserializes_bare_numbers() {
        let row: Row = serde_json::from_value(json!({"id": 42})).unwrap();
        assert_eq!(row.id, ArbiterId::from_raw(42));
    }

    #[test]
    fn rejects_invalid_values() {
        for value in [json!(-1), json!("-1"), json!(u64::MAX), json!("abc"), json!("")] {
            let err = serde_json::from_value::<Row>(json!({ "id": value }));
            assert!(err.is_err(), "accepted {value}");
        }

        let err = serde_json::from_value::<Row>(json!({"id": -5})).unwrap_err();
        assert!(err.to_string().contains(&DecodeError::Negative.to_string()));
        let too_large = json!({"id": "9223372036854775808"});
        let err = serde_json::from_value::<Row>(too_large).unwrap_err();
        assert!(err.to_string().contains(&DecodeError::Overflow.to_string()));
    }

    #[test]
    fn int_adapter_roundtrip() {
        #[derive(PartialEq, Eq, Debug, Serialize, Deserialize)]
        struct Event {
            #[serde(with = "as_int")]
            event_id: ArbiterId,
        }
        let event = Event {
            event_id: ArbiterId::from_raw(42),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"event_id":42}"#);
        assert_eq!(serde_json::from_str::<Event>(&json).unwrap(), event);
        assert!(serde_json::from_value::<Event>(json!({"event_id": -1})).is_err());
    }

    #[test]
    fn base58_adapter_roundtrip() {
        #[derive(PartialEq, Eq, Debug, Serialize, Deserialize)]
        struct Event {
            #[serde(with = "as_base58")]
            event_id: ArbiterId,
        }
        let event = Event {
            event_id: ArbiterId::from_raw(58),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"event_id":"21"}"#);
        assert_eq!(serde_json::from_str::<Event>(&json).unwrap(), event);

        let zero = json!({"event_id": "0"});
        let err = serde_json::from_value::<Event>(zero).unwrap_err();
        let expected = DecodeError::InvalidAscii {
            byte: b'0',
            index: 0,
        };
        assert!(err.to_string().contains(&expected.to_string()));
    }

    #[test]
    fn base64_adapter_roundtrip() {
        #[derive(PartialEq, Eq, Debug, Serialize, Deserialize)]
        struct Event {
            #[serde(with = "as_base64")]
            event_id: ArbiterId,
        }
        let event = Event {
            event_id: ArbiterId::from_raw(1),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"event_id":"AAAAAAAAAAE"}"#);
        assert_eq!(serde_json::from_str::<Event>(&json).unwrap(), event);
        assert!(serde_json::from_value::<Event>(json!({"event_id": "gAAAAAAAAAA"})).is_err());
    }
}
