//! Runtime wire format selection.

use std::fmt;
use std::str::FromStr;

use super::{JsonCodec, MsgPackCodec};
use crate::error::Result;

/// Encoding used for payloads on the message channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum WireFormat {
    /// JSON via [`JsonCodec`].
    #[default]
    Json,
    /// MessagePack via [`MsgPackCodec`].
    MsgPack,
}

impl WireFormat {
    /// Encode a value in this format.
    pub fn encode<T: serde::Serialize>(self, value: &T) -> Result<Vec<u8>> {
        match self {
            WireFormat::Json => JsonCodec::encode(value),
            WireFormat::MsgPack => MsgPackCodec::encode(value),
        }
    }

    /// Decode bytes in this format.
    pub fn decode<T: serde::de::DeserializeOwned>(self, bytes: &[u8]) -> Result<T> {
        match self {
            WireFormat::Json => JsonCodec::decode(bytes),
            WireFormat::MsgPack => MsgPackCodec::decode(bytes),
        }
    }

    /// Lowercase name, as accepted by [`FromStr`].
    pub fn as_str(self) -> &'static str {
        match self {
            WireFormat::Json => "json",
            WireFormat::MsgPack => "msgpack",
        }
    }
}

impl fmt::Display for WireFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown wire format name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown wire format '{0}' (expected 'json' or 'msgpack')")]
pub struct UnknownWireFormat(pub String);

impl FromStr for WireFormat {
    type Err = UnknownWireFormat;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(WireFormat::Json),
            "msgpack" | "messagepack" => Ok(WireFormat::MsgPack),
            _ => Err(UnknownWireFormat(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        assert_eq!("json".parse::<WireFormat>().unwrap(), WireFormat::Json);
        assert_eq!("MsgPack".parse::<WireFormat>().unwrap(), WireFormat::MsgPack);
        assert!("xml".parse::<WireFormat>().is_err());
    }

    #[test]
    fn test_display_matches_parse() {
        for format in [WireFormat::Json, WireFormat::MsgPack] {
            assert_eq!(format.to_string().parse::<WireFormat>().unwrap(), format);
        }
    }

    #[test]
    fn test_formats_are_not_interchangeable() {
        let encoded = WireFormat::MsgPack.encode(&vec![1u8, 2, 3]).unwrap();
        assert!(WireFormat::Json.decode::<Vec<u8>>(&encoded).is_err());
        assert_eq!(
            WireFormat::MsgPack.decode::<Vec<u8>>(&encoded).unwrap(),
            vec![1, 2, 3]
        );
    }
}
