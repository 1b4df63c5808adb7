//! Codec module - payload encoding for the message channel.
//!
//! - [`JsonCodec`] - JSON using `serde_json` (default wire format)
//! - [`MsgPackCodec`] - MessagePack using `rmp-serde`
//! - [`WireFormat`] - runtime selection between the two
//!
//! # Design
//!
//! Codecs are marker structs with static methods. [`WireFormat`] is the value
//! that travels through configuration and picks the codec at the call site.
//!
//! # Example
//!
//! ```
//! use msgchain::codec::{JsonCodec, WireFormat};
//!
//! let encoded = JsonCodec::encode(&"hello").unwrap();
//! assert_eq!(encoded, br#""hello""#);
//!
//! let decoded: String = WireFormat::Json.decode(&encoded).unwrap();
//! assert_eq!(decoded, "hello");
//! ```

mod format;
mod json;
mod msgpack;

pub use format::WireFormat;
pub use json::JsonCodec;
pub use msgpack::MsgPackCodec;
