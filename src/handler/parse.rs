//! Parse handler: payload bytes to a typed scratch value.

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;

use super::{Context, Handler, HandlerResult, Key};
use crate::codec::WireFormat;

/// Scratch slot holding the decoded message.
pub const MESSAGE: &str = "message";

/// Typed key for the decoded message.
pub const fn message_key<T>() -> Key<T> {
    Key::new(MESSAGE)
}

/// Decodes the payload into `T`, stores it under [`message_key`] and
/// continues the chain.
///
/// A decode failure is returned as the codec's own error
/// (`serde_json::Error` or `rmp_serde::decode::Error`), unwrapped. It is not
/// a structured error, so [`Recover`](super::Recover) lets it propagate.
pub struct Parse<T> {
    format: WireFormat,
    _phantom: PhantomData<fn() -> T>,
}

impl<T> Parse<T> {
    /// Parse JSON payloads.
    pub fn new() -> Self {
        Self::with_format(WireFormat::Json)
    }

    pub fn with_format(format: WireFormat) -> Self {
        Self {
            format,
            _phantom: PhantomData,
        }
    }

    pub fn format(&self) -> WireFormat {
        self.format
    }
}

impl<T> Default for Parse<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Parse<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parse")
            .field("format", &self.format)
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T> Handler for Parse<T>
where
    T: DeserializeOwned + Send + 'static,
{
    fn handle(&self, ctx: &mut Context<'_>) -> HandlerResult {
        let message: T = match self.format {
            WireFormat::Json => serde_json::from_slice(ctx.payload())?,
            WireFormat::MsgPack => rmp_serde::from_slice(ctx.payload())?,
        };
        ctx.set(&message_key::<T>(), message);
        ctx.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::handler::{Chain, Recover};
    use crate::structured::find_structured;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Ping {
        seq: u32,
    }

    const SEQ: Key<u32> = Key::new("seq");

    fn chain_with(parse: Parse<Ping>) -> Chain {
        Chain::builder()
            .handler(parse)
            .handle_fn(|ctx| {
                let ping = ctx.try_take(&message_key::<Ping>())?;
                ctx.set(&SEQ, ping.seq);
                ctx.next()
            })
            .build()
    }

    #[test]
    fn test_decoded_value_reaches_next_handler() {
        let (result, scratch) = chain_with(Parse::new()).process_with(&br#"{"seq":9}"#[..], |_| {});

        assert!(result.is_ok());
        assert_eq!(scratch.get(&SEQ), Some(&9));
    }

    #[test]
    fn test_msgpack_format() {
        let payload = WireFormat::MsgPack.encode(&Ping { seq: 4 }).unwrap();
        let (result, scratch) =
            chain_with(Parse::with_format(WireFormat::MsgPack)).process_with(payload, |_| {});

        assert!(result.is_ok());
        assert_eq!(scratch.get(&SEQ), Some(&4));
    }

    #[test]
    fn test_malformed_payload_is_unstructured() {
        let err = chain_with(Parse::new()).process(&b"{seq:"[..]).unwrap_err();

        let raw = serde_json::from_slice::<Ping>(b"{seq:").unwrap_err();
        assert!(err.downcast_ref::<serde_json::Error>().is_some());
        assert_eq!(err.to_string(), raw.to_string());
        assert!(find_structured(&*err).is_none());
    }

    #[test]
    fn test_malformed_msgpack_keeps_codec_error() {
        let err = chain_with(Parse::with_format(WireFormat::MsgPack))
            .process(&b"\xc1"[..])
            .unwrap_err();

        assert!(err.downcast_ref::<rmp_serde::decode::Error>().is_some());
        assert!(err.downcast_ref::<Error>().is_none());
    }

    #[test]
    fn test_malformed_payload_escapes_recover() {
        let chain = Chain::builder()
            .handler(Recover::with_reporter(|_| panic!("nothing should be reported")))
            .handler(Parse::<Ping>::new())
            .build();

        let err = chain.process(&b"not json"[..]).unwrap_err();
        assert!(err.downcast_ref::<serde_json::Error>().is_some());
    }

    #[test]
    fn test_downstream_expecting_other_type() {
        let chain = Chain::builder()
            .handler(Parse::<Ping>::new())
            .handle_fn(|ctx| {
                let _text: String = ctx.try_take(&message_key::<String>())?;
                ctx.next()
            })
            .build();

        let err = chain.process(&br#"{"seq":1}"#[..]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::ValueType { key: MESSAGE, .. })
        ));
    }
}
