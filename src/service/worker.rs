//! Record event worker.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::codec::WireFormat;
use crate::handler::{message_key, Chain, Parse, Recover};
use crate::record::Record;
use crate::store::RecordStore;
use crate::structured::StructuredError;
use crate::transport::{ConsumeStats, Consumer};

/// `[Recover, Parse<Record>, process]`.
///
/// Processing marks the record processed and writes it back. A failed
/// update becomes a structured error carrying the record as data, which
/// `Recover` reports and swallows.
pub fn worker_chain(store: Arc<dyn RecordStore<Record>>, format: WireFormat) -> Chain {
    Chain::builder()
        .handler(Recover::new())
        .handler(Parse::<Record>::with_format(format))
        .handle_fn(move |ctx| {
            let mut record = ctx.try_take(&message_key::<Record>())?;
            record.set_processed();

            if let Err(e) = store.update(record.clone()) {
                let data = serde_json::to_value(&record)?;
                return Err(StructuredError::from(e).with_data(data).into());
            }

            tracing::debug!(id = %record.id, "record processed");
            ctx.next()
        })
        .build()
}

/// Run `chain` over `consumer` on a background task.
pub fn spawn_worker(consumer: Consumer, chain: Chain) -> JoinHandle<ConsumeStats> {
    tokio::spawn(async move { consumer.run(&chain).await })
}
