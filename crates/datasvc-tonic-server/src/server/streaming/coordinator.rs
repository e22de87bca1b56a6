use datasvc_tonic_core::{Error, proto::DataResponse};
use tokio::sync::mpsc;
use tonic::Status;

/// Emits the fixed `StreamingGet` response sequence into `resp_tx`.
///
/// Responses are produced strictly in index order (`"Response 0"`
/// first); tonic preserves that order on the wire, so no further
/// serialization is needed here. Emission stops as soon as the
/// receiver side is gone, which is how a mid-stream client disconnect
/// shows up: no unbounded buffering of undeliverable items.
pub async fn feed_responses(
    count: usize,
    resp_tx: mpsc::Sender<Result<DataResponse, Status>>,
) -> datasvc_tonic_core::Result<()> {
    for i in 0..count {
        let response = DataResponse {
            value: format!("Response {i}"),
        };
        if let Err(e) = resp_tx.send(Ok(response)).await {
            return Err(Error::ChannelError {
                context: format!("failed to forward response {i}: {e}"),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn emits_fixed_sequence_in_order() {
        let (tx, mut rx) = mpsc::channel(10);
        feed_responses(10, tx).await.unwrap();

        let mut received = Vec::new();
        while let Some(item) = rx.recv().await {
            received.push(item.unwrap().value);
        }

        assert_eq!(received.len(), 10);
        for (i, value) in received.iter().enumerate() {
            assert_eq!(value, &format!("Response {i}"));
        }
    }

    #[tokio::test]
    async fn stops_when_receiver_is_dropped() {
        let (tx, mut rx) = mpsc::channel(1);

        let producer = tokio::spawn(feed_responses(10, tx));

        // Take three items, then walk away mid-stream.
        for _ in 0..3 {
            rx.recv().await.unwrap().unwrap();
        }
        drop(rx);

        let result = producer.await.unwrap();
        assert!(matches!(result, Err(Error::ChannelError { .. })));
    }
}
