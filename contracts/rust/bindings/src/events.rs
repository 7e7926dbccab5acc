//! Typed event access on top of the bindings.
//!
//! Every event type generated by `sol!` implements [`SolEvent`], so the helpers here work for any
//! contract. Historic ranges are fetched chunk by chunk to keep individual `eth_getLogs` calls
//! small; live events are exposed as streams that release their filter or subscription on drop.

use std::cmp::min;

use alloy::{
    contract::Event,
    network::Network,
    primitives::Address,
    providers::Provider,
    rpc::types::Log,
    sol_types::SolEvent,
    transports::TransportResult,
};
use futures::Stream;

/// Split the inclusive block range `from..=to` into chunks of at most `max_range` blocks.
///
/// A `max_range` of zero is treated as one. The iterator is empty if `to < from`.
pub fn block_ranges(from: u64, to: u64, max_range: u64) -> impl Iterator<Item = (u64, u64)> + Clone {
    let chunk_size = max_range.max(1);
    let mut start = from;
    let mut done = to < from;
    std::iter::from_fn(move || {
        if done {
            return None;
        }
        let chunk_end = min(start.saturating_add(chunk_size - 1), to);
        let chunk = (start, chunk_end);
        if chunk_end == to {
            done = true;
        } else {
            start = chunk_end + 1;
        }
        Some(chunk)
    })
}

/// Fetch every `E` emitted by `address` in `from..=to`, in block order.
///
/// Fails on the first RPC or decoding error.
pub async fn query_events<E, P, N>(
    provider: P,
    address: Address,
    from: u64,
    to: u64,
    max_range: u64,
) -> Result<Vec<(E, Log)>, alloy::contract::Error>
where
    E: SolEvent,
    P: Provider<N>,
    N: Network,
{
    let mut events = Vec::new();
    for (from, to) in block_ranges(from, to, max_range) {
        tracing::debug!(from, to, event = E::SIGNATURE, %address, "fetch events in range");
        let chunk = Event::<(), _, E, N>::new_sol(&provider, &address)
            .from_block(from)
            .to_block(to)
            .query()
            .await?;
        events.extend(chunk);
    }
    Ok(events)
}

/// Poll for new `E` logs emitted by `address`.
///
/// The filter is installed on the node when this returns and is dropped with the stream.
pub async fn watch_events<E, P, N>(
    provider: P,
    address: Address,
) -> TransportResult<impl Stream<Item = alloy::sol_types::Result<(E, Log)>>>
where
    E: SolEvent,
    P: Provider<N>,
    N: Network,
{
    let poller = Event::<(), _, E, N>::new_sol(&provider, &address).watch().await?;
    tracing::info!(event = E::SIGNATURE, %address, "watching events");
    Ok(poller.into_stream())
}

/// Subscribe to `E` logs emitted by `address`. Requires a pubsub transport.
pub async fn subscribe_events<E, P, N>(
    provider: P,
    address: Address,
) -> TransportResult<impl Stream<Item = alloy::sol_types::Result<(E, Log)>>>
where
    E: SolEvent,
    P: Provider<N>,
    N: Network,
{
    let subscription = Event::<(), _, E, N>::new_sol(&provider, &address)
        .subscribe()
        .await?;
    tracing::info!(event = E::SIGNATURE, %address, "subscribed to events");
    Ok(subscription.into_stream())
}

/// Decode a raw log as `E`.
pub fn parse_log<E: SolEvent>(log: &Log) -> alloy::sol_types::Result<E> {
    E::decode_log(&log.inner, true).map(|decoded| decoded.data)
}

#[cfg(test)]
mod tests {
    use alloy::{
        primitives::{self, address, B256, U256},
        providers::ProviderBuilder,
        transports::mock::Asserter,
    };
    use futures::StreamExt;
    use rstest::rstest;

    use super::*;
    use crate::L2OutputOracle::{OutputReplaced, OutputSubmitted};

    const ORACLE: Address = address!("0000000000000000000000000000000000000abc");

    fn submitted(index: u64) -> OutputSubmitted {
        OutputSubmitted {
            outputRoot: B256::repeat_byte(index as u8),
            l2OutputIndex: U256::from(index),
            l2BlockNumber: U256::from(index * 1800),
            l1Timestamp: U256::from(1_700_000_000 + index),
        }
    }

    fn rpc_log(event: &impl SolEvent, block_number: u64) -> Log {
        Log {
            inner: primitives::Log {
                address: ORACLE,
                data: event.encode_log_data(),
            },
            block_number: Some(block_number),
            ..Default::default()
        }
    }

    #[rstest]
    #[case(0, 0, 10, vec![(0, 0)])]
    #[case(0, 9, 10, vec![(0, 9)])]
    #[case(0, 10, 10, vec![(0, 9), (10, 10)])]
    #[case(5, 30, 10, vec![(5, 14), (15, 24), (25, 30)])]
    #[case(3, 5, 0, vec![(3, 3), (4, 4), (5, 5)])]
    #[case(10, 9, 10, vec![])]
    #[case(u64::MAX - 1, u64::MAX, 10, vec![(u64::MAX - 1, u64::MAX)])]
    fn test_block_ranges(
        #[case] from: u64,
        #[case] to: u64,
        #[case] max_range: u64,
        #[case] expected: Vec<(u64, u64)>,
    ) {
        assert_eq!(block_ranges(from, to, max_range).collect::<Vec<_>>(), expected);
    }

    #[test]
    fn test_parse_log() {
        let event = submitted(7);
        let log = rpc_log(&event, 100);
        assert_eq!(parse_log::<OutputSubmitted>(&log).unwrap(), event);

        // wrong event signature
        assert!(parse_log::<OutputReplaced>(&log).is_err());

        let replaced = OutputReplaced {
            outputIndex: U256::from(3),
            newOutputRoot: B256::repeat_byte(0xee),
        };
        let log = rpc_log(&replaced, 101);
        assert_eq!(parse_log::<OutputReplaced>(&log).unwrap(), replaced);
        assert!(parse_log::<OutputSubmitted>(&log).is_err());
    }

    #[tokio::test]
    async fn test_query_events_in_chunks() -> anyhow::Result<()> {
        let asserter = Asserter::new();
        let provider = ProviderBuilder::new()
            .disable_recommended_fillers()
            .on_mocked_client(asserter.clone());

        // one response per chunk: [0, 9] and [10, 15]
        asserter.push_success(&vec![rpc_log(&submitted(1), 3), rpc_log(&submitted(2), 8)]);
        asserter.push_success(&vec![rpc_log(&submitted(3), 12)]);

        let events = query_events::<OutputSubmitted, _, _>(&provider, ORACLE, 0, 15, 10).await?;
        let indexes: Vec<_> = events
            .iter()
            .map(|(event, _)| event.l2OutputIndex.to::<u64>())
            .collect();
        assert_eq!(indexes, vec![1, 2, 3]);
        assert_eq!(events[2].1.block_number, Some(12));
        assert_eq!(events[0].0, submitted(1));
        Ok(())
    }

    #[tokio::test]
    async fn test_query_events_fails_fast() {
        let asserter = Asserter::new();
        let provider = ProviderBuilder::new()
            .disable_recommended_fillers()
            .on_mocked_client(asserter.clone());

        asserter.push_success(&Vec::<Log>::new());
        asserter.push_failure_msg("boom");

        let err = query_events::<OutputSubmitted, _, _>(&provider, ORACLE, 0, 25, 10)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("boom"), "{err}");
    }

    #[tokio::test]
    async fn test_query_events_empty_range() {
        let asserter = Asserter::new();
        let provider = ProviderBuilder::new()
            .disable_recommended_fillers()
            .on_mocked_client(asserter.clone());

        let events = query_events::<OutputSubmitted, _, _>(&provider, ORACLE, 10, 9, 10)
            .await
            .unwrap();
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn test_watch_events() -> anyhow::Result<()> {
        let asserter = Asserter::new();
        let provider = ProviderBuilder::new()
            .disable_recommended_fillers()
            .on_mocked_client(asserter.clone());

        // eth_newFilter, then the first eth_getFilterChanges poll
        asserter.push_success(&U256::from(0x1f));
        asserter.push_success(&vec![rpc_log(&submitted(4), 20), rpc_log(&submitted(5), 21)]);

        let stream = watch_events::<OutputSubmitted, _, _>(&provider, ORACLE).await?;
        let events: Vec<_> = stream.take(2).collect().await;
        let (first, log) = events[0].as_ref().unwrap();
        assert_eq!(*first, submitted(4));
        assert_eq!(log.block_number, Some(20));
        assert_eq!(events[1].as_ref().unwrap().0, submitted(5));
        Ok(())
    }

    #[tokio::test]
    async fn test_watch_events_filter_rejected() {
        let asserter = Asserter::new();
        let provider = ProviderBuilder::new()
            .disable_recommended_fillers()
            .on_mocked_client(asserter.clone());

        asserter.push_failure_msg("filter not found");
        let Err(err) = watch_events::<OutputSubmitted, _, _>(&provider, ORACLE).await else {
            panic!("watch should fail when eth_newFilter fails");
        };
        assert!(err.to_string().contains("filter not found"), "{err}");
    }

    #[tokio::test]
    async fn test_subscribe_events_needs_pubsub() {
        let asserter = Asserter::new();
        let provider = ProviderBuilder::new()
            .disable_recommended_fillers()
            .on_mocked_client(asserter.clone());

        let Err(err) = subscribe_events::<OutputSubmitted, _, _>(&provider, ORACLE).await else {
            panic!("subscribe should fail without a pubsub transport");
        };
        assert!(err.to_string().contains("subscriptions are not available"), "{err}");
    }
}
