// =============================================================================
// Quote Sources — the data-fetch collaborator behind every cycle
// =============================================================================
//
// `QuoteSource` is the single capability the scheduler needs: current price,
// close history and the raw option chain for one underlying.  Two
// implementations exist:
//
//   LiveQuoteProvider  HTTP chart / options endpoints (reqwest)
//   ReplayFixture      JSON fixture on disk, used by tests and demo mode
//
// Retries and caching belong here, never in the scoring core.
// =============================================================================

pub mod error;
pub mod live;
pub mod replay;

use async_trait::async_trait;
use serde_json::Value;

use crate::cycle::CycleInputs;

pub use error::QuoteError;
pub use live::{LiveProviderConfig, LiveQuoteProvider};
pub use replay::ReplayFixture;

#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Short name for logs and the health endpoint.
    fn name(&self) -> &'static str;

    async fn fetch_current_price(&self) -> Result<f64, QuoteError>;

    /// Most recent `lookback` daily closes, oldest first.
    async fn fetch_price_history(&self, lookback: usize) -> Result<Vec<f64>, QuoteError>;

    /// Raw chain records exactly as the provider shaped them.
    async fn fetch_option_chain(&self) -> Result<Vec<Value>, QuoteError>;
}

/// Fetch every cycle input concurrently.  When `include_chain` is false the
/// chain is not requested and an empty chain is passed along.
pub async fn fetch_cycle_inputs(
    source: &dyn QuoteSource,
    lookback: usize,
    include_chain: bool,
) -> CycleInputs {
    let chain = async {
        if include_chain {
            source.fetch_option_chain().await
        } else {
            Ok(Vec::new())
        }
    };

    let (current_price, price_history, option_chain) = futures_util::future::join3(
        source.fetch_current_price(),
        source.fetch_price_history(lookback),
        chain,
    )
    .await;

    CycleInputs {
        current_price: current_price.map_err(Into::into),
        price_history: price_history.map_err(Into::into),
        option_chain: option_chain.map_err(Into::into),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        chain_calls: AtomicUsize,
    }

    #[async_trait]
    impl QuoteSource for CountingSource {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn fetch_current_price(&self) -> Result<f64, QuoteError> {
            Ok(604.15)
        }

        async fn fetch_price_history(&self, lookback: usize) -> Result<Vec<f64>, QuoteError> {
            Ok(vec![600.0; lookback])
        }

        async fn fetch_option_chain(&self) -> Result<Vec<Value>, QuoteError> {
            self.chain_calls.fetch_add(1, Ordering::SeqCst);
            Err(QuoteError::Missing("option chain".into()))
        }
    }

    #[tokio::test]
    async fn inputs_map_failures_to_upstream_unavailable() {
        let source = CountingSource { chain_calls: AtomicUsize::new(0) };
        let inputs = fetch_cycle_inputs(&source, 20, true).await;
        assert_eq!(inputs.current_price, Ok(604.15));
        assert_eq!(inputs.price_history.as_ref().map(Vec::len), Ok(20));
        assert!(matches!(inputs.option_chain, Err(CoreError::UpstreamUnavailable(_))));
        assert_eq!(source.chain_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn closed_market_skips_chain_request() {
        let source = CountingSource { chain_calls: AtomicUsize::new(0) };
        let inputs = fetch_cycle_inputs(&source, 20, false).await;
        assert_eq!(inputs.option_chain, Ok(Vec::new()));
        assert_eq!(source.chain_calls.load(Ordering::SeqCst), 0);
    }
}
