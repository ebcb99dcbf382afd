//! Optional observability helpers for the exchange flow.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `oauth2_relay.exchange` with the `stage`
//!   field, plus warn-level events on recovery paths (snapshot corruption, membership hook
//!   failures).
//! - Enable `metrics` to increment the `oauth2_relay_exchange_total` counter for every
//!   attempt/success/failure, labeled by `outcome`.

// self
use crate::_prelude::*;

/// Outcome labels recorded for each exchange attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExchangeOutcome {
	/// Entry to the exchange entry point.
	Attempt,
	/// Successful completion, credential persisted.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl ExchangeOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			ExchangeOutcome::Attempt => "attempt",
			ExchangeOutcome::Success => "success",
			ExchangeOutcome::Failure => "failure",
		}
	}
}
impl Display for ExchangeOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Records an exchange outcome via the global metrics recorder (when enabled).
pub fn record_exchange(outcome: ExchangeOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("oauth2_relay_exchange_total", "outcome" => outcome.as_str())
			.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = outcome;
	}
}

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedExchange<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedExchange<F> = F;

/// A span builder used by the exchange engine.
#[derive(Clone, Debug)]
pub struct ExchangeSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl ExchangeSpan {
	/// Creates a new span tagged with the provided stage.
	pub fn new(stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("oauth2_relay.exchange", stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = stage;

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedExchange<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Emits a warn-level event when tracing is enabled; no-op otherwise.
pub(crate) fn warn(message: String) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!("{message}");
	}

	#[cfg(not(feature = "tracing"))]
	{
		let _ = message;
	}
}
