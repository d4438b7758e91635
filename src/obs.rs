//! Observability labels and counters for broker operations.
//!
//! Enable the `metrics` feature to increment the `connect_broker_operation_total` counter for
//! every attempt/success/failure, labeled by `operation`, `provider`, and `outcome`. Without
//! the feature the recorder is a no-op. `tracing` events are emitted by the broker itself and
//! are not feature-gated.

// self
use crate::provider::ProviderKind;

/// Broker operations observed by the counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
	/// Code exchange plus store write.
	CompleteConnect,
	/// Authorized provider resource call.
	ResourceCall,
}
impl OperationKind {
	/// Returns a stable label suitable for metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationKind::CompleteConnect => "complete_connect",
			OperationKind::ResourceCall => "resource_call",
		}
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationOutcome {
	/// Entry to a broker operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl OperationOutcome {
	/// Returns a stable label suitable for metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationOutcome::Attempt => "attempt",
			OperationOutcome::Success => "success",
			OperationOutcome::Failure => "failure",
		}
	}
}

/// Records an operation outcome via the global metrics recorder (when enabled).
pub fn record_operation(kind: OperationKind, provider: ProviderKind, outcome: OperationOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"connect_broker_operation_total",
			"operation" => kind.as_str(),
			"provider" => provider.tag(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, provider, outcome);
	}
}
