// self
use crate::{_prelude::*, obs::HandshakeStage};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedHandshake<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedHandshake<F> = F;

/// A span builder used at every handshake stage.
#[derive(Clone, Debug)]
pub struct HandshakeSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl HandshakeSpan {
	/// Creates a new span tagged with the stage and the accessor being delegated to.
	pub fn new(stage: HandshakeStage, accessor: &str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"delegated_auth.handshake",
				stage = stage.as_str(),
				accessor
			);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (stage, accessor);

			Self {}
		}
	}

	/// Enters the span for synchronous sections.
	pub fn entered(self) -> HandshakeSpanGuard {
		#[cfg(feature = "tracing")]
		{
			HandshakeSpanGuard { guard: self.span.entered() }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = self;

			HandshakeSpanGuard {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedHandshake<Fut>
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

/// RAII guard returned by [`HandshakeSpan::entered`].
pub struct HandshakeSpanGuard {
	#[cfg(feature = "tracing")]
	#[allow(dead_code)]
	guard: tracing::span::EnteredSpan,
}
impl Debug for HandshakeSpanGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("HandshakeSpanGuard(..)")
	}
}

/// Emits a `debug` event when tracing is enabled; expands to nothing otherwise.
macro_rules! debug_event {
	($($arg:tt)+) => {
		#[cfg(feature = "tracing")]
		{
			::tracing::debug!($($arg)+);
		}
	};
}
pub(crate) use debug_event;
