//! Tracing shims.
//!
//! With the `tracing` feature the macros forward to `tracing`; without it
//! they expand to nothing so the compactor stays dependency-free.

#[cfg(feature = "tracing")]
pub(crate) use tracing::{debug, debug_span, trace, warn};

// Defined under other names: a `macro_rules! warn` re-exported by `use`
// is ambiguous with the built-in `#[warn]` attribute.
#[cfg(not(feature = "tracing"))]
mod noop {
    macro_rules! noop_event {
        ($($arg:tt)*) => {};
    }
    macro_rules! noop_span {
        ($($arg:tt)*) => {
            $crate::logging::NoopSpan
        };
    }

    pub(crate) use noop_event as debug;
    pub(crate) use noop_event as trace;
    pub(crate) use noop_event as warn;
    pub(crate) use noop_span as debug_span;
}

#[cfg(not(feature = "tracing"))]
pub(crate) use noop::{debug, debug_span, trace, warn};

/// Stand-in for `tracing::Span` when tracing is compiled out.
#[cfg(not(feature = "tracing"))]
pub(crate) struct NoopSpan;

#[cfg(not(feature = "tracing"))]
impl NoopSpan {
    pub(crate) fn entered(self) -> Self {
        self
    }
}

#[cfg(all(test, not(feature = "tracing")))]
mod tests {
    use super::*;

    #[test]
    fn shims_accept_tracing_syntax() {
        let _span = debug_span!("dashgrid.compact", items = 1, columns = 3).entered();
        debug!(iterations = 1, converged = true, "compaction finished");
        trace!(id = "chat", "gap filled");
        warn!(iterations = 64, "compaction did not converge");
    }
}
