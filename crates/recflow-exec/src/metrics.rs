//! Metrics hooks.
//!
//! Emitted as `trace` events under a `recflow` span; hosts route them to
//! their own telemetry through a `tracing` subscriber.

pub fn emit_span(event: &str, key_values: &[(&str, String)]) {
    let span = tracing::trace_span!("recflow", event);
    let _entered = span.enter();
    for (k, v) in key_values {
        tracing::trace!(%event, %k, %v, "metric");
    }
}
