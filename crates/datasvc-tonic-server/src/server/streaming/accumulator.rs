//! Per-call accumulator for `StreamingPut`.

/// Ordered buffer of transformed strings for one client-streaming call.
///
/// The value moves through two states: receiving, where [`push`]
/// appends in arrival order, and completed, where [`render`] consumes
/// the accumulator to build the single aggregated response. Consuming
/// `self` makes the invariants structural: the buffer cannot be read
/// before the inbound stream ends, and cannot be mutated after the
/// response is built. The accumulator is owned by its call's task and
/// never shared, so no locking is involved.
///
/// [`push`]: PutAccumulator::push
/// [`render`]: PutAccumulator::render
#[derive(Debug, Default)]
pub struct PutAccumulator {
    values: Vec<String>,
}

impl PutAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one transformed value; arrival order is preserved.
    pub fn push(&mut self, value: String) {
        self.values.push(value);
    }

    /// Renders the aggregated response as a bracketed, comma-separated
    /// list (`[AB, CD]`; `[]` when no messages arrived).
    pub fn render(self) -> String {
        format!("[{}]", self.values.join(", "))
    }
}
