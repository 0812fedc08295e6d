use crate::foundation::error::{ReelError, ReelResult, Stage};

/// A recoverable failure that was replaced by a simpler equivalent.
///
/// Degradations never abort a render; they are logged and surfaced in the render report.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DegradedFallback {
    /// Stage that degraded.
    pub stage: Stage,
    /// What degraded (an image path, "background music", ...).
    pub subject: String,
    /// Why the preferred strategy could not be used.
    pub reason: String,
}

/// One named candidate in an ordered fallback chain.
pub struct Strategy<'a, T> {
    name: &'static str,
    run: Box<dyn FnOnce() -> ReelResult<T> + 'a>,
}

impl<'a, T> Strategy<'a, T> {
    /// Wrap a closure as a named strategy.
    pub fn new(name: &'static str, run: impl FnOnce() -> ReelResult<T> + 'a) -> Self {
        Self {
            name,
            run: Box::new(run),
        }
    }
}

/// Value produced by [`first_success`] together with the failures it skipped over.
#[derive(Clone, Debug)]
pub struct Recovered<T> {
    /// Value returned by the first successful strategy.
    pub value: T,
    /// Name of that strategy.
    pub strategy: &'static str,
    /// One entry per strategy that failed before it.
    pub degradations: Vec<DegradedFallback>,
}

impl<T> Recovered<T> {
    /// `true` when a fallback (not the preferred strategy) produced the value.
    pub fn is_degraded(&self) -> bool {
        !self.degradations.is_empty()
    }
}

/// Run `strategies` in order and return the first success.
///
/// Every failure before the success is recorded as a [`DegradedFallback`] and logged. When all
/// strategies fail, the last error is returned.
pub fn first_success<T>(
    stage: Stage,
    subject: &str,
    strategies: Vec<Strategy<'_, T>>,
) -> ReelResult<Recovered<T>> {
    let mut degradations = Vec::new();
    let mut last_err = None;

    for strategy in strategies {
        match (strategy.run)() {
            Ok(value) => {
                return Ok(Recovered {
                    value,
                    strategy: strategy.name,
                    degradations,
                });
            }
            Err(err) => {
                tracing::warn!(
                    stage = %stage,
                    subject,
                    strategy = strategy.name,
                    "degraded: {err}"
                );
                degradations.push(DegradedFallback {
                    stage,
                    subject: subject.to_string(),
                    reason: format!("{} failed: {err}", strategy.name),
                });
                last_err = Some(err);
            }
        }
    }

    Err(last_err.unwrap_or_else(|| {
        ReelError::validation(format!("no fallback strategies given for '{subject}'"))
    }))
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/fallback.rs"]
mod tests;
