use std::{
    future::Future,
    time::{Duration, Instant},
};

use crate::{Backend, Hit, Result};

/// A value together with the wall-clock time it took to produce.
#[derive(Clone, Debug, PartialEq)]
pub struct Timed<T> {
    pub value: T,
    pub elapsed: Duration,
}

impl<T> Timed<T> {
    pub fn secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Timed<U> {
        Timed {
            value: f(self.value),
            elapsed: self.elapsed,
        }
    }
}

impl<T, E> Timed<Result<T, E>> {
    pub fn transpose(self) -> Result<Timed<T>, E> {
        let elapsed = self.elapsed;
        self.value.map(|value| Timed { value, elapsed })
    }
}

/// Await `future` once and measure it. Single sample: no warm-up, no repetition.
pub async fn timed<F: Future>(future: F) -> Timed<F::Output> {
    let start = Instant::now();
    let value = future.await;
    Timed {
        value,
        elapsed: start.elapsed(),
    }
}

/// Run one search against `backend` and time it.
pub async fn timed_search(backend: &dyn Backend, keyword: &str) -> Result<Timed<Vec<Hit>>> {
    let hits = timed(backend.search(keyword)).await.transpose()?;
    log::debug!(
        "{} returned {} hits for {keyword:?} in {:?}",
        backend.name(),
        hits.value.len(),
        hits.elapsed
    );
    Ok(hits)
}
