///! Spawn / record / join harness shared by every collector
///!
///! Each spawned unit of work gets its own `Recorder`, a clone of one channel
///! sender. The consumer drains the channel until every sender is gone, which
///! happens when the last task finishes, bails out early or unwinds from a
///! panic. Nested fan-out hands clones of the parent's recorder to its
///! children and waits for them before the parent finishes.

use std::future::Future;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error};

use crate::metric::Observation;

const CHANNEL_CAPACITY: usize = 256;

/// Recording handle owned by one unit of work
#[derive(Clone)]
pub struct Recorder {
    tx: mpsc::Sender<Observation>,
}

impl Recorder {
    pub async fn record(&self, observation: Observation) {
        // Only fails once the consumer is gone, at which point nobody wants the value.
        let _ = self.tx.send(observation).await;
    }

    pub async fn record_all(&self, observations: impl IntoIterator<Item = Observation>) {
        for observation in observations {
            self.record(observation).await;
        }
    }

    /// Run `work` for every item concurrently and wait until all of them finish
    ///
    /// Returns the number of units that completed without panicking.
    pub async fn fan_out<I, F, Fut>(&self, items: Vec<I>, work: F) -> usize
    where
        F: Fn(I, Recorder) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut tasks = JoinSet::new();
        for item in items {
            tasks.spawn(work(item, self.clone()));
        }

        join_all(tasks).await.0
    }
}

/// Outcome of one top-level fan-out
#[derive(Debug, Default)]
pub struct Collected {
    pub observations: Vec<Observation>,
    pub completed: usize,
    pub panicked: usize,
}

/// Spawn `work` once per item, gather everything recorded, then join
pub async fn collect_all<I, F, Fut>(items: Vec<I>, work: F) -> Collected
where
    F: Fn(I, Recorder) -> Fut,
    Fut: Future<Output = ()> + Send + 'static,
{
    let (tx, mut rx) = mpsc::channel(CHANNEL_CAPACITY);
    let mut tasks = JoinSet::new();

    for item in items {
        tasks.spawn(work(item, Recorder { tx: tx.clone() }));
    }
    drop(tx);

    let mut observations = Vec::new();
    while let Some(observation) = rx.recv().await {
        observations.push(observation);
    }

    let (completed, panicked) = join_all(tasks).await;
    debug!(
        "Fan-out finished: {} tasks completed, {} observations",
        completed,
        observations.len()
    );

    Collected {
        observations,
        completed,
        panicked,
    }
}

async fn join_all(mut tasks: JoinSet<()>) -> (usize, usize) {
    let mut completed = 0;
    let mut panicked = 0;

    while let Some(result) = tasks.join_next().await {
        match result {
            Ok(()) => completed += 1,
            Err(e) if e.is_panic() => {
                error!("Collection task panicked: {}", e);
                panicked += 1;
            }
            Err(e) => error!("Collection task did not finish: {}", e),
        }
    }

    (completed, panicked)
}
