//! Bounded FIFO queue that runs indexing jobs one at a time.
//!
//! The indexer reads a single shared config file, so jobs must never run
//! concurrently. One consumer loop owns that file for the process lifetime;
//! when the queue is full, producers (the HTTP handlers) either wait for a
//! slot or fail fast, per the configured [`OverflowPolicy`].

use std::future::Future;

use futures::channel::mpsc::{channel, Receiver, Sender};
use futures::{SinkExt, StreamExt};
use thiserror::Error;

/// A unit of work the consumer loop can run to completion.
pub(crate) trait Job: Send + 'static {
    type Error: std::fmt::Display;

    fn run(&self) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// Queue entry: a job, or the sentinel that ends the consumer loop.
pub(crate) enum Task<J> {
    Run(J),
    Stop,
}

/// What `submit` does when the queue is at capacity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum OverflowPolicy {
    /// Wait for a slot, holding up the webhook response
    Block,
    /// Fail fast so the caller can ask GitHub to redeliver later
    Reject,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum SubmitError {
    #[error("task queue is full")]
    Full,
    #[error("task queue is closed")]
    Closed,
}

/// Submission handle. Cloned into every HTTP handler invocation.
pub(crate) struct TaskQueue<J> {
    sender: Sender<Task<J>>,
    policy: OverflowPolicy,
}

// Not derived: `Sender` is `Clone` regardless of `J`.
impl<J> Clone for TaskQueue<J> {
    fn clone(&self) -> Self {
        TaskQueue {
            sender: self.sender.clone(),
            policy: self.policy,
        }
    }
}

impl<J: Job> TaskQueue<J> {
    pub(crate) fn channel(capacity: usize, policy: OverflowPolicy) -> (Self, Receiver<Task<J>>) {
        let (sender, receiver) = channel(capacity);
        (TaskQueue { sender, policy }, receiver)
    }

    /// Enqueues `job` at the tail. When the queue is full, blocks or fails
    /// per the configured [`OverflowPolicy`].
    pub(crate) async fn submit(&mut self, job: J) -> Result<(), SubmitError> {
        match self.policy {
            OverflowPolicy::Block => self
                .sender
                .send(Task::Run(job))
                .await
                .map_err(|_| SubmitError::Closed),
            OverflowPolicy::Reject => self.sender.try_send(Task::Run(job)).map_err(|error| {
                if error.is_full() {
                    SubmitError::Full
                } else {
                    SubmitError::Closed
                }
            }),
        }
    }

    /// Enqueues the stop sentinel, waiting for space regardless of policy;
    /// shutdown must not be droppable. Jobs submitted before it still drain.
    pub(crate) async fn stop(&mut self) -> Result<(), SubmitError> {
        self.sender
            .send(Task::Stop)
            .await
            .map_err(|_| SubmitError::Closed)
    }
}

/// Consumer loop. Runs each job to completion before dequeuing the next;
/// exits on the stop sentinel or when every sender is gone. A failed job is
/// logged and does not affect the loop or later jobs.
pub(crate) async fn consume<J: Job>(mut receiver: Receiver<Task<J>>) {
    while let Some(task) = receiver.next().await {
        match task {
            Task::Run(job) => {
                if let Err(error) = job.run().await {
                    tracing::error!("indexing job failed: {error}");
                }
            }
            Task::Stop => break,
        }
    }
}
