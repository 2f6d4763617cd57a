//! Background move computation
//!
//! One worker thread serves requests in submission order. Each request is
//! tagged with a ticket, and only the reply to the most recent one is ever
//! handed back: submitting a new request or abandoning the current one turns
//! any reply still in flight into a stale reply that is dropped on arrival.
//! When the worker is gone (spawn failure, panic, closed channel)
//! `request_move` silently falls back to a synchronous reduced-depth search.

use anyhow::{anyhow, Result};

use std::sync::mpsc::*;
use std::thread::{self, JoinHandle};

use crate::engine::{Engine, MoveRequest};

/// Identifies one submitted request
pub type Ticket = u64;

struct Job {
    ticket: Ticket,
    request: MoveRequest,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    pub ticket: Ticket,
    pub column: Option<usize>,
}

pub struct AiWorker {
    jobs: Option<Sender<Job>>,
    replies: Receiver<Reply>,
    handle: Option<JoinHandle<()>>,
    next_ticket: Ticket,
    // the only ticket whose reply is still wanted
    latest: Option<Ticket>,
}

impl AiWorker {
    pub fn spawn() -> Result<Self> {
        Self::spawn_with(Engine::new())
    }

    /// Spawns a worker that uses `engine` for every request
    pub fn spawn_with(mut engine: Engine) -> Result<Self> {
        let (job_tx, job_rx) = channel::<Job>();
        let (reply_tx, reply_rx) = channel();

        let handle = thread::Builder::new()
            .name("connectn-ai".to_string())
            .spawn(move || {
                for job in job_rx {
                    let column = engine.choose_move(&job.request);
                    let reply = Reply {
                        ticket: job.ticket,
                        column,
                    };
                    if reply_tx.send(reply).is_err() {
                        break;
                    }
                }
                log::debug!("AI worker shutting down");
            })?;

        Ok(Self {
            jobs: Some(job_tx),
            replies: reply_rx,
            handle: Some(handle),
            next_ticket: 0,
            latest: None,
        })
    }

    /// Whether a reply is still expected for the latest request
    pub fn is_busy(&self) -> bool {
        self.latest.is_some()
    }

    /// Queues a request, superseding any request still in flight
    pub fn submit(&mut self, request: MoveRequest) -> Result<Ticket> {
        let jobs = self
            .jobs
            .as_ref()
            .ok_or_else(|| anyhow!("AI worker has shut down"))?;

        let ticket = self.next_ticket;
        jobs.send(Job { ticket, request })
            .map_err(|_| anyhow!("AI worker is no longer running"))?;
        self.next_ticket += 1;
        self.latest = Some(ticket);
        Ok(ticket)
    }

    /// Gives up on the request in flight; its reply will be dropped
    pub fn abandon(&mut self) {
        if let Some(ticket) = self.latest.take() {
            log::debug!("abandoned request {}", ticket);
        }
    }

    fn accept(&mut self, reply: Reply) -> Option<Reply> {
        if self.latest == Some(reply.ticket) {
            self.latest = None;
            Some(reply)
        } else {
            log::debug!("dropping stale reply to request {}", reply.ticket);
            None
        }
    }

    /// Blocks until the latest request resolves
    pub fn wait(&mut self) -> Result<Reply> {
        if self.latest.is_none() {
            return Err(anyhow!("no request in flight"));
        }
        loop {
            let reply = match self.replies.recv() {
                Ok(reply) => reply,
                Err(_) => {
                    self.latest = None;
                    return Err(anyhow!("AI worker stopped before replying"));
                }
            };
            if let Some(reply) = self.accept(reply) {
                return Ok(reply);
            }
        }
    }

    /// Non-blocking poll for the latest request
    pub fn try_reply(&mut self) -> Result<Option<Reply>> {
        loop {
            match self.replies.try_recv() {
                Ok(reply) => {
                    if let Some(reply) = self.accept(reply) {
                        return Ok(Some(reply));
                    }
                }
                Err(TryRecvError::Empty) => return Ok(None),
                Err(TryRecvError::Disconnected) => {
                    self.latest = None;
                    return Err(anyhow!("AI worker stopped before replying"));
                }
            }
        }
    }

    /// Submits and waits
    pub fn compute(&mut self, request: MoveRequest) -> Result<Option<usize>> {
        self.submit(request)?;
        Ok(self.wait()?.column)
    }
}

impl Drop for AiWorker {
    fn drop(&mut self) {
        // closing the job channel ends the worker loop
        self.jobs.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("AI worker panicked");
            }
        }
    }
}

/// Computes a move on the worker when one is available, otherwise (or when
/// it fails) on the calling thread at reduced depth
pub fn request_move(
    worker: Option<&mut AiWorker>,
    fallback: &mut Engine,
    request: &MoveRequest,
) -> Option<usize> {
    if let Some(worker) = worker {
        match worker.compute(request.clone()) {
            Ok(column) => return column,
            Err(err) => log::warn!("{}, falling back to a synchronous move", err),
        }
    }
    fallback.fallback_move(request)
}
