use std::collections::{HashSet, VecDeque};

use serde_json::Value;

use super::{
    PoolStatus,
    message::{Availability, PoolMessage},
};
use crate::{
    Actor, ActorBuilder, ActorClass, ActorId, ActorProxy, Call, Config, Error, ExitSignal,
    Mailbox, Result, message::Reply,
};

/// The pool's own actor loop. Sole owner of the worker set.
pub(crate) struct PoolManager<A: Actor> {
    id: ActorId,
    class: ActorClass<A>,
    size: usize,
    args: Vec<Value>,
    worker_config: Config,
    mailbox: Mailbox<PoolMessage>,
    idle: VecDeque<ActorProxy>,
    /// Linked workers whose exit signal hasn't been processed yet.
    live: HashSet<ActorId>,
    spawned: usize,
}

impl<A: Actor> PoolManager<A> {
    /// Spawns `size` linked workers. If any of them can't be constructed the
    /// ones already running are terminated and the error is returned.
    pub(crate) fn new(
        id: ActorId,
        class: ActorClass<A>,
        size: usize,
        args: Vec<Value>,
        worker_config: Config,
        mailbox: Mailbox<PoolMessage>,
    ) -> Result<Self> {
        let mut manager = Self {
            id,
            class,
            size,
            args,
            worker_config,
            mailbox,
            idle: VecDeque::with_capacity(size),
            live: HashSet::with_capacity(size),
            spawned: 0,
        };
        for _ in 0..size {
            if let Err(e) = manager.spawn_worker() {
                manager.shutdown();
                return Err(e);
            }
        }
        Ok(manager)
    }

    fn spawn_worker(&mut self) -> Result<()> {
        let actor = self.class.construct(&self.args)?;
        self.spawned += 1;

        let manager = self.mailbox.clone();
        let worker = ActorBuilder::new(actor)
            .name(format!("{}-{}", self.class.name(), self.spawned))
            .config(self.worker_config.clone())
            .link(move |signal: ExitSignal| {
                let _ = manager.push(PoolMessage::Available(Availability::Exit(signal)));
            })
            .spawn();

        self.live.insert(worker.id().clone());
        self.idle.push_back(worker);
        Ok(())
    }

    pub(crate) async fn run(mut self) {
        tracing::info!(pool = %self.id, class = self.class.name(), size = self.size, "worker pool started");
        while let Some(msg) = self.mailbox.recv().await {
            match msg {
                PoolMessage::Execute { call, reply } => self.execute(call, reply).await,
                PoolMessage::Available(event) => self.on_available(event),
                PoolMessage::Status(reply) => {
                    let _ = reply.send(self.status());
                }
                PoolMessage::Terminate => break,
            }
        }
        self.shutdown();
        tracing::info!(pool = %self.id, "worker pool stopped");
    }

    async fn execute(&mut self, call: Call, reply: Option<Reply>) {
        match self.provision_worker().await {
            Ok(worker) => self.dispatch(worker, call, reply),
            Err(e) => {
                if let Some(reply) = reply {
                    let _ = reply.send(Err(e));
                }
            }
        }
    }

    /// Pops the longest-idle worker, waiting for one if none is free.
    ///
    /// While waiting only availability messages are received. Other requests
    /// stay queued in the mailbox, untouched and in order.
    async fn provision_worker(&mut self) -> Result<ActorProxy> {
        loop {
            if let Some(worker) = self.idle.pop_front() {
                return Ok(worker);
            }
            if self.live.is_empty() {
                return Err(Error::NoWorkers);
            }
            match self.mailbox.recv_matching(PoolMessage::is_availability).await {
                Some(PoolMessage::Available(event)) => self.on_available(event),
                Some(_) => unreachable!("restricted receive accepts availability messages only"),
                None => return Err(Error::dead("worker pool terminated")),
            }
        }
    }

    /// Runs the call on its own task so the manager keeps serving; the
    /// outcome comes back through the mailbox.
    fn dispatch(&self, worker: ActorProxy, call: Call, reply: Option<Reply>) {
        let manager = self.mailbox.clone();
        tokio::spawn(async move {
            let result = worker.invoke(call).await;
            let done = PoolMessage::Available(Availability::Completed {
                worker,
                result,
                reply,
            });
            if let Err(done) = manager.push(done) {
                done.reject();
            }
        });
    }

    fn on_available(&mut self, event: Availability) {
        match event {
            Availability::Completed {
                worker,
                result,
                reply,
            } => self.complete(worker, result, reply),
            Availability::Exit(signal) => self.crash_handler(signal),
        }
    }

    fn complete(&mut self, worker: ActorProxy, result: Result<Value>, reply: Option<Reply>) {
        if worker.is_alive() {
            self.idle.push_back(worker);
        } else {
            tracing::debug!(pool = %self.id, worker = %worker.id(), "worker died during call, not re-queued");
        }

        match (reply, result) {
            (Some(reply), result) => {
                let _ = reply.send(result);
            }
            (None, Err(e)) => {
                tracing::debug!(pool = %self.id, error = %e, "async execute failed");
            }
            (None, Ok(_)) => {}
        }
    }

    /// Replaces crashed workers one for one. Clean exits are not replaced.
    ///
    /// Replacements are not rate limited: a worker that crashes on every
    /// start keeps being respawned.
    fn crash_handler(&mut self, signal: ExitSignal) {
        let ExitSignal { actor, reason } = signal;
        self.live.remove(&actor);
        self.idle.retain(|worker| worker.id() != &actor);

        let Some(reason) = reason else {
            tracing::debug!(pool = %self.id, worker = %actor, "worker exited cleanly, not replaced");
            return;
        };

        tracing::warn!(pool = %self.id, worker = %actor, %reason, "worker crashed, spawning replacement");
        if let Err(e) = self.spawn_worker() {
            tracing::error!(pool = %self.id, error = %e, "could not spawn replacement worker");
        }
    }

    fn status(&self) -> PoolStatus {
        PoolStatus {
            size: self.size,
            idle: self.idle.len(),
            live: self.live.len(),
        }
    }

    fn shutdown(&mut self) {
        for msg in self.mailbox.close() {
            msg.reject();
        }
        for worker in self.idle.drain(..) {
            let _ = worker.request_termination();
        }
    }
}
