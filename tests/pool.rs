use std::{
    collections::HashSet,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use serde_json::{Value, json};
use tokio::{
    sync::{Barrier, Semaphore},
    time::{sleep, timeout},
};
use troupe::{
    Actor, ActorClass, Call, Context, Error, PoolConfig, PoolStatus, Result, WorkerPool,
};

const WAIT: Duration = Duration::from_secs(2);

struct Doubler {
    factor: i64,
    barrier: Arc<Barrier>,
    gate: Arc<Semaphore>,
}

impl Actor for Doubler {
    fn methods(&self) -> &'static [&'static str] {
        METHODS
    }

    async fn handle_call(&mut self, call: &Call, ctx: &Context) -> Result<Value> {
        match call.method() {
            "process" => Ok(json!(call.arg::<i64>(0)? * self.factor)),
            "whoami" => Ok(json!(ctx.name())),
            "rendezvous" => {
                self.barrier.wait().await;
                Ok(json!(ctx.name()))
            }
            "hold" => {
                let permit = self.gate.acquire().await.map_err(Error::external)?;
                permit.forget();
                Ok(json!(ctx.name()))
            }
            "crash" => Err(Error::external("boom")),
            "quit" => {
                ctx.stop();
                Ok(Value::Null)
            }
            _ => Err(Error::NoSuchMethod {
                class: self.class_name().into(),
                method: call.method().into(),
            }),
        }
    }
}

const METHODS: &[&str] = &["process", "whoami", "rendezvous", "hold", "crash", "quit"];

struct Fixture {
    class: ActorClass<Doubler>,
    constructed: Arc<AtomicUsize>,
    gate: Arc<Semaphore>,
}

fn doubler_class(barrier_size: usize) -> Fixture {
    let constructed = Arc::new(AtomicUsize::new(0));
    let barrier = Arc::new(Barrier::new(barrier_size));
    let gate = Arc::new(Semaphore::new(0));

    let counter = constructed.clone();
    let (b, g) = (barrier.clone(), gate.clone());
    let class = ActorClass::new("Doubler", METHODS, move |args: &[Value]| {
        counter.fetch_add(1, Ordering::SeqCst);
        let factor = match args.first() {
            Some(v) => v
                .as_i64()
                .ok_or_else(|| Error::InvalidArgument(format!("factor: {v}")))?,
            None => 2,
        };
        Ok(Doubler {
            factor,
            barrier: b.clone(),
            gate: g.clone(),
        })
    });

    Fixture {
        class,
        constructed,
        gate,
    }
}

fn pool_of(fx: &Fixture, size: usize) -> WorkerPool {
    WorkerPool::new(fx.class.clone(), PoolConfig::default().with_size(size)).unwrap()
}

async fn wait_for_status(pool: &WorkerPool, pred: impl Fn(&PoolStatus) -> bool) -> PoolStatus {
    timeout(WAIT, async {
        loop {
            let status = pool.status().await.unwrap();
            if pred(&status) {
                return status;
            }
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("pool status condition not met in time")
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_executes_on_pool_of_two() {
    let fx = doubler_class(1);
    let pool = pool_of(&fx, 2);

    let (a, b) = tokio::join!(
        pool.execute(Call::new("process").with_arg(5)),
        pool.execute(Call::new("process").with_arg(7)),
    );
    assert_eq!(a.unwrap(), json!(10));
    assert_eq!(b.unwrap(), json!(14));

    let status = pool.status().await.unwrap();
    assert_eq!(
        status,
        PoolStatus {
            size: 2,
            idle: 2,
            live: 2
        }
    );
}

#[tokio::test]
async fn test_pool_smaller_than_two_is_rejected_before_spawning() {
    let fx = doubler_class(1);
    for size in [0, 1] {
        let err = WorkerPool::new(fx.class.clone(), PoolConfig::default().with_size(size))
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)), "{err}");
    }
    assert_eq!(fx.constructed.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_default_size_is_at_least_two() {
    let fx = doubler_class(1);
    let pool = WorkerPool::new(fx.class.clone(), PoolConfig::default()).unwrap();
    assert!(pool.size() >= 2);
    assert_eq!(fx.constructed.load(Ordering::SeqCst), pool.size());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_no_worker_is_borrowed_twice() {
    let fx = doubler_class(3);
    let pool = pool_of(&fx, 3);

    // Every call blocks until all three are inside a worker, which is only
    // possible if each got its own worker.
    let calls: Vec<_> = (0..3)
        .map(|_| {
            let pool = pool.clone();
            tokio::spawn(async move { pool.execute("rendezvous").await })
        })
        .collect();

    let mut names = HashSet::new();
    for call in calls {
        let name = timeout(WAIT, call).await.unwrap().unwrap().unwrap();
        names.insert(name.as_str().unwrap().to_owned());
    }
    assert_eq!(names.len(), 3);
}

#[tokio::test]
async fn test_workers_return_to_the_tail_exactly_once() {
    let fx = doubler_class(1);
    let pool = pool_of(&fx, 2);

    let mut names = Vec::new();
    for _ in 0..6 {
        let name = pool.execute("whoami").await.unwrap();
        names.push(name.as_str().unwrap().to_owned());
    }
    assert_ne!(names[0], names[1]);
    for pair in names.chunks(2) {
        assert_eq!(pair, &names[..2]);
    }

    let status = pool.status().await.unwrap();
    assert_eq!(status.idle, 2);
    assert_eq!(status.live, 2);
}

#[tokio::test]
async fn test_crashed_worker_is_replaced() {
    let fx = doubler_class(1);
    let pool = pool_of(&fx, 2);

    let err = pool.execute("crash").await.unwrap_err();
    assert_eq!(err, Error::external("boom"));

    let status = wait_for_status(&pool, |s| s.idle == 2 && s.live == 2).await;
    assert_eq!(status.size, 2);
    assert_eq!(fx.constructed.load(Ordering::SeqCst), 3);

    // The manager survived the failure and the replacement works.
    let mut names = HashSet::new();
    for _ in 0..2 {
        let name = pool.execute("whoami").await.unwrap();
        names.insert(name.as_str().unwrap().to_owned());
    }
    assert!(names.contains("Doubler-3"));
}

#[tokio::test]
async fn test_unknown_method_does_not_cost_a_worker() {
    let fx = doubler_class(1);
    let pool = pool_of(&fx, 2);

    let err = pool.execute(Call::new("proces").with_arg(5)).await.unwrap_err();
    assert!(matches!(err, Error::NoSuchMethod { .. }), "{err}");
    let err = pool.execute(Call::new("process").with_arg("five")).await.unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)), "{err}");

    let status = pool.status().await.unwrap();
    assert_eq!((status.idle, status.live), (2, 2));
    assert_eq!(fx.constructed.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_cleanly_exited_worker_is_not_replaced() {
    let fx = doubler_class(1);
    let pool = pool_of(&fx, 2);

    pool.execute("quit").await.unwrap();
    let status = wait_for_status(&pool, |s| s.live == 1).await;
    assert_eq!(status.idle, 1);

    sleep(Duration::from_millis(20)).await;
    assert_eq!(fx.constructed.load(Ordering::SeqCst), 2);
    assert_eq!(pool.execute(Call::new("process").with_arg(4)).await.unwrap(), json!(8));
}

#[tokio::test]
async fn test_pool_without_live_workers_fails_fast() {
    let fx = doubler_class(1);
    let pool = pool_of(&fx, 2);

    pool.execute("quit").await.unwrap();
    pool.execute("quit").await.unwrap();
    wait_for_status(&pool, |s| s.live == 0).await;

    let err = pool.execute(Call::new("process").with_arg(1)).await.unwrap_err();
    assert_eq!(err, Error::NoWorkers);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_saturation_queues_requests_at_the_mailbox() {
    let fx = doubler_class(1);
    let pool = pool_of(&fx, 2);

    let held: Vec<_> = (0..3)
        .map(|_| {
            let pool = pool.clone();
            tokio::spawn(async move { pool.execute("hold").await })
        })
        .collect();
    sleep(Duration::from_millis(50)).await;

    // The manager waits for a worker and leaves the status request queued.
    let status = {
        let pool = pool.clone();
        tokio::spawn(async move { pool.status().await })
    };
    sleep(Duration::from_millis(50)).await;
    assert!(held.iter().all(|h| !h.is_finished()));
    assert!(!status.is_finished());

    fx.gate.add_permits(3);
    for handle in held {
        timeout(WAIT, handle).await.unwrap().unwrap().unwrap();
    }
    let status = timeout(WAIT, status).await.unwrap().unwrap().unwrap();
    assert_eq!(status.live, 2);
}

#[tokio::test]
async fn test_spawn_args_are_replayed_on_respawn() {
    let fx = doubler_class(1);
    let pool = WorkerPool::new(
        fx.class.clone(),
        PoolConfig::default().with_size(2).with_arg(3),
    )
    .unwrap();

    assert_eq!(pool.execute(Call::new("process").with_arg(5)).await.unwrap(), json!(15));
    pool.execute("crash").await.unwrap_err();
    wait_for_status(&pool, |s| s.live == 2 && s.idle == 2).await;

    for _ in 0..2 {
        let value = pool.execute(Call::new("process").with_arg(5)).await.unwrap();
        assert_eq!(value, json!(15));
    }
}

#[tokio::test]
async fn test_failing_factory_fails_construction() {
    let fx = doubler_class(1);
    let err = WorkerPool::new(
        fx.class.clone(),
        PoolConfig::default().with_size(2).with_arg("not a number"),
    )
    .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
}

#[tokio::test]
async fn test_forwarding_by_method_name() {
    let fx = doubler_class(1);
    let pool = pool_of(&fx, 2);

    assert!(pool.responds_to("process"));
    assert!(pool.responds_to("inspect"));
    assert!(!pool.responds_to("triple"));
    assert_eq!(pool.forward("class").await.unwrap(), json!("Doubler"));
    assert_eq!(pool.forward(Call::new("process").with_arg(4)).await.unwrap(), json!(8));
    assert_eq!(pool.forward(Call::new("process!").with_arg(4)).await.unwrap(), Value::Null);

    let err = pool.forward(Call::new("triple").with_arg(4)).await.unwrap_err();
    assert!(matches!(err, Error::UnsupportedOperation { .. }), "{err}");
    let err = pool.forward("triple!").await.unwrap_err();
    assert!(matches!(err, Error::UnsupportedOperation { .. }), "{err}");

    assert_eq!(fx.constructed.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_execute_future() {
    let fx = doubler_class(1);
    let pool = pool_of(&fx, 2);
    let future = pool.execute_future(Call::new("process").with_arg(21)).unwrap();
    assert_eq!(future.await.unwrap(), json!(42));
}

#[tokio::test]
async fn test_terminated_pool() {
    let fx = doubler_class(1);
    let pool = pool_of(&fx, 2);
    assert!(pool.is_alive());

    timeout(WAIT, pool.terminate_and_wait()).await.unwrap().unwrap();
    assert!(!pool.is_alive());

    let err = pool.execute(Call::new("process").with_arg(1)).await.unwrap_err();
    assert!(err.is_dead_actor());
    assert!(pool.status().await.unwrap_err().is_dead_actor());
    assert!(pool.request_termination().unwrap_err().is_dead_actor());
}
