use std::time::Duration;

use serde_json::{Value, json};
use troupe::{Actor, ActorClass, Call, Context, Error, PoolConfig, Result, WorkerPool};

// A worker that doubles numbers and occasionally crashes
struct Doubler;

impl Actor for Doubler {
    fn methods(&self) -> &'static [&'static str] {
        METHODS
    }

    async fn handle_call(&mut self, call: &Call, ctx: &Context) -> Result<Value> {
        match call.method() {
            "process" => {
                let n = call.arg::<i64>(0)?;
                tokio::time::sleep(Duration::from_millis(10)).await;
                println!("{} doubled {n}", ctx.name());
                Ok(json!(n * 2))
            }
            "crash" => Err(Error::external("simulated failure")),
            _ => Err(Error::NoSuchMethod {
                class: self.class_name().into(),
                method: call.method().into(),
            }),
        }
    }
}

const METHODS: &[&str] = &["process", "crash"];

#[tokio::main]
async fn main() -> Result {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let class = ActorClass::new("Doubler", METHODS, |_args: &[Value]| Ok(Doubler));
    let pool = WorkerPool::new(class, PoolConfig::default().with_size(2))?;

    let (a, b) = tokio::join!(
        pool.execute(Call::new("process").with_arg(5)),
        pool.execute(Call::new("process").with_arg(7)),
    );
    println!("results: {} {}", a?, b?);

    // Cast: returns immediately, the result is discarded
    pool.forward(Call::new("process!").with_arg(100)).await?;

    // The crashed worker is replaced behind the scenes
    if let Err(e) = pool.execute("crash").await {
        println!("worker failed: {e}");
    }
    tokio::time::sleep(Duration::from_millis(50)).await;
    println!("status: {:?}", pool.status().await?);

    let future = pool.execute_future(Call::new("process").with_arg(21))?;
    println!("future resolved to {}", future.await?);

    pool.terminate_and_wait().await
}
