//! Timer-driven scenarios on a paused tokio clock
//!
//! Hooked futures are `!Send`, so everything runs inside a `LocalSet`.

use std::time::Duration;

use hooked_runtime::Hooked;
use tokio::task::{self, LocalSet};
use tokio::time::sleep;

use crate::Recorder;

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

/// Broadcasts 1000, 2000 and 3000 on a schedule, then resolves
fn ticking() -> Hooked<&'static str, u32> {
    Hooked::from_task(|hooks| async move {
        sleep(ms(1000)).await;
        hooks.broadcast("broadcast", 1000u32);
        sleep(ms(2000)).await;
        hooks.broadcast("broadcast", 2000u32);
        sleep(ms(3000)).await;
        hooks.broadcast("broadcast", 3000u32);
        Ok("result")
    })
}

#[tokio::test(start_paused = true)]
async fn test_broadcast_travels_both_ways_over_time() {
    LocalSet::new()
        .run_until(async {
            let wrapped = ticking();
            let upstream = Recorder::<u32>::new();
            wrapped.on("broadcast", upstream.listener());

            let chained = wrapped.then(|value, hooks| async move {
                sleep(ms(4000)).await;
                hooks.broadcast("broadcast", 4000u32);
                Ok(value.to_uppercase())
            });
            let downstream = Recorder::<u32>::new();
            chained.on("broadcast", downstream.listener());

            let running = task::spawn_local(chained.clone());

            sleep(ms(1500)).await;
            assert_eq!(upstream.values(), vec![1000]);
            assert_eq!(downstream.values(), vec![1000]);

            sleep(ms(2000)).await;
            assert_eq!(upstream.values(), vec![1000, 2000]);
            assert_eq!(downstream.values(), vec![1000, 2000]);

            sleep(ms(3000)).await;
            assert_eq!(upstream.values(), vec![1000, 2000, 3000]);
            assert!(!chained.is_settled());

            assert_eq!(running.await.unwrap().unwrap(), "RESULT");
            assert_eq!(wrapped.await.unwrap(), "result");
            assert_eq!(upstream.values(), vec![1000, 2000, 3000, 4000]);
            assert_eq!(downstream.values(), vec![1000, 2000, 3000, 4000]);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_separate_chains_hear_only_their_own_broadcasts() {
    LocalSet::new()
        .run_until(async {
            let wrapped: Hooked<&'static str, String> = Hooked::resolved("result");
            let parent = Recorder::<String>::new();
            wrapped.on("broadcast", parent.listener());

            let first = wrapped.then(|value, hooks| async move {
                sleep(ms(1000)).await;
                hooks.broadcast("broadcast", "chained1".to_string());
                Ok(value.to_uppercase())
            });
            let second = wrapped.then(|value, hooks| async move {
                sleep(ms(2000)).await;
                hooks.broadcast("broadcast", "chained2".to_string());
                Ok(value.to_string())
            });
            let (first_seen, second_seen) = (Recorder::<String>::new(), Recorder::<String>::new());
            first.on("broadcast", first_seen.listener());
            second.on("broadcast", second_seen.listener());

            let first = task::spawn_local(first);
            let second = task::spawn_local(second);
            assert_eq!(first.await.unwrap().unwrap(), "RESULT");
            assert_eq!(second.await.unwrap().unwrap(), "result");

            assert_eq!(parent.values(), vec!["chained1", "chained2"]);
            assert_eq!(first_seen.values(), vec!["chained1"]);
            assert_eq!(second_seen.values(), vec!["chained2"]);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_emit_stays_downstream_over_time() {
    LocalSet::new()
        .run_until(async {
            let wrapped: Hooked<u32, u32> = Hooked::resolved(1);
            let parent = Recorder::<u32>::new();
            wrapped.on("emit", parent.listener());

            let chained = wrapped.then(|value, hooks| async move {
                sleep(ms(4000)).await;
                hooks.emit("emit", 4000u32);
                Ok(value)
            });
            let child = Recorder::<u32>::new();
            chained.on("emit", child.listener());

            let grandchild = chained.chain();
            let below = Recorder::<u32>::new();
            grandchild.on("emit", below.listener());

            assert_eq!(task::spawn_local(grandchild).await.unwrap().unwrap(), 1);
            assert!(parent.is_empty());
            assert_eq!(child.values(), vec![4000]);
            assert_eq!(below.values(), vec![4000]);
        })
        .await;
}
