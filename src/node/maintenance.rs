use crate::node::ChordNode;
use log::{error, info};
use std::{sync::Arc, time::Duration};
use tokio::time;

/// Starts the periodic stabilization and finger refresh of `node`.
///
/// Rounds are skipped while the node simulates a crash. Returns a function
/// that stops both loops.
pub fn start(node: Arc<ChordNode>) -> impl FnOnce() {
    let stabilizer = {
        let node = node.clone();
        let period = node.config().stabilize_interval;

        tokio::spawn(async move {
            let mut ticker = interval(period);

            loop {
                ticker.tick().await;

                if node.fault().is_crashed() {
                    continue;
                }

                if let Err(e) = node.stabilize().await {
                    error!("error stabilizing: {e}");
                }

                node.check_predecessor().await;
            }
        })
    };

    let finger_fixer = (node.config().finger_count > 0).then(|| {
        let node = node.clone();
        let period = node.config().fix_fingers_interval;

        tokio::spawn(async move {
            let mut ticker = interval(period);

            loop {
                ticker.tick().await;

                if !node.fault().is_crashed() {
                    node.fix_fingers().await;
                }
            }
        })
    });

    info!("ring maintenance started");

    move || {
        stabilizer.abort();
        if let Some(task) = finger_fixer {
            task.abort();
        }
        info!("ring maintenance stopped");
    }
}

fn interval(period: Duration) -> time::Interval {
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
    ticker
}
