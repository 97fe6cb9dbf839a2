use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::commands::giveaway::manager::GiveawayManager;
use crate::commands::giveaway::models::{EndOutcome, GiveawayId};

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SweepReport {
    // Giveaways finalized by this pass.
    pub finalized: usize,
    // Giveaways that somebody else finalized first.
    pub skipped: usize,
    pub refreshed: usize,
    pub failed: usize,
}

// Periodically refreshes the running giveaways and finalizes the expired
// ones. The next pass starts only after the previous one has completed.
pub struct Sweeper {
    manager: Arc<GiveawayManager>,
    interval: Duration,
}

impl Sweeper {
    pub fn new(manager: Arc<GiveawayManager>, interval: Duration) -> Self {
        Sweeper { manager, interval }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    pub async fn run(self) {
        info!(
            "Giveaway sweeper started, interval: {}s",
            self.interval.as_secs()
        );

        loop {
            let report = self.sweep(Utc::now()).await;
            if report != SweepReport::default() {
                debug!("Giveaway sweep finished: {:?}", report);
            }
            tokio::time::sleep(self.interval).await;
        }
    }

    // One pass over the registry. A failure for one giveaway never stops
    // the pass for the others.
    pub async fn sweep(&self, now: DateTime<Utc>) -> SweepReport {
        let mut report = SweepReport::default();

        let ids = self
            .manager
            .running()
            .iter()
            .map(|giveaway| giveaway.id())
            .collect::<Vec<GiveawayId>>();

        for id in ids {
            // Earlier steps of this pass may take a while, so read the
            // giveaway again instead of trusting the snapshot
            let giveaway = match self.manager.get_giveaway(id) {
                Ok(giveaway) => giveaway,
                Err(_) => {
                    report.skipped += 1;
                    continue;
                }
            };

            if giveaway.is_expired(now) {
                match self.manager.end(id).await {
                    EndOutcome::Ended(_) => report.finalized += 1,
                    _ => report.skipped += 1,
                }
                continue;
            }

            match self.manager.refresh_giveaway(&giveaway, now).await {
                Ok(()) => report.refreshed += 1,
                Err(err) => {
                    report.failed += 1;
                    warn!("Can't refresh the giveaway #{}: {}", id, err);
                }
            }
        }

        report
    }
}
