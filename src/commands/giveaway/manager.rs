use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::commands::giveaway::display::GiveawayDisplay;
use crate::commands::giveaway::formatters::{DefaultGiveawayFormatter, GiveawayFormatter};
use crate::commands::giveaway::models::{
    ChannelRef, EndOutcome, FinalizeOutcome, Giveaway, GiveawayId, RerollOutcome, ToggleOutcome,
    UserRef,
};
use crate::commands::giveaway::parser::parse_duration;
use crate::commands::giveaway::records::{Record, RecordStore};
use crate::commands::giveaway::registry::GiveawayRegistry;
use crate::commands::giveaway::strategies::{UniformDrawStrategy, WinnerStrategy};
use crate::error::{Error, Result};

// Owns the whole giveaway lifecycle: creation, membership, finalization
// and rerolls. Shared between the commands and the sweeper via `Arc`.
pub struct GiveawayManager {
    registry: GiveawayRegistry,
    records: RecordStore,
    display: Arc<dyn GiveawayDisplay>,
    // Determines the algorithm for drawing winners.
    strategy: Arc<dyn WinnerStrategy>,
    formatter: Arc<dyn GiveawayFormatter>,
}

impl GiveawayManager {
    pub fn new(display: Arc<dyn GiveawayDisplay>) -> Self {
        GiveawayManager {
            registry: GiveawayRegistry::new(),
            records: RecordStore::new(),
            display,
            strategy: Arc::new(UniformDrawStrategy::new()),
            formatter: Arc::new(DefaultGiveawayFormatter::new()),
        }
    }

    pub fn formatter(&self) -> Arc<dyn GiveawayFormatter> {
        self.formatter.clone()
    }

    // Returns copies of the running giveaways ordered by id.
    pub fn running(&self) -> Vec<Giveaway> {
        self.registry.snapshot()
    }

    pub fn get_giveaway(&self, id: GiveawayId) -> Result<Giveaway> {
        self.registry.get(id)
    }

    pub fn get_record(&self, id: GiveawayId) -> Option<Record> {
        self.records.get(id)
    }

    pub async fn start(
        &self,
        channel: ChannelRef,
        duration: &str,
        prize: &str,
        winner_count: usize,
    ) -> Result<GiveawayId> {
        self.start_at(channel, duration, prize, winner_count, Utc::now())
            .await
    }

    // Validates the input, registers the giveaway and publishes its
    // announcement. A failed announcement doesn't cancel the giveaway.
    pub async fn start_at(
        &self,
        channel: ChannelRef,
        duration: &str,
        prize: &str,
        winner_count: usize,
        now: DateTime<Utc>,
    ) -> Result<GiveawayId> {
        let duration_secs = parse_duration(duration)?;
        let prize = prize.trim();
        if prize.is_empty() {
            return Err(Error::InvalidPrize);
        }
        if winner_count == 0 {
            return Err(Error::InvalidWinnerCount);
        }

        let id = self
            .registry
            .create(channel, prize, winner_count, duration_secs, now)?;
        info!(
            "Giveaway #{} started: prize '{}', {} winner(s), ends in {}s",
            id, prize, winner_count, duration_secs
        );

        // Somebody may have ended it already, the id is still valid then
        let card = match self.registry.get(id) {
            Ok(giveaway) => self.formatter.running_card(&giveaway, now),
            Err(_) => return Ok(id),
        };
        match self.display.publish(channel, id, &card).await {
            Ok(message) => {
                // The giveaway could have been ended while publishing
                if let Err(err) = self.registry.attach_message(id, message) {
                    debug!("Announcement of giveaway #{} wasn't attached: {}", id, err);
                }
            }
            Err(err) => warn!("Can't publish the giveaway #{}: {}", id, err),
        }

        Ok(id)
    }

    pub fn toggle(&self, id: GiveawayId, user: UserRef) -> ToggleOutcome {
        let outcome = self.registry.toggle(id, user);
        debug!("User {} {} the giveaway #{}", user.0, outcome.as_str(), id);
        outcome
    }

    pub async fn refresh(&self, id: GiveawayId) -> Result<()> {
        self.refresh_at(id, Utc::now()).await
    }

    // Re-renders the running display. Never changes the registry.
    pub async fn refresh_at(&self, id: GiveawayId, now: DateTime<Utc>) -> Result<()> {
        let giveaway = self.registry.get(id)?;
        self.refresh_giveaway(&giveaway, now).await
    }

    pub(crate) async fn refresh_giveaway(
        &self,
        giveaway: &Giveaway,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let message = match giveaway.message() {
            Some(message) => message,
            None => return Ok(()),
        };

        let card = self.formatter.running_card(giveaway, now);
        self.display
            .update(giveaway.channel(), message, giveaway.id(), &card)
            .await?;

        // The giveaway could have been finalized while the running card was
        // in flight. Its ended card must stay the last one.
        if let Some(record) = self.records.get(giveaway.id()) {
            debug!(
                "Giveaway #{} ended during the refresh, restoring its ended card",
                giveaway.id()
            );
            let card = self.formatter.ended_card(giveaway, &record.winners);
            self.display
                .update(giveaway.channel(), message, giveaway.id(), &card)
                .await?;
        }

        Ok(())
    }

    // Ends the giveaway right now. Both the manual command and the sweeper
    // go through here, so only one caller ever finalizes a giveaway.
    pub async fn end(&self, id: GiveawayId) -> EndOutcome {
        if let Some(giveaway) = self.registry.take_for_finalization(id) {
            return EndOutcome::Ended(self.finalize(giveaway).await);
        }
        if !self.registry.was_issued(id) {
            return EndOutcome::NotFound;
        }

        // The id could have been issued right after the first attempt
        match self.registry.take_for_finalization(id) {
            Some(giveaway) => EndOutcome::Ended(self.finalize(giveaway).await),
            None => {
                debug!("Giveaway #{} has already been finalized", id);
                EndOutcome::AlreadyEnded
            }
        }
    }

    // Works on the giveaway detached from the registry. The record is
    // committed before any delivery, so a failed delivery loses nothing.
    async fn finalize(&self, giveaway: Giveaway) -> FinalizeOutcome {
        let winners = self
            .strategy
            .draw(giveaway.participants(), giveaway.winner_count());
        self.records.merge(&giveaway, &winners);
        info!(
            "Giveaway #{} finalized: {} participant(s), {} winner(s)",
            giveaway.id(),
            giveaway.participants().len(),
            winners.len()
        );

        if let Some(message) = giveaway.message() {
            let card = self.formatter.ended_card(&giveaway, &winners);
            if let Err(err) = self
                .display
                .update(giveaway.channel(), message, giveaway.id(), &card)
                .await
            {
                warn!("Can't update the ended giveaway #{}: {}", giveaway.id(), err);
            }
        }

        let text = self.formatter.result_text(&giveaway, &winners);
        if let Err(err) = self
            .display
            .announce(giveaway.channel(), giveaway.message(), &text)
            .await
        {
            warn!(
                "Can't announce results of the giveaway #{}: {}",
                giveaway.id(),
                err
            );
        }

        FinalizeOutcome::new(&giveaway, winners)
    }

    // Draws one more winner for an ended giveaway and posts it to the
    // giveaway's channel.
    pub async fn reroll(&self, id: GiveawayId) -> Result<RerollOutcome> {
        let outcome = self.records.reroll(id, self.strategy.as_ref())?;
        info!("Giveaway #{} rerolled, new winner: {}", id, outcome.winner.0);

        let text = self.formatter.reroll_text(&outcome);
        if let Err(err) = self
            .display
            .announce(outcome.channel, outcome.message, &text)
            .await
        {
            warn!("Can't announce the reroll of the giveaway #{}: {}", id, err);
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use chrono::Utc;

    use crate::commands::giveaway::display::testing::{GatedDisplay, RecordingDisplay};
    use crate::commands::giveaway::manager::GiveawayManager;
    use crate::commands::giveaway::models::{
        ChannelRef, EndOutcome, GiveawayId, MessageRef, ToggleOutcome, UserRef,
    };
    use crate::error::Error;

    fn get_manager() -> (Arc<RecordingDisplay>, GiveawayManager) {
        let display = Arc::new(RecordingDisplay::new());
        let manager = GiveawayManager::new(display.clone());
        (display, manager)
    }

    #[tokio::test]
    async fn test_start_giveaway() {
        let (display, manager) = get_manager();
        let id = manager.start(ChannelRef(1), "1h2m", "Gift Card", 2).await.unwrap();

        let giveaway = manager.get_giveaway(id).unwrap();
        assert_eq!(giveaway.prize(), "Gift Card");
        assert_eq!(giveaway.winner_count(), 2);
        assert_eq!(giveaway.message(), Some(MessageRef(1000)));
        assert_eq!(display.published.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_validation_errors_on_start() {
        let (display, manager) = get_manager();

        let bad_duration = manager.start(ChannelRef(1), "10", "Key", 1).await;
        assert_eq!(bad_duration.unwrap_err(), Error::InvalidDuration("10".to_string()));

        let empty_prize = manager.start(ChannelRef(1), "1h", "  ", 1).await;
        assert_eq!(empty_prize.unwrap_err(), Error::InvalidPrize);

        let no_winners = manager.start(ChannelRef(1), "1h", "Key", 0).await;
        assert_eq!(no_winners.unwrap_err(), Error::InvalidWinnerCount);

        assert_eq!(manager.running().is_empty(), true);
        assert_eq!(display.published.lock().unwrap().is_empty(), true);
    }

    #[tokio::test]
    async fn test_start_survives_failed_announcement() {
        let (display, manager) = get_manager();
        display.fail_deliveries();

        let id = manager.start(ChannelRef(1), "1h", "Key", 1).await.unwrap();
        assert_eq!(manager.get_giveaway(id).unwrap().message(), None);
    }

    #[tokio::test]
    async fn test_toggle_giveaway_participation() {
        let (_, manager) = get_manager();
        let id = manager.start(ChannelRef(1), "1h", "Key", 1).await.unwrap();

        assert_eq!(manager.toggle(id, UserRef(1)), ToggleOutcome::Joined);
        assert_eq!(manager.toggle(id, UserRef(2)), ToggleOutcome::Joined);
        assert_eq!(manager.toggle(id, UserRef(1)), ToggleOutcome::Left);
        assert_eq!(manager.toggle(GiveawayId(42), UserRef(1)), ToggleOutcome::Inactive);

        let giveaway = manager.get_giveaway(id).unwrap();
        assert_eq!(giveaway.participants().len(), 1);
        assert_eq!(giveaway.is_participant(UserRef(2)), true);
    }

    #[tokio::test]
    async fn test_refresh_updates_display() {
        let (display, manager) = get_manager();
        let id = manager.start(ChannelRef(1), "1h", "Key", 1).await.unwrap();
        manager.toggle(id, UserRef(1));

        manager.refresh(id).await.unwrap();
        let updates = display.updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].2.description.contains("Participants: 1"), true);
        assert_eq!(updates[0].2.joinable, true);
    }

    #[tokio::test]
    async fn test_get_error_on_refresh_for_unknown_giveaway() {
        let (_, manager) = get_manager();
        let result = manager.refresh(GiveawayId(3)).await;

        assert_eq!(result.unwrap_err(), Error::GiveawayNotFound(3));
    }

    #[tokio::test]
    async fn test_end_giveaway_without_participants() {
        let (display, manager) = get_manager();
        let id = manager.start(ChannelRef(1), "1h", "Key", 1).await.unwrap();

        let outcome = match manager.end(id).await {
            EndOutcome::Ended(outcome) => outcome,
            other => panic!("Unexpected outcome: {:?}", other),
        };
        assert_eq!(outcome.winners.is_empty(), true);
        assert_eq!(outcome.participants, 0);

        let announcements = display.announcements();
        assert_eq!(announcements.len(), 1);
        assert_eq!(announcements[0].contains("No one participated."), true);

        let record = manager.get_record(id).unwrap();
        assert_eq!(record.won.is_empty(), true);
    }

    #[tokio::test]
    async fn test_end_draws_distinct_winners() {
        let (display, manager) = get_manager();
        let id = manager.start(ChannelRef(1), "1h", "Key", 3).await.unwrap();
        for user in 1..=5 {
            manager.toggle(id, UserRef(user));
        }

        let outcome = match manager.end(id).await {
            EndOutcome::Ended(outcome) => outcome,
            other => panic!("Unexpected outcome: {:?}", other),
        };
        let winners = outcome.winners.iter().copied().collect::<HashSet<UserRef>>();
        assert_eq!(outcome.winners.len(), 3);
        assert_eq!(winners.len(), 3);
        assert_eq!(winners.iter().all(|user| (1..=5).contains(&user.0)), true);

        // The announcement was switched to the ended state
        let updates = display.updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].2.joinable, false);

        let record = manager.get_record(id).unwrap();
        assert_eq!(record.participants.len(), 5);
        assert_eq!(record.won, winners);
    }

    #[tokio::test]
    async fn test_end_twice() {
        let (display, manager) = get_manager();
        let id = manager.start(ChannelRef(1), "1h", "Key", 1).await.unwrap();

        assert_eq!(matches!(manager.end(id).await, EndOutcome::Ended(_)), true);
        assert_eq!(manager.end(id).await, EndOutcome::AlreadyEnded);
        assert_eq!(manager.end(GiveawayId(100)).await, EndOutcome::NotFound);
        assert_eq!(display.announcements().len(), 1);
    }

    #[tokio::test]
    async fn test_toggle_after_end_is_inactive() {
        let (_, manager) = get_manager();
        let id = manager.start(ChannelRef(1), "1h", "Key", 1).await.unwrap();
        manager.end(id).await;

        assert_eq!(manager.toggle(id, UserRef(1)), ToggleOutcome::Inactive);
    }

    #[tokio::test]
    async fn test_record_is_kept_when_delivery_fails() {
        let (display, manager) = get_manager();
        let id = manager.start(ChannelRef(1), "1h", "Key", 1).await.unwrap();
        manager.toggle(id, UserRef(7));
        display.fail_deliveries();

        let outcome = match manager.end(id).await {
            EndOutcome::Ended(outcome) => outcome,
            other => panic!("Unexpected outcome: {:?}", other),
        };
        assert_eq!(outcome.winners, vec![UserRef(7)]);

        let record = manager.get_record(id).unwrap();
        assert_eq!(record.won.contains(&UserRef(7)), true);
        assert_eq!(display.announcements().is_empty(), true);
    }

    #[tokio::test]
    async fn test_reroll_giveaway() {
        let (display, manager) = get_manager();
        let id = manager.start(ChannelRef(1), "1h", "Gift Card", 1).await.unwrap();
        for user in 1..=3 {
            manager.toggle(id, UserRef(user));
        }
        let first = match manager.end(id).await {
            EndOutcome::Ended(outcome) => outcome.winners[0],
            other => panic!("Unexpected outcome: {:?}", other),
        };

        let second = manager.reroll(id).await.unwrap();
        let third = manager.reroll(id).await.unwrap();
        let drawn = [first, second.winner, third.winner]
            .into_iter()
            .collect::<HashSet<UserRef>>();
        assert_eq!(drawn.len(), 3);
        assert_eq!(second.prize, "Gift Card");

        let result = manager.reroll(id).await;
        assert_eq!(result.unwrap_err(), Error::NoEligibleParticipants);

        // One result message plus two rerolls
        let announcements = display.announcements();
        assert_eq!(announcements.len(), 3);
        assert_eq!(announcements[1].contains("Prize: Gift Card"), true);
    }

    #[tokio::test]
    async fn test_get_error_on_reroll_for_running_giveaway() {
        let (_, manager) = get_manager();
        let id = manager.start(ChannelRef(1), "1h", "Key", 1).await.unwrap();
        manager.toggle(id, UserRef(1));

        let result = manager.reroll(id).await;
        assert_eq!(result.unwrap_err(), Error::UnknownGiveaway(id.get()));
    }

    #[tokio::test]
    async fn test_start_at_uses_given_time() {
        let (_, manager) = get_manager();
        let now = Utc::now();
        let id = manager
            .start_at(ChannelRef(1), "1h2m", "Key", 1, now)
            .await
            .unwrap();

        let giveaway = manager.get_giveaway(id).unwrap();
        assert_eq!(giveaway.created_at(), now);
        assert_eq!(giveaway.remaining_seconds(now), 3720);
    }

    #[tokio::test]
    async fn test_result_and_reroll_reply_to_announcement() {
        let (display, manager) = get_manager();
        let id = manager.start(ChannelRef(1), "1h", "Key", 1).await.unwrap();
        manager.toggle(id, UserRef(1));
        manager.toggle(id, UserRef(2));

        manager.end(id).await;
        manager.reroll(id).await.unwrap();
        assert_eq!(
            display.replies(),
            vec![Some(MessageRef(1000)), Some(MessageRef(1000))]
        );
    }

    #[tokio::test]
    async fn test_refresh_racing_end_keeps_ended_card() {
        let display = Arc::new(GatedDisplay::new());
        let manager = Arc::new(GiveawayManager::new(display.clone()));
        let id = manager.start(ChannelRef(1), "1h", "Key", 1).await.unwrap();
        manager.toggle(id, UserRef(1));

        let refresh = {
            let manager = manager.clone();
            tokio::spawn(async move { manager.refresh(id).await })
        };
        display.wait_for_update().await;
        assert_eq!(matches!(manager.end(id).await, EndOutcome::Ended(_)), true);
        display.release();
        refresh.await.unwrap().unwrap();

        let updates = display.inner.updates();
        let (_, message, card) = updates.last().unwrap();
        assert_eq!(*message, MessageRef(1000));
        assert_eq!(card.joinable, false);
        assert_eq!(card.description.contains("Winner(s): <@1>"), true);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_toggles_racing_end_are_drawn_or_inactive() {
        for _ in 0..10 {
            let (_, manager) = get_manager();
            let manager = Arc::new(manager);
            let id = manager.start(ChannelRef(1), "1h", "Key", 1).await.unwrap();

            let handles = (0..4)
                .map(|worker| {
                    let manager = manager.clone();
                    tokio::spawn(async move {
                        let mut outcomes = Vec::new();
                        for user in 0..100 {
                            let user = UserRef(worker * 1000 + user);
                            outcomes.push((user, manager.toggle(id, user)));
                            tokio::task::yield_now().await;
                        }
                        outcomes
                    })
                })
                .collect::<Vec<_>>();
            tokio::task::yield_now().await;
            assert_eq!(matches!(manager.end(id).await, EndOutcome::Ended(_)), true);

            let mut joined = HashSet::new();
            for handle in handles {
                let outcomes = handle.await.unwrap();
                let first_inactive = outcomes
                    .iter()
                    .position(|(_, outcome)| *outcome == ToggleOutcome::Inactive)
                    .unwrap_or(outcomes.len());
                assert_eq!(
                    outcomes[first_inactive..]
                        .iter()
                        .all(|(_, outcome)| *outcome == ToggleOutcome::Inactive),
                    true
                );
                joined.extend(
                    outcomes
                        .iter()
                        .filter(|(_, outcome)| *outcome == ToggleOutcome::Joined)
                        .map(|(user, _)| *user),
                );
            }

            let record = manager.get_record(id).unwrap();
            assert_eq!(record.participants, joined);
            assert_eq!(manager.toggle(id, UserRef(1)), ToggleOutcome::Inactive);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_end_during_creation_finalizes_new_giveaway() {
        for _ in 0..20 {
            let (_, manager) = get_manager();
            let manager = Arc::new(manager);

            let creator = {
                let manager = manager.clone();
                tokio::spawn(async move { manager.start(ChannelRef(1), "1h", "Key", 1).await })
            };
            let outcome = loop {
                match manager.end(GiveawayId(1)).await {
                    EndOutcome::NotFound => tokio::task::yield_now().await,
                    outcome => break outcome,
                }
            };

            assert_eq!(matches!(outcome, EndOutcome::Ended(_)), true);
            assert_eq!(creator.await.unwrap().unwrap(), GiveawayId(1));
            assert_eq!(manager.running().is_empty(), true);
        }
    }
}
