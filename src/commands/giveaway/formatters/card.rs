// Default formatter for the giveaway displays and notifications
use chrono::{DateTime, Utc};

use crate::commands::giveaway::formatters::base::{GiveawayCard, GiveawayFormatter};
use crate::commands::giveaway::models::{Giveaway, RerollOutcome, UserRef};
use crate::commands::giveaway::parser::{SECONDS_IN_DAY, SECONDS_IN_HOUR, SECONDS_IN_MINUTE};

pub const NO_PARTICIPANTS_TEXT: &str = "No one participated.";

pub fn winners_label(count: usize) -> String {
    match count {
        1 => "1 winner".to_string(),
        _ => format!("{} winners", count),
    }
}

// Renders seconds as `1d 2h 3m 4s`, largest unit first. Leading units
// equal to zero are skipped; zero seconds renders as `0s`.
pub fn format_remaining(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let components = [
        (seconds / SECONDS_IN_DAY, "d"),
        (seconds % SECONDS_IN_DAY / SECONDS_IN_HOUR, "h"),
        (seconds % SECONDS_IN_HOUR / SECONDS_IN_MINUTE, "m"),
        (seconds % SECONDS_IN_MINUTE, "s"),
    ];

    let parts = components
        .iter()
        .skip_while(|(value, _)| *value == 0)
        .map(|(value, unit)| format!("{}{}", value, unit))
        .collect::<Vec<String>>();

    match parts.is_empty() {
        true => "0s".to_string(),
        false => parts.join(" "),
    }
}

fn winners_text(winners: &[UserRef]) -> String {
    match winners.is_empty() {
        true => NO_PARTICIPANTS_TEXT.to_string(),
        false => {
            let mentions = winners
                .iter()
                .map(|winner| winner.mention())
                .collect::<Vec<String>>()
                .join(", ");
            format!("Winner(s): {}", mentions)
        }
    }
}

#[derive(Debug, Default)]
pub struct DefaultGiveawayFormatter;

impl DefaultGiveawayFormatter {
    pub fn new() -> Self {
        DefaultGiveawayFormatter {}
    }
}

impl GiveawayFormatter for DefaultGiveawayFormatter {
    fn running_card(&self, giveaway: &Giveaway, now: DateTime<Utc>) -> GiveawayCard {
        let description = format!(
            "Prize: {}\n🏆 {}\n⏳ Ends in: {}\n👥 Participants: {}\n\nPress Join to participate.",
            giveaway.prize(),
            winners_label(giveaway.winner_count()),
            format_remaining(giveaway.remaining_seconds(now)),
            giveaway.participants().len(),
        );

        GiveawayCard {
            title: format!(
                "Giveaway #{} running — {}",
                giveaway.id(),
                winners_label(giveaway.winner_count())
            ),
            description,
            joinable: true,
        }
    }

    fn ended_card(&self, giveaway: &Giveaway, winners: &[UserRef]) -> GiveawayCard {
        GiveawayCard {
            title: format!(
                "Giveaway #{} ended — {}",
                giveaway.id(),
                winners_label(giveaway.winner_count())
            ),
            description: format!("Prize: {}\n{}", giveaway.prize(), winners_text(winners)),
            joinable: false,
        }
    }

    fn result_text(&self, giveaway: &Giveaway, winners: &[UserRef]) -> String {
        format!(
            "Giveaway #{} ended — Prize: {}\n{}",
            giveaway.id(),
            giveaway.prize(),
            winners_text(winners)
        )
    }

    fn reroll_text(&self, outcome: &RerollOutcome) -> String {
        format!(
            "Reroll for giveaway #{}\nNew winner: {}\nPrize: {}",
            outcome.id,
            outcome.winner.mention(),
            outcome.prize
        )
    }

    fn list_entry(&self, giveaway: &Giveaway, now: DateTime<Utc>) -> String {
        format!(
            "#{} {} [{}, participants: {}, ends in: {}]",
            giveaway.id(),
            giveaway.prize(),
            winners_label(giveaway.winner_count()),
            giveaway.participants().len(),
            format_remaining(giveaway.remaining_seconds(now)),
        )
    }
}
