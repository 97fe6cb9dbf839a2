use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{Error, Result};

pub const SECONDS_IN_MINUTE: i64 = 60;
pub const SECONDS_IN_HOUR: i64 = 60 * SECONDS_IN_MINUTE;
pub const SECONDS_IN_DAY: i64 = 24 * SECONDS_IN_HOUR;

lazy_static! {
    static ref DURATION_REGEX: Regex = Regex::new(r"^(?:[0-9]+[dhm])+$").unwrap();
    static ref DURATION_PART_REGEX: Regex =
        Regex::new(r"(?P<value>[0-9]+)(?P<unit>[dhm])").unwrap();
}

#[readonly::make]
#[derive(Debug, Eq, PartialEq)]
pub struct ParsedPrize {
    pub prize: String,
    pub winner_count: usize,
}

// Converts a compact token like `1d2h30m` into a number of seconds.
pub fn parse_duration(token: &str) -> Result<i64> {
    let invalid = || Error::InvalidDuration(token.to_string());
    let normalized = token.trim().to_lowercase();

    if !DURATION_REGEX.is_match(&normalized) {
        return Err(invalid());
    }

    let mut total: i64 = 0;
    for captures in DURATION_PART_REGEX.captures_iter(&normalized) {
        let value = captures["value"].parse::<i64>().map_err(|_| invalid())?;
        let unit = match &captures["unit"] {
            "d" => SECONDS_IN_DAY,
            "h" => SECONDS_IN_HOUR,
            _ => SECONDS_IN_MINUTE,
        };

        total = value
            .checked_mul(unit)
            .and_then(|seconds| total.checked_add(seconds))
            .ok_or_else(invalid)?;
    }

    match total > 0 {
        true => Ok(total),
        false => Err(invalid()),
    }
}

// Splits the `<prize> [winners]` part of the start command. A trailing
// number is treated as the winner count, the rest is the prize.
pub fn parse_prize(text: &str) -> Result<ParsedPrize> {
    let mut parts = text.split_whitespace().collect::<Vec<&str>>();

    let winner_count = match parts.last() {
        Some(last) if last.chars().all(|ch| ch.is_ascii_digit()) => {
            let value = last
                .parse::<usize>()
                .map_err(|_| Error::InvalidWinnerCount)?;
            parts.pop();
            value
        }
        _ => 1,
    };

    if winner_count == 0 {
        return Err(Error::InvalidWinnerCount);
    }

    let prize = parts.join(" ");
    if prize.is_empty() {
        return Err(Error::InvalidPrize);
    }

    Ok(ParsedPrize {
        prize,
        winner_count,
    })
}
