use chrono::NaiveDateTime;

use crate::league::{Match, TeamSchedule};

pub fn format_time(datetime: &NaiveDateTime) -> String {
    datetime.format("%-I:%M %p").to_string()
}

pub fn subject_for_match(schedule: &TeamSchedule, match_: &Match) -> String {
    format!(
        "{} plays at {} today",
        schedule.team.name,
        format_time(&match_.datetime)
    )
}

/// Body of the alert. Kept short since most people get it as a text message.
pub fn create_message_from_match(schedule: &TeamSchedule, match_: &Match) -> String {
    let TeamSchedule { team, league, .. } = schedule;
    format!(
        "Game day! {} ({}) vs {} ({})\n{} on Court {}\n{} at {}",
        team.name,
        team.record,
        match_.opponent.name,
        match_.opponent.record,
        format_time(&match_.datetime),
        match_.court,
        league.name,
        league.venue.name,
    )
}
