use std::{collections::BTreeMap, fmt};

use chrono::{Datelike, NaiveDate, NaiveDateTime, TimeDelta, Weekday};
use futures::future::try_join_all;

use crate::{
    league::{TeamConfig, TeamSchedule},
    requests::HtmlFetcher,
    team_info_scraper::get_matches_for_team,
};

pub async fn get_all_schedules<'a>(
    fetcher: &impl HtmlFetcher,
    teams: impl IntoIterator<Item = &'a TeamConfig>,
) -> anyhow::Result<Vec<TeamSchedule>> {
    try_join_all(
        teams
            .into_iter()
            .map(|team| get_matches_for_team(fetcher, team)),
    )
    .await
}

/// A member booked into more than one game at the same time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub datetime: NaiveDateTime,
    pub member: String,
    pub games: Vec<String>,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} is double-booked:", self.member)?;
        for game in &self.games {
            write!(f, "\n  {game}")?;
        }
        Ok(())
    }
}

pub fn find_schedule_conflicts(schedules: &[TeamSchedule]) -> Vec<Conflict> {
    let mut games_by_slot = BTreeMap::<(NaiveDateTime, &str), Vec<String>>::new();
    for schedule in schedules {
        for match_ in &schedule.matches {
            for member in &schedule.team.members {
                let game = [
                    schedule.league.name.clone(),
                    format!("Court {}", match_.court),
                    game_datetime(match_.datetime),
                    schedule.team.name.clone(),
                    member.name.clone(),
                ]
                .join(" - ");
                games_by_slot
                    .entry((match_.datetime, member.name.as_str()))
                    .or_default()
                    .push(game);
            }
        }
    }

    games_by_slot
        .into_iter()
        .filter(|(_, games)| games.len() > 1)
        .map(|((datetime, member), games)| Conflict {
            datetime,
            member: member.to_string(),
            games,
        })
        .collect()
}

/// `October 14th, 2026 7:00 PM`
fn game_datetime(datetime: NaiveDateTime) -> String {
    let day = datetime.day();
    let suffix = match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!(
        "{} {day}{suffix}, {}",
        datetime.format("%B"),
        datetime.format("%Y %-I:%M %p")
    )
}

/// Time a player spends between their first two games of a night.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitTime {
    pub date: NaiveDate,
    pub times: Vec<NaiveDateTime>,
    /// `None` when the player only has one game that night.
    pub wait: Option<TimeDelta>,
}

impl fmt::Display for WaitTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let date = self.date.format("%b %-d");
        match self.wait {
            Some(wait) if wait.num_minutes() % 60 == 0 => {
                write!(f, "{date}\t- {} hour wait.", wait.num_hours())
            }
            Some(wait) => write!(
                f,
                "{date}\t- {}h {:02}m wait.",
                wait.num_hours(),
                wait.num_minutes() % 60
            ),
            None => write!(f, "{date}\t- single game."),
        }
    }
}

/// Teams in leagues played on `day` that have `player` on the roster.
pub fn player_teams<'a>(
    teams: &'a [TeamConfig],
    day: Weekday,
    player: &'a str,
) -> impl Iterator<Item = &'a TeamConfig> {
    teams
        .iter()
        .filter(move |team| team.plays_on(day) && team.has_member(player))
}

pub fn wait_times(schedules: &[TeamSchedule], day: Weekday, player: &str) -> Vec<WaitTime> {
    // How long a single game occupies the court.
    let game_length = TimeDelta::hours(1);
    let mut times_by_date = BTreeMap::<NaiveDate, Vec<NaiveDateTime>>::new();
    let player_schedules = schedules.iter().filter(|schedule| {
        schedule.league.day_of_the_week == day
            && schedule
                .team
                .members
                .iter()
                .any(|member| member.name == player)
    });
    for schedule in player_schedules {
        for match_ in &schedule.matches {
            times_by_date
                .entry(match_.datetime.date())
                .or_default()
                .push(match_.datetime);
        }
    }

    times_by_date
        .into_iter()
        .map(|(date, mut times)| {
            times.sort();
            let wait = match times.as_slice() {
                [first, second, ..] => Some((*second - *first - game_length).max(TimeDelta::zero())),
                _ => None,
            };
            WaitTime { date, times, wait }
        })
        .collect()
}
