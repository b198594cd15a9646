use anyhow::Context;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use log::info;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::{
    error::ScrapeError,
    league::{League, Match, OpponentTeam, Record, Team, TeamConfig, TeamSchedule},
    requests::HtmlFetcher,
    text_manipulators::{child_elements, extract_text},
};

// The team-info page is a fixed table layout; these paths walk it from <body>.
static LEAGUE_NAME: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(
        "body > div:nth-of-type(1) > div:nth-of-type(3) > div > div \
         > div:nth-of-type(5) > table > tbody > tr > td:nth-of-type(1) > div > a",
    )
    .unwrap()
});
static TEAM_RECORD: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(
        "body > div:nth-of-type(1) > div:nth-of-type(3) > div > div \
         > table > tbody > tr > td:nth-of-type(2) > div:nth-of-type(2) > table > tbody > tr \
         > td:nth-of-type(1)",
    )
    .unwrap()
});
static SCHEDULE_ROWS: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(
        "body > div:nth-of-type(1) > div:nth-of-type(3) > div > div \
         > table > tbody > tr > td:nth-of-type(2) > div:nth-of-type(4) > table > tbody > tr",
    )
    .unwrap()
});

static TEAM_RECORD_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Games:\s*(?<wins>\d+)\s*-\s*(?<losses>\d+)\s*\(\d+%\)").unwrap()
});
static OPPONENT_RECORD_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Current\s*Record:\s*(?<wins>\d+)-(?<losses>\d+)").unwrap());
static MATCH_TIME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?<hour>\d{1,2})(?::(?<minute>\d{2}))?\s*(?<meridiem>[AaPp])\.?[Mm]\.?$")
        .unwrap()
});

pub fn team_info_url(team: &TeamConfig) -> Result<Url, ScrapeError> {
    let mut url = team.league.venue.base_url.clone();
    url.path_segments_mut()
        .map_err(|()| ScrapeError::InvalidBaseUrl(team.league.venue.base_url.to_string()))?
        .pop_if_empty()
        .extend(["teaminfo", team.league.id.as_str()]);
    Ok(url)
}

pub async fn get_matches_for_team(
    fetcher: &impl HtmlFetcher,
    team: &TeamConfig,
) -> anyhow::Result<TeamSchedule> {
    let url = team_info_url(team)?;
    let html = fetcher.fetch_html(&url).await?;
    let document = Html::parse_document(&html);
    let schedule = parse_team_page(&document, team, url)
        .with_context(|| format!("failed to parse the team page for {}", team.name))?;
    info!(
        "Found {} matches for {} in {}.",
        schedule.matches.len(),
        team.name,
        schedule.league.name
    );
    Ok(schedule)
}

pub fn parse_team_page(
    document: &Html,
    config: &TeamConfig,
    url: Url,
) -> Result<TeamSchedule, ScrapeError> {
    let matches = parse_matches(document)?;
    let team = Team {
        name: config.name.clone(),
        members: config.members.clone(),
        additional_contacts: config.additional_contacts.clone(),
        record: parse_team_record(document)?,
        url,
    };
    let league = League {
        id: config.league.id.clone(),
        name: parse_league_name(document)?,
        day_of_the_week: config.league.day_of_the_week,
        venue: config.league.venue.clone(),
    };
    Ok(TeamSchedule {
        team,
        league,
        matches,
    })
}

fn parse_league_name(document: &Html) -> Result<String, ScrapeError> {
    document
        .select(&LEAGUE_NAME)
        .next()
        .map(extract_text)
        .ok_or(ScrapeError::MissingField("league name"))
}

fn parse_team_record(document: &Html) -> Result<Record, ScrapeError> {
    let raw = document
        .select(&TEAM_RECORD)
        .next()
        .map(extract_text)
        .ok_or(ScrapeError::MissingField("team record"))?;
    parse_team_record_text(raw)
}

fn parse_team_record_text(raw: String) -> Result<Record, ScrapeError> {
    parse_record(
        &TEAM_RECORD_PATTERN,
        "team",
        raw,
    )
}

fn parse_opponent_record(raw: String) -> Result<Record, ScrapeError> {
    parse_record(
        &OPPONENT_RECORD_PATTERN,
        "opponent's",
        raw,
    )
}

fn parse_record(
    pattern: &Regex,
    what: &'static str,
    raw: String,
) -> Result<Record, ScrapeError> {
    let parsed = pattern.captures(&raw).and_then(|caps| {
        let wins = caps.name("wins")?.as_str().parse().ok()?;
        let losses = caps.name("losses")?.as_str().parse().ok()?;
        Some(Record { wins, losses })
    });
    parsed.ok_or(ScrapeError::Record { what, raw })
}

fn parse_matches(document: &Html) -> Result<Vec<Match>, ScrapeError> {
    document
        .select(&SCHEDULE_ROWS)
        // The first row is the table header.
        .skip(1)
        .map(parse_match_row)
        .collect()
}

fn parse_match_row(row: ElementRef) -> Result<Match, ScrapeError> {
    let cells: Vec<_> = child_elements(row, "td").collect();
    let cell = |index: usize, field: &'static str| {
        cells
            .get(index)
            .copied()
            .ok_or(ScrapeError::MissingField(field))
    };

    let date = extract_text(cell(0, "match date")?);
    let time = extract_text(cell(1, "match time")?);
    let datetime = parse_match_datetime(&date, &time)?;

    let court_raw = extract_text(cell(2, "court")?);
    let court = court_raw
        .parse()
        .map_err(|_| ScrapeError::Court(court_raw.clone()))?;

    let opponent_cell = cell(3, "opponent")?;
    let name = child_elements(opponent_cell, "a")
        .next()
        .map(extract_text)
        .ok_or(ScrapeError::MissingField("opponent name"))?;
    let record_raw = child_elements(opponent_cell, "span")
        .next()
        .map(extract_text)
        .ok_or(ScrapeError::MissingField("opponent record"))?;
    let record = parse_opponent_record(record_raw)?;

    Ok(Match {
        datetime,
        court,
        opponent: OpponentTeam { name, record },
    })
}

fn parse_match_datetime(date: &str, time: &str) -> Result<NaiveDateTime, ScrapeError> {
    let error = || ScrapeError::Datetime {
        date: date.to_string(),
        time: time.to_string(),
    };
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| error())?;
    let time = parse_match_time(time).ok_or_else(error)?;
    Ok(date.and_time(time))
}

/// Times are written on a 12-hour clock, usually without minutes (`7PM`).
fn parse_match_time(time: &str) -> Option<NaiveTime> {
    let caps = MATCH_TIME_PATTERN.captures(time.trim())?;
    let hour: u32 = caps["hour"].parse().ok()?;
    let minute: u32 = caps.name("minute").map_or(Ok(0), |m| m.as_str().parse()).ok()?;
    if !(1..=12).contains(&hour) {
        return None;
    }
    let is_pm = caps["meridiem"].eq_ignore_ascii_case("p");
    let hour = match (hour, is_pm) {
        (12, false) => 0,
        (12, true) => 12,
        (hour, false) => hour,
        (hour, true) => hour + 12,
    };
    NaiveTime::from_hms_opt(hour, minute, 0)
}
