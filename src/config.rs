use std::{collections::HashMap, path::Path};

use anyhow::{Context, bail};
use chrono::Weekday;
use serde::{Deserialize, de::DeserializeOwned};

use crate::league::{Contact, LeagueConfig, TeamConfig, Venue};

/// The env vars needed for sending mail.
#[derive(Debug, Deserialize)]
pub struct MailEnv {
    pub smtp_host: String,
    pub smtp_port: Option<u16>,
    pub smtp_username: String,
    pub smtp_password: String,
    pub mail_from: String,
}

// Extension trait.
pub trait LoadFromEnv: DeserializeOwned {
    fn load_from_env() -> anyhow::Result<Self> {
        // Don't throw an error if .env file doesn't exist.
        let _ = dotenv::dotenv();
        let config =
            envy::from_env::<Self>().context("failed to load env variables into config struct")?;
        Ok(config)
    }
}

impl<T: DeserializeOwned> LoadFromEnv for T {}

/// The team file as written on disk. Teams refer to contacts by key and to
/// venues by name.
#[derive(Debug, Deserialize)]
pub struct TeamsFile {
    #[serde(default)]
    venues: Vec<Venue>,
    #[serde(default)]
    contacts: HashMap<String, Contact>,
    #[serde(default)]
    teams: Vec<TeamEntry>,
}

#[derive(Debug, Deserialize)]
struct TeamEntry {
    name: String,
    league: LeagueEntry,
    members: Vec<String>,
    #[serde(default)]
    additional_contacts: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct LeagueEntry {
    id: String,
    day_of_the_week: Weekday,
    venue: String,
}

impl TeamsFile {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs_err::read_to_string(path)?;
        Self::parse(&text).with_context(|| format!("while reading team file {path:?}"))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn resolve(self) -> anyhow::Result<Vec<TeamConfig>> {
        let TeamsFile {
            venues,
            contacts,
            teams,
        } = self;
        let lookup = |team: &str, key: &String| {
            contacts
                .get(key)
                .cloned()
                .with_context(|| format!("team {team:?} refers to unknown contact {key:?}"))
        };

        teams
            .into_iter()
            .map(|entry| -> anyhow::Result<TeamConfig> {
                let venue = venues
                    .iter()
                    .find(|venue| venue.name == entry.league.venue)
                    .cloned()
                    .with_context(|| {
                        format!(
                            "team {:?} plays at unknown venue {:?}",
                            entry.name, entry.league.venue
                        )
                    })?;
                if entry.members.is_empty() {
                    bail!("team {:?} has no members", entry.name);
                }
                let members = entry
                    .members
                    .iter()
                    .map(|key| lookup(&entry.name, key))
                    .collect::<anyhow::Result<Vec<_>>>()?;
                let additional_contacts = entry
                    .additional_contacts
                    .iter()
                    .map(|key| lookup(&entry.name, key))
                    .collect::<anyhow::Result<Vec<_>>>()?;
                Ok(TeamConfig {
                    name: entry.name,
                    league: LeagueConfig {
                        id: entry.league.id,
                        day_of_the_week: entry.league.day_of_the_week,
                        venue,
                    },
                    members,
                    additional_contacts,
                })
            })
            .collect()
    }
}

pub fn load_teams(path: &Path) -> anyhow::Result<Vec<TeamConfig>> {
    TeamsFile::load(path)?.resolve()
}
