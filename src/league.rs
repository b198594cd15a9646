use std::fmt;

use anyhow::Context;
use chrono::{NaiveDate, NaiveDateTime, Weekday};
use lettre::Address;
use serde::{Deserialize, Serialize};
use url::Url;

/// A centre hosting league pages in the team-info layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Venue {
    pub name: String,
    pub base_url: Url,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeagueConfig {
    /// The id the site uses in `/teaminfo/<id>`.
    pub id: String,
    pub day_of_the_week: Weekday,
    pub venue: Venue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct League {
    pub id: String,
    pub name: String,
    pub day_of_the_week: Weekday,
    pub venue: Venue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Carrier {
    Verizon,
    Att,
    TMobile,
    Sprint,
    UsCellular,
    Boost,
    Cricket,
    MetroPcs,
    GoogleFi,
}

impl Carrier {
    /// Domain of the carrier's e-mail to SMS gateway.
    pub fn gateway_domain(self) -> &'static str {
        match self {
            Carrier::Verizon => "vtext.com",
            Carrier::Att => "txt.att.net",
            Carrier::TMobile => "tmomail.net",
            Carrier::Sprint => "messaging.sprintpcs.com",
            Carrier::UsCellular => "email.uscc.net",
            Carrier::Boost => "sms.myboostmobile.com",
            Carrier::Cricket => "sms.cricketwireless.net",
            Carrier::MetroPcs => "mymetropcs.com",
            Carrier::GoogleFi => "msg.fi.google.com",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContactMethod {
    Email { email: String },
    Sms { phone: String, carrier: Carrier },
}

impl fmt::Display for ContactMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContactMethod::Email { email } => f.write_str(email),
            ContactMethod::Sms { phone, carrier } => write!(f, "{phone} ({carrier:?})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    #[serde(flatten)]
    pub method: ContactMethod,
}

impl Contact {
    pub fn mail_address(&self) -> anyhow::Result<Address> {
        match &self.method {
            ContactMethod::Email { email } => email
                .trim()
                .parse::<Address>()
                .with_context(|| format!("invalid e-mail address for {}: {email:?}", self.name)),
            ContactMethod::Sms { phone, carrier } => {
                let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
                if digits.is_empty() {
                    anyhow::bail!("phone number for {} has no digits: {phone:?}", self.name);
                }
                Address::new(digits, carrier.gateway_domain())
                    .with_context(|| format!("invalid SMS gateway address for {}", self.name))
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamConfig {
    pub name: String,
    pub league: LeagueConfig,
    pub members: Vec<Contact>,
    pub additional_contacts: Vec<Contact>,
}

impl TeamConfig {
    pub fn plays_on(&self, weekday: Weekday) -> bool {
        self.league.day_of_the_week == weekday
    }

    pub fn has_member(&self, name: &str) -> bool {
        self.members.iter().any(|member| member.name == name)
    }

    /// Members first, then the extra people who want the alerts.
    pub fn contacts(&self) -> impl Iterator<Item = &Contact> {
        self.members.iter().chain(&self.additional_contacts)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record {
    pub wins: u32,
    pub losses: u32,
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.wins, self.losses)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpponentTeam {
    pub name: String,
    pub record: Record,
}

#[derive(Debug, Clone)]
pub struct Team {
    pub name: String,
    pub members: Vec<Contact>,
    pub additional_contacts: Vec<Contact>,
    pub record: Record,
    pub url: Url,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub datetime: NaiveDateTime,
    pub court: u32,
    pub opponent: OpponentTeam,
}

#[derive(Debug, Clone)]
pub struct TeamSchedule {
    pub team: Team,
    pub league: League,
    pub matches: Vec<Match>,
}

impl TeamSchedule {
    pub fn matches_on(&self, date: NaiveDate) -> impl Iterator<Item = &Match> {
        self.matches
            .iter()
            .filter(move |match_| match_.datetime.date() == date)
    }
}
