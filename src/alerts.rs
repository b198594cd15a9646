use chrono::{Datelike, NaiveDate};
use log::{debug, error, info};

use crate::{
    league::TeamConfig,
    mail::Mailer,
    message::{create_message_from_match, format_time, subject_for_match},
    requests::HtmlFetcher,
    team_info_scraper::get_matches_for_team,
};

#[derive(Debug, Clone)]
pub struct NotifyOptions {
    pub today: NaiveDate,
    /// Only alert the contact with this name.
    pub only_to: Option<String>,
}

/// One alert that went out (or was attempted).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub team: String,
    pub contact: String,
    pub address: String,
    pub accepted: bool,
}

pub async fn notify_todays_matches(
    teams: &[TeamConfig],
    fetcher: &impl HtmlFetcher,
    mailer: &impl Mailer,
    options: &NotifyOptions,
) -> Vec<Notification> {
    let weekday = options.today.weekday();
    let mut notifications = vec![];

    for team in teams {
        if !team.plays_on(weekday) {
            debug!("Skipping {}, they play on {}.", team.name, team.league.day_of_the_week);
            continue;
        }
        info!("- Parsing {}.", team.name);

        let schedule = match get_matches_for_team(fetcher, team).await {
            Ok(schedule) => schedule,
            Err(e) => {
                error!("{e:#}");
                continue;
            }
        };

        for match_ in schedule.matches_on(options.today) {
            let subject = subject_for_match(&schedule, match_);
            let message = create_message_from_match(&schedule, match_);
            info!("  - {} - Court {}", format_time(&match_.datetime), match_.court);
            info!("  - {}", schedule.league.name);

            for contact in team.contacts() {
                if options
                    .only_to
                    .as_ref()
                    .is_some_and(|only_to| *only_to != contact.name)
                {
                    continue;
                }
                let address = match contact.mail_address() {
                    Ok(address) => address,
                    Err(e) => {
                        error!("{e:#}");
                        notifications.push(Notification {
                            team: team.name.clone(),
                            contact: contact.name.clone(),
                            address: contact.method.to_string(),
                            accepted: false,
                        });
                        continue;
                    }
                };
                info!("    - Sending alert to {} ({address}).", contact.name);

                let accepted = match mailer.send(&address, &subject, &message).await {
                    Ok(report) => {
                        info!("      - {}", report.response);
                        if !report.accepted {
                            error!("Email Send Rejected: {address} ({})", report.response);
                        }
                        report.accepted
                    }
                    Err(e) => {
                        error!("{e:#}");
                        false
                    }
                };
                notifications.push(Notification {
                    team: team.name.clone(),
                    contact: contact.name.clone(),
                    address: address.to_string(),
                    accepted,
                });
            }
        }
    }

    notifications
}

#[cfg(test)]
pub(crate) mod tests {
    use std::{collections::HashMap, sync::Mutex};

    use chrono::Weekday;
    use lettre::Address;
    use url::Url;

    use super::*;
    use crate::{
        league::{
            Carrier, Contact, ContactMethod,
            tests::{email, team_config},
        },
        mail::SendReport,
    };

    /// Serves canned pages keyed by URL.
    pub struct FakeFetcher(pub HashMap<String, String>);

    impl HtmlFetcher for FakeFetcher {
        async fn fetch_html(&self, url: &Url) -> anyhow::Result<String> {
            self.0
                .get(url.as_str())
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("404 for {url}"))
        }
    }

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<(String, String, String)>>,
        reject: Option<String>,
        /// Address whose send fails outright, as if the relay dropped the connection.
        fail: Option<String>,
    }

    impl Mailer for RecordingMailer {
        async fn send(&self, to: &Address, subject: &str, body: &str) -> anyhow::Result<SendReport> {
            if self.fail.as_deref() == Some(to.to_string().as_str()) {
                anyhow::bail!("connection to relay lost while sending to {to}");
            }
            self.sent
                .lock()
                .unwrap()
                .push((to.to_string(), subject.to_string(), body.to_string()));
            let accepted = self.reject.as_deref() != Some(to.to_string().as_str());
            Ok(SendReport {
                accepted,
                response: if accepted { "250 OK" } else { "550 rejected" }.to_string(),
            })
        }
    }

    pub fn page(league: &str, rows: &[(&str, &str, u32, &str)]) -> String {
        let rows: String = rows
            .iter()
            .map(|(date, time, court, opponent)| {
                format!(
                    "<tr><td>{date}</td><td>{time}</td><td>{court}</td>\
                     <td><a href='#'>{opponent}</a> <span>Current Record: 3-5</span></td></tr>"
                )
            })
            .collect();
        format!(
            "<html><body><div><div></div><div></div><div><div><div>\
             <div></div><div></div><div></div><div></div>\
             <div><table><tr><td><div><a href='#'>{league}</a></div></td></tr></table></div>\
             <table><tr><td></td><td>\
             <div></div>\
             <div><table><tr><td>Games: 7 - 1 (88%)</td></tr></table></div>\
             <div></div>\
             <div><table><tr><th>Date</th><th>Time</th><th>Court</th><th>Opponent</th></tr>{rows}</table></div>\
             </td></tr></table>\
             </div></div></div></div></body></html>"
        )
    }

    fn teams() -> Vec<TeamConfig> {
        let mut six_pack = team_config(
            "6 Pack",
            "100",
            Weekday::Wed,
            vec![
                email("Dana", "dana@example.com"),
                Contact {
                    name: "Sam".to_string(),
                    method: ContactMethod::Sms {
                        phone: "419-555-0123".to_string(),
                        carrier: Carrier::Verizon,
                    },
                },
            ],
        );
        six_pack.additional_contacts = vec![email("Coach", "coach@example.com")];
        let thursday = team_config(
            "Thursday Spikers",
            "200",
            Weekday::Thu,
            vec![email("Dana", "dana@example.com")],
        );
        vec![six_pack, thursday]
    }

    fn fetcher() -> FakeFetcher {
        FakeFetcher(HashMap::from([
            (
                "https://lanes.example.com/teaminfo/100".to_string(),
                page(
                    "Wednesday Coed 4s",
                    &[
                        ("2026-10-07", "7PM", 2, "Net Results"),
                        ("2026-10-14", "8PM", 3, "Block Party"),
                        ("2026-10-21", "7PM", 1, "Dig Deep"),
                    ],
                ),
            ),
            (
                "https://lanes.example.com/teaminfo/200".to_string(),
                page("Thursday Open", &[("2026-10-15", "7PM", 4, "Aces")]),
            ),
        ]))
    }

    #[tokio::test]
    async fn alerts_every_contact_for_todays_match() {
        let mailer = RecordingMailer::default();
        let options = NotifyOptions {
            today: "2026-10-14".parse().unwrap(),
            only_to: None,
        };
        let notifications = notify_todays_matches(&teams(), &fetcher(), &mailer, &options).await;

        let addresses: Vec<_> = notifications.iter().map(|n| n.address.as_str()).collect();
        assert_eq!(
            addresses,
            ["dana@example.com", "4195550123@vtext.com", "coach@example.com"]
        );
        assert!(notifications.iter().all(|n| n.accepted && n.team == "6 Pack"));

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent[0].1, "6 Pack plays at 8:00 PM today");
        assert!(sent[0].2.contains("Block Party"));
        assert!(sent[0].2.contains("Court 3"));
    }

    #[tokio::test]
    async fn nothing_is_sent_on_an_off_day() {
        let mailer = RecordingMailer::default();
        let options = NotifyOptions {
            // A Wednesday without a 6 Pack game on the schedule.
            today: "2026-10-28".parse().unwrap(),
            only_to: None,
        };
        let notifications = notify_todays_matches(&teams(), &fetcher(), &mailer, &options).await;
        assert!(notifications.is_empty());
        assert!(mailer.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn only_to_limits_recipients() {
        let mailer = RecordingMailer::default();
        let options = NotifyOptions {
            today: "2026-10-15".parse().unwrap(),
            only_to: Some("Dana".to_string()),
        };
        let notifications = notify_todays_matches(&teams(), &fetcher(), &mailer, &options).await;
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].team, "Thursday Spikers");
        assert_eq!(notifications[0].contact, "Dana");
    }

    #[tokio::test]
    async fn rejected_sends_are_reported() {
        let mailer = RecordingMailer {
            reject: Some("coach@example.com".to_string()),
            ..Default::default()
        };
        let options = NotifyOptions {
            today: "2026-10-14".parse().unwrap(),
            only_to: None,
        };
        let notifications = notify_todays_matches(&teams(), &fetcher(), &mailer, &options).await;
        let rejected: Vec<_> = notifications
            .iter()
            .filter(|n| !n.accepted)
            .map(|n| n.contact.as_str())
            .collect();
        assert_eq!(rejected, ["Coach"]);
    }

    #[tokio::test]
    async fn a_broken_page_does_not_stop_other_teams() {
        let mut teams = teams();
        teams[1].league.day_of_the_week = Weekday::Wed;
        teams[1].league.id = "404".to_string();
        teams.reverse();
        let mailer = RecordingMailer::default();
        let options = NotifyOptions {
            today: "2026-10-14".parse().unwrap(),
            only_to: None,
        };
        let notifications = notify_todays_matches(&teams, &fetcher(), &mailer, &options).await;
        assert_eq!(notifications.len(), 3);
    }

    #[tokio::test]
    async fn failed_sends_and_bad_addresses_are_reported() {
        let mut teams = teams();
        teams[0].members.push(Contact {
            name: "Alex".to_string(),
            method: ContactMethod::Sms {
                phone: "n/a".to_string(),
                carrier: Carrier::Att,
            },
        });
        let mailer = RecordingMailer {
            fail: Some("dana@example.com".to_string()),
            ..Default::default()
        };
        let options = NotifyOptions {
            today: "2026-10-14".parse().unwrap(),
            only_to: None,
        };
        let notifications = notify_todays_matches(&teams, &fetcher(), &mailer, &options).await;

        let outcomes: Vec<_> = notifications
            .iter()
            .map(|n| (n.contact.as_str(), n.address.as_str(), n.accepted))
            .collect();
        assert_eq!(
            outcomes,
            [
                ("Dana", "dana@example.com", false),
                ("Sam", "4195550123@vtext.com", true),
                ("Alex", "n/a (Att)", false),
                ("Coach", "coach@example.com", true),
            ]
        );
        let sent: Vec<_> = mailer.sent.lock().unwrap().iter().map(|s| s.0.clone()).collect();
        assert_eq!(sent, ["4195550123@vtext.com", "coach@example.com"]);
    }
}
