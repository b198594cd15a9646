use std::path::PathBuf;

use anyhow::Context;
use chrono::{Local, NaiveDate, Weekday};
use clap::{Args, Parser, Subcommand};
use dotenv::dotenv;
use league_alerts::{
    NotifyOptions, ScrapingContext,
    config::{LoadFromEnv, MailEnv},
    mail::{DryRunMailer, SmtpMailer},
    notify_todays_matches,
    reports::{find_schedule_conflicts, get_all_schedules, player_teams, wait_times},
};
use log::{LevelFilter, info, warn};

#[derive(Parser)]
#[command(about = "Text league teammates when they have a game today")]
struct Opts {
    /// Team file describing venues, contacts and teams.
    #[arg(long, default_value = "teams.toml")]
    config: PathBuf,
    #[command(subcommand)]
    sub: Option<Sub>,
}

#[derive(Subcommand)]
enum Sub {
    /// Send alerts for today's games (the default).
    Notify(Notify),
    /// List members who are booked into two games at once.
    Conflicts,
    /// Show how long a player waits between games on a league night.
    WaitTimes(WaitTimes),
    /// Print the resolved team configuration as JSON.
    Teams,
}

#[derive(Args, Default)]
struct Notify {
    /// Pretend today is this date (YYYY-MM-DD).
    #[arg(long)]
    date: Option<NaiveDate>,
    /// Log the alerts instead of sending them.
    #[arg(long)]
    dry_run: bool,
    /// Only alert the contact with this name.
    #[arg(long)]
    only_to: Option<String>,
}

#[derive(Args)]
struct WaitTimes {
    #[arg(long)]
    day: Weekday,
    #[arg(long)]
    player: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let opts = Opts::parse();
    let context = ScrapingContext::new(&opts.config)?;

    match opts.sub.unwrap_or(Sub::Notify(Notify::default())) {
        Sub::Notify(args) => notify(&context, args).await?,
        Sub::Conflicts => {
            let schedules = get_all_schedules(&context.request_client, &context.teams).await?;
            let conflicts = find_schedule_conflicts(&schedules);
            if conflicts.is_empty() {
                info!("No schedule conflicts.");
            }
            for conflict in conflicts {
                println!("{conflict}");
            }
        }
        Sub::WaitTimes(args) => {
            let teams = player_teams(&context.teams, args.day, &args.player);
            let schedules = get_all_schedules(&context.request_client, teams).await?;
            for wait in wait_times(&schedules, args.day, &args.player) {
                println!("{wait}");
            }
        }
        Sub::Teams => println!("{}", serde_json::to_string_pretty(&context.teams)?),
    }

    Ok(())
}

async fn notify(context: &ScrapingContext, args: Notify) -> anyhow::Result<()> {
    let options = NotifyOptions {
        today: args.date.unwrap_or_else(|| Local::now().date_naive()),
        only_to: args.only_to,
    };
    info!("Checking games for {}.", options.today.format("%A, %B %-d"));

    let notifications = if args.dry_run {
        notify_todays_matches(&context.teams, &context.request_client, &DryRunMailer, &options)
            .await
    } else {
        let mail_env = MailEnv::load_from_env().context("SMTP settings are needed to send alerts")?;
        let mailer = SmtpMailer::new(mail_env)?;
        notify_todays_matches(&context.teams, &context.request_client, &mailer, &options).await
    };

    let rejected = notifications.iter().filter(|n| !n.accepted).count();
    if rejected > 0 {
        warn!("{rejected} of {} alerts were not delivered.", notifications.len());
    } else {
        info!("Sent {} alerts.", notifications.len());
    }
    Ok(())
}
