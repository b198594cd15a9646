mod ratelimit;
mod text_manipulators;

pub mod alerts;
pub mod config;
pub mod error;
pub mod league;
pub mod mail;
pub mod message;
pub mod reports;
pub mod requests;
pub mod scraping_context;
pub mod team_info_scraper;

pub use alerts::{Notification, NotifyOptions, notify_todays_matches};
pub use error::ScrapeError;
pub use scraping_context::ScrapingContext;
pub use team_info_scraper::{get_matches_for_team, parse_team_page, team_info_url};
