use std::path::Path;

use crate::{config::load_teams, league::TeamConfig, requests::RequestClient};

pub struct ScrapingContext {
    pub teams: Vec<TeamConfig>,
    pub request_client: RequestClient,
}

impl ScrapingContext {
    pub fn new(teams_path: &Path) -> anyhow::Result<Self> {
        let teams = load_teams(teams_path)?;
        let request_client = RequestClient::new()?;
        Ok(ScrapingContext {
            teams,
            request_client,
        })
    }
}
