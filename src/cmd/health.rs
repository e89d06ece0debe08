use anyhow::Result;

use entmark::Config;

use super::output::print_json;
use super::start_service;

pub async fn cmd_health(config: &Config) -> Result<()> {
    let service = start_service(config).await?;
    print_json(&service.health())
}
