mod analyze;
mod extract;
mod health;
mod input;
mod output;
mod render;

pub use analyze::cmd_analyze;
pub use extract::{cmd_batch, cmd_extract, cmd_patterns};
pub use health::cmd_health;
pub use render::cmd_render;

use anyhow::Result;
use entmark::{Config, EntityService};

/// Build the service and check the model before any work is done.
async fn start_service(config: &Config) -> Result<EntityService> {
    let service = EntityService::from_config(config)?;
    service.start().await?;
    Ok(service)
}
