use anyhow::Result;
use tracing::info;

use crate::config;
use crate::ctx::Ctx;
use crate::pipeline::Stage;

pub struct Stage1Config;

impl Stage1Config {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage1Config {
    fn name(&self) -> &'static str {
        "stage1_config"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let site = match &ctx.config_path {
            Some(path) => {
                info!(config = %path.display(), "loading site config");
                config::load_site_config(path)?
            }
            None => config::load_builtin()?,
        };
        info!(
            site_id = %site.site_id,
            utc_offset_hours = site.utc_offset_hours,
            "site config ready"
        );
        ctx.config = Some(site);
        Ok(())
    }
}
