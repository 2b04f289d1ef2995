//! Default-handler opener adapter

use docrouter_core::ports::LinkOpener;
use docrouter_domain::{DocRouterError, Result};
use tracing::debug;

/// Opens URLs with the operating system's default handler
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemOpener;

impl LinkOpener for SystemOpener {
    fn open_url(&self, url: &str) -> Result<()> {
        open::that(url)
            .map_err(|err| DocRouterError::Io(format!("could not open {url}: {err}")))?;
        debug!(url = %url, "opened in default handler");
        Ok(())
    }
}
