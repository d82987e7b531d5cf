pub mod native;

use crate::interceptor::TabId;
use anyhow::Result;

pub use self::native::{run_host, Inbound, NativeNavigator, Outbound};

/// Browser-side effects the gatekeeper needs.
#[async_trait::async_trait]
pub trait TabNavigator: Send + Sync {
    async fn redirect_tab(&self, tab: TabId, url: &str) -> Result<()>;

    /// Pushes the soft-block countdown text to the page shown in `tab`.
    async fn show_countdown(&self, _tab: TabId, _remaining: u32, _message: &str) -> Result<()> {
        Ok(())
    }
}
