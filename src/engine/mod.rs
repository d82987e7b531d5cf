mod cache;
mod matcher;
mod pending;
pub mod state;
mod traits;

pub use cache::DecisionCache;
pub use matcher::HashedTrustMatcher;
pub use pending::{Join, PendingChecks, PendingGuard, SharedVerdict};
pub use state::SessionState;
pub use traits::TrustMatcher;
