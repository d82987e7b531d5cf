mod gatekeeper;
mod types;

pub use self::gatekeeper::Gatekeeper;
pub use self::types::{
    AllowReason, IgnoreReason, NavigationEvent, NavigationOutcome, NavigationPhase, TabId,
};
