//! # nav-gatekeeper
//!
//! Intercepts page navigations, decides whether the destination is safe,
//! malicious or unverified, and enforces that decision through interstitial
//! pages.
//!
//! ## Pipeline
//!
//! navigation event -> scheme/own-page filter -> session approvals ->
//! cooldown cache -> trusted domains -> reputation oracle -> allow, hard
//! block (warning page) or soft block (countdown page).
//!
//! - **Gatekeeper**: the interceptor; owns the cache and allowlist
//! - **ReputationOracle**: external lookup, every failure maps to `Unknown`
//! - **InterstitialController**: hard/soft block sessions per tab
//! - **GateChannel**: interstitial -> gatekeeper approvals
//! - **host**: native messaging binding to the browser

pub mod channel;
pub mod config;
pub mod engine;
pub mod host;
pub mod init;
pub mod interceptor;
pub mod interstitial;
pub mod logger;
pub mod oracle;
pub mod stats;

pub use channel::{Delivery, GateChannel, GateMessage};
pub use config::Config;
pub use host::TabNavigator;
pub use interceptor::{Gatekeeper, NavigationEvent, NavigationOutcome, TabId};
pub use interstitial::InterstitialController;
pub use oracle::{ReputationOracle, Verdict};
