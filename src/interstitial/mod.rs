mod controller;
pub mod countdown;
pub mod hard_block;
pub mod pages;
pub mod soft_block;

pub use self::controller::{InterstitialController, Opened, UserAction};
pub use self::countdown::CountdownTimer;
pub use self::hard_block::{HardBlockChoice, HardBlockDecision, HardBlockPage};
pub use self::pages::{InterstitialPages, PageKind, PageRequest};
pub use self::soft_block::{
    run_soft_block, ProceedTrigger, Resolution, SoftAction, SoftBlockContext, SoftBlockReport,
    SoftBlockSession, SoftBlockState,
};
