//! CLI flags.

mod globals;
pub use globals::GlobalArgs;

mod bitcoin;
pub use bitcoin::BitcoinArgs;

mod mirror;
pub use mirror::MirrorArgs;

mod relay;
pub use relay::RelayArgs;
