#![doc = include_str!("../README.md")]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

pub mod cli;
pub mod commands;
pub mod error;
pub mod flags;

use std::process::ExitCode;

fn main() -> ExitCode {
    use clap::Parser;

    btc_mirror_cli::backtrace::enable();
    let result = cli::Cli::parse().run();
    if let Err(err) = &result {
        eprintln!("Error: {err:?}");
    }
    ExitCode::from(exit_code(&result))
}

/// Every completed pass exits with 0, including the ones that skip submitting. Errors exit with 1.
fn exit_code<T>(result: &anyhow::Result<T>) -> u8 {
    match result {
        Ok(_) => 0,
        Err(_) => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::TxHash;
    use btc_mirror_sync::{SyncError, SyncOutcome};
    use rstest::rstest;

    #[rstest]
    #[case::up_to_date(SyncOutcome::UpToDate { mirror_height: 100, chain_tip: 100 })]
    #[case::below_threshold(SyncOutcome::BelowThreshold {
        mirror_height: 100,
        chain_tip: 103,
        threshold: 6,
    })]
    #[case::fee_too_high(SyncOutcome::FeeTooHigh { observed: 75, ceiling: 50 })]
    #[case::submitted(SyncOutcome::Submitted {
        from_height: 100,
        to_height: 103,
        tx_hash: TxHash::ZERO,
    })]
    fn test_completed_pass_exits_zero(#[case] outcome: SyncOutcome) {
        assert_eq!(exit_code(&anyhow::Ok(outcome)), 0);
    }

    #[rstest]
    #[case::deep_reorg(SyncError::DeepReorg { mirror_height: 100, max_depth: 20 })]
    #[case::reverted(SyncError::TransactionFailed { tx_hash: TxHash::ZERO })]
    fn test_failed_pass_exits_one(#[case] err: SyncError) {
        assert_eq!(exit_code(&Err::<SyncOutcome, _>(err.into())), 1);
    }
}
