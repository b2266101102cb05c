use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tlv_types::{AccountId, Amount, BlockHeight};

#[derive(Parser)]
#[command(
    name = "tlv",
    about = "Timelock Vault Ledger: timelocked custody with a diagnostic counter",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// State file the ledger is loaded from and saved to
    #[arg(long, global = true, default_value = "tlv-state.json")]
    pub state: PathBuf,

    /// TOML ledger configuration
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create a fresh state file
    Init(InitArgs),
    /// Credit host-ledger funds to an account
    Fund(FundArgs),
    /// Move the block height forward
    Advance(AdvanceArgs),
    /// Add one to the counter
    Increment(CallerArgs),
    /// Subtract one from the counter
    Decrement(CallerArgs),
    /// Show the counter
    Counter,
    /// Show the current block height
    Height,
    /// Lock funds in custody until a block height
    Deposit(DepositArgs),
    /// Withdraw the caller's full unlocked balance
    Withdraw(CallerArgs),
    /// Show an account's vault record
    VaultInfo(AccountArgs),
    /// Show custody totals and check them against the host ledger
    Custody,
    /// Show an account's host-ledger balance
    Balance(AccountArgs),
    /// Show recent ledger events
    Events(EventsArgs),
}

#[derive(Args)]
pub struct InitArgs {
    /// Starting block height (defaults to the configured genesis height)
    #[arg(long)]
    pub height: Option<BlockHeight>,
    /// Overwrite an existing state file
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct FundArgs {
    pub account: AccountId,
    pub amount: Amount,
}

#[derive(Args)]
pub struct AdvanceArgs {
    #[arg(long, conflicts_with = "to")]
    pub blocks: Option<u64>,
    #[arg(long)]
    pub to: Option<BlockHeight>,
}

#[derive(Args)]
pub struct CallerArgs {
    /// Invoking account: a 64-char hex id or a label
    #[arg(long)]
    pub caller: AccountId,
}

#[derive(Args)]
pub struct DepositArgs {
    #[arg(long)]
    pub caller: AccountId,
    pub amount: Amount,
    pub unlock_height: BlockHeight,
}

#[derive(Args)]
pub struct AccountArgs {
    pub account: AccountId,
}

#[derive(Args)]
pub struct EventsArgs {
    #[arg(short = 'n', long, default_value = "20")]
    pub limit: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_init() {
        let cli = Cli::try_parse_from(["tlv", "init", "--height", "100"]).unwrap();
        if let Command::Init(args) = cli.command {
            assert_eq!(args.height, Some(100));
            assert!(!args.force);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_deposit() {
        let cli = Cli::try_parse_from(["tlv", "deposit", "--caller", "alice", "1000", "110"]).unwrap();
        if let Command::Deposit(args) = cli.command {
            assert_eq!(args.caller, AccountId::from_label("alice"));
            assert_eq!(args.amount, 1000);
            assert_eq!(args.unlock_height, 110);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_hex_account() {
        let bob = AccountId::from_label("bob");
        let cli = Cli::try_parse_from(["tlv", "vault-info", bob.to_hex().as_str()]).unwrap();
        if let Command::VaultInfo(args) = cli.command {
            assert_eq!(args.account, bob);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_withdraw_requires_caller() {
        assert!(Cli::try_parse_from(["tlv", "withdraw"]).is_err());
    }

    #[test]
    fn parse_advance_flags_conflict() {
        assert!(Cli::try_parse_from(["tlv", "advance", "--blocks", "1", "--to", "5"]).is_err());
    }

    #[test]
    fn parse_events_limit() {
        let cli = Cli::try_parse_from(["tlv", "events", "-n", "5"]).unwrap();
        if let Command::Events(args) = cli.command {
            assert_eq!(args.limit, 5);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::try_parse_from([
            "tlv", "--state", "/tmp/s.json", "--format", "json", "--verbose", "counter",
        ])
        .unwrap();
        assert_eq!(cli.state, PathBuf::from("/tmp/s.json"));
        assert!(matches!(cli.format, OutputFormat::Json));
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Counter));
    }
}
