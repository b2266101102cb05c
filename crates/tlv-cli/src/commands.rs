use colored::Colorize;
use serde_json::{json, Value};
use tlv_ledger::{LedgerConfig, LedgerError, ValueTransfer};
use tlv_types::VaultRecord;

use crate::cli::*;
use crate::session::Session;

/// What a command reports: a human line and a machine-readable value.
pub struct Outcome {
    pub text: String,
    pub json: Value,
}

impl Outcome {
    fn new(text: impl Into<String>, json: Value) -> Self {
        Self {
            text: text.into(),
            json,
        }
    }
}

pub fn run_command(cli: &Cli) -> anyhow::Result<()> {
    let outcome = execute(cli)?;
    match cli.format {
        OutputFormat::Text => println!("{}", outcome.text),
        OutputFormat::Json => println!("{}", json!({ "ok": true, "result": outcome.json })),
    }
    Ok(())
}

/// Print a failure, tagged with the ledger error kind when there is one.
pub fn report_error(format: &OutputFormat, err: &anyhow::Error) {
    let kind = err
        .downcast_ref::<LedgerError>()
        .map(|e| e.kind().as_str())
        .unwrap_or("ERROR");
    match format {
        OutputFormat::Text => eprintln!("{} {:#}", format!("error[{kind}]:").red().bold(), err),
        OutputFormat::Json => println!(
            "{}",
            json!({ "ok": false, "error": kind, "message": format!("{err:#}") })
        ),
    }
}

/// Run one command. State is saved only when a mutating command succeeds.
pub fn execute(cli: &Cli) -> anyhow::Result<Outcome> {
    let config = match &cli.config {
        Some(path) => LedgerConfig::load(path)?,
        None => LedgerConfig::default(),
    };

    match &cli.command {
        Command::Init(args) => cmd_init(cli, config, args),
        Command::Fund(args) => mutate(cli, config, |s| cmd_fund(s, args)),
        Command::Advance(args) => mutate(cli, config, |s| Ok(cmd_advance(s, args))),
        Command::Increment(args) => mutate(cli, config, |s| cmd_increment(s, args)),
        Command::Decrement(args) => mutate(cli, config, |s| cmd_decrement(s, args)),
        Command::Deposit(args) => mutate(cli, config, |s| cmd_deposit(s, args)),
        Command::Withdraw(args) => mutate(cli, config, |s| cmd_withdraw(s, args)),
        Command::Counter => query(cli, config, cmd_counter),
        Command::Height => query(cli, config, |s| Ok(cmd_height(s))),
        Command::VaultInfo(args) => query(cli, config, |s| cmd_vault_info(s, args)),
        Command::Custody => query(cli, config, cmd_custody),
        Command::Balance(args) => query(cli, config, |s| cmd_balance(s, args)),
        Command::Events(args) => query(cli, config, |s| cmd_events(s, args)),
    }
}

/// Open the state file, run `op`, and save only if it succeeded.
fn mutate(
    cli: &Cli,
    config: LedgerConfig,
    op: impl FnOnce(&Session) -> anyhow::Result<Outcome>,
) -> anyhow::Result<Outcome> {
    let session = Session::open(&cli.state, config)?;
    let outcome = op(&session)?;
    session.save()?;
    Ok(outcome)
}

fn query(
    cli: &Cli,
    config: LedgerConfig,
    op: impl FnOnce(&Session) -> anyhow::Result<Outcome>,
) -> anyhow::Result<Outcome> {
    let session = Session::open(&cli.state, config)?;
    op(&session)
}

fn cmd_init(cli: &Cli, config: LedgerConfig, args: &InitArgs) -> anyhow::Result<Outcome> {
    let custody = config.custody_account();
    let session = Session::create(&cli.state, config, args.height, args.force)?;
    session.save()?;
    let height = session.ledger.get_current_block();
    Ok(Outcome::new(
        format!(
            "{} Initialized ledger state in {}\n  Height: {}\n  Custody: {}",
            "✓".green().bold(),
            cli.state.display().to_string().bold(),
            height.to_string().yellow(),
            custody.to_string().cyan(),
        ),
        json!({ "state": cli.state, "height": height, "custody": custody }),
    ))
}

fn cmd_fund(session: &Session, args: &FundArgs) -> anyhow::Result<Outcome> {
    let balance = session.host.bank.mint(&args.account, args.amount)?;
    Ok(Outcome::new(
        format!(
            "{} Funded {} with {} (balance {})",
            "✓".green(),
            args.account.to_string().cyan(),
            args.amount,
            balance.to_string().bold(),
        ),
        json!({ "account": args.account, "amount": args.amount, "balance": balance }),
    ))
}

fn cmd_advance(session: &Session, args: &AdvanceArgs) -> Outcome {
    let heights = &session.host.heights;
    let height = match (args.blocks, args.to) {
        (_, Some(to)) => heights.advance_to(to),
        (Some(blocks), None) => heights.advance(blocks),
        (None, None) => heights.advance(1),
    };
    Outcome::new(
        format!("Height is now {}", height.to_string().yellow().bold()),
        json!({ "height": height }),
    )
}

fn cmd_increment(session: &Session, args: &CallerArgs) -> anyhow::Result<Outcome> {
    let value = session.ledger.increment(&args.caller)?;
    Ok(Outcome::new(
        format!("Counter: {}", value.to_string().bold()),
        json!({ "counter": value }),
    ))
}

fn cmd_decrement(session: &Session, args: &CallerArgs) -> anyhow::Result<Outcome> {
    let value = session.ledger.decrement(&args.caller)?;
    Ok(Outcome::new(
        format!("Counter: {}", value.to_string().bold()),
        json!({ "counter": value }),
    ))
}

fn cmd_counter(session: &Session) -> anyhow::Result<Outcome> {
    let value = session.ledger.get_counter()?;
    Ok(Outcome::new(
        format!("Counter: {}", value.to_string().bold()),
        json!({ "counter": value }),
    ))
}

fn cmd_height(session: &Session) -> Outcome {
    let height = session.ledger.get_current_block();
    Outcome::new(
        format!("Height: {}", height.to_string().yellow()),
        json!({ "height": height }),
    )
}

fn cmd_deposit(session: &Session, args: &DepositArgs) -> anyhow::Result<Outcome> {
    session
        .ledger
        .deposit(&args.caller, args.amount, args.unlock_height)?;
    let record = session.ledger.get_vault_info(&args.caller)?;
    Ok(Outcome::new(
        format!(
            "{} Deposited {} for {}\n  Balance: {}\n  Unlocks at: {}",
            "✓".green().bold(),
            args.amount.to_string().bold(),
            args.caller.to_string().cyan(),
            record.balance,
            record.unlock_height.to_string().yellow(),
        ),
        json!({ "account": args.caller, "amount": args.amount, "record": record }),
    ))
}

fn cmd_withdraw(session: &Session, args: &CallerArgs) -> anyhow::Result<Outcome> {
    let amount = session.ledger.withdraw(&args.caller)?;
    Ok(Outcome::new(
        format!(
            "{} Withdrew {} to {}",
            "✓".green().bold(),
            amount.to_string().bold(),
            args.caller.to_string().cyan(),
        ),
        json!({ "account": args.caller, "amount": amount }),
    ))
}

fn cmd_vault_info(session: &Session, args: &AccountArgs) -> anyhow::Result<Outcome> {
    let record = session.ledger.get_vault_info(&args.account)?;
    let height = session.ledger.get_current_block();
    Ok(Outcome::new(
        format!(
            "{}  balance {}  unlock {}  ({})",
            args.account.to_string().cyan(),
            record.balance.to_string().bold(),
            record.unlock_height,
            lock_status(&record, height),
        ),
        json!({ "account": args.account, "record": record }),
    ))
}

fn cmd_custody(session: &Session) -> anyhow::Result<Outcome> {
    let held = session.ledger.verify_custody()?;
    let accounts = session.ledger.accounts()?;
    Ok(Outcome::new(
        format!(
            "Custody {}: {} held for {} account(s), {}",
            session.ledger.custody_account().to_string().cyan(),
            held.to_string().bold(),
            accounts.len(),
            "balanced".green(),
        ),
        json!({
            "custody": session.ledger.custody_account(),
            "held": held,
            "accounts": accounts.len(),
        }),
    ))
}

fn cmd_balance(session: &Session, args: &AccountArgs) -> anyhow::Result<Outcome> {
    let balance = session.host.bank.balance_of(&args.account)?;
    Ok(Outcome::new(
        format!("{}  {}", args.account.to_string().cyan(), balance.to_string().bold()),
        json!({ "account": args.account, "balance": balance }),
    ))
}

fn cmd_events(session: &Session, args: &EventsArgs) -> anyhow::Result<Outcome> {
    let events = session.host.events.latest(args.limit);
    let text = if events.is_empty() {
        "No events.".to_string()
    } else {
        events
            .iter()
            .map(|e| {
                format!(
                    "{} {} {} @{}",
                    format!("#{}", e.seq).yellow(),
                    e.short_id().dimmed(),
                    e.event.name().bold(),
                    e.event.height(),
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };
    Ok(Outcome::new(text, serde_json::to_value(&events)?))
}

fn lock_status(record: &VaultRecord, height: u64) -> colored::ColoredString {
    if record.balance == 0 {
        "empty".dimmed()
    } else if record.is_unlocked_at(height) {
        "unlocked".green()
    } else {
        "locked".red()
    }
}
