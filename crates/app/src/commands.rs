use std::{path::PathBuf, str::FromStr};

use api_types::transaction::TransactionRequest;
use chrono::{NaiveDate, NaiveDateTime};
use clap::{Args, Parser, Subcommand};
use engine::{AccountRef, Currency, Item, Money, TransactionDraft, datetime};

use crate::{
    client::{Client, ClientError},
    config::Overrides,
    error::{AppError, Result},
    render,
};

#[derive(Parser, Debug)]
#[command(name = "finnance")]
#[command(about = "Draft, check and submit split transactions")]
pub struct Cli {
    /// Path of the TOML config file.
    #[arg(long)]
    pub config: Option<String>,
    #[arg(long)]
    pub base_url: Option<String>,
    #[arg(long)]
    pub username: Option<String>,
    /// Log level, e.g. `debug` or `warn`.
    #[arg(long)]
    pub level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            config: self.config.clone(),
            base_url: self.base_url.clone(),
            username: self.username.clone(),
            level: self.level.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print a stored transaction as an edit draft.
    Show(ShowArgs),
    /// Build a draft offline and validate it.
    Check(CheckArgs),
    /// Create a transaction.
    Add(AddArgs),
    /// Change a stored transaction.
    Edit(EditArgs),
}

impl Command {
    pub fn needs_server(&self) -> bool {
        !matches!(self, Self::Check(_))
    }
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    pub id: i64,
    /// Print the draft snapshot as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Book the draft on this account instead of a remote agent.
    #[arg(long)]
    pub account: Option<i64>,
    /// Start from a draft snapshot (as printed by `show --json`).
    #[arg(long)]
    pub from: Option<PathBuf>,
    #[command(flatten)]
    pub draft: DraftArgs,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    #[arg(long)]
    pub account: Option<i64>,
    #[command(flatten)]
    pub draft: DraftArgs,
    /// Print the payload instead of submitting it.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    pub id: i64,
    #[command(flatten)]
    pub draft: DraftArgs,
    /// Type an amount into one row, e.g. `1=12.50`; `1=` clears it.
    #[arg(long = "item-amount")]
    pub item_amounts: Vec<ItemAmountArg>,
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Default)]
pub struct DraftArgs {
    /// Transaction total in major units.
    #[arg(long)]
    pub total: Option<String>,
    #[arg(long, conflicts_with = "expense")]
    pub income: bool,
    #[arg(long)]
    pub expense: bool,
    #[arg(long)]
    pub agent: Option<String>,
    #[arg(long)]
    pub comment: Option<String>,
    /// Issue date, `YYYY-MM-DD`.
    #[arg(long)]
    pub date: Option<NaiveDate>,
    /// Issue time, `HH:mm`.
    #[arg(long)]
    pub time: Option<String>,
    /// Book the whole total as one flow to `--agent`, ignoring rows.
    #[arg(long, conflicts_with = "split")]
    pub direct: bool,
    /// Itemize a direct transaction again.
    #[arg(long)]
    pub split: bool,
    #[arg(long)]
    pub remote_agent: Option<String>,
    /// Record row, `<category id>[=<amount>]`. Replaces existing rows.
    #[arg(long = "record")]
    pub records: Vec<ItemArg>,
    /// Flow row, `<agent>[=<amount>]`. Replaces existing rows.
    #[arg(long = "flow")]
    pub flows: Vec<ItemArg>,
    #[arg(long)]
    pub currency_id: Option<i64>,
    /// Fraction digits of `--currency-id` when checking offline.
    #[arg(long, requires = "currency_id")]
    pub decimals: Option<u8>,
}

/// `<name>[=<amount>]`, split at the last `=` so agent names may contain one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemArg {
    pub name: String,
    pub amount: Option<String>,
}

impl FromStr for ItemArg {
    type Err = String;

    fn from_str(raw: &str) -> std::result::Result<Self, Self::Err> {
        let (name, amount) = match raw.rsplit_once('=') {
            Some((name, amount)) => (name, Some(amount.trim().to_string())),
            None => (raw, None),
        };
        if name.trim().is_empty() {
            return Err(format!("missing name in '{raw}'"));
        }
        Ok(Self {
            name: name.trim().to_string(),
            amount: amount.filter(|amount| !amount.is_empty()),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemAmountArg {
    pub index: usize,
    pub amount: Option<String>,
}

impl FromStr for ItemAmountArg {
    type Err = String;

    fn from_str(raw: &str) -> std::result::Result<Self, Self::Err> {
        let (index, amount) = raw
            .split_once('=')
            .ok_or_else(|| format!("expected <index>=<amount>, got '{raw}'"))?;
        let index = index
            .trim()
            .parse()
            .map_err(|_| format!("invalid row index '{index}'"))?;
        let amount = amount.trim();
        Ok(Self {
            index,
            amount: (!amount.is_empty()).then(|| amount.to_string()),
        })
    }
}

fn parse_amount(draft: &TransactionDraft, raw: &str) -> Result<Money> {
    Ok(Money::parse_major(raw, draft.decimals())?)
}

impl DraftArgs {
    /// Applies the flags the way the form is filled: rows first, then the
    /// total, then the amounts typed into rows, so blank rows take the rest.
    pub fn apply(&self, draft: &mut TransactionDraft) -> Result<()> {
        if self.income {
            draft.is_expense = false;
        } else if self.expense {
            draft.is_expense = true;
        }
        if let Some(agent) = &self.agent {
            draft.agent.clone_from(agent);
        }
        if let Some(comment) = &self.comment {
            draft.comment.clone_from(comment);
        }
        if let Some(date) = self.date {
            draft.date = date;
        }
        if let Some(time) = &self.time {
            draft.time = Some(datetime::parse_time(time)?);
        }
        if self.direct {
            draft.direct = true;
        } else if self.split {
            draft.direct = false;
        }
        if let Some(remote_agent) = &self.remote_agent {
            draft.remote_agent = Some(remote_agent.clone());
        }

        let total = self
            .total
            .as_deref()
            .map(|raw| parse_amount(draft, raw))
            .transpose()?;

        if self.records.is_empty() && self.flows.is_empty() {
            if total.is_some() {
                draft.set_total(total);
            }
            return Ok(());
        }

        draft.clear_items();
        let mut typed = Vec::with_capacity(self.records.len() + self.flows.len());
        for record in &self.records {
            let category_id = record.name.parse::<i64>().map_err(|_| {
                AppError::Invalid(format!("invalid category id '{}'", record.name))
            })?;
            draft.push_item(Item::record(Some(category_id), None));
            typed.push(record.amount.as_deref());
        }
        for flow in &self.flows {
            draft.push_item(Item::flow(flow.name.clone(), None));
            typed.push(flow.amount.as_deref());
        }

        if total.is_some() {
            draft.set_total(total);
        }
        for (index, raw) in typed.into_iter().enumerate() {
            if let Some(raw) = raw {
                let amount = parse_amount(draft, raw)?;
                draft.set_item_amount(index, Some(amount))?;
            }
        }
        Ok(())
    }

    fn offline_currency(&self) -> Option<Currency> {
        self.currency_id.map(|id| {
            Currency::new(
                id,
                format!("#{id}"),
                self.decimals.unwrap_or(Currency::DEFAULT_DECIMALS),
            )
        })
    }
}

pub async fn run(command: Command, client: &mut Client, now: NaiveDateTime) -> Result<()> {
    match command {
        Command::Show(args) => show(client, args).await,
        Command::Check(args) => check(args, now),
        Command::Add(args) => add(client, args, now).await,
        Command::Edit(args) => edit(client, args).await,
    }
}

fn load_error(what: String) -> impl FnOnce(ClientError) -> AppError {
    move |source| AppError::Load { what, source }
}

fn print_draft(draft: &TransactionDraft) {
    for line in render::draft_lines(draft) {
        println!("{line}");
    }
}

/// Validates the draft and builds its payload; invalid fields are reported
/// on stderr and block submission.
fn checked_request(draft: &TransactionDraft) -> Result<TransactionRequest> {
    let errors = draft.validate();
    if !errors.is_empty() {
        for line in render::validation_lines(draft, &errors) {
            eprintln!("{line}");
        }
        return Err(AppError::Invalid(format!(
            "draft has {} invalid field(s)",
            errors.len()
        )));
    }
    Ok(draft.to_request()?)
}

fn print_payload(request: &TransactionRequest) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(request)?);
    Ok(())
}

async fn show(client: &mut Client, args: ShowArgs) -> Result<()> {
    let detail = client
        .transaction(args.id)
        .await
        .map_err(load_error(format!("transaction {}", args.id)))?;
    let draft = TransactionDraft::from_detail(&detail)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&draft)?);
    } else {
        print_draft(&draft);
    }
    Ok(())
}

fn check(args: CheckArgs, now: NaiveDateTime) -> Result<()> {
    let mut draft = match &args.from {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => {
            let mut draft = TransactionDraft::new(None, now);
            draft.set_currency(args.draft.offline_currency());
            if let Some(id) = args.account {
                draft.account_id = Some(id);
                draft.remote_agent = None;
            }
            draft
        }
    };
    args.draft.apply(&mut draft)?;

    print_draft(&draft);
    let request = checked_request(&draft)?;
    print_payload(&request)
}

async fn resolve_currency(client: &mut Client, id: i64) -> Result<Currency> {
    let currencies = client
        .currencies()
        .await
        .map_err(load_error("currencies".to_string()))?;
    currencies
        .iter()
        .find(|currency| currency.id == id)
        .map(Currency::from)
        .ok_or_else(|| AppError::Invalid(format!("unknown currency {id}")))
}

async fn add(client: &mut Client, args: AddArgs, now: NaiveDateTime) -> Result<()> {
    let account = match args.account {
        Some(id) => {
            let view = client
                .account(id)
                .await
                .map_err(load_error(format!("account {id}")))?;
            let currency = match &view.currency {
                Some(currency) => Currency::from(currency),
                None => resolve_currency(client, view.currency_id).await?,
            };
            Some(AccountRef { id, currency })
        }
        None => None,
    };

    let mut draft = TransactionDraft::new(account.as_ref(), now);
    if let Some(currency_id) = args.draft.currency_id {
        draft.set_currency(Some(resolve_currency(client, currency_id).await?));
    }
    args.draft.apply(&mut draft)?;

    print_draft(&draft);
    let request = checked_request(&draft)?;
    if args.dry_run {
        return print_payload(&request);
    }

    client
        .add_transaction(&request)
        .await
        .map_err(AppError::Submit)?;
    tracing::info!(amount = request.amount, "transaction added");
    println!("saved");
    Ok(())
}

async fn edit(client: &mut Client, args: EditArgs) -> Result<()> {
    let detail = client
        .transaction(args.id)
        .await
        .map_err(load_error(format!("transaction {}", args.id)))?;
    let mut draft = TransactionDraft::from_detail(&detail)?;
    if let Some(currency_id) = args.draft.currency_id {
        draft.set_currency(Some(resolve_currency(client, currency_id).await?));
    }
    args.draft.apply(&mut draft)?;
    for typed in &args.item_amounts {
        let amount = typed
            .amount
            .as_deref()
            .map(|raw| parse_amount(&draft, raw))
            .transpose()?;
        draft.set_item_amount(typed.index, amount)?;
    }

    print_draft(&draft);
    let request = checked_request(&draft)?;
    if args.dry_run {
        return print_payload(&request);
    }

    client
        .edit_transaction(args.id, &request)
        .await
        .map_err(AppError::Submit)?;
    tracing::info!(id = args.id, "transaction updated");
    println!("saved");
    Ok(())
}
