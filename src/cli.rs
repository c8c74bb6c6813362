use std::{
    env,
    io::{self, Write},
    path::{Path, PathBuf},
};

use anyhow::{anyhow, bail, Context};
use chrono::{NaiveDate, Utc};
use tracing::info;

use shift_planner::{
    main_shop::{determine_employee_main_shop, is_employee_on_leave},
    planning::{parse_iso_date, Employee, PlanningData, WeekKey},
    register::CashRegister,
    report::{monthly_recap, monthly_recap_csv, payment_recap, payment_totals_csv, weekly_recap, weekly_recap_csv, PayPeriod},
    storage::{
        backup::{export_to_file, import_from_file},
        clear_store, load_from_store, replace_all,
        config::Config,
        SqliteStore,
    },
};

pub const USAGE: &str = "Usage: shift-planner [--from <backup.json>] [--output <file>] <command>

Commands:
  weekly <YYYY-MM-DD>            hours per employee for the week containing the date
  monthly <YYYY-MM>              hours per employee for the month, split by week
  payments <YYYY-MM>             register totals per payment method for the month
  leave <employee> <YYYY-MM-DD>  whether the employee is on leave that day
  main-shop <employee>           the shop the employee mostly works in
  import <backup.json>           replace the stored planning with a backup
  export <backup.json>           write the stored planning to a backup
  clear                          remove every stored planning and register key";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Weekly(NaiveDate),
    Monthly { year: i32, month: u32 },
    Payments { year: i32, month: u32 },
    Leave { employee: String, date: NaiveDate },
    MainShop { employee: String },
    Import(PathBuf),
    Export(PathBuf),
    Clear,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub command: Command,
    pub from: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

pub enum CliMode {
    Run(CliArgs),
    Help,
}

pub fn parse_cli_mode() -> Result<CliMode, String> {
    parse_args(env::args().skip(1))
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    parse_iso_date(value).map_err(|_| format!("Invalid date '{}'. Use YYYY-MM-DD.", value))
}

fn parse_month(value: &str) -> Result<(i32, u32), String> {
    let invalid = || format!("Invalid month '{}'. Use YYYY-MM.", value);
    let (year, month) = value.split_once('-').ok_or_else(invalid)?;
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) {
        return Err(invalid());
    }
    Ok((year, month))
}

pub fn parse_args<I>(args: I) -> Result<CliMode, String>
where
    I: IntoIterator<Item = String>,
{
    let mut from = None;
    let mut output = None;
    let mut positional = Vec::new();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--from" => {
                let path = args.next().ok_or("--from needs a file")?;
                from = Some(PathBuf::from(path));
            }
            "--output" | "-o" => {
                let path = args.next().ok_or("--output needs a file")?;
                output = Some(PathBuf::from(path));
            }
            "--help" | "-h" => return Ok(CliMode::Help),
            flag if flag.starts_with("--") => return Err(format!("Unknown argument: {}", flag)),
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let name = positional.next().ok_or("Missing command")?;
    let mut operand = |what: &str| positional.next().ok_or_else(|| format!("{} needs {}", name, what));

    let command = match name.as_str() {
        "weekly" => Command::Weekly(parse_date(&operand("a date")?)?),
        "monthly" => {
            let (year, month) = parse_month(&operand("a month")?)?;
            Command::Monthly { year, month }
        }
        "payments" => {
            let (year, month) = parse_month(&operand("a month")?)?;
            Command::Payments { year, month }
        }
        "leave" => {
            let employee = operand("an employee")?;
            let date = parse_date(&operand("a date")?)?;
            Command::Leave { employee, date }
        }
        "main-shop" => Command::MainShop { employee: operand("an employee")? },
        "import" => Command::Import(PathBuf::from(operand("a file")?)),
        "export" => Command::Export(PathBuf::from(operand("a file")?)),
        "clear" => Command::Clear,
        other => return Err(format!("Unknown command: {}", other)),
    };

    if let Some(extra) = positional.next() {
        return Err(format!("Unexpected argument: {}", extra));
    }

    Ok(CliMode::Run(CliArgs { command, from, output }))
}

fn find_employee<'a>(data: &'a PlanningData, query: &str) -> anyhow::Result<&'a Employee> {
    if let Some(employee) = data.employee(query) {
        return Ok(employee);
    }
    let matches: Vec<&Employee> = data
        .employees
        .iter()
        .filter(|employee| employee.name.eq_ignore_ascii_case(query))
        .collect();
    match matches.as_slice() {
        [employee] => Ok(*employee),
        [] => Err(anyhow!("No employee named '{}'", query)),
        _ => Err(anyhow!("Several employees are named '{}'; use their id", query)),
    }
}

fn load_planning(args: &CliArgs, store: &SqliteStore) -> anyhow::Result<PlanningData> {
    match &args.from {
        Some(path) => import_from_file(path)
            .with_context(|| format!("Failed to read backup {}", path.display())),
        None => load_from_store(store).context("Failed to load the stored planning"),
    }
}

fn emit(output: Option<&Path>, content: &str) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), "wrote report");
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

pub fn run(args: CliArgs, config: &Config) -> anyhow::Result<()> {
    let mut store = SqliteStore::open(&config.storage.database_path)
        .with_context(|| format!("Failed to open {}", config.storage.database_path.display()))?;
    let output = args.output.as_deref();

    match &args.command {
        Command::Weekly(date) => {
            let data = load_planning(&args, &store)?;
            let rows = weekly_recap(&data, WeekKey::containing(*date));
            emit(output, &weekly_recap_csv(&rows))
        }
        Command::Monthly { year, month } => {
            let data = load_planning(&args, &store)?;
            let period = PayPeriod::month(*year, *month).ok_or_else(|| anyhow!("Invalid month"))?;
            let rows = monthly_recap(&data, &period);
            emit(output, &monthly_recap_csv(&rows))
        }
        Command::Payments { year, month } => {
            let period = PayPeriod::month(*year, *month).ok_or_else(|| anyhow!("Invalid month"))?;
            let register = CashRegister::new(store);
            let totals = payment_recap(&register.history()?, &period);
            emit(output, &payment_totals_csv(&totals))
        }
        Command::Leave { employee, date } => {
            let data = load_planning(&args, &store)?;
            let employee = find_employee(&data, employee)?;
            let answer = if is_employee_on_leave(&data, &employee.id, *date) {
                format!("{} is on leave on {}\n", employee.name, date)
            } else {
                format!("{} is not on leave on {}\n", employee.name, date)
            };
            emit(output, &answer)
        }
        Command::MainShop { employee } => {
            let data = load_planning(&args, &store)?;
            let employee = find_employee(&data, employee)?;
            let answer = match determine_employee_main_shop(&data, &employee.id) {
                Some(shop_id) => {
                    let name = data.shop(&shop_id).map_or(shop_id.as_str(), |s| s.name.as_str());
                    format!("{}: {}\n", employee.name, name)
                }
                None => format!("{}: no shop\n", employee.name),
            };
            emit(output, &answer)
        }
        Command::Import(path) => {
            let data = import_from_file(path)
                .with_context(|| format!("Failed to import {}", path.display()))?;
            store
                .transaction(|store| replace_all(store, &data))
                .context("Failed to store the import; the previous planning is kept")?;
            println!("Imported {} shop(s), {} employee(s)", data.shops.len(), data.employees.len());
            Ok(())
        }
        Command::Export(path) => {
            let data = load_planning(&args, &store)?;
            export_to_file(&data, path)
                .with_context(|| format!("Failed to export to {}", path.display()))?;
            println!("Exported {} shop(s) at {}", data.shops.len(), Utc::now().format("%Y-%m-%d %H:%M"));
            Ok(())
        }
        Command::Clear => {
            let failures = clear_store(&mut store);
            if failures > 0 {
                bail!("{} key(s) could not be removed", failures);
            }
            println!("Cleared stored planning");
            Ok(())
        }
    }
}
