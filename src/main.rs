// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{bail, Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use rusqlite::Connection;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use esms::{
    count_employees, delete_employee, format_dob, get_employee, normalize_name, open_database,
    search_employees, Config, Employee, EmployeeId, EmployeeRegistry, LinearScanNameChecker,
    NameUniquenessChecker, SaveOutcome,
};

const EXIT_SAVED: u8 = 0;
/// Exit status when a save is refused for bad or duplicate input
const EXIT_REJECTED: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "esms", version, about = "Employee Staff Management System")]
struct Cli {
    /// SQLite database file (default: $ESMS_DB_PATH, then ./employees.db)
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the database and employees table if missing.
    Init,
    /// List employees, optionally filtered by name, department or position.
    List {
        #[arg(short, long)]
        search: Option<String>,
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Show one employee record.
    Show {
        id: EmployeeId,
        #[arg(long)]
        json: bool,
    },
    /// Register a new employee.
    Add(FieldArgs),
    /// Edit an employee; fields not given keep their stored value.
    Update {
        id: EmployeeId,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Delete an employee.
    Delete {
        id: EmployeeId,
        /// Skip the confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },
    /// Show a name's comparison key and whether it collides with a stored name.
    CheckName {
        name: String,
        /// Ignore this record (the one being edited).
        #[arg(long)]
        exclude: Option<EmployeeId>,
    },
    /// Interactive terminal UI (default).
    #[cfg(feature = "tui")]
    Tui,
}

#[derive(ClapArgs, Debug, Default)]
struct FieldArgs {
    #[arg(long)]
    name: Option<String>,
    /// MALE, FEMALE or OTHERS
    #[arg(long)]
    gender: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    dob: Option<String>,
    /// HR, IT, SALES, FINANCE, MARKETING, OPERATIONS or OTHERS
    #[arg(long)]
    department: Option<String>,
    /// ADMIN, MANAGER, SUPERVISOR, STAFF, INTERN or OTHERS
    #[arg(long)]
    position: Option<String>,
    /// ACTIVE, INACTIVE, TERMINATED or ON LEAVE
    #[arg(long)]
    status: Option<String>,
    /// 10 or 11 digit phone number
    #[arg(long)]
    contact: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    address: Option<String>,
}

impl FieldArgs {
    /// Overwrite the fields that were given on the command line
    fn apply_to(self, emp: &mut Employee) {
        let FieldArgs {
            name,
            gender,
            dob,
            department,
            position,
            status,
            contact,
            email,
            address,
        } = self;

        let pairs = [
            (&mut emp.name, name),
            (&mut emp.gender, gender),
            (&mut emp.dob, dob),
            (&mut emp.department, department),
            (&mut emp.position, position),
            (&mut emp.status, status),
            (&mut emp.contact, contact),
            (&mut emp.email, email),
            (&mut emp.address, address),
        ];
        for (slot, value) in pairs {
            if let Some(v) = value {
                *slot = v;
            }
        }
    }
}

fn main() -> Result<ExitCode> {
    // .env is optional
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = Config::resolve(cli.db, cli.verbose);

    #[cfg(feature = "tui")]
    let interactive = matches!(cli.command, None | Some(Command::Tui));
    #[cfg(not(feature = "tui"))]
    let interactive = false;

    init_tracing(&config, interactive)?;

    let conn = open_database(&config.db_path)?;

    match cli.command {
        Some(Command::Init) => {
            println!("✓ Database ready: {}", config.db_path.display());
            println!("✓ {} employees on file", count_employees(&conn)?);
            Ok(ExitCode::SUCCESS)
        }
        Some(Command::List { search, json }) => {
            run_list(&conn, search.as_deref().unwrap_or(""), json)?;
            Ok(ExitCode::SUCCESS)
        }
        Some(Command::Show { id, json }) => run_show(&conn, id, json),
        Some(Command::Add(fields)) => {
            let mut emp = Employee::default();
            fields.apply_to(&mut emp);
            run_save(&conn, &emp, None).map(ExitCode::from)
        }
        Some(Command::Update { id, fields }) => {
            let Some(mut emp) = get_employee(&conn, id)? else {
                bail!("No employee with id {}", id);
            };
            fields.apply_to(&mut emp);
            run_save(&conn, &emp, Some(id)).map(ExitCode::from)
        }
        Some(Command::Delete { id, yes }) => run_delete(&conn, id, yes),
        Some(Command::CheckName { name, exclude }) => {
            let taken = LinearScanNameChecker::new(&conn).name_exists(&name, exclude)?;
            println!("key:   {}", normalize_name(&name));
            println!("taken: {}", if taken { "yes" } else { "no" });
            Ok(ExitCode::SUCCESS)
        }
        #[cfg(feature = "tui")]
        Some(Command::Tui) | None => {
            ui::run(&conn)?;
            Ok(ExitCode::SUCCESS)
        }
        #[cfg(not(feature = "tui"))]
        None => {
            run_list(&conn, "", false)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Console logging for one-shot commands; the TUI logs to a file so the
/// screen stays clean.
fn init_tracing(config: &Config, to_file: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter));

    if to_file {
        let log_path = config.log_path();
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(file))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }

    Ok(())
}

fn run_list(conn: &Connection, query: &str, json: bool) -> Result<()> {
    let employees = search_employees(conn, query)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&employees)?);
        return Ok(());
    }

    println!("{:>5}  {:<32} {:<18} {:<12}", "ID", "NAME", "DOB", "POSITION");
    for emp in &employees {
        println!(
            "{:>5}  {:<32} {:<18} {:<12}",
            emp.id.unwrap_or_default(),
            truncate(&emp.name, 32),
            format_dob(&emp.dob),
            emp.position
        );
    }
    println!("\n{} employees", employees.len());

    Ok(())
}

fn run_show(conn: &Connection, id: EmployeeId, json: bool) -> Result<ExitCode> {
    let Some(emp) = get_employee(conn, id)? else {
        eprintln!("❌ No employee with id {}", id);
        return Ok(ExitCode::FAILURE);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&emp)?);
    } else {
        println!("ID:          {}", id);
        for field in esms::Field::ALL {
            println!("{:<12} {}", format!("{}:", field.title()), emp.get(field));
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Returns the process exit status
fn run_save(conn: &Connection, emp: &Employee, existing_id: Option<EmployeeId>) -> Result<u8> {
    let registry = EmployeeRegistry::new(conn);
    let outcome = registry
        .save(emp, existing_id)
        .context("Failed to save record")?;

    match outcome {
        SaveOutcome::Created(id) => {
            println!("✓ Record saved successfully (id {})", id);
            Ok(EXIT_SAVED)
        }
        SaveOutcome::Updated(id) => {
            println!("✓ Record {} updated successfully", id);
            Ok(EXIT_SAVED)
        }
        SaveOutcome::Rejected(rejection) => {
            eprintln!("❌ {}: {}", rejection.title(), rejection);
            Ok(EXIT_REJECTED)
        }
    }
}

fn run_delete(conn: &Connection, id: EmployeeId, yes: bool) -> Result<ExitCode> {
    let Some(emp) = get_employee(conn, id)? else {
        eprintln!("❌ No employee with id {}", id);
        return Ok(ExitCode::FAILURE);
    };

    if !yes && !confirm(&format!("Delete {} (id {})? [y/N] ", emp.name, id))? {
        println!("Cancelled.");
        return Ok(ExitCode::SUCCESS);
    }

    delete_employee(conn, id)?;
    println!("✓ Deleted {}", emp.name);
    Ok(ExitCode::SUCCESS)
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}
