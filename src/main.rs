//! Applicant Desk command line
//!
//! Terminal front-end over the applicant store: lists, filters and edits applicants held by
//! the remote Applicants API.

use std::io::{self, BufRead, Write};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use applicant_desk::form::{ApplicantForm, FormSubmission, SubmitOutcome, ValidationRules};
use applicant_desk::models::Applicant;
use applicant_desk::store::StoreOptions;
use applicant_desk::view::{ListView, StatusFilter};
use applicant_desk::{ApiClient, ApplicantApi, ApplicantStore, Config};

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// How long a submit may run before the "Saving..." hint appears.
const SAVING_HINT_DELAY: Duration = Duration::from_millis(300);

#[derive(Parser, Debug)]
#[command(
    name = "applicant-desk",
    about = "Manage job applicants stored behind the Applicants API",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List one page of applicants
    List(ListArgs),
    /// Show a single applicant
    Show { id: i64 },
    /// Create an applicant
    Add(FieldArgs),
    /// Edit an applicant; omitted fields keep their current value
    Edit {
        id: i64,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Delete an applicant
    Delete {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
    /// Flip an applicant between hired and pending
    ToggleHired {
        id: i64,
        /// Page the applicant is listed on
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
}

#[derive(Args, Debug)]
struct ListArgs {
    #[arg(long, default_value_t = 1)]
    page: u32,
    /// Defaults to APPLICANTS_PAGE_SIZE
    #[arg(long)]
    page_size: Option<u32>,
    /// Case-insensitive match on name, family name, email or country
    #[arg(long, default_value = "")]
    search: String,
    /// all, hired or pending
    #[arg(long, default_value_t = StatusFilter::All)]
    status: StatusFilter,
}

#[derive(Args, Debug)]
struct FieldArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    family_name: Option<String>,
    #[arg(long)]
    address: Option<String>,
    #[arg(long)]
    country: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    age: Option<String>,
    /// Bare `--hired` means true
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    hired: Option<bool>,
}

impl FieldArgs {
    fn apply_to(self, form: &mut ApplicantForm) {
        if let Some(name) = self.name {
            form.name = name;
        }
        if let Some(family_name) = self.family_name {
            form.family_name = family_name;
        }
        if let Some(address) = self.address {
            form.address = address;
        }
        if let Some(country) = self.country {
            form.country = country;
        }
        if let Some(email) = self.email {
            form.email = email;
        }
        if let Some(age) = self.age {
            form.age = age;
        }
        if let Some(hired) = self.hired {
            form.hired = hired;
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> CliResult {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("Applicants API at {}", config.api_base);

    let client = ApiClient::from_config(&config)?;
    let mut store =
        ApplicantStore::with_options(client, config.page_size, StoreOptions::from(&config));
    let rules = ValidationRules::from(&config);

    match cli.command {
        Command::List(args) => list(&mut store, args).await,
        Command::Show { id } => {
            let applicant = store.api().fetch_applicant(id).await?;
            print_details(&applicant);
            Ok(())
        }
        Command::Add(fields) => {
            let mut form = ApplicantForm {
                age: rules.age_range.start().to_string(),
                ..ApplicantForm::default()
            };
            fields.apply_to(&mut form);
            submit(&mut store, rules, &form, None).await
        }
        Command::Edit { id, fields } => {
            let current = store.api().fetch_applicant(id).await?;
            let mut form = ApplicantForm::from_applicant(&current);
            fields.apply_to(&mut form);
            submit(&mut store, rules, &form, Some(id)).await
        }
        Command::Delete { id, yes } => {
            if !yes && !confirm("Are you sure you want to delete this applicant?")? {
                println!("Cancelled");
                return Ok(());
            }
            store.delete_applicant(id).await?;
            println!("Deleted applicant #{}", id);
            Ok(())
        }
        Command::ToggleHired { id, page } => {
            store.set_current_page(page);
            store.load_applicants().await?;
            if store.find(id).is_none() {
                return Err(format!("applicant #{} is not listed on page {}", id, page).into());
            }
            let hired = store.toggle_hired(id).await?;
            println!(
                "Applicant #{} is now {}",
                id,
                if hired { "hired" } else { "pending" }
            );
            Ok(())
        }
    }
}

async fn list<A: ApplicantApi>(store: &mut ApplicantStore<A>, args: ListArgs) -> CliResult {
    let mut view = ListView::default();
    view.set_search_term(store, args.search);
    view.set_status(store, args.status);
    if let Some(size) = args.page_size {
        store.set_items_per_page(size);
    }
    store.set_current_page(args.page);
    store.load_applicants().await?;

    let shown = view.filter(store.applicants());
    if shown.is_empty() {
        println!("No applicants found matching your criteria.");
    }
    for applicant in &shown {
        print_row(applicant);
    }

    let summary = view.summary(store);
    let page = store.page();
    println!(
        "Showing {} of {} applicants (page {} of {}, {} in total)",
        summary.shown,
        summary.loaded,
        page.current_page,
        page.total_pages.max(1),
        summary.total_count
    );
    if page.has_previous() {
        println!("  previous: --page {}", page.current_page - 1);
    }
    if page.has_next() {
        println!("  next:     --page {}", page.current_page + 1);
    }
    Ok(())
}

/// Ask a yes/no question on stdin; anything but y/yes counts as no.
fn confirm(question: &str) -> io::Result<bool> {
    print!("{} [y/N] ", question);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

async fn submit<A: ApplicantApi>(
    store: &mut ApplicantStore<A>,
    rules: ValidationRules,
    form: &ApplicantForm,
    editing: Option<i64>,
) -> CliResult {
    let mut submission = FormSubmission::new(rules);
    let busy = submission.busy_flag();
    let pending = submission.submit(store, form, editing);
    tokio::pin!(pending);
    let outcome = tokio::select! {
        outcome = &mut pending => outcome,
        _ = tokio::time::sleep(SAVING_HINT_DELAY) => {
            if busy.is_set() {
                eprintln!("Saving...");
            }
            pending.await
        }
    };

    match outcome {
        SubmitOutcome::Created(applicant) => {
            println!("Added applicant #{}", applicant.id);
            print_details(&applicant);
            Ok(())
        }
        SubmitOutcome::Updated(id) => {
            println!("Updated applicant #{}", id);
            Ok(())
        }
        SubmitOutcome::Invalid(errors) | SubmitOutcome::Rejected(errors) => {
            eprint!("{}", errors);
            Err("applicant was not saved".into())
        }
        SubmitOutcome::Failed(message) => Err(message.into()),
    }
}

fn print_row(applicant: &Applicant) {
    println!(
        "#{:<5} {:<28} {:<18} {:<32} {:>3}  {}",
        applicant.id,
        applicant.full_name(),
        applicant.country.as_deref().unwrap_or("-"),
        applicant.email.as_deref().unwrap_or("-"),
        applicant.age,
        applicant.status_label()
    );
}

fn print_details(applicant: &Applicant) {
    println!("#{} {} ({})", applicant.id, applicant.full_name(), applicant.status_label());
    println!("  Address: {}", applicant.address.as_deref().unwrap_or("-"));
    println!("  Country: {}", applicant.country.as_deref().unwrap_or("-"));
    println!("  Email:   {}", applicant.email.as_deref().unwrap_or("-"));
    println!("  Age:     {} years", applicant.age);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("applicant-desk").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_bare_hired_flag() {
        let Command::Add(fields) = parse(&["add", "--name", "Johnny", "--hired"]).command else {
            panic!("expected add");
        };
        assert_eq!(fields.hired, Some(true));

        let Command::Add(fields) = parse(&["add", "--hired", "false"]).command else {
            panic!("expected add");
        };
        assert_eq!(fields.hired, Some(false));

        let Command::Add(fields) = parse(&["add", "--name", "Johnny"]).command else {
            panic!("expected add");
        };
        assert_eq!(fields.hired, None);
    }

    #[test]
    fn test_delete_confirmation() {
        assert!(matches!(
            parse(&["delete", "3"]).command,
            Command::Delete { id: 3, yes: false }
        ));
        assert!(matches!(
            parse(&["delete", "3", "--yes"]).command,
            Command::Delete { id: 3, yes: true }
        ));

        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes(""));
        assert!(!is_yes("no"));
    }

    // Arguments are parsed before the environment is read, so help survives bad config.
    #[test]
    fn test_help_ignores_broken_config() {
        std::env::set_var("APPLICANTS_PAGE_SIZE", "lots");
        assert!(Config::from_env().is_err());

        let err = Cli::try_parse_from(["applicant-desk", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);

        std::env::remove_var("APPLICANTS_PAGE_SIZE");
    }
}
