use crate::server;
use clap::{Args, Parser, Subcommand};
use mortgage_ledger::error::AppError;
use mortgage_ledger::mortgages::{assess, MortgageTerms};

#[derive(Parser, Debug)]
#[command(
    name = "Mortgage Ledger",
    about = "Run the mortgage ledger service or rate a mortgage from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Score a single mortgage without touching the database
    Rate(RateArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug)]
pub(crate) struct RateArgs {
    #[arg(long)]
    pub(crate) credit_score: i64,
    #[arg(long)]
    pub(crate) loan_amount: f64,
    #[arg(long)]
    pub(crate) property_value: f64,
    #[arg(long)]
    pub(crate) annual_income: f64,
    #[arg(long)]
    pub(crate) debt_amount: f64,
    /// "fixed" or "adjustable"; other values score neutrally
    #[arg(long, default_value = "fixed")]
    pub(crate) loan_type: String,
    #[arg(long, default_value = "single_family")]
    pub(crate) property_type: String,
    /// Portfolio-wide average credit score to rate against (defaults to this mortgage's own score)
    #[arg(long)]
    pub(crate) average_credit_score: Option<f64>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Rate(args) => run_rate(args),
    }
}

pub(crate) fn run_rate(args: RateArgs) -> Result<(), AppError> {
    let average = args
        .average_credit_score
        .unwrap_or(args.credit_score as f64);
    let terms = MortgageTerms {
        credit_score: args.credit_score,
        loan_amount: args.loan_amount,
        property_value: args.property_value,
        annual_income: args.annual_income,
        debt_amount: args.debt_amount,
        loan_type: args.loan_type,
        property_type: args.property_type,
    };
    terms.validate().map_err(AppError::InvalidInput)?;

    let assessment = assess(&terms, average);
    println!("Mortgage risk assessment");
    println!(
        "- loan-to-value {:.2} | debt-to-income {:.2} | average credit score {:.0}",
        assessment.loan_to_value, assessment.debt_to_income, average
    );
    println!(
        "- risk score {} -> rating {}",
        assessment.risk_score, assessment.rating
    );
    Ok(())
}
