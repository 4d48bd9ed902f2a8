mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use log::LevelFilter;
use std::process;

use commands::annuity::AnnuityArgs;
use commands::credit_card::CreditCardArgs;
use commands::currency::ConvertArgs;
use commands::discount::{DiscountArgs, DiscountRateArgs};
use commands::education::CollegeArgs;
use commands::housing::RentArgs;
use commands::lease::{AutoLeaseArgs, LeaseArgs};
use commands::payment::PaymentArgs;
use commands::retirement::K401Args;

/// Consumer financial calculators
#[derive(Parser)]
#[command(
    name = "fincalc",
    version,
    about = "Consumer financial calculators with decimal precision",
    long_about = "A CLI for everyday financial calculations with decimal precision. \
                  Supports loan payments and amortization, annuity payouts, leases, \
                  401(k) projections, college savings, credit card payoff, currency \
                  conversion, discounts and rent affordability."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log calculation details to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Loan payment (or term) with a full amortization schedule
    Payment(PaymentArgs),
    /// Annuity payout from a lump sum
    Annuity(AnnuityArgs),
    /// General lease payment with a residual value
    Lease(LeaseArgs),
    /// Dealer-style auto lease (money factor) breakdown
    AutoLease(AutoLeaseArgs),
    /// 401(k) balance at retirement and retirement income
    #[command(name = "401k")]
    K401(K401Args),
    /// College cost projection and savings plan
    College(CollegeArgs),
    /// Credit card payoff schedule
    CreditCard(CreditCardArgs),
    /// Convert an amount between currencies
    Convert(ConvertArgs),
    /// Sale price after discounts and sales tax
    Discount(DiscountArgs),
    /// Percent off implied by an original and a sale price
    DiscountRate(DiscountRateArgs),
    /// Affordable monthly rent for an income
    Rent(RentArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result: commands::CommandResult = match cli.command {
        Commands::Payment(args) => commands::payment::run_payment(args),
        Commands::Annuity(args) => commands::annuity::run_annuity(args),
        Commands::Lease(args) => commands::lease::run_lease(args),
        Commands::AutoLease(args) => commands::lease::run_auto_lease(args),
        Commands::K401(args) => commands::retirement::run_k401(args),
        Commands::College(args) => commands::education::run_college(args),
        Commands::CreditCard(args) => commands::credit_card::run_credit_card(args),
        Commands::Convert(args) => commands::currency::run_convert(args),
        Commands::Discount(args) => commands::discount::run_discount(args),
        Commands::DiscountRate(args) => commands::discount::run_discount_rate(args),
        Commands::Rent(args) => commands::housing::run_rent(args),
        Commands::Version => {
            println!("fincalc {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            log::debug!("command failed: {e:?}");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
