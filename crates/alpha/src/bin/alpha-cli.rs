//! Developer CLI: parse an expression, evaluate it at one date, or evaluate
//! it across a whole synthetic panel. No file/network I/O — every run builds
//! its own in-memory field bundle from `alpha_eval::test_support`.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use alpha_eval::test_support::SyntheticBundle;
use alpha_eval::value::{FieldBundle, PanelValue, ScalarValue};
use alpha_parse::{analyze, parse, pretty_print};

#[derive(Parser, Debug)]
#[command(name = "alpha", about = "Panel-data alpha expression CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse an expression and print its AST and referenced fields/functions.
    Parse {
        expr: String,
    },
    /// Evaluate an expression at one date in the synthetic bundle.
    Eval(BundleArgs),
    /// Evaluate an expression across the whole synthetic panel.
    Panel(BundleArgs),
}

#[derive(Parser, Debug)]
struct BundleArgs {
    expr: String,

    /// RNG seed for the synthetic `returns`/`close`/`volume` fields.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Number of business days in the synthetic panel.
    #[arg(long, default_value_t = 30)]
    days: usize,

    /// Comma-separated symbol list.
    #[arg(long, default_value = "A,B,C")]
    symbols: String,

    /// First date of the panel, `YYYY-MM-DD`.
    #[arg(long, default_value = "2024-01-01")]
    start: String,

    /// Date to evaluate at (for `eval`), `YYYY-MM-DD`. Defaults to the last
    /// date in the panel.
    #[arg(long)]
    date: Option<String>,
}

fn build_bundle(args: &BundleArgs) -> Result<FieldBundle> {
    let start = NaiveDate::parse_from_str(&args.start, "%Y-%m-%d")
        .with_context(|| format!("invalid --start date {:?}", args.start))?;
    let symbols: Vec<&str> = args.symbols.split(',').map(str::trim).collect();
    Ok(SyntheticBundle::new(args.seed, start, args.days, &symbols)
        .with_gaussian_field("returns", 0.0, 0.01)
        .with_gaussian_field("close", 100.0, 5.0)
        .with_gaussian_field("volume", 1_000_000.0, 50_000.0)
        .build())
}

fn main() -> Result<()> {
    alpha_eval::function_registry::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Parse { expr } => {
            let ast = parse(&expr).map_err(|e| anyhow::anyhow!("{e}"))?;
            let analysis = analyze(&ast);
            println!("{}", pretty_print(&ast));
            println!("fields:    {:?}", analysis.fields);
            println!("functions: {:?}", analysis.functions);
            println!("windows:   {:?}", analysis.windows);
        }
        Command::Eval(args) => {
            let bundle = build_bundle(&args)?;
            let ast = parse(&args.expr).map_err(|e| anyhow::anyhow!("{e}"))?;
            let date = match &args.date {
                Some(d) => NaiveDate::parse_from_str(d, "%Y-%m-%d")
                    .with_context(|| format!("invalid --date {d:?}"))?,
                None => *bundle.dates.last().context("empty panel")?,
            };
            let date_idx = bundle
                .date_index(date)
                .with_context(|| format!("{date} is not in the panel"))?;
            match alpha_eval::eval_scalar(&bundle, date_idx, &ast)? {
                ScalarValue::Scalar(x) => println!("{x}"),
                ScalarValue::CrossSection(cs) => {
                    for (symbol, value) in cs.symbols.iter().zip(cs.values.iter()) {
                        println!("{symbol}\t{value}");
                    }
                }
            }
        }
        Command::Panel(args) => {
            let bundle = build_bundle(&args)?;
            let ast = parse(&args.expr).map_err(|e| anyhow::anyhow!("{e}"))?;
            match alpha_eval::eval_panel(&bundle, &ast)? {
                PanelValue::Scalar(x) => println!("{x}"),
                PanelValue::Panel(panel) => {
                    print!("date");
                    for symbol in panel.symbols.iter() {
                        print!("\t{symbol}");
                    }
                    println!();
                    for (i, date) in panel.dates.iter().enumerate() {
                        print!("{date}");
                        for value in panel.row(i) {
                            print!("\t{value}");
                        }
                        println!();
                    }
                }
            }
        }
    }

    Ok(())
}
