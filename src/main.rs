use anyhow::bail;
use anyhow::Context;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use log::LevelFilter;
use sheet_reducer::reduce::DEFAULT_REDUCED_NAME;
use sheet_reducer::spreadsheet;
use sheet_reducer::spreadsheet::criteria::Criteria;
use sheet_reducer::spreadsheet::DEFAULT_SHEET_NAME;
use sheet_reducer::table::Table;
use sheet_reducer::ConstantPolicy;
use sheet_reducer::DurationScaling;
use sheet_reducer::MissingPolicy;
use sheet_reducer::OutputMode;
use sheet_reducer::ReduceRequest;
use sheet_reducer::Tagging;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sheet-reducer")]
#[command(version)]
#[command(about = "Reduce Likert and duration columns of a spreadsheet into one standardized score", long_about = None)]
struct Cli {
    /// Log debug messages (RUST_LOG is honored otherwise)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Where and how to read the input table
#[derive(Args)]
struct ReadOptions {
    /// Spreadsheet to read (.xlsx, .xlsm or .csv)
    file: PathBuf,

    /// Sheet name or glob pattern; the first sheet by default
    #[arg(short, long)]
    sheet: Option<String>,

    /// A1-style range whose first row is the header, e.g. B2:F100
    #[arg(short, long)]
    range: Option<String>,

    /// Text read as a missing value (repeatable)
    #[arg(long = "null")]
    nulls: Vec<String>,

    /// Read error cells such as #DIV/0! as missing values
    #[arg(long)]
    error_as_null: bool,

    /// Drop rows without any value
    #[arg(long)]
    skip_empty_rows: bool,
}

impl ReadOptions {
    fn read(&self) -> anyhow::Result<Table> {
        let mut criteria = Criteria::parse(self.sheet.as_deref(), self.range.as_deref(), &self.nulls)?;
        criteria.error_as_null = self.error_as_null;
        criteria.skip_empty_rows = self.skip_empty_rows;
        spreadsheet::read_table(&self.file, &criteria)
            .with_context(|| format!("Failed to read '{}'", self.file.display()))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List the columns of a spreadsheet with their detected types
    Columns {
        #[command(flatten)]
        input: ReadOptions,

        /// Number of rows to preview
        #[arg(long, default_value_t = 5)]
        rows: usize,
    },

    /// Standardize the selected columns and average them into one column
    Reduce {
        #[command(flatten)]
        input: ReadOptions,

        /// Likert column name or glob pattern (repeatable)
        #[arg(short, long)]
        likert: Vec<String>,

        /// Duration column name or glob pattern (repeatable)
        #[arg(short, long)]
        duration: Vec<String>,

        /// Column tagged automatically: Likert when all values lie in [0, 5], duration otherwise
        #[arg(short, long, conflicts_with_all = ["likert", "duration"])]
        auto: Vec<String>,

        /// Name of the reduced column
        #[arg(long, default_value = DEFAULT_REDUCED_NAME)]
        name: String,

        /// Clip durations to [1, N] and scale them by log1p(N)
        #[arg(short = 'n', long)]
        bound: Option<f64>,

        /// Standardize constant columns to 0 instead of NaN
        #[arg(long)]
        constant_zero: bool,

        /// Average the present values of a row instead of propagating missing ones
        #[arg(long)]
        skip_missing: bool,

        /// Drop the consumed columns from the output
        #[arg(long)]
        replace: bool,

        /// Add <column>_standardized columns to the output
        #[arg(long)]
        keep_standardized: bool,

        /// Output file (.xlsx or .csv)
        #[arg(short, long, default_value = "processed_data.xlsx")]
        output: PathBuf,

        /// Sheet name of the xlsx output
        #[arg(long, default_value = DEFAULT_SHEET_NAME)]
        output_sheet: String,

        /// Number of rows to preview
        #[arg(long, default_value_t = 5)]
        rows: usize,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut logger = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if cli.verbose {
        logger.filter_level(LevelFilter::Debug);
    }
    logger.init();

    match cli.command {
        Commands::Columns { input, rows } => {
            let table = input.read()?;
            println!("'{}': {} rows x {} columns", input.file.display(), table.height(), table.width());
            for column in table.columns() {
                let missing = column.values.iter().filter(|value| value.is_empty()).count();
                println!("  {:<24} {:<8} {} missing", column.name, column.kind().as_str(), missing);
            }
            println!();
            print!("{}", table.preview(rows));
        }

        Commands::Reduce {
            input,
            likert,
            duration,
            auto,
            name,
            bound,
            constant_zero,
            skip_missing,
            replace,
            keep_standardized,
            output,
            output_sheet,
            rows,
        } => {
            if likert.is_empty() && duration.is_empty() && auto.is_empty() {
                bail!("Select at least one column with --likert, --duration or --auto");
            }
            let table = input.read()?;

            let request = ReduceRequest {
                tagging: if auto.is_empty() {
                    Tagging::Manual { likert, duration }
                } else {
                    Tagging::heuristic(auto)
                },
                reduced_name: name,
                scaling: bound.map(|n| DurationScaling::Bounded { n }).unwrap_or_default(),
                constant: if constant_zero { ConstantPolicy::Zero } else { ConstantPolicy::Nan },
                missing: if skip_missing { MissingPolicy::Skip } else { MissingPolicy::Propagate },
                output: if replace { OutputMode::ReplaceSources } else { OutputMode::Append },
                keep_standardized,
            };
            let reduction = sheet_reducer::reduce(&table, &request)?;

            println!("Processed data:");
            print!("{}", reduction.table.preview(rows));
            println!();
            println!("Statistics of '{}':", reduction.reduced_name);
            print!("{}", reduction.summary);
            println!();
            println!("Correlation of the source columns with '{}':", reduction.reduced_name);
            print!("{}", reduction.correlation);
            for warning in &reduction.warnings {
                eprintln!("warning: {warning}");
            }

            spreadsheet::write_table(&output, &reduction.table, &output_sheet)
                .with_context(|| format!("Failed to write '{}'", output.display()))?;
            println!();
            println!("Wrote '{}'", output.display());
        }
    }

    Ok(())
}
