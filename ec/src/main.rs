//! evcal - compile recurrence specs from the command line
//!
//! Handy for checking what a form-entered recurrence expands to
//! before it reaches a session.

use chrono::{NaiveDate, Weekday};
use clap::{Parser, Subcommand};
use eyre::{Result, eyre};

use evcal::{MonthlyMode, Recurrence, RecurrenceSpec, rrule};

#[derive(Parser)]
#[command(name = "evcal", about = "Recurrence compiler and calendar export helper")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile a recurrence spec and show its descriptor, RRULE and end date
    Compile {
        /// Frequency: daily, weekly, monthly or yearly
        #[arg(long)]
        frequency: String,

        /// Repeat every N units
        #[arg(long, default_value_t = 1)]
        interval: u32,

        /// Weekday set for weekly recurrences (e.g. --weekday tue --weekday thu)
        #[arg(long = "weekday")]
        weekdays: Vec<String>,

        /// Use the positional monthly rule (Nth weekday / last)
        #[arg(long)]
        positional: bool,

        /// End after this many occurrences
        #[arg(long, conflicts_with = "until")]
        count: Option<u32>,

        /// End on this date (YYYY-MM-DD)
        #[arg(long)]
        until: Option<NaiveDate>,

        /// Anchor date of the first occurrence (YYYY-MM-DD)
        #[arg(long)]
        anchor: NaiveDate,

        /// How many occurrences to preview
        #[arg(long, default_value_t = 6)]
        preview: usize,
    },

    /// Parse an RRULE value and show the descriptor it compiles to
    Parse {
        /// RRULE value, e.g. "FREQ=WEEKLY;INTERVAL=1;BYDAY=TU;COUNT=4"
        rule: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Compile {
            frequency,
            interval,
            weekdays,
            positional,
            count,
            until,
            anchor,
            preview,
        } => {
            let mut spec = match (count, until) {
                (Some(n), None) => RecurrenceSpec::after(&frequency, interval, n),
                (None, Some(date)) => RecurrenceSpec::until(&frequency, interval, date),
                _ => return Err(eyre!("exactly one of --count or --until is required")),
            };

            spec.weekdays = weekdays
                .iter()
                .map(|w| w.parse::<Weekday>().map_err(|_| eyre!("bad weekday: {}", w)))
                .collect::<Result<Vec<_>>>()?;
            if positional {
                spec.monthly_mode = Some(MonthlyMode::Positional);
            }

            let rec = Recurrence::compile(&spec)?;
            let resolved = rec.resolve(anchor);

            println!("descriptor: {}", serde_json::to_string_pretty(&resolved)?);
            println!("rrule:      {}", rrule::render(&resolved, anchor));
            println!("ends:       {}", rec.compute_end(anchor)?);
            let dates: Vec<String> = rec.occurrences(anchor).take(preview).map(|d| d.to_string()).collect();
            println!("next:       {}", dates.join(", "));
        }

        Command::Parse { rule } => {
            let rec = rrule::parse(&rule)?;
            println!("{}", serde_json::to_string_pretty(&rec)?);
        }
    }

    Ok(())
}
