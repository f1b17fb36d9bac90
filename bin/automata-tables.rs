use std::{path::PathBuf, process::ExitCode};

use automata_tables::{
    prelude::*,
    rows::{rows_from_str, rows_to_string},
};

use itertools::Itertools;
use thiserror::Error;
use tracing::{debug, info, trace};
use tracing_subscriber::{filter, prelude::*};

use clap::{error::ErrorKind, Arg, ArgAction, ArgMatches, Command};

#[derive(Debug, Error)]
enum Error {
    #[error(transparent)]
    Argument(#[from] ArgumentError),
    #[error("could not access `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Format(#[from] FormatError),
}

fn cli() -> clap::Command {
    Command::new("automata-tables")
        .about("Converts, minimizes and determinizes Mealy and Moore machines given as tables")
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbosity")
                .num_args(0..=1)
                .require_equals(true)
                .value_parser(["info", "debug", "trace"])
                .default_missing_value("info"),
        )
        .arg(
            Arg::new("reachability")
                .long("reachability")
                .value_parser(["column-wise", "graph"])
                .default_value("column-wise")
                .help("how unreachable states are determined before minimizing"),
        )
        .arg(
            Arg::new("initial")
                .long("initial")
                .value_parser(["discovery", "preserve"])
                .default_value("discovery")
                .help("which state becomes the initial state when converting mealy to moore"),
        )
        .arg(
            Arg::new("epsilon")
                .long("epsilon")
                .default_value(EPSILON)
                .help("input signal of epsilon transitions when determinizing"),
        )
        .arg(
            Arg::new("finish")
                .long("finish")
                .default_value(FINISH)
                .help("output of accepting states when determinizing"),
        )
        .arg(
            Arg::new("show")
                .long("show")
                .action(ArgAction::SetTrue)
                .help("print the resulting machine as a table to stderr"),
        )
        .arg(
            Arg::new("mode")
                .required(true)
                .help("one of mealy-to-moore, moore-to-mealy, mealy, moore, determinize"),
        )
        .arg(Arg::new("input").required(true).help("file to read the machine from"))
        .arg(Arg::new("output").required(true).help("file to write the result to"))
}

fn setup_logging(matches: &ArgMatches) {
    let level = match matches
        .try_get_one::<String>("verbosity")
        .ok()
        .flatten()
        .map(|m| m.as_str())
    {
        Some("trace") => filter::LevelFilter::TRACE,
        Some("debug") => filter::LevelFilter::DEBUG,
        _ => filter::LevelFilter::INFO,
    };

    let stderr_log = tracing_subscriber::fmt::layer()
        .without_time()
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(stderr_log.with_filter(level))
        .init();

    trace!("setup {level} logging");
}

/// Returns the value of the argument `name`, which must not be blank.
fn non_blank<'a>(matches: &'a ArgMatches, name: &'static str) -> Result<&'a str, ArgumentError> {
    matches
        .get_one::<String>(name)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .ok_or(ArgumentError::Blank(name))
}

fn config(matches: &ArgMatches) -> Result<Config, ArgumentError> {
    let reachability = non_blank(matches, "reachability")?;
    let reachability = reachability
        .parse::<ReachabilityMode>()
        .map_err(|reason| ArgumentError::InvalidValue {
            name: "reachability",
            value: reachability.to_string(),
            reason,
        })?;
    let initial = non_blank(matches, "initial")?;
    let initial = initial
        .parse::<InitialState>()
        .map_err(|reason| ArgumentError::InvalidValue {
            name: "initial",
            value: initial.to_string(),
            reason,
        })?;
    Ok(Config {
        conversion: ConversionOptions::with_initial(initial),
        minimization: MinimizationOptions::with_reachability(reachability),
        determinization: DeterminizationOptions {
            epsilon: non_blank(matches, "epsilon")?.to_string(),
            finish: non_blank(matches, "finish")?.to_string(),
        },
    })
}

fn run(matches: &ArgMatches) -> Result<(), Error> {
    let operation: Operation = non_blank(matches, "mode")?.parse()?;
    let input = PathBuf::from(non_blank(matches, "input")?);
    let output = PathBuf::from(non_blank(matches, "output")?);
    let config = config(matches)?;
    debug!("running {operation} with {config:?}");

    let contents = std::fs::read_to_string(&input).map_err(|source| Error::Io {
        path: input.clone(),
        source,
    })?;
    let rows = rows_from_str(&contents);
    info!("read {} rows from {}", rows.len(), input.display());

    let result = operation.apply(&rows, &config)?;
    if matches.get_flag("show") {
        eprintln!("{}", result.show());
    }

    std::fs::write(&output, rows_to_string(&result.to_rows())).map_err(|source| Error::Io {
        path: output.clone(),
        source,
    })?;
    info!(
        "wrote {} machine with {} states to {}",
        result.kind(),
        result.size(),
        output.display()
    );
    Ok(())
}

/// Parses the command line arguments. Requests for help or the version are answered by
/// clap itself, every other problem becomes an [`ArgumentError`].
fn arguments<I, T>(args: I) -> Result<ArgMatches, Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    cli().try_get_matches_from(args).map_err(|err| match err.kind() {
        ErrorKind::DisplayHelp
        | ErrorKind::DisplayVersion
        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => err.exit(),
        _ => ArgumentError::Usage(usage_message(&err)).into(),
    })
}

/// The first paragraph of a clap error on one line, without its `error: ` prefix.
fn usage_message(err: &clap::Error) -> String {
    let rendered = err.render().to_string();
    rendered
        .lines()
        .map(str::trim)
        .take_while(|line| !line.is_empty())
        .join(" ")
        .trim_start_matches("error: ")
        .to_string()
}

fn report(err: Error) -> ExitCode {
    eprintln!("Error! Message: {err}");
    ExitCode::FAILURE
}

fn main() -> ExitCode {
    let matches = match arguments(std::env::args_os()) {
        Ok(matches) => matches,
        Err(err) => return report(err),
    };

    setup_logging(&matches);

    match run(&matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report(err),
    }
}
