use clap::{arg, ArgMatches, Command, ErrorKind};
use color_eyre::Result;
use kiwi_bench::config::{
    check_storage_unit_size, DEFAULT_DB_PATH, DEFAULT_KEY_SIZE, DEFAULT_VALUE_SIZE, SCALE_FACTOR,
};
use kiwi_bench::{Backend, BenchmarkConfig, Error, HarnessSettings};
use log::info;

use std::path::PathBuf;
use std::process;
use std::str::FromStr;

fn main() -> Result<()> {
    color_eyre::install()?;

    let key_size = DEFAULT_KEY_SIZE.to_string();
    let value_size = DEFAULT_VALUE_SIZE.to_string();
    let scale = SCALE_FACTOR.to_string();

    // set up argument parsing
    let command = Command::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .arg(arg!(-r --rocksdb "Benchmark RocksDB."))
        .arg(arg!(--sled "Benchmark sled."))
        .arg(
            arg!(-s --size <BYTES> "Storage unit size: file, write buffer, segment and cache sizing.")
                .required(false),
        )
        .arg(
            arg!(-k --"key-size" <BYTES> "Key size, at least 18 bytes.")
                .required(false)
                .default_value(&key_size),
        )
        .arg(
            arg!(-v --"value-size" <BYTES> "Value size.")
                .required(false)
                .default_value(&value_size),
        )
        .arg(arg!(-b --header "Prefix the output with storage unit size and queries per phase."))
        .arg(
            arg!(-p --path <DIR> "Database location, must not contain a database yet.")
                .required(false)
                .default_value(DEFAULT_DB_PATH),
        )
        .arg(
            arg!(--scale <FACTOR> "Multiplier of the 16 MiB load budget.")
                .required(false)
                .default_value(&scale),
        )
        .arg(arg!(-q --quiet "Silence all logging."))
        .arg(arg!(--verbose ... "Increase logging verbosity, repeat for more."));

    // every usage error exits with 1, only help and version succeed
    let matches = match command.try_get_matches() {
        Ok(matches) => matches,
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => err.exit(),
            _ => {
                eprintln!("{}", err);
                process::exit(1);
            }
        },
    };

    // set up logger
    stderrlog::new()
        .module(module_path!())
        .quiet(matches.is_present("quiet"))
        .verbosity(1 + matches.occurrences_of("verbose") as usize)
        .timestamp(stderrlog::Timestamp::Second)
        .init()?;

    run(&matches)
}

fn run(matches: &ArgMatches) -> Result<()> {
    let storage_unit_size = check_storage_unit_size(parse(matches, "size")?)?;
    let backend = Backend::from_flags(matches.is_present("rocksdb"), matches.is_present("sled"))?;
    let config = BenchmarkConfig::new(
        Some(storage_unit_size),
        parse(matches, "key-size")?.unwrap_or(DEFAULT_KEY_SIZE),
        parse(matches, "value-size")?.unwrap_or(DEFAULT_VALUE_SIZE),
        backend,
        matches.is_present("header"),
    )?;
    let settings = HarnessSettings {
        db_path: PathBuf::from(matches.value_of("path").unwrap_or(DEFAULT_DB_PATH)),
        scale_factor: parse(matches, "scale")?.unwrap_or(SCALE_FACTOR),
        ..HarnessSettings::default()
    };

    info!(
        "{} v{}: {} with {} byte keys and {} byte values",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        config.backend,
        config.key_size,
        config.value_size
    );

    let report = kiwi_bench::run(&config, &settings)?;
    println!("{}", report);
    Ok(())
}

fn parse<T: FromStr>(matches: &ArgMatches, name: &str) -> kiwi_bench::Result<Option<T>> {
    matches
        .value_of(name)
        .map(|raw| {
            raw.parse().map_err(|_| {
                Error::Config(format!("invalid value '{}' for --{}", raw, name))
            })
        })
        .transpose()
}
