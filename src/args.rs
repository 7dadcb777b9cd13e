use clap::builder::RangedU64ValueParser;
use clap::{value_parser, Arg, ArgAction, Command};
use std::fs;

fn existing_file(input: &str) -> Result<String, String> {
    let path = fs::canonicalize(input).map_err(|_| "Failed to resolve input path")?;
    if path.is_file() {
        Ok(path.to_string_lossy().to_string())
    } else {
        Err(String::from("Input file does not exist"))
    }
}

fn file_arg() -> Arg {
    Arg::new("file")
        .help("File to operate on")
        .required(true)
        .index(1)
        .value_parser(existing_file)
}

fn width_arg() -> Arg {
    Arg::new("width")
        .short('n')
        .long("width")
        .help("Number of divisions (the .raid file will be approx. 1/N of the file size)")
        .value_name("N")
        .required(true)
        .value_parser(RangedU64ValueParser::<usize>::new().range(1..))
}

fn damage_args() -> [Arg; 3] {
    [
        Arg::new("damages")
            .short('d')
            .long("damages")
            .help("Number of random damage bursts to write")
            .value_name("COUNT")
            .default_value("1")
            .value_parser(RangedU64ValueParser::<usize>::new()),
        Arg::new("burst")
            .long("burst")
            .help("Bytes overwritten by each burst")
            .value_name("BYTES")
            .default_value("100")
            .value_parser(RangedU64ValueParser::<usize>::new().range(1..)),
        Arg::new("seed")
            .long("seed")
            .help("Seed for reproducible damage")
            .value_name("SEED")
            .value_parser(value_parser!(u64)),
    ]
}

fn common_args() -> [Arg; 3] {
    [
        Arg::new("quiet")
            .short('q')
            .long("quiet")
            .help("Quiet mode - minimal output")
            .action(ArgAction::SetTrue),
        Arg::new("threads")
            .short('t')
            .long("threads")
            .help("Number of CPU threads for parity computation (0 = auto-detect)")
            .value_name("N")
            .default_value("0")
            .value_parser(RangedU64ValueParser::<usize>::new()),
        Arg::new("no-parallel")
            .long("no-parallel")
            .help("Disable all parallel processing")
            .action(ArgAction::SetTrue),
    ]
}

/// Command line definition for the `raidfile` binary
pub fn build_cli() -> Command {
    Command::new("raidfile")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Protect a file with XOR parity and repair damaged blocks")
        .arg_required_else_help(true)
        .subcommand_required(true)
        .subcommand(
            Command::new("protect")
                .visible_alias("p")
                .about("Create the .raid parity file and .crc32 checksum file")
                .arg(file_arg())
                .arg(width_arg())
                .args(common_args()),
        )
        .subcommand(
            Command::new("verify")
                .visible_alias("v")
                .about("List damaged blocks using the .crc32 checksum file")
                .arg(file_arg())
                .args(common_args()),
        )
        .subcommand(
            Command::new("repair")
                .visible_alias("r")
                .about("Rebuild damaged blocks in place from the .raid parity file")
                .arg(file_arg())
                .arg(width_arg())
                .args(common_args()),
        )
        .subcommand(
            Command::new("simulate")
                .about("Write a randomly damaged .damaged copy of a file")
                .arg(file_arg())
                .args(damage_args())
                .args(common_args()),
        )
        .subcommand(
            Command::new("demo")
                .about("Protect, damage a copy, detect, recover and detect again")
                .arg(file_arg())
                .arg(width_arg())
                .args(damage_args())
                .args(common_args()),
        )
}

pub fn parse_args() -> clap::ArgMatches {
    build_cli().get_matches()
}
