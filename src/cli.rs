//! Command-line surface: `dsync [OPTION]... SOURCE... DIRECTORY`.

use std::path::PathBuf;

use clap::Parser;

use crate::constants::MAX_WORKER_THREADS;

const USAGE_TEXT: &str = "Usage: dsync [OPTION]... SOURCE... DIRECTORY\n\
Sync/copy SOURCE(s) to DIRECTORY.\n\n\
  -f       force copy SOURCE(s) to DIRECTORY even if they are in sync\n\
  -j [N]   run N (max 255) threads that sync/copy source files\n\n\
By default (without the -f option), dsync will copy SOURCE(s) to DIRECTORY only\n\
if the files' size and modification time don't match (even if file in destination\n\
is newer than the corresponding source file). dsync always preserves mode and\n\
timestamps. Multiple threads can be used to sync/copy using the -j option which\n\
can reduce total time in case of source directories with a lot of directories\n\
and a lot of small files in them. dsync always recursively syncs/copies all the\n\
contents of the given sources. Symbolic links inside SOURCE(s) are not followed\n\
but copied themselves. Extra directories or files in destination directory are\n\
not detected or deleted. dsync doesn't make sure data is written to disk.\n";

/// Parsed and validated command-line arguments.
pub struct Args {
    pub sources: Vec<PathBuf>,
    pub destination: PathBuf,
    pub force: bool,
    pub worker_count: u8,
}

#[derive(Parser, Debug)]
#[command(name = "dsync", disable_help_flag = true, disable_version_flag = true)]
struct RawArgs {
    #[arg(short = 'f')]
    force: bool,

    #[arg(short = 'j', value_name = "N")]
    jobs: Option<String>,

    #[arg(short = 'h')]
    help: bool,

    /// Sources followed by exactly one destination directory.
    paths: Vec<PathBuf>,
}

/// Outcome of parsing: either validated [`Args`], or a request to print
/// usage (to stdout for `-h`, to stderr on any validation failure) and
/// exit with the given code.
pub enum Parsed {
    Run(Args),
    PrintUsage { to_stdout: bool, exit_code: i32 },
}

/// Parses `argv` (excluding argv[0]) into [`Parsed`].
pub fn parse(argv: &[String]) -> Parsed {
    let argv_with_progname: Vec<String> = std::iter::once("dsync".to_string())
        .chain(argv.iter().cloned())
        .collect();

    let raw = match RawArgs::try_parse_from(argv_with_progname) {
        Ok(raw) => raw,
        Err(_) => {
            eprintln!("Unrecognized or malformed option.\n");
            return Parsed::PrintUsage {
                to_stdout: false,
                exit_code: 1,
            };
        }
    };

    if raw.help {
        return Parsed::PrintUsage {
            to_stdout: true,
            exit_code: 0,
        };
    }

    let worker_count: u8 = match &raw.jobs {
        None => 1,
        Some(value) => match value.parse::<u64>() {
            Ok(n) if n >= 1 && n <= MAX_WORKER_THREADS as u64 => n as u8,
            _ => {
                eprintln!(
                    "Option -j should be provided with a value in range [1, {MAX_WORKER_THREADS}].\n"
                );
                return Parsed::PrintUsage {
                    to_stdout: false,
                    exit_code: 1,
                };
            }
        },
    };

    if raw.paths.len() < 2 {
        eprintln!("At least one source and a destination directory must be provided.\n");
        return Parsed::PrintUsage {
            to_stdout: false,
            exit_code: 1,
        };
    }

    let mut paths = raw.paths;
    let destination = paths.pop().expect("checked len >= 2 above");
    let sources = paths;

    Parsed::Run(Args {
        sources,
        destination,
        force: raw.force,
        worker_count,
    })
}

/// Prints usage text to the given stream.
pub fn print_usage(to_stdout: bool) {
    if to_stdout {
        print!("{USAGE_TEXT}");
    } else {
        eprint!("{USAGE_TEXT}");
    }
}
