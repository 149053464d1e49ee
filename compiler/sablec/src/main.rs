//! The `sable` binary.

use sablec::{run, Options};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "\
usage: sable [options] <input.cc>

options:
  -o, --output <path>   write the declaration tree as JSON
      --dump-tree       print the declaration tree to stdout
      --macro-table <path>
                        macro-call table from the preprocessor stage
  -v, --verbose         enable debug tracing (or set SABLE_LOG)
  -h, --help            show this help
";

fn parse_args() -> Result<Options, String> {
    let mut options = Options::default();
    let mut verbose = false;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Err(USAGE.to_owned()),
            "-o" | "--output" => {
                let value = args.next().ok_or("missing value for --output")?;
                options.output = Some(PathBuf::from(value));
            }
            "--dump-tree" => options.dump_tree = true,
            "--macro-table" => {
                let value = args.next().ok_or("missing value for --macro-table")?;
                options.macro_table = Some(PathBuf::from(value));
            }
            "-v" | "--verbose" => verbose = true,
            _ if arg.starts_with('-') => {
                return Err(format!("unknown option `{arg}`\n\n{USAGE}"));
            }
            _ => {
                if options.input.as_os_str().is_empty() {
                    options.input = PathBuf::from(arg);
                } else {
                    return Err(format!("unexpected argument `{arg}`\n\n{USAGE}"));
                }
            }
        }
    }
    if options.input.as_os_str().is_empty() {
        return Err(USAGE.to_owned());
    }

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("SABLE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    Ok(options)
}

fn main() -> ExitCode {
    let options = match parse_args() {
        Ok(options) => options,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::from(2);
        }
    };
    match run(&options) {
        Ok(code) => ExitCode::from(code as u8),
        Err(error) => {
            eprintln!("sable: {error}");
            ExitCode::from(2)
        }
    }
}
