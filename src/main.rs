//! c++filt-style command line filter over the library.

use std::io::BufRead;

use undecorate::Flags;

macro_rules! exit {
    ($code:expr => $($arg:tt)*) => {{
        eprintln!($($arg)*);
        std::process::exit($code);
    }};
}

const HELP: &str = "OVERVIEW: MSVC symbol undecorator

USAGE: undecorate [options] [SYMBOL]...

Symbols are read from the arguments, or from stdin one per line when no
symbol is given.

OPTIONS:
  -h, --help            Print usage information
  -n, --name-only       Print the qualified name alone
  -t, --type-only       Print the type alone
  -f, --fragments       Accept bare qualified-name fragments
  -q, --quirks          Reproduce the reference tool's rendering bugs
      --no-access       Drop public:/protected:/private: prefixes
      --no-calling-convention
                        Drop __cdecl and friends
      --no-return-type  Drop function return types
      --no-ms-keywords  Drop all toolchain keywords";

#[derive(Debug)]
struct Cli {
    flags: Flags,
    symbols: Vec<String>,
}

impl Cli {
    fn parse() -> Self {
        let mut cli = Cli {
            flags: Flags::default(),
            symbols: Vec::new(),
        };

        for arg in std::env::args().skip(1) {
            match arg.as_str() {
                "-h" | "--help" => exit!(0 => "{HELP}"),
                "-n" | "--name-only" => cli.flags |= Flags::NAME_ONLY,
                "-t" | "--type-only" => cli.flags |= Flags::TYPE_ONLY,
                "-f" | "--fragments" => cli.flags |= Flags::ALLOW_FRAGMENTS,
                "-q" | "--quirks" => cli.flags -= Flags::NO_QUIRKS,
                "--no-access" => cli.flags |= Flags::NO_ACCESS,
                "--no-calling-convention" => cli.flags |= Flags::NO_CALLING_CONVENTION,
                "--no-return-type" => cli.flags |= Flags::NO_RETURN_TYPE,
                "--no-ms-keywords" => cli.flags |= Flags::NO_MS_KEYWORDS,
                unknown if unknown.starts_with('-') => {
                    exit!(1 => "Unknown option '{unknown}', try --help.")
                }
                symbol => cli.symbols.push(symbol.to_string()),
            }
        }

        cli
    }
}

fn decode(symbol: &str, flags: Flags, failures: &mut usize) {
    match undecorate::parse(symbol, flags) {
        Ok(sym) => println!("{}", sym.display(flags)),
        Err(err) => {
            // keep the pipeline flowing: mangled text passes through
            // untouched, the diagnosis goes to stderr
            println!("{symbol}");
            eprintln!("undecorate: {err}");
            *failures += 1;
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let mut failures = 0usize;

    if cli.symbols.is_empty() {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => exit!(1 => "Failed to read stdin: {err}."),
            };

            let trimmed = line.trim();
            if !trimmed.is_empty() {
                decode(trimmed, cli.flags, &mut failures);
            }
        }
    } else {
        for symbol in &cli.symbols {
            decode(symbol, cli.flags, &mut failures);
        }
    }

    if failures != 0 {
        std::process::exit(1);
    }
}
