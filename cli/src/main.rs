use std::fs;
use std::io::{self, Read};
use std::process;

use usagedoc_parse::{run, run_with, Args, ParseConfig};

// The binary's own interface, parsed with the library it ships.
const USAGE: &str = "\
Parse an argument vector against a usage text.

Usage:
  usagedoc <usage-file> [<arg>...]
  usagedoc -h | --help
  usagedoc --version

The usage text is read from <usage-file>, or from stdin when <usage-file>
is '-'. The remaining arguments are matched against it and the resulting
map is printed as JSON. On an argument error the message and the usage
text are printed to stderr and the exit code is nonzero.

Options:
  -h --help   Show this screen.
  --version   Show version.
";

fn main() {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    let own_config = ParseConfig {
        help: true,
        version: Some(format!("usagedoc {}", env!("CARGO_PKG_VERSION"))),
        // everything after <usage-file> belongs to the parsed program
        options_first: true,
    };
    let own = run(USAGE, &argv, &own_config);

    if let Err(message) = run_parse(&own) {
        eprintln!("error: {message}");
        process::exit(2);
    }
}

fn run_parse(own: &Args) -> Result<(), String> {
    let source = own.get_str("<usage-file>").unwrap_or("-");
    let doc = read_usage(source)?;
    let argv = own.get_list("<arg>").unwrap_or_default().to_vec();

    let config = ParseConfig {
        help: true,
        version: None,
        options_first: false,
    };
    let stdout = io::stdout();
    let stderr = io::stderr();
    match run_with(&doc, &argv, &config, &mut stdout.lock(), &mut stderr.lock()) {
        Ok(args) => {
            let json = serde_json::to_string_pretty(&args)
                .map_err(|err| format!("failed to serialize result: {err}"))?;
            println!("{json}");
            Ok(())
        }
        Err(code) => process::exit(code),
    }
}

fn read_usage(source: &str) -> Result<String, String> {
    if source == "-" {
        let mut doc = String::new();
        io::stdin()
            .read_to_string(&mut doc)
            .map_err(|err| format!("failed to read stdin: {err}"))?;
        Ok(doc)
    } else {
        fs::read_to_string(source).map_err(|err| format!("failed to read '{source}': {err}"))
    }
}
