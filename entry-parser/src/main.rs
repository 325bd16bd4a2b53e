use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::io::{self, Read};
use std::process;

fn main() {
    if let Err(err) = run() {
        eprintln!("{}: {err}", env!("CARGO_PKG_NAME"));
        process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let mut args = env::args();
    let program = args
        .next()
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string());

    let mut sources = Vec::new();
    for arg in args {
        match arg.as_str() {
            "-h" | "--help" => {
                println!("{}", usage(&program));
                return Ok(());
            }
            "-V" | "--version" => {
                println!("{}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            flag if flag.starts_with("--") => {
                return Err(format!("unknown option: {flag}\n{}", usage(&program)));
            }
            _ => sources.push(arg),
        }
    }
    if sources.is_empty() {
        sources.push("-".to_string());
    }

    let extractor = entry_parser::Extractor::default();
    let mut words = BTreeSet::new();
    for source in &sources {
        let html = if source == "-" {
            read_stdin()?
        } else {
            fs::read_to_string(source).map_err(|err| format!("failed to read '{source}': {err}"))?
        };
        words.extend(extractor.extract(&html));
    }

    for word in words {
        println!("{word}");
    }
    Ok(())
}

fn read_stdin() -> Result<String, String> {
    let mut buf = String::new();
    io::stdin()
        .read_to_string(&mut buf)
        .map_err(|err| format!("failed to read stdin: {err}"))?;
    Ok(buf)
}

fn usage(program: &str) -> String {
    format!(
        "Usage: {program} [HTML_FILE|-]...\n\n\
         Prints every word discovered in the given archived dictionary entries, one per line.\n\
         '-' (or no argument) reads a single entry from stdin.\n\n\
         Options:\n  -h, --help      Show this message\n  -V, --version   Print package version"
    )
}
