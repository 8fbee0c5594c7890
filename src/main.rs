//! # balance-text CLI
//!
//! Usage:
//!   balance-text page.json -o balanced.json
//!   echo '{ ... }' | balance-text
//!   balance-text --example > page.json
//!
//! Logging goes to stderr and is controlled with `RUST_LOG`
//! (e.g. `RUST_LOG=balance_text=debug`).

use balance_text::BalanceError;
use std::env;
use std::fs;
use std::io::{self, Read};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.iter().any(|a| a == "--example") {
        print!("{}", example_page_json());
        return ExitCode::SUCCESS;
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("✗ {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<(), BalanceError> {
    let input = if args.len() > 1 && !args[1].starts_with('-') {
        fs::read_to_string(&args[1])?
    } else {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    };

    let output_path = args.windows(2).find(|w| w[0] == "-o").map(|w| w[1].clone());

    let output = balance_text::balance_json(&input)?;
    let json = serde_json::to_string_pretty(&output).map_err(BalanceError::Output)?;

    match output_path {
        Some(path) => {
            fs::write(&path, json.as_bytes())?;
            eprintln!("✓ Balanced {} blocks into {}", output.blocks.len(), path);
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn example_page_json() -> &'static str {
    r##"{
  "config": { "maxTextWidth": 5000 },
  "blocks": [
    {
      "id": "headline",
      "tag": "h1",
      "classes": ["balance-text"],
      "width": 360,
      "fontFamily": "Helvetica",
      "fontWeight": 700,
      "fontSize": 32,
      "markup": "Balanced headlines read better than ones with a lonely last word"
    },
    {
      "id": "standfirst",
      "classes": ["balance-text"],
      "width": 420,
      "fontSize": 18,
      "markup": "Breaks land at spaces and dashes, never inside <span style=\"white-space: nowrap\">no-wrap spans</span>, and a soft hy&shy;phen becomes a real one."
    },
    {
      "id": "justified",
      "classes": ["balance-text"],
      "width": 300,
      "fontFamily": "Courier",
      "fontSize": 12,
      "style": { "text-align": "justify" },
      "markup": "Justified blocks get word spacing on every line instead of break markers."
    },
    {
      "id": "body",
      "width": 420,
      "markup": "Blocks without the balance-text class are left exactly as they are."
    }
  ]
}
"##
}
