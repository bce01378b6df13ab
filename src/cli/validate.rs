use std::path::Path;

use addon_validator::config::ValidateOptions;
use addon_validator::{pipeline, report, HttpFetcher, ValidatorError};

pub(crate) fn run(file: &Path, options: &ValidateOptions, format: super::Format) {
    let fetcher = HttpFetcher::new(options.timeout);

    match format {
        super::Format::Text => {
            // Status lines go out as each stage passes.
            let outcome =
                match pipeline::run_reporting(file, options, &fetcher, &mut |line| {
                    println!("{line}");
                }) {
                    Ok(outcome) => outcome,
                    Err(e) => fail(&e),
                };
            for d in outcome.diagnostics.iter().filter(|d| !d.is_error()) {
                eprintln!("{d}");
            }
            if let Err(e) = report(&outcome.diagnostics) {
                fail(&e);
            }
        }
        super::Format::Json => {
            let outcome = match pipeline::run(file, options, &fetcher) {
                Ok(outcome) => outcome,
                Err(e) => fail(&e),
            };
            match serde_json::to_string_pretty(&outcome) {
                Ok(json) => println!("{json}"),
                Err(e) => fail(&e.into()),
            }
            if outcome.has_errors() {
                std::process::exit(1);
            }
        }
    }
}

fn fail(err: &ValidatorError) -> ! {
    match err {
        // The discrepancy report is the message; no prefix on its first line.
        ValidatorError::Validation { .. } => eprintln!("{err}"),
        _ => eprintln!("addon-validator: {err}"),
    }
    std::process::exit(1);
}
