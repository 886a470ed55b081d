//! `jeongsan run`, `validate` and `columns`.

use std::path::{Path, PathBuf};

use jeongsan_recon::normalize::resolve_spec;
use jeongsan_recon::{reconcile, ReconConfig, Source};

use crate::exit_codes::{EXIT_DISCREPANCIES, EXIT_IO, EXIT_SCHEMA};
use crate::CliError;

pub struct RunArgs {
    pub orders: PathBuf,
    pub deposits: PathBuf,
    pub config: Option<PathBuf>,
    pub output: PathBuf,
    pub json: bool,
    pub json_output: Option<PathBuf>,
    pub strict: bool,
    pub quiet: bool,
}

/// Built-in Korean layout when no config is given.
fn load_config(path: Option<&Path>) -> Result<ReconConfig, CliError> {
    let Some(path) = path else {
        log::debug!("no config given, using built-in column rules");
        return Ok(ReconConfig::default());
    };

    let config_str = std::fs::read_to_string(path).map_err(|e| {
        CliError::new(EXIT_IO, format!("cannot read config {}: {e}", path.display()))
    })?;
    let config = ReconConfig::from_toml(&config_str)?;
    log::info!("loaded config '{}' from {}", config.name, path.display());
    Ok(config)
}

pub fn cmd_run(args: RunArgs) -> Result<(), CliError> {
    let is_xlsx = args
        .output
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("xlsx"));
    if !is_xlsx {
        return Err(CliError::usage(format!(
            "output must be an .xlsx file: {}",
            args.output.display()
        )));
    }

    let config = load_config(args.config.as_deref())?;
    let (orders, deposits) = jeongsan_io::read_inputs(&args.orders, &args.deposits, &config)?;
    let result = reconcile(&orders, &deposits, &config)?;

    jeongsan_io::write_report(&result.report(), &args.output)?;
    if !args.quiet {
        eprintln!("wrote {}", args.output.display());
    }

    if let Some(ref path) = args.json_output {
        jeongsan_io::write_json(&result, path)?;
        if !args.quiet {
            eprintln!("wrote {}", path.display());
        }
    }

    if args.json {
        let json_str = jeongsan_io::json::to_string(&result)
            .map_err(|e| CliError::new(EXIT_IO, format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
    }

    // Human summary to stderr
    let s = &result.summary;
    if !args.quiet {
        eprintln!(
            "'{}': {} order(s), {} deposit(s): {} matched ({} exact, {} partial), {} unmatched, {} orphan",
            result.meta.config_name,
            s.order_groups,
            s.deposit_groups,
            s.matched(),
            s.matched_exact,
            s.matched_partial,
            s.unmatched_orders,
            s.orphan_deposits,
        );
        eprintln!(
            "sheets: B2B {}, B2B 이외 {}, 더 입금 {}, 덜 입금 {}; difference {}",
            s.b2b, s.non_b2b, s.overpaid, s.underpaid, s.total_difference,
        );
        if s.coercion_warnings > 0 {
            eprintln!("{} amount cell(s) counted as 0 (use -v for details)", s.coercion_warnings);
        }
    }

    if args.strict && s.has_discrepancies() {
        return Err(CliError::new(EXIT_DISCREPANCIES, "discrepancies found"));
    }

    Ok(())
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(Some(&config_path))?;
    eprintln!(
        "valid: '{}' (orders header row {}, deposits header row {}, prefer_exact={}, empty_keys={})",
        config.name,
        config.orders.header_row,
        config.deposits.header_row,
        config.matching.prefer_exact,
        config.matching.empty_keys,
    );
    Ok(())
}

pub fn cmd_columns(file: PathBuf, source: Source, config: Option<PathBuf>) -> Result<(), CliError> {
    let config = load_config(config.as_deref())?;
    let table = jeongsan_io::read_table(&file, source, config.header_row(source))?;

    println!("{} ({}, {} data row(s))", file.display(), source, table.len());
    for (i, header) in table.headers.iter().enumerate() {
        println!("  [{i}] {header}");
    }

    let mut missing = Vec::new();
    for (field, spec) in config.column_specs(source) {
        match resolve_spec(spec, &table.headers) {
            Some((index, rule)) => {
                println!("{field:>7} -> [{index}] {} (by {rule})", table.headers[index]);
            }
            None => {
                println!("{field:>7} -> not found");
                missing.push(field.to_string());
            }
        }
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(CliError::new(
            EXIT_SCHEMA,
            format!("{source}: no column found for {}", missing.join(", ")),
        )
        .with_hint(format!("add a [{source}.columns.<field>] section to the config")))
    }
}
