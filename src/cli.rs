use std::fmt::Write as _;
use std::sync::Arc;

use serde::Serialize;

use crate::config::AppConfig;
use crate::registry::Tracker;
use crate::server;
use crate::views::{parse_level, params, ViewError, ViewKind, ViewOutput, ViewRequest};

const USAGE: &str = "usage: vitrack <serve|levels|view|report|validate>";
const VIEW_USAGE: &str = "usage: vitrack view <level> <view> [--threshold X] [--periods N] \
                          [--min-population N] [--highlight LABEL]... [--table]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Serve,
    Levels,
    View,
    Report,
    Validate,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("serve") => Some(Command::Serve),
        Some("levels") => Some(Command::Levels),
        Some("view") => Some(Command::View),
        Some("report") => Some(Command::Report),
        Some("validate") => Some(Command::Validate),
        _ => None,
    }
}

pub fn run_with_args(args: &[String], config: &AppConfig) -> i32 {
    match parse_command(args) {
        Some(Command::Serve) => handle_serve(config),
        Some(Command::Levels) => handle_levels(args, config),
        Some(Command::View) => handle_view(args, config),
        Some(Command::Report) => handle_report(args, config),
        Some(Command::Validate) => handle_validate(config),
        None => {
            eprintln!("{USAGE}");
            2
        }
    }
}

fn load_tracker(config: &AppConfig) -> Option<Arc<Tracker>> {
    match Tracker::load(config) {
        Ok(tracker) => Some(tracker),
        Err(err) => {
            eprintln!("failed to load data: {err}");
            None
        }
    }
}

fn print_json<T: Serialize>(value: &T, what: &str) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize {what}: {err}");
            1
        }
    }
}

fn handle_serve(config: &AppConfig) -> i32 {
    let Some(tracker) = load_tracker(config) else {
        return 1;
    };
    let bind_addr = config.bind_addr();
    match server::run_server(&bind_addr, tracker) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("server error: {err}");
            1
        }
    }
}

fn handle_levels(args: &[String], config: &AppConfig) -> i32 {
    let as_table = args.iter().any(|arg| arg == "--table");
    let Some(tracker) = load_tracker(config) else {
        return 1;
    };
    let summaries = tracker.level_summaries();
    if as_table {
        println!("level\tconfirmed\tdeaths");
        for summary in &summaries {
            println!("{}\t{}\t{}", summary.level, summary.confirmed, summary.deaths);
        }
        return 0;
    }
    print_json(&summaries, "levels")
}

/// Options following `view <level> <view>`.
#[derive(Debug, Default, PartialEq)]
struct ViewArgs {
    request: ViewRequest,
    as_table: bool,
}

fn parse_view_args(rest: &[String]) -> Result<ViewArgs, ViewError> {
    let mut parsed = ViewArgs::default();
    let mut iter = rest.iter();
    while let Some(flag) = iter.next() {
        if flag == "--table" {
            parsed.as_table = true;
            continue;
        }
        let name: &'static str = match flag.as_str() {
            "--threshold" => "threshold",
            "--periods" => "periods",
            "--min-population" => "min_population",
            "--highlight" => "highlight",
            _ => {
                return Err(ViewError::InvalidParameter {
                    name: "option",
                    message: format!("unknown option '{flag}'"),
                })
            }
        };
        let value = iter.next().ok_or_else(|| ViewError::InvalidParameter {
            name,
            message: "missing value".to_string(),
        })?;
        let request = &mut parsed.request;
        match name {
            "threshold" => request.threshold = Some(params::parse_number(name, value)?),
            "periods" => request.periods = Some(params::parse_count(name, value)?),
            "min_population" => request.min_population = Some(params::parse_number(name, value)?),
            _ => request.highlight.push(value.clone()),
        }
    }
    Ok(parsed)
}

fn handle_view(args: &[String], config: &AppConfig) -> i32 {
    let (Some(level), Some(view)) = (args.get(2), args.get(3)) else {
        eprintln!("{VIEW_USAGE}");
        return 2;
    };
    let parsed = parse_level(level)
        .and_then(|level| Ok((level, view.parse::<ViewKind>()?)))
        .and_then(|(level, kind)| Ok((level, kind, parse_view_args(&args[4..])?)));
    let (level, kind, view_args) = match parsed {
        Ok(parsed) => parsed,
        Err(err) => {
            eprintln!("{err}");
            eprintln!("{VIEW_USAGE}");
            return 2;
        }
    };

    let Some(tracker) = load_tracker(config) else {
        return 1;
    };
    match tracker.view(level, kind, &view_args.request) {
        Ok(output) if view_args.as_table => {
            print!("{}", view_table(&output));
            0
        }
        Ok(output) => print_json(&output, "view"),
        Err(err) => {
            eprintln!("view failed: {err}");
            1
        }
    }
}

/// One row per place: label, then its values.
fn view_table(output: &ViewOutput) -> String {
    let mut table = String::from("label\tvalues\n");
    for (label, values) in &output.series {
        let _ = write!(table, "{label}");
        for value in values {
            let _ = write!(table, "\t{value}");
        }
        table.push('\n');
    }
    table
}

fn handle_report(args: &[String], config: &AppConfig) -> i32 {
    let Some(raw_level) = args.get(2) else {
        eprintln!("usage: vitrack report <level>");
        return 2;
    };
    let level = match parse_level(raw_level) {
        Ok(level) => level,
        Err(err) => {
            eprintln!("{err}");
            return 2;
        }
    };
    let Some(tracker) = load_tracker(config) else {
        return 1;
    };
    match tracker.report(level) {
        Ok(report) => print_json(&report, "report"),
        Err(err) => {
            eprintln!("report failed: {err}");
            1
        }
    }
}

fn handle_validate(config: &AppConfig) -> i32 {
    let Some(tracker) = load_tracker(config) else {
        return 1;
    };
    for coverage in tracker.reference_coverage() {
        println!(
            "{}: {} places, {} without population, {} without beds",
            coverage.level,
            coverage.places,
            coverage.missing_population.len(),
            coverage.missing_beds.len()
        );
        for place in &coverage.missing_population {
            println!("- no population: {place}");
        }
    }
    println!("validation passed");
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_known_commands() {
        assert_eq!(parse_command(&args(&["vitrack", "report"])), Some(Command::Report));
        assert_eq!(parse_command(&args(&["vitrack", "plot"])), None);
    }

    #[test]
    fn view_options_are_parsed_in_any_order() {
        let parsed = parse_view_args(&args(&[
            "--highlight",
            "Portland, OR",
            "--table",
            "--threshold",
            "2.5",
            "--highlight",
            "top-states",
        ]))
        .unwrap();
        assert!(parsed.as_table);
        assert_eq!(parsed.request.threshold, Some(2.5));
        assert_eq!(parsed.request.highlight, vec!["Portland, OR", "top-states"]);
    }

    #[test]
    fn view_options_reject_unknown_flags_and_missing_values() {
        assert!(parse_view_args(&args(&["--color", "red"])).is_err());
        assert!(matches!(
            parse_view_args(&args(&["--periods"])),
            Err(ViewError::InvalidParameter { name: "periods", .. })
        ));
    }
}
