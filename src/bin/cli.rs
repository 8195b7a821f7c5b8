use section_scheduler::catalog::format_day_codes;
use section_scheduler::{
    Catalog, CatalogFormat, Comparator, Course, CourseRequest, Schedule, ScheduleSearch,
    SearchLimits, ServiceConfig, config, resolve_comparator, resolve_requests,
    save_catalog_to_csv, save_catalog_to_json,
};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

const DEFAULT_SHOWN: usize = 3;

fn render_row<'a>(widths: &[usize], cells: impl Iterator<Item = &'a str>) -> String {
    let mut line = String::from("|");
    for (ci, cell) in cells.enumerate() {
        line.push(' ');
        line.push_str(cell);
        line.push_str(&" ".repeat(widths[ci].saturating_sub(cell.len())));
        line.push_str(" |");
    }
    line
}

fn render_text_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (ci, cell) in row.iter().enumerate() {
            if cell.len() > widths[ci] {
                widths[ci] = cell.len();
            }
        }
    }

    let mut sep = String::new();
    sep.push('+');
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&render_row(&widths, headers.iter().copied()));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in rows {
        out.push_str(&render_row(&widths, row.iter().map(String::as_str)));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

/// 13.5 -> "13:30".
fn format_hour(hour: f64) -> String {
    let total_minutes = (hour * 60.0).round() as i64;
    format!("{}:{:02}", total_minutes / 60, total_minutes % 60)
}

fn render_schedule(schedule: &Schedule) -> String {
    let mut rows = Vec::new();
    for entry in schedule.entries() {
        let section = &entry.section;
        let base = vec![
            entry.course.label(),
            section.number.clone(),
            section.kind.clone(),
            section.instructor.clone(),
        ];
        if section.is_tba() || section.meetings().is_empty() {
            let mut row = base;
            row.extend(["TBA".to_string(), String::new(), String::new()]);
            rows.push(row);
            continue;
        }
        for meeting in section.meetings() {
            let mut row = base.clone();
            row.push(format_day_codes(&meeting.days));
            row.push(format!(
                "{}-{}",
                format_hour(meeting.start),
                format_hour(meeting.end)
            ));
            row.push(meeting.location.clone().unwrap_or_default());
            rows.push(row);
        }
    }
    render_text_table(
        &["course", "section", "type", "instructor", "days", "time", "location"],
        &rows,
    )
}

fn render_statistics(schedule: &Schedule) -> String {
    let stats = schedule.statistics();
    if stats.is_empty() {
        return format!("credits={}, no scheduled meetings", schedule.total_credits());
    }
    format!(
        "credits={}, days={}, first={}, last={}, gaps={:.2}h",
        schedule.total_credits(),
        stats.days_of_class,
        format_hour(stats.earliest_time),
        format_hour(stats.latest_time),
        stats.gap_hours
    )
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  load <json|csv> <path>             Load a catalog snapshot\n  save <json|csv> <path>             Save the current catalog snapshot\n  depts                              List departments\n  courses <dept>                     List courses in a department\n  course <dept> <code>               Show every section of a course\n  add <ident>[, <ident>...]          Request courses (e.g. CIS 120, MATH-104)\n  drop <ident>                       Remove a requested course\n  clear                              Remove all requested courses\n  list                               Show requested courses\n  sort <primary> [secondary]         Choose ranking keys\n  sorts                              List ranking keys\n  limit <n|none>                     Stop the search after n schedules\n  find [n]                           Search and show the best n schedules\n  quit|exit                          Exit"
    );
}

fn print_comparators() {
    println!("Available ranking keys:");
    for (key, description) in Comparator::variants() {
        println!("  {:<10} {}", key, description);
    }
}

fn print_course(course: &Course) {
    println!("{} {} ({} cr)", course.label(), course.name, course.credits);
    for (idx, group) in course.groups.iter().enumerate() {
        println!("Group {}:", idx + 1);
        let rows: Vec<Vec<String>> = group
            .sections()
            .map(|section| {
                let meetings = if section.is_tba() {
                    "TBA".to_string()
                } else {
                    section
                        .meetings()
                        .iter()
                        .map(|m| {
                            format!(
                                "{} {}-{}",
                                format_day_codes(&m.days),
                                format_hour(m.start),
                                format_hour(m.end)
                            )
                        })
                        .collect::<Vec<_>>()
                        .join(", ")
                };
                vec![
                    section.number.clone(),
                    section.kind.clone(),
                    section.instructor.clone(),
                    meetings,
                ]
            })
            .collect();
        print!(
            "{}",
            render_text_table(&["section", "type", "instructor", "meetings"], &rows)
        );
    }
}

fn parse_format(s: &str) -> Option<CatalogFormat> {
    match s {
        "json" => Some(CatalogFormat::Json),
        "csv" => Some(CatalogFormat::Csv),
        _ => None,
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let service_config = match ServiceConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            ServiceConfig::default()
        }
    };
    let mut catalog = match service_config.load_catalog() {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!("Could not load configured catalog: {e}");
            Catalog::new()
        }
    };
    let mut requested: Vec<Arc<Course>> = Vec::new();
    let mut primary = Comparator::Early;
    let mut secondary = Comparator::MinDays;
    let mut limits: SearchLimits = service_config.limits;

    println!("Section Scheduler (CLI) - type 'help' for commands");
    if let Some(term) = catalog.term_label() {
        println!("Catalog: {term}");
    }
    println!("{} courses loaded.\n", catalog.course_count());

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let (cmd, rest) = input
            .split_once(char::is_whitespace)
            .map(|(cmd, rest)| (cmd, rest.trim()))
            .unwrap_or((input, ""));
        let mut parts = rest.split_whitespace();

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "load" => match (parts.next().and_then(parse_format), parts.next()) {
                (Some(format), Some(path)) => {
                    match config::load_catalog(Path::new(path), format) {
                        Ok(loaded) => {
                            catalog = loaded;
                            requested.clear();
                            println!(
                                "Catalog loaded from {path} ({} courses).",
                                catalog.course_count()
                            );
                        }
                        Err(e) => println!("Load error: {e}"),
                    }
                }
                _ => println!("Usage: load <json|csv> <path>"),
            },
            "save" => match (parts.next().and_then(parse_format), parts.next()) {
                (Some(format), Some(path)) => {
                    let result = match format {
                        CatalogFormat::Csv => save_catalog_to_csv(&catalog, path),
                        _ => save_catalog_to_json(&catalog, path),
                    };
                    match result {
                        Ok(()) => println!("Catalog saved to {path}."),
                        Err(e) => println!("Save error: {e}"),
                    }
                }
                _ => println!("Usage: save <json|csv> <path>"),
            },
            "depts" => {
                let names: Vec<&str> = catalog.departments.keys().map(String::as_str).collect();
                if names.is_empty() {
                    println!("No departments loaded.");
                } else {
                    println!("{}", names.join(" "));
                }
            }
            "courses" => match parts.next() {
                Some(dept) => match catalog.department(&dept.to_uppercase()) {
                    Some(department) => {
                        let rows: Vec<Vec<String>> = department
                            .courses
                            .values()
                            .map(|course| {
                                vec![
                                    course.label(),
                                    course.name.clone(),
                                    course.credits.to_string(),
                                    course.groups.len().to_string(),
                                ]
                            })
                            .collect();
                        print!(
                            "{}",
                            render_text_table(&["course", "name", "credits", "groups"], &rows)
                        );
                    }
                    None => println!("Department {dept} not found."),
                },
                None => println!("Usage: courses <dept>"),
            },
            "course" => match CourseRequest::parse(rest) {
                Ok(request) => match request.resolve(&catalog) {
                    Ok(course) => print_course(&course),
                    Err(e) => println!("{e}"),
                },
                Err(_) => println!("Usage: course <dept> <code>"),
            },
            "add" => {
                if rest.is_empty() {
                    println!("Usage: add <ident>[, <ident>...]");
                    continue;
                }
                let inputs: Vec<&str> = rest.split(',').map(str::trim).collect();
                match resolve_requests(&catalog, &inputs) {
                    Ok(resolved) => {
                        for course in resolved.courses {
                            if requested.iter().any(|c| Arc::ptr_eq(c, &course)) {
                                println!("{} already requested.", course.label());
                            } else {
                                println!("Added {}.", course.label());
                                requested.push(course);
                            }
                        }
                        if resolved.requests.iter().any(|r| r.section.is_some()) {
                            println!("Note: section numbers are checked but whole courses are scheduled.");
                        }
                    }
                    Err(errors) => {
                        for e in errors {
                            println!("Error: {e}");
                        }
                    }
                }
            }
            "drop" => match CourseRequest::parse(rest) {
                Ok(request) => {
                    let before = requested.len();
                    requested.retain(|course| {
                        !(course.department == request.department && course.code == request.course)
                    });
                    if requested.len() < before {
                        println!("Dropped {}-{}.", request.department, request.course);
                    } else {
                        println!("{}-{} was not requested.", request.department, request.course);
                    }
                }
                Err(_) => println!("Usage: drop <ident>"),
            },
            "clear" => {
                requested.clear();
                println!("Cleared requested courses.");
            }
            "list" => {
                if requested.is_empty() {
                    println!("No courses requested.");
                }
                for course in &requested {
                    println!("  {} {}", course.label(), course.name);
                }
            }
            "sorts" => print_comparators(),
            "sort" => match parts.next() {
                Some(first) => {
                    let parsed = resolve_comparator(first).and_then(|p| match parts.next() {
                        Some(second) => resolve_comparator(second).map(|s| (p, Some(s))),
                        None => Ok((p, None)),
                    });
                    match parsed {
                        Ok((p, s)) => {
                            primary = p;
                            if let Some(s) = s {
                                secondary = s;
                            }
                            println!("Ranking by {primary}, then {secondary}.");
                        }
                        Err(e) => println!("Error: {e}"),
                    }
                }
                None => println!("Usage: sort <primary> [secondary]"),
            },
            "limit" => match parts.next() {
                Some("none") => {
                    limits.max_results = None;
                    println!("Search limit removed.");
                }
                Some(value) => match value.parse::<usize>() {
                    Ok(n) => {
                        limits.max_results = Some(n);
                        println!("Search stops after {n} schedules.");
                    }
                    Err(_) => println!("Invalid limit"),
                },
                None => println!("Usage: limit <n|none>"),
            },
            "find" => {
                let shown = match parts.next() {
                    Some(value) => match value.parse::<usize>() {
                        Ok(n) => n,
                        Err(_) => {
                            println!("Invalid count");
                            continue;
                        }
                    },
                    None => DEFAULT_SHOWN,
                };
                let outcome = ScheduleSearch::new(&requested)
                    .primary(primary)
                    .secondary(secondary)
                    .limits(limits)
                    .run();
                if outcome.schedules.is_empty() {
                    println!("No conflict-free schedules found.");
                    continue;
                }
                println!(
                    "Found {} schedule(s){}, ranked by {primary} then {secondary}.",
                    outcome.schedules.len(),
                    if outcome.truncated { " (search stopped early)" } else { "" }
                );
                for (idx, schedule) in outcome.schedules.iter().take(shown).enumerate() {
                    println!("#{} {}", idx + 1, render_statistics(schedule));
                    print!("{}", render_schedule(schedule));
                }
            }
            _ => println!("Unknown command. Type 'help'."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hours_render_as_clock_time() {
        assert_eq!(format_hour(9.0), "9:00");
        assert_eq!(format_hour(13.5), "13:30");
        assert_eq!(format_hour(10.0 + 20.0 / 60.0), "10:20");
    }

    #[test]
    fn table_pads_columns() {
        let table = render_text_table(&["a", "bb"], &[vec!["xyz".into(), "1".into()]]);
        assert!(table.contains("| a   | bb |"));
        assert!(table.contains("| xyz | 1  |"));
    }
}
