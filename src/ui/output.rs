use crate::model::Event;
use crate::ui::{theme, Icons};
use crate::timestamp::UNPARSED_SUFFIX;
use owo_colors::{OwoColorize, Style};

pub fn header(text: &str) {
    println!("{} {}", Icons::FLAG, text.style(theme().header.clone()));
}

pub fn status(icon: &str, label: &str, value: &str) {
    println!("{} {}: {}", icon, label.style(theme().label.clone()), value);
}

pub fn success(label: &str) {
    println!("{} {}", Icons::CHECK, label.style(theme().success.clone()));
}

pub fn warn(label: &str) {
    eprintln!("{} {}", Icons::WARN, label.style(theme().warn.clone()));
}

pub fn info(label: &str, value: &str) {
    println!(
        "{} {}: {}",
        Icons::INFO.style(theme().info.clone()),
        label.style(theme().label.clone()),
        value
    );
}

pub fn section(title: &str) {
    println!();
    println!("━{}━", title.style(theme().header.clone()));
}

pub fn dim(text: &str) -> String {
    text.style(theme().label.clone()).to_string()
}

pub fn muted(text: &str) -> String {
    text.style(theme().muted.clone()).to_string()
}

pub fn summary_row(label: &str, value: &str) {
    println!("  {} {}", label.style(theme().label.clone()), value);
}

/// Lines describing one event; optional fields appear only when set
pub fn event_lines(event: &Event) -> Vec<(&'static str, String)> {
    let mut lines = vec![
        ("ID", event.id.to_string()),
        ("Title", event.title.clone()),
        ("Track", event.track_name.clone()),
        ("Start", event.start_date.display()),
    ];
    if let Some(end) = &event.end_date {
        lines.push(("End", end.display()));
    }
    if let Some(fee) = event.driver_fee {
        lines.push(("Driver Fee", format!("${:.2}", fee)));
    }
    if let Some(fee) = event.spectator_fee {
        lines.push(("Spectator Fee", format!("${:.2}", fee)));
    }
    if !event.url.is_empty() {
        lines.push(("URL", event.url.clone()));
    }
    if !event.description.is_empty() {
        lines.push(("Description", event.description.clone()));
    }
    lines
}

pub fn event_block(event: &Event) {
    println!(
        "{} {}",
        Icons::CALENDAR,
        event.title.style(theme().title.clone())
    );
    for (label, value) in event_lines(event) {
        let style = match label {
            "Driver Fee" | "Spectator Fee" => theme().fee.clone(),
            "Start" | "End" if value.ends_with(UNPARSED_SUFFIX) => theme().unparsed.clone(),
            _ => Style::new(),
        };
        summary_row(&format!("{}:", label), &value.style(style).to_string());
    }
    println!();
}
