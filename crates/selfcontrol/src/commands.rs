//! Subcommand implementations
//!
//! Output for the user goes to stdout; diagnostics go through tracing.

use anyhow::{bail, Result};
use chrono::{DateTime, Local};
use selfcontrol_config::Settings;
use selfcontrol_core::{expand_pattern, Controller};
use selfcontrol_util::{format_datetime_full, format_duration, parse_duration, PresetDuration};

pub fn list(controller: &Controller, now: DateTime<Local>) -> Result<()> {
    let status = controller.status(now)?;
    print!("{}", render_patterns(&status.patterns));
    Ok(())
}

pub fn add(controller: &Controller, patterns: &[String]) -> Result<()> {
    for pattern in patterns {
        if controller.add_pattern(pattern)? {
            println!("Added {}", pattern.trim());
        } else {
            println!("{} is already in the block list", pattern.trim());
        }
    }
    Ok(())
}

pub fn remove(controller: &Controller, numbers: &[u64]) -> Result<()> {
    let removed = controller.remove_patterns(&to_indices(numbers))?;
    println!("Removed {removed} pattern(s)");
    Ok(())
}

pub fn start(
    controller: &mut Controller,
    settings: &Settings,
    words: &[String],
    now: DateTime<Local>,
) -> Result<()> {
    let Some(preset) = resolve_duration(settings, words) else {
        bail!(
            "Unknown duration {:?}; use a preset label (see `selfcontrol durations`) or a value like 45m",
            words.join(" ")
        );
    };

    let session = controller.start_session(preset.duration, &preset.label, now)?;
    println!(
        "Blocking for {} until {}",
        session.label,
        format_datetime_full(&session.end)
    );
    Ok(())
}

pub fn status(controller: &Controller, now: DateTime<Local>) -> Result<()> {
    let status = controller.status(now)?;

    match &status.session {
        Some(session) if status.is_active(now) => println!(
            "Blocking active ({}): {} elapsed, {} remaining, ends {}",
            session.label,
            format_duration(session.elapsed(now)),
            format_duration(status.remaining),
            format_datetime_full(&session.end)
        ),
        Some(session) => println!(
            "Session ended {}; waiting for selfcontrold to unblock",
            format_datetime_full(&session.end)
        ),
        None => println!("No active session"),
    }

    if status.hosts_blocked && status.session.is_none() {
        println!("Warning: hosts file still contains a block region");
    }

    print!("{}", render_patterns(&status.patterns));
    Ok(())
}

pub fn durations(settings: &Settings) {
    for preset in &settings.durations {
        println!("{:<12} {}", preset.label, format_duration(preset.duration));
    }
}

pub fn expand(patterns: &[String]) {
    for pattern in patterns {
        let hosts = expand_pattern(pattern);
        if hosts.is_empty() {
            println!("{pattern}: blocks nothing");
            continue;
        }
        println!("{pattern}:");
        for host in hosts {
            println!("  {host}");
        }
    }
}

/// Match a preset label first (`5 minutes`), then a compact duration
/// (`45m`, `1h30m`, `90`).
fn resolve_duration(settings: &Settings, words: &[String]) -> Option<PresetDuration> {
    let input = words.join(" ");
    let input = input.trim();

    if let Some(preset) = settings
        .durations
        .iter()
        .find(|d| d.label.eq_ignore_ascii_case(input))
    {
        return Some(preset.clone());
    }

    parse_duration(input).map(|d| PresetDuration::new(format_duration(d), d))
}

/// 1-based numbers as shown by `list` to zero-based positions
fn to_indices(numbers: &[u64]) -> Vec<usize> {
    numbers
        .iter()
        .filter_map(|&n| n.checked_sub(1))
        .map(|n| usize::try_from(n).unwrap_or(usize::MAX))
        .collect()
}

fn render_patterns(patterns: &[String]) -> String {
    if patterns.is_empty() {
        return "Block list is empty\n".to_string();
    }

    patterns
        .iter()
        .enumerate()
        .map(|(i, pattern)| format!("{:>3}. {pattern}\n", i + 1))
        .collect()
}
