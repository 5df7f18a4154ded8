use std::io::{self, IsTerminal};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use anstyle::{AnsiColor, Effects, Style};
use anyhow::anyhow;
use indicatif::{ProgressBar, ProgressStyle};
use pinnacle_core::ProgressTracker;

use crate::failure::{TaskFailure, TaskKind};
use crate::orchestrator::HostSignal;

const POLL_INTERVAL: Duration = Duration::from_millis(80);
const LABEL: &str = "bootstrap";

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum OutputStyle {
    Plain,
    Rich,
}

pub(crate) fn resolve_output_style(force_plain: bool) -> OutputStyle {
    if force_plain || !io::stderr().is_terminal() {
        OutputStyle::Plain
    } else {
        OutputStyle::Rich
    }
}

/// Terminal stand-in for the progress window: renders `completed/total` until the
/// coordinator signals, then returns that signal.
pub(crate) fn run_progress_host(
    style: OutputStyle,
    progress: &ProgressTracker,
    signals: &Receiver<HostSignal>,
) -> HostSignal {
    let started_at = Instant::now();
    let progress_bar =
        (style == OutputStyle::Rich).then(|| start_progress_bar(progress.total()));
    let mut last_printed = None;

    loop {
        let (completed, total) = progress.snapshot();
        match &progress_bar {
            Some(progress_bar) => progress_bar.set_position(completed.min(total) as u64),
            None => {
                if last_printed != Some(completed) {
                    eprintln!("{}", render_plain_line(completed, total));
                    last_printed = Some(completed);
                }
            }
        }

        match signals.recv_timeout(POLL_INTERVAL) {
            Ok(signal) => {
                finish(style, progress_bar, progress, &signal, started_at.elapsed());
                return signal;
            }
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => {
                if let Some(progress_bar) = progress_bar {
                    progress_bar.abandon();
                }
                return HostSignal::Failed(TaskFailure::new(
                    TaskKind::Handoff,
                    "waiting for bootstrap coordinator",
                    anyhow!("coordinator exited without signalling"),
                ));
            }
        }
    }
}

fn start_progress_bar(total: usize) -> ProgressBar {
    let progress_bar = ProgressBar::new(total.max(1) as u64);
    if let Ok(style) = ProgressStyle::with_template(
        "{spinner:.cyan.bold} {msg:<10} [{bar:20.cyan/blue}] {pos:>2}/{len:2} {elapsed_precise}",
    ) {
        progress_bar.set_style(style.tick_chars(".oO@* ").progress_chars("=>-"));
    }
    progress_bar.set_message(LABEL);
    progress_bar.enable_steady_tick(POLL_INTERVAL);
    progress_bar
}

fn finish(
    style: OutputStyle,
    progress_bar: Option<ProgressBar>,
    progress: &ProgressTracker,
    signal: &HostSignal,
    elapsed: Duration,
) {
    let (completed, total) = progress.snapshot();
    match signal {
        HostSignal::Close { .. } => {
            if let Some(progress_bar) = progress_bar {
                progress_bar.finish_and_clear();
            }
            match render_progress_line(style, completed, total, Some(elapsed)) {
                Some(line) => eprintln!("{line}"),
                None => eprintln!("{}", render_plain_line(completed, total)),
            }
        }
        HostSignal::Failed(_) => {
            if let Some(progress_bar) = progress_bar {
                progress_bar.abandon();
            }
        }
    }
}

pub(crate) fn render_plain_line(completed: usize, total: usize) -> String {
    format!("{LABEL}: {}/{}", completed.min(total), total)
}

fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    let millis = elapsed.subsec_millis();
    format!("{secs}.{millis:03}s")
}

fn progress_label_style() -> Style {
    Style::new()
        .fg_color(Some(AnsiColor::BrightCyan.into()))
        .effects(Effects::BOLD)
}

fn progress_bar_style() -> Style {
    Style::new().fg_color(Some(AnsiColor::BrightBlue.into()))
}

fn colorize(style: Style, text: &str) -> String {
    format!("{}{}{}", style.render(), text, style.render_reset())
}

pub(crate) fn render_progress_line(
    style: OutputStyle,
    current: usize,
    total: usize,
    elapsed: Option<Duration>,
) -> Option<String> {
    if style == OutputStyle::Plain {
        return None;
    }

    let width = 20_usize;
    let safe_total = total.max(1);
    let bounded_current = current.min(safe_total);
    let filled = (bounded_current * width) / safe_total;
    let bar = format!(
        "{}{}",
        "=".repeat(filled),
        "-".repeat(width.saturating_sub(filled))
    );
    let percent = (bounded_current * 100) / safe_total;
    let suffix = elapsed
        .map(|value| format!(" complete in {}", format_elapsed(value)))
        .unwrap_or_default();

    Some(format!(
        "{} [{}] {:>3}% {}/{}{}",
        colorize(progress_label_style(), LABEL),
        colorize(progress_bar_style(), &bar),
        percent,
        current,
        total,
        suffix
    ))
}
