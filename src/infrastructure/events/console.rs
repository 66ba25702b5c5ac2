//! Console Event Sink
//!
//! One human-readable line per event on stderr. Per-host progress only
//! shows at `-v` and above.

use std::io::{self, Write};
use std::sync::Mutex;

use crossterm::style::{Color, Stylize};

use crate::domain::entities::{BackupKind, FailoverOutcome};
use crate::domain::ports::{DeployEvent, DeployEventSink};

/// Terminal capabilities the sink renders for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConsoleStyle {
    pub color: bool,
    pub unicode: bool,
}

#[derive(Debug, Clone, Copy)]
enum Mark {
    Ok,
    Fail,
    Warn,
    Step,
    Detail,
}

impl Mark {
    fn glyph(self, unicode: bool) -> &'static str {
        match (unicode, self) {
            (true, Mark::Ok) => "✓",
            (true, Mark::Fail) => "✗",
            (true, Mark::Warn) => "⚠",
            (true, Mark::Step) => "●",
            (true, Mark::Detail) => "↳",
            (false, Mark::Ok) => "[OK]",
            (false, Mark::Fail) => "[FAIL]",
            (false, Mark::Warn) => "[WARN]",
            (false, Mark::Step) => "[..]",
            (false, Mark::Detail) => "  -",
        }
    }

    fn color(self) -> Color {
        match self {
            Mark::Ok => Color::Green,
            Mark::Fail => Color::Red,
            Mark::Warn => Color::Yellow,
            Mark::Step => Color::Cyan,
            Mark::Detail => Color::DarkGrey,
        }
    }
}

pub struct ConsoleEventSink {
    style: ConsoleStyle,
    verbose: u8,
    writer: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleEventSink {
    pub fn stderr(style: ConsoleStyle, verbose: u8) -> Self {
        Self::with_writer(io::stderr(), style, verbose)
    }

    pub fn with_writer<W: Write + Send + 'static>(writer: W, style: ConsoleStyle, verbose: u8) -> Self {
        Self {
            style,
            verbose,
            writer: Mutex::new(Box::new(writer)),
        }
    }

    fn line(&self, mark: Mark, text: &str) {
        let glyph = mark.glyph(self.style.unicode);
        let glyph = if self.style.color {
            format!("{}", glyph.with(mark.color()))
        } else {
            glyph.to_string()
        };
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{} {}", glyph, text);
        }
    }

    /// Render an event, or `None` when it is below the verbosity threshold
    fn describe(&self, event: &DeployEvent) -> Option<(Mark, String)> {
        let detailed = self.verbose > 0;
        let described = match event {
            DeployEvent::Started {
                cluster_id,
                workflow,
                hosts,
            } => (
                Mark::Step,
                format!(
                    "{} cluster {} on {}",
                    workflow,
                    cluster_id,
                    join(hosts.iter())
                ),
            ),
            DeployEvent::PhaseStarted { phase, hosts } => {
                if *hosts > 0 {
                    (Mark::Step, format!("{} ({} hosts)", phase, hosts))
                } else {
                    (Mark::Step, phase.to_string())
                }
            }
            DeployEvent::PhaseCompleted { phase } => {
                if !detailed {
                    return None;
                }
                (Mark::Ok, format!("{} done", phase))
            }
            DeployEvent::HostStarted { phase, host } => {
                if !detailed {
                    return None;
                }
                (Mark::Detail, format!("{} {}", host, phase))
            }
            DeployEvent::HostCompleted { phase, host } => {
                if !detailed {
                    return None;
                }
                (Mark::Detail, format!("{} {} ok", host, phase))
            }
            DeployEvent::HostFailed { phase, host, error } => {
                (Mark::Fail, format!("{} failed during {}: {}", host, phase, error))
            }
            DeployEvent::StateObserved { host, state } => {
                if !detailed {
                    return None;
                }
                (Mark::Detail, format!("{} is {}", host, state))
            }
            DeployEvent::PendingDiscarded { host } => (
                Mark::Warn,
                format!("discarded unfinished install on {}", host),
            ),
            DeployEvent::PortConflicts { conflicts } => (
                Mark::Warn,
                format!(
                    "ports in use: {}",
                    join(conflicts.iter().map(|c| format!("{}:{}", c.host, c.port)))
                ),
            ),
            DeployEvent::BackupCreated { kind, host, path } => {
                let what = match kind {
                    BackupKind::Conf => "conf".to_string(),
                    BackupKind::Data => match host {
                        Some(h) => format!("data on {}", h),
                        None => "data".to_string(),
                    },
                };
                (Mark::Ok, format!("backed up {} to {}", what, path.display()))
            }
            DeployEvent::ConfRestored { path, files } => (
                Mark::Ok,
                format!("restored {} files from {}", files, path.display()),
            ),
            DeployEvent::FailoverRound {
                round,
                max_rounds,
                attempts,
            } => {
                let promoted = attempts.iter().filter(|a| a.outcome.is_promoted()).count();
                let mut text = format!(
                    "failover round {}/{}: {}/{} promoted",
                    round,
                    max_rounds,
                    promoted,
                    attempts.len()
                );
                if detailed {
                    for attempt in attempts {
                        let outcome = match &attempt.outcome {
                            FailoverOutcome::Promoted => "promoted".to_string(),
                            FailoverOutcome::NotYetSlave => "pending".to_string(),
                            FailoverOutcome::Error(e) => format!("error: {}", e),
                        };
                        text.push_str(&format!("\n    {} {}", attempt.target, outcome));
                    }
                }
                let mark = if promoted == attempts.len() {
                    Mark::Ok
                } else {
                    Mark::Step
                };
                (mark, text)
            }
            DeployEvent::TimeoutWidened {
                key,
                master_value,
                slave_value,
                widened,
            } => (
                Mark::Step,
                format!(
                    "{} set to {} (was {} on masters, {} on slaves)",
                    key, widened, master_value, slave_value
                ),
            ),
            DeployEvent::TimeoutRestored { key } => (Mark::Ok, format!("{} restored", key)),
            DeployEvent::TopologyPersisted {
                master_ports,
                slave_ports,
            } => (
                Mark::Ok,
                format!("masters now on {}, slaves on {}", master_ports, slave_ports),
            ),
            DeployEvent::Warning { message } => (Mark::Warn, message.clone()),
            DeployEvent::Completed {
                cluster_id,
                workflow,
            } => (Mark::Ok, format!("{} of cluster {} complete", workflow, cluster_id)),
        };
        Some(described)
    }
}

fn join<T: ToString>(items: impl Iterator<Item = T>) -> String {
    items.map(|i| i.to_string()).collect::<Vec<_>>().join(", ")
}

impl DeployEventSink for ConsoleEventSink {
    fn on_event(&self, event: DeployEvent) {
        if let Some((mark, text)) = self.describe(&event) {
            self.line(mark, &text);
        }
    }

    fn wants_detailed_events(&self) -> bool {
        self.verbose > 0
    }
}
