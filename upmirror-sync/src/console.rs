use std::io::Write;

use crossterm::style::Stylize;
use upmirror_sync::{Event, Observer};

/// Prints replication events to stdout, one line per event,
/// indented by one tab per depth level.
#[derive(Debug, Default)]
pub struct Console;

impl Observer for Console {
    fn notify(&self, event: &Event<'_>) {
        let indent = "\t".repeat(event.level());
        let line = match event {
            Event::Folder {
                name,
                created: true,
                ..
            } => format!("{} {name}", "Created folder".green()),
            Event::Folder { name, .. } => format!("{name}"),
            Event::Skip { name, .. } => format!("{}", format!("{name} exists").dark_grey()),
            Event::Upload {
                name,
                chunked: false,
                ..
            } => format!("{} {name}", "Uploading".yellow()),
            Event::Upload { name, .. } => {
                format!("{} {name}", "Uploading in chunks".red())
            }
            Event::Progress { percent, .. } => format!("\t{percent}%"),
            Event::Uploaded { name, .. } => format!("{} {name}", "Uploaded".green()),
            Event::Stop { name, .. } => {
                format!("{}", format!("Stopping at excluded {name}").red())
            }
        };

        let mut stdout = std::io::stdout().lock();
        // console output is informative only
        let _ = writeln!(stdout, "{indent}{line}");
    }
}
