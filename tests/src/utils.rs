use std::sync::Mutex;

use upmirror::path::FsPathBuf;
use upmirror_sync::{Event, Observer};

pub fn temp_path(prefix: Option<&str>, ext: Option<&str>) -> FsPathBuf {
    use rand::{distributions::Alphanumeric, Rng};

    let mut filename = String::new();
    if let Some(prefix) = prefix {
        filename.push_str(prefix);
        filename.push('-');
    }
    let rnd: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(7)
        .map(char::from)
        .collect();
    filename.push_str(&rnd);
    if let Some(ext) = ext {
        filename.push('.');
        filename.push_str(ext);
    }
    let mut p = std::env::temp_dir();
    p.push(filename);
    p.try_into().unwrap()
}

/// Owned copy of an [`Event`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recorded {
    Folder {
        name: String,
        level: usize,
        created: bool,
    },
    Skip {
        name: String,
    },
    Upload {
        name: String,
        level: usize,
        chunked: bool,
    },
    Progress {
        name: String,
        percent: u8,
    },
    Uploaded {
        name: String,
    },
    Stop {
        name: String,
        level: usize,
    },
}

#[derive(Debug, Default)]
pub struct Recorder {
    events: Mutex<Vec<Recorded>>,
}

impl Recorder {
    pub fn events(&self) -> Vec<Recorded> {
        self.events.lock().unwrap().clone()
    }

    /// Percentages reported for the upload of `name`
    pub fn progress(&self, name: &str) -> Vec<u8> {
        self.events()
            .into_iter()
            .filter_map(|ev| match ev {
                Recorded::Progress { name: n, percent } if n == name => Some(percent),
                _ => None,
            })
            .collect()
    }

    pub fn uploads(&self) -> Vec<(String, bool)> {
        self.events()
            .into_iter()
            .filter_map(|ev| match ev {
                Recorded::Upload { name, chunked, .. } => Some((name, chunked)),
                _ => None,
            })
            .collect()
    }
}

impl Observer for Recorder {
    fn notify(&self, event: &Event<'_>) {
        let rec = match *event {
            Event::Folder {
                name,
                level,
                created,
            } => Recorded::Folder {
                name: name.into(),
                level,
                created,
            },
            Event::Skip { name, .. } => Recorded::Skip { name: name.into() },
            Event::Upload {
                name,
                level,
                chunked,
                ..
            } => Recorded::Upload {
                name: name.into(),
                level,
                chunked,
            },
            Event::Progress { name, percent, .. } => Recorded::Progress {
                name: name.into(),
                percent,
            },
            Event::Uploaded { name, .. } => Recorded::Uploaded { name: name.into() },
            Event::Stop { name, level } => Recorded::Stop {
                name: name.into(),
                level,
            },
        };
        self.events.lock().unwrap().push(rec);
    }
}
