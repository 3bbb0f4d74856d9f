#![cfg(test)]

use std::sync::{Arc, Once};

use upmirror::{path::FsPath, Id};
use upmirror_sync::{Policy, Replicator, Summary};

mod dataset;
mod utils;
mod stubs {
    pub mod local;
    pub mod remote;
}
mod tests;

use dataset::Entry;
use stubs::{local, remote};
use utils::Recorder;

const LOCAL_ROOT: &str = "/home/student/Year 4";

static LOG_INIT: Once = Once::new();

struct Harness {
    replicator: Replicator<local::Stub, remote::Stub, Arc<Recorder>>,
    recorder: Arc<Recorder>,
}

impl Harness {
    fn remote(&self) -> &remote::Stub {
        self.replicator.remote()
    }

    async fn run(&self) -> upmirror::Result<Summary> {
        self.replicator
            .run(FsPath::new(LOCAL_ROOT), Id::new(remote::ROOT))
            .await
    }
}

/// Harness mirroring `local` into `remote`
fn harness_with(local: &[Entry], remote: remote::Stub) -> Harness {
    LOG_INIT.call_once(env_logger::init);

    let local = local::Stub::new(FsPath::new(LOCAL_ROOT), local);
    let recorder = Arc::new(Recorder::default());
    let replicator =
        Replicator::new(local, remote, Policy::default()).with_observer(recorder.clone());
    Harness {
        replicator,
        recorder,
    }
}

fn harness(local: &[Entry]) -> Harness {
    harness_with(local, remote::Stub::new())
}
