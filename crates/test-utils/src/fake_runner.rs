use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use sectionwatch::engine::{BuildOutcome, BuildRequest, DispatchEvent};
use sectionwatch::errors::Result;
use sectionwatch::exec::BuildRunner;

/// A fake runner that:
/// - records every submitted request
/// - immediately reports an outcome: failure for sections listed in
///   `failing`, success otherwise
/// - optionally holds builds open (reports nothing) to simulate slow builds.
pub struct FakeBuildRunner {
    events: mpsc::Sender<DispatchEvent>,
    executed: Arc<Mutex<Vec<BuildRequest>>>,
    failing: HashSet<String>,
    hold_open: bool,
}

impl FakeBuildRunner {
    pub fn new(events: mpsc::Sender<DispatchEvent>, executed: Arc<Mutex<Vec<BuildRequest>>>) -> Self {
        Self {
            events,
            executed,
            failing: HashSet::new(),
            hold_open: false,
        }
    }

    pub fn failing(mut self, section: &str) -> Self {
        self.failing.insert(section.to_string());
        self
    }

    /// Never report completion.
    pub fn hold_open(mut self) -> Self {
        self.hold_open = true;
        self
    }
}

impl BuildRunner for FakeBuildRunner {
    fn spawn_build(
        &mut self,
        request: BuildRequest,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let tx = self.events.clone();
        let executed = Arc::clone(&self.executed);
        let fails = self.failing.contains(&request.section);
        let hold_open = self.hold_open;

        Box::pin(async move {
            executed.lock().unwrap().push(request.clone());
            if hold_open {
                return Ok(());
            }

            let outcome = if fails {
                BuildOutcome::failed(&request, Some(1), "exit status: 1")
            } else {
                BuildOutcome::succeeded(&request)
            };

            // Report from a separate task like a real child would, so the
            // runtime loop is not blocked on its own channel.
            tokio::spawn(async move {
                let _ = tx.send(DispatchEvent::BuildFinished(outcome)).await;
            });
            Ok(())
        })
    }
}

/// Names of the sections built so far, in order.
pub fn built_sections(executed: &Arc<Mutex<Vec<BuildRequest>>>) -> Vec<String> {
    executed
        .lock()
        .unwrap()
        .iter()
        .map(|r| r.section.clone())
        .collect()
}
