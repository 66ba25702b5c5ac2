//! Phase runner
//!
//! Runs one unit of work per host on scoped threads with bounded
//! parallelism. `run` returns only after every started worker has
//! finished, which makes each call a barrier between phases. After the
//! first failure no further hosts are started. A panicking worker makes
//! the calling thread panic once the scope closes.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;

use crate::application::cancel::CancelToken;
use crate::domain::ports::{DeployEvent, DeployEventSink};
use crate::domain::value_objects::{Host, Phase};
use crate::error::{DeployError, DeployResult};

pub struct PhaseRunner<'a> {
    events: &'a dyn DeployEventSink,
    cancel: &'a CancelToken,
    max_parallel: usize,
}

impl<'a> PhaseRunner<'a> {
    pub fn new(events: &'a dyn DeployEventSink, cancel: &'a CancelToken, max_parallel: usize) -> Self {
        Self {
            events,
            cancel,
            max_parallel,
        }
    }

    /// Mark the start of a phase that has no per-host fan-out
    pub fn enter(&self, phase: Phase) -> DeployResult<()> {
        self.cancel.check(phase)?;
        self.events.on_event(DeployEvent::PhaseStarted { phase, hosts: 0 });
        Ok(())
    }

    pub fn leave(&self, phase: Phase) {
        self.events.on_event(DeployEvent::PhaseCompleted { phase });
    }

    /// Run `work` for every host; results come back in host order.
    pub fn run<T, F>(&self, phase: Phase, hosts: &[Host], work: F) -> DeployResult<Vec<T>>
    where
        T: Send,
        F: Fn(&Host) -> DeployResult<T> + Sync,
    {
        self.cancel.check(phase)?;
        self.events.on_event(DeployEvent::PhaseStarted {
            phase,
            hosts: hosts.len(),
        });

        let workers = match self.max_parallel {
            0 => hosts.len(),
            n => n.min(hosts.len()),
        };
        let detailed = self.events.wants_detailed_events();
        let next = AtomicUsize::new(0);
        let failed = AtomicBool::new(false);
        let slots: Vec<Mutex<Option<DeployResult<T>>>> =
            hosts.iter().map(|_| Mutex::new(None)).collect();

        thread::scope(|scope| {
            for _ in 0..workers {
                let (work, next, failed, slots) = (&work, &next, &failed, &slots);
                let events = self.events;
                scope.spawn(move || loop {
                    if failed.load(Ordering::SeqCst) {
                        break;
                    }
                    let index = next.fetch_add(1, Ordering::SeqCst);
                    let Some(host) = hosts.get(index) else {
                        break;
                    };
                    if detailed {
                        events.on_event(DeployEvent::HostStarted {
                            phase,
                            host: host.clone(),
                        });
                    }
                    let result = work(host);
                    match &result {
                        Ok(_) => {
                            if detailed {
                                events.on_event(DeployEvent::HostCompleted {
                                    phase,
                                    host: host.clone(),
                                });
                            }
                        }
                        Err(err) => {
                            failed.store(true, Ordering::SeqCst);
                            events.on_event(DeployEvent::HostFailed {
                                phase,
                                host: host.clone(),
                                error: err.to_string(),
                            });
                        }
                    }
                    if let Ok(mut slot) = slots[index].lock() {
                        *slot = Some(result);
                    }
                });
            }
        });

        let mut results = Vec::with_capacity(hosts.len());
        let mut first_error: Option<DeployError> = None;
        // Slots are only locked to store a finished result
        for slot in slots {
            match slot.into_inner().ok().flatten() {
                Some(Ok(value)) => results.push(value),
                Some(Err(err)) => {
                    if first_error.is_none() {
                        first_error = Some(err);
                    }
                }
                None => {}
            }
        }
        if let Some(err) = first_error {
            return Err(err);
        }

        self.events.on_event(DeployEvent::PhaseCompleted { phase });
        Ok(results)
    }
}
