use std::sync::atomic::{ AtomicBool, Ordering };
use std::sync::mpsc::{ self, Receiver, Sender };
use std::sync::{ Arc, Mutex };
use std::thread;
use std::time::Duration;
use serde_json::json;
use uuid::Uuid;
use crate::api::error::{ Error, Result };
use crate::api::models::{ DispenseEvent, DispenseJob, PumpId };
use crate::api::{ ChannelBank, ChannelError, ResourceService };

const PROGRESS_STEPS: u8 = 100;

struct Worker {
    thread: thread::JoinHandle<()>,
    cancel_requested: Arc<AtomicBool>
}

/// Holds the single dispense slot until dropped.
pub struct Admission {
    is_busy: Arc<AtomicBool>
}

impl Drop for Admission {
    fn drop(&mut self) {
        self.is_busy.store(false, Ordering::SeqCst);
    }
}

/// Receiving end of one dispense job.
pub struct DispenseHandle {
    job: DispenseJob,
    events: Receiver<DispenseEvent>
}

impl DispenseHandle {
    pub fn job(&self) -> &DispenseJob {
        &self.job
    }

    /// Blocks for each event. The scheduler accepts the next job by the time
    /// the terminal event arrives.
    pub fn events(&self) -> mpsc::Iter<'_, DispenseEvent> {
        self.events.iter()
    }

    pub fn wait(self) -> Result<()> {
        self.wait_with(|_| {})
    }

    pub fn wait_with<F: FnMut(u8)>(self, mut on_progress: F) -> Result<()> {
        let mut outcome = Err(Error::DispenseFault(String::from("dispense worker stopped without finishing")));
        for event in self.events.iter() {
            let is_terminal = event.is_terminal();
            match event {
                DispenseEvent::Progress(percent) => on_progress(percent),
                DispenseEvent::Done => outcome = Ok(()),
                DispenseEvent::Fault(message) => outcome = Err(Error::DispenseFault(message)),
                DispenseEvent::Cancelled => outcome = Err(Error::Cancelled)
            }
            if is_terminal {
                break;
            }
        }
        outcome
    }
}

/// Runs one timed actuation at a time over the pump channels. Jobs run on a
/// background thread and report progress through their [`DispenseHandle`].
pub struct DispenseScheduler {
    resource_service: ResourceService,
    pumps: Vec<PumpId>,
    channel_bank: Arc<Mutex<ChannelBank>>,
    is_busy: Arc<AtomicBool>,
    running_pumps: Arc<Mutex<Vec<PumpId>>>,
    worker: Mutex<Option<Worker>>
}

impl DispenseScheduler {
    pub fn new(resource_service: ResourceService, channel_bank: ChannelBank) -> DispenseScheduler {
        DispenseScheduler {
            resource_service,
            pumps: channel_bank.pumps(),
            channel_bank: Arc::new(Mutex::new(channel_bank)),
            is_busy: Arc::new(AtomicBool::new(false)),
            running_pumps: Arc::new(Mutex::new(vec![])),
            worker: Mutex::new(None)
        }
    }

    pub fn pumps(&self) -> &[PumpId] {
        &self.pumps
    }

    pub fn is_busy(&self) -> bool {
        self.is_busy.load(Ordering::SeqCst)
    }

    pub fn running_pumps(&self) -> Vec<PumpId> {
        match self.running_pumps.lock() {
            Ok(running_pumps) => running_pumps.clone(),
            Err(poisoned) => poisoned.into_inner().clone()
        }
    }

    /// Claims the dispense slot without starting anything yet.
    pub fn reserve(&self) -> Result<Admission> {
        if self.is_busy.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst).is_err() {
            log::debug!("{}", self.resource_service.message("dispense_rejected_busy_debug_message"));
            return Err(Error::Busy);
        }
        Ok(Admission { is_busy: self.is_busy.clone() })
    }

    pub fn start(&self, duration: Duration, pumps: &[PumpId]) -> Result<DispenseHandle> {
        let admission = self.reserve()?;
        self.start_reserved(admission, duration, pumps)
    }

    pub fn start_reserved(&self, admission: Admission, duration: Duration, pumps: &[PumpId]) -> Result<DispenseHandle> {
        let mut job_pumps: Vec<PumpId> = vec![];
        for pump in pumps {
            if !self.pumps.contains(pump) {
                return Err(Error::UnknownPump(*pump));
            }
            if !job_pumps.contains(pump) {
                job_pumps.push(*pump);
            }
        }
        if job_pumps.is_empty() {
            return Err(Error::EmptyRequest);
        }
        let job = DispenseJob {
            id: Uuid::new_v4(),
            pumps: job_pumps,
            duration_in_milliseconds: duration.as_millis() as u64
        };

        let mut worker = self.worker.lock().map_err(|_| Error::poisoned("dispense worker"))?;
        if let Some(previous) = worker.take() {
            // The slot was free, so the previous worker is at most dropping its sender.
            if previous.thread.join().is_err() {
                log::error!("{}", self.resource_service.message("dispense_worker_panicked_error_message"));
            }
        }

        let message_data = &json!({
            "job": job.id.to_string(),
            "pumps": pump_list(&job.pumps),
            "milliseconds": job.duration_in_milliseconds
        });
        log::info!("{}", self.resource_service.render("scheduling_job_info_message_template", message_data));

        let (sender, receiver) = mpsc::channel();
        let cancel_requested = Arc::new(AtomicBool::new(false));
        let resource_service = self.resource_service.clone();
        let channel_bank = self.channel_bank.clone();
        let running_pumps = self.running_pumps.clone();
        let worker_cancel_requested = cancel_requested.clone();
        let worker_job = job.clone();
        let thread = thread::Builder::new()
            .name(String::from("dispense"))
            .spawn(move || {
                let outcome = DispenseScheduler::run_job(
                    &resource_service,
                    &worker_job,
                    &channel_bank,
                    &running_pumps,
                    &worker_cancel_requested,
                    &sender
                );
                // Channels are off by now. Free the slot before anyone hears the outcome.
                drop(admission);
                let _ = sender.send(outcome);
            })?;
        *worker = Some(Worker { thread, cancel_requested });
        Ok(DispenseHandle { job, events: receiver })
    }

    /// Asks the running job, if any, to stop early. Its channels are switched
    /// off and it ends with [`DispenseEvent::Cancelled`].
    pub fn cancel(&self) {
        if let Ok(worker) = self.worker.lock() {
            if let Some(worker) = worker.as_ref() {
                worker.cancel_requested.store(true, Ordering::SeqCst);
            }
        }
    }

    /// Cancels the running job and waits for its worker to exit.
    pub fn shutdown(&self) {
        let worker = match self.worker.lock() {
            Ok(mut worker) => worker.take(),
            Err(poisoned) => poisoned.into_inner().take()
        };
        if let Some(worker) = worker {
            worker.cancel_requested.store(true, Ordering::SeqCst);
            if worker.thread.join().is_err() {
                log::error!("{}", self.resource_service.message("dispense_worker_panicked_error_message"));
            }
            log::info!("{}", self.resource_service.message("dispense_worker_stopped_info_message"));
        }
    }

    /// Pours one job and returns its terminal event once every channel is off.
    fn run_job(
        resource_service: &ResourceService,
        job: &DispenseJob,
        channel_bank: &Mutex<ChannelBank>,
        running_pumps: &Mutex<Vec<PumpId>>,
        cancel_requested: &AtomicBool,
        sender: &Sender<DispenseEvent>
    ) -> DispenseEvent {
        let job_data = json!({ "job": job.id.to_string(), "pumps": pump_list(&job.pumps) });
        log::info!("{}", resource_service.render("processing_job_info_message_template", &job_data));
        let mut channel_bank = match channel_bank.lock() {
            Ok(channel_bank) => channel_bank,
            Err(_) => return DispenseEvent::Fault(Error::poisoned("channel bank").to_string())
        };
        let mut energized = Energized { channel_bank: &mut *channel_bank, active: vec![], running_pumps };

        for pump in &job.pumps {
            if let Err(error) = energized.activate(*pump) {
                let message = resource_service.render(
                    "activation_failed_error_message_template",
                    &json!({ "pump": pump.0, "error": error.to_string() })
                );
                log::error!("{}", message);
                if let Err(release_error) = energized.release() {
                    log::error!("{}", release_error);
                }
                return DispenseEvent::Fault(message);
            }
        }

        let step = Duration::from_millis(job.duration_in_milliseconds) / u32::from(PROGRESS_STEPS);
        for percent in 0..=PROGRESS_STEPS {
            if cancel_requested.load(Ordering::SeqCst) {
                log::warn!("{}", resource_service.render("job_cancelled_warn_message_template", &job_data));
                return match energized.release() {
                    Ok(()) => DispenseEvent::Cancelled,
                    Err(message) => DispenseEvent::Fault(message)
                };
            }
            if percent > 0 {
                thread::sleep(step);
            }
            // Nobody listening is fine, the pour still has to finish.
            let _ = sender.send(DispenseEvent::Progress(percent));
        }

        match energized.release() {
            Ok(()) => {
                log::info!("{}", resource_service.render("finished_job_info_message_template", &job_data));
                DispenseEvent::Done
            },
            Err(message) => {
                log::error!("{}", message);
                DispenseEvent::Fault(message)
            }
        }
    }
}

impl Drop for DispenseScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Channels switched on by the current job. Whatever is still on when this
/// goes away, including during a panic, is switched off.
struct Energized<'a> {
    channel_bank: &'a mut ChannelBank,
    active: Vec<usize>,
    running_pumps: &'a Mutex<Vec<PumpId>>
}

impl<'a> Energized<'a> {
    fn activate(&mut self, pump: PumpId) -> std::result::Result<(), ChannelError> {
        let index = self.channel_bank
            .index_of(pump)
            .ok_or_else(|| ChannelError::from(format!("no channel for pump {}", pump)))?;
        // Tracked before switching so a half failed activation still gets switched off.
        self.active.push(index);
        self.channel_bank.activate(index)?;
        if let Ok(mut running_pumps) = self.running_pumps.lock() {
            running_pumps.push(pump);
        }
        Ok(())
    }

    fn release(&mut self) -> std::result::Result<(), String> {
        let mut failures = vec![];
        for index in self.active.drain(..) {
            if let Err(error) = self.channel_bank.deactivate(index) {
                failures.push(format!("pump {} stuck on: {}", self.channel_bank.pump_at(index), error));
            }
        }
        if let Ok(mut running_pumps) = self.running_pumps.lock() {
            running_pumps.clear();
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(failures.join("; "))
        }
    }
}

impl<'a> Drop for Energized<'a> {
    fn drop(&mut self) {
        if !self.active.is_empty() {
            if let Err(message) = self.release() {
                log::error!("{}", message);
            }
        }
    }
}

fn pump_list(pumps: &[PumpId]) -> String {
    pumps.iter().map(PumpId::to_string).collect::<Vec<_>>().join(", ")
}
