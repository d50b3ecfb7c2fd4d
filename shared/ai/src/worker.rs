//! Runs an agent on its own thread behind a pair of single-slot channels.

use crate::agent::MonteCarloVehicleAi;
use crate::error::WorkerError;
use crossbeam::channel::{self, Receiver, Sender, TryRecvError};
use mts_simulator::controls::VehicleControls;
use mts_simulator::simulation::SimulationState;
use mts_simulator::VehicleId;
use std::sync::Arc;
use std::thread::JoinHandle;

/// Owner side of one agent thread.
///
/// At most one request is outstanding: a new snapshot is only accepted after
/// the response to the previous one has been taken.
pub struct AgentWorker {
    id: VehicleId,
    request_send: Option<Sender<Arc<SimulationState>>>,
    response_recv: Receiver<VehicleControls>,
    handle: Option<JoinHandle<()>>,
    in_flight: bool,
}

impl AgentWorker {
    pub fn spawn(mut agent: MonteCarloVehicleAi) -> Self {
        let id = agent.controlled();
        let (request_send, request_recv) = channel::bounded::<Arc<SimulationState>>(1);
        let (response_send, response_recv) = channel::bounded(1);
        let handle = std::thread::Builder::new()
            .name(format!("agent-{id}"))
            .spawn(move || {
                for snapshot in request_recv.iter() {
                    let controls = agent.compute_control(&snapshot);
                    if response_send.send(controls).is_err() {
                        break;
                    }
                }
                log::debug!("agent {id} worker exiting");
            });
        let handle = match handle {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::error!("failed to start worker for agent {id}: {e}");
                None
            }
        };
        Self {
            id,
            request_send: Some(request_send),
            response_recv,
            handle,
            in_flight: false,
        }
    }

    pub fn id(&self) -> VehicleId {
        self.id
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn request(&mut self, snapshot: Arc<SimulationState>) -> Result<(), WorkerError> {
        if self.in_flight {
            return Err(WorkerError::RequestInFlight);
        }
        let sender = self.request_send.as_ref().ok_or(WorkerError::Disconnected)?;
        sender
            .send(snapshot)
            .map_err(|_| WorkerError::Disconnected)?;
        self.in_flight = true;
        Ok(())
    }

    /// Blocks until the outstanding request is answered.
    pub fn response(&mut self) -> Result<VehicleControls, WorkerError> {
        if !self.in_flight {
            return Err(WorkerError::NoRequest);
        }
        let controls = self
            .response_recv
            .recv()
            .map_err(|_| WorkerError::Disconnected)?;
        self.in_flight = false;
        Ok(controls)
    }

    /// Returns `Ok(None)` while the search is still running.
    pub fn try_response(&mut self) -> Result<Option<VehicleControls>, WorkerError> {
        if !self.in_flight {
            return Err(WorkerError::NoRequest);
        }
        match self.response_recv.try_recv() {
            Ok(controls) => {
                self.in_flight = false;
                Ok(Some(controls))
            }
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(WorkerError::Disconnected),
        }
    }
}

impl Drop for AgentWorker {
    fn drop(&mut self) {
        self.request_send.take();
        // Unblock a worker waiting to deliver an unread response.
        while self.response_recv.try_recv().is_ok() {}
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("agent {} worker panicked", self.id);
            }
        }
    }
}
