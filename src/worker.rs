//! Background engine worker.
//!
//! The worker thread owns its own engine, built by a factory on `Init`, and
//! answers each `Process` with exactly one reply. Requests are handled in
//! channel order, one file at a time.

use crate::engine::IfcEngine;
use crate::error::WorkerError;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;

/// What the worker learned about one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileSummary {
    pub entity_count: usize,
    pub byte_len: usize,
}

#[derive(Debug)]
enum Request {
    Init,
    Process(Vec<u8>),
}

#[derive(Debug)]
enum Reply {
    Processed(FileSummary),
    Failed(String),
}

pub struct EngineWorker {
    requests: Option<Sender<Request>>,
    replies: Receiver<Reply>,
    thread: Option<JoinHandle<()>>,
}

impl EngineWorker {
    /// Starts the worker thread. The engine is built there, so it need not be `Send`.
    pub fn spawn<E, F>(factory: F) -> Self
    where
        E: IfcEngine + 'static,
        F: FnOnce() -> E + Send + 'static,
    {
        let (request_tx, request_rx) = mpsc::channel();
        let (reply_tx, reply_rx) = mpsc::channel();
        let thread = std::thread::spawn(move || serve(factory, &request_rx, &reply_tx));

        Self {
            requests: Some(request_tx),
            replies: reply_rx,
            thread: Some(thread),
        }
    }

    /// Asks the worker to build its engine. Not acknowledged.
    pub fn init(&self) -> Result<(), WorkerError> {
        self.send(Request::Init)
    }

    /// Hands the buffer to the worker and blocks until it answers.
    pub fn process(&self, bytes: Vec<u8>) -> Result<FileSummary, WorkerError> {
        self.send(Request::Process(bytes))?;
        match self.replies.recv() {
            Ok(Reply::Processed(summary)) => Ok(summary),
            Ok(Reply::Failed(message)) => Err(WorkerError::Failed { message }),
            Err(_) => Err(WorkerError::Disconnected),
        }
    }

    fn send(&self, request: Request) -> Result<(), WorkerError> {
        self.requests
            .as_ref()
            .ok_or(WorkerError::Disconnected)?
            .send(request)
            .map_err(|_| WorkerError::Disconnected)
    }
}

impl Drop for EngineWorker {
    fn drop(&mut self) {
        // Closing the request channel ends the serve loop.
        self.requests.take();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::warn!("Engine worker thread panicked");
            }
        }
    }
}

fn serve<E, F>(factory: F, requests: &Receiver<Request>, replies: &Sender<Reply>)
where
    E: IfcEngine,
    F: FnOnce() -> E,
{
    let mut factory = Some(factory);
    let mut engine: Option<E> = None;

    while let Ok(request) = requests.recv() {
        match request {
            Request::Init => {
                if let Some(factory) = factory.take() {
                    engine = Some(factory());
                    tracing::debug!("Engine worker initialized");
                }
            }
            Request::Process(bytes) => {
                let reply = match engine.as_mut() {
                    Some(engine) => summarize(engine, &bytes),
                    None => Reply::Failed("engine not initialized".to_string()),
                };
                if replies.send(reply).is_err() {
                    break;
                }
            }
        }
    }
}

fn summarize<E: IfcEngine>(engine: &mut E, bytes: &[u8]) -> Reply {
    let handle = match engine.open_model(bytes) {
        Ok(handle) => handle,
        Err(err) => return Reply::Failed(err.to_string()),
    };
    let counted = engine.all_entity_ids(handle).map(|ids| ids.len());
    if let Err(err) = engine.close_model(handle) {
        tracing::warn!(handle = handle.0, error = %err, "Worker failed to close model");
    }

    match counted {
        Ok(entity_count) => Reply::Processed(FileSummary {
            entity_count,
            byte_len: bytes.len(),
        }),
        Err(err) => Reply::Failed(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{MemoryEngine, MemoryModel, StepEngine};
    use crate::schema::TypeSchema;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn counts_entities_after_init() {
        let model = MemoryModel::new()
            .with_line(1, json!({}))
            .with_line(2, json!({}))
            .with_line(3, json!({}));
        let worker = EngineWorker::spawn(move || MemoryEngine::new(model));
        worker.init().unwrap();

        let summary = worker.process(b"abcd".to_vec()).unwrap();
        assert_eq!(
            summary,
            FileSummary {
                entity_count: 3,
                byte_len: 4,
            }
        );
    }

    #[test]
    fn open_failure_is_reported() {
        let worker = EngineWorker::spawn(MemoryEngine::default);
        worker.init().unwrap();
        let err = worker.process(Vec::new()).unwrap_err();
        assert!(matches!(err, WorkerError::Failed { message } if message.contains("empty buffer")));
    }

    #[test]
    fn process_before_init_fails() {
        let worker = EngineWorker::spawn(MemoryEngine::default);
        assert!(matches!(
            worker.process(b"x".to_vec()),
            Err(WorkerError::Failed { .. })
        ));
    }

    #[test]
    fn handles_files_one_after_another_with_step_engine() {
        let worker = EngineWorker::spawn(|| StepEngine::new(TypeSchema::default()));
        worker.init().unwrap();
        let file = "ISO-10303-21;\nHEADER;\nFILE_SCHEMA(('IFC4'));\nENDSEC;\nDATA;\n\
                    #1=IFCPROJECT('0x',$,'Demo',$,$,$,$,$,$);\n\
                    #2=IFCWALL('0y',$,'Wall',$,$,$,$,$,$);\nENDSEC;\nEND-ISO-10303-21;\n";

        assert_eq!(worker.process(file.as_bytes().to_vec()).unwrap().entity_count, 2);
        assert!(worker.process(b"not ifc".to_vec()).is_err());
    }
}
