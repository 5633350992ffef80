use std::sync::Arc;

use program_engine::{
    BackendError, Command, Editor, EditorErrorEvent, Event, ProgramBackend, ProgramSnapshot,
    RequestTicket,
};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender, error::TryRecvError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Request sent from the operator surface to a running session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Load,
    Command(Command),
    Submit,
    /// Leaves the editor; pending backend responses are dropped.
    Close,
}

/// Error raised by the UI-session bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeError {
    Disconnected,
}

/// Channel-backed handle to a session task.
#[derive(Debug)]
pub struct SessionHandle {
    request_tx: UnboundedSender<Request>,
    event_rx: UnboundedReceiver<Event>,
    task: JoinHandle<Editor>,
}

impl SessionHandle {
    /// Sends one request to the session task.
    pub fn send(&self, request: Request) -> Result<(), BridgeError> {
        self.request_tx
            .send(request)
            .map_err(|_| BridgeError::Disconnected)
    }

    pub fn send_command(&self, command: Command) -> Result<(), BridgeError> {
        self.send(Request::Command(command))
    }

    /// Waits for the next event; `None` once the session task has ended.
    pub async fn next_event(&mut self) -> Option<Event> {
        self.event_rx.recv().await
    }

    /// Receives all currently queued events without blocking.
    pub fn drain_events(&mut self) -> Result<Vec<Event>, BridgeError> {
        let mut events = Vec::new();
        loop {
            match self.event_rx.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Empty) => return Ok(events),
                Err(TryRecvError::Disconnected) if !events.is_empty() => return Ok(events),
                Err(TryRecvError::Disconnected) => return Err(BridgeError::Disconnected),
            }
        }
    }

    /// Stops accepting requests, waits for the task and returns the editor
    /// with any events it emitted last.
    pub async fn shutdown(self) -> Result<(Editor, Vec<Event>), BridgeError> {
        let Self {
            request_tx,
            mut event_rx,
            task,
        } = self;
        drop(request_tx);
        let editor = task.await.map_err(|_| BridgeError::Disconnected)?;
        let mut events = Vec::new();
        while let Ok(event) = event_rx.try_recv() {
            events.push(event);
        }
        Ok((editor, events))
    }
}

/// Runs `editor` on its own task, talking to `backend` for load and submit.
///
/// Must be called from within a tokio runtime.
pub fn spawn_session<B>(editor: Editor, backend: Arc<B>) -> SessionHandle
where
    B: ProgramBackend + 'static,
{
    let (request_tx, request_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(run_session(editor, backend, request_rx, event_tx));
    SessionHandle {
        request_tx,
        event_rx,
        task,
    }
}

#[derive(Debug)]
enum Completion {
    Loaded(RequestTicket, Result<ProgramSnapshot, BackendError>),
    Submitted(RequestTicket, Result<(), BackendError>),
}

async fn run_session<B>(
    mut editor: Editor,
    backend: Arc<B>,
    mut requests: UnboundedReceiver<Request>,
    events: UnboundedSender<Event>,
) -> Editor
where
    B: ProgramBackend + 'static,
{
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<Completion>();

    loop {
        tokio::select! {
            request = requests.recv() => {
                let Some(request) = request else {
                    debug!(session_id = editor.session_id(), "session handle dropped");
                    break;
                };
                let emitted = handle_request(&mut editor, &backend, &done_tx, request);
                publish(&events, emitted);
            }
            Some(completion) = done_rx.recv() => {
                let emitted = match completion {
                    Completion::Loaded(ticket, outcome) => editor.finish_load(ticket, outcome),
                    Completion::Submitted(ticket, outcome) => editor.finish_submit(ticket, outcome),
                };
                publish(&events, emitted);
            }
        }

        if editor.is_closed() {
            break;
        }
    }

    editor
}

fn handle_request<B>(
    editor: &mut Editor,
    backend: &Arc<B>,
    done_tx: &UnboundedSender<Completion>,
    request: Request,
) -> Vec<Event>
where
    B: ProgramBackend + 'static,
{
    match request {
        Request::Load => match editor.begin_load() {
            Ok(ticket) => {
                let backend = Arc::clone(backend);
                let done_tx = done_tx.clone();
                let session_id = editor.session_id().to_string();
                tokio::spawn(async move {
                    let outcome = backend.load_program(&session_id).await;
                    if done_tx.send(Completion::Loaded(ticket, outcome)).is_err() {
                        debug!(session_id = %session_id, "load finished after session ended");
                    }
                });
                Vec::new()
            }
            Err(error) => vec![Event::Error(EditorErrorEvent::from_error(&error))],
        },
        Request::Command(command) => match editor.handle_command(command) {
            Ok(events) => events,
            Err(error) => vec![Event::Error(EditorErrorEvent::from_error(&error))],
        },
        Request::Submit => match editor.begin_submit() {
            Ok((ticket, submission)) => {
                let backend = Arc::clone(backend);
                let done_tx = done_tx.clone();
                let session_id = editor.session_id().to_string();
                tokio::spawn(async move {
                    let outcome = backend.apply_program(&session_id, &submission).await;
                    if done_tx.send(Completion::Submitted(ticket, outcome)).is_err() {
                        debug!(session_id = %session_id, "submit finished after session ended");
                    }
                });
                vec![Event::SubmitStarted, Event::ProgramChanged(editor.view())]
            }
            Err(error) => {
                warn!(%error, "submit rejected");
                vec![Event::Error(EditorErrorEvent::from_error(&error))]
            }
        },
        Request::Close => {
            editor.close();
            Vec::new()
        }
    }
}

fn publish(events: &UnboundedSender<Event>, emitted: Vec<Event>) {
    for event in emitted {
        if events.send(event).is_err() {
            debug!("event receiver dropped");
            return;
        }
    }
}
