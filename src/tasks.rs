//! Work that runs after a response has been produced.
//!
//! Handlers push mail onto a per-request [`DeferredTasks`] list. Once the
//! handler returned a successful response, [`run_deferred_tasks`] moves the
//! list onto the process-wide [`TaskQueue`], and the [`MailWorker`] sends
//! them in enqueue order. Callers never see the outcome of a send.

use std::sync::{Arc, Mutex, PoisonError};

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::mailer::{MailMessage, Mailer};
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeferredTask {
    SendMail(MailMessage),
}

/// Tasks collected while a single request is handled.
#[derive(Debug, Clone, Default)]
pub struct DeferredTasks {
    tasks: Arc<Mutex<Vec<DeferredTask>>>,
}

impl DeferredTasks {
    pub fn send_mail(&self, message: MailMessage) {
        self.push(DeferredTask::SendMail(message));
    }

    pub fn push(&self, task: DeferredTask) {
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(task);
    }

    pub fn take(&self) -> Vec<DeferredTask> {
        std::mem::take(&mut *self.tasks.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn len(&self) -> usize {
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Sending half of the process-wide task queue.
#[derive(Debug, Clone)]
pub struct TaskQueue {
    sender: mpsc::UnboundedSender<DeferredTask>,
}

pub type TaskReceiver = mpsc::UnboundedReceiver<DeferredTask>;

impl TaskQueue {
    pub fn new() -> (Self, TaskReceiver) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    pub fn enqueue(&self, task: DeferredTask) {
        if self.sender.send(task).is_err() {
            warn!("task queue closed; dropping deferred task");
        }
    }
}

/// Middleware that gives each request its own [`DeferredTasks`] and flushes
/// them to the queue when the response is a success.
pub async fn run_deferred_tasks(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let tasks = DeferredTasks::default();
    request.extensions_mut().insert(tasks.clone());

    let response = next.run(request).await;

    let pending = tasks.take();
    if pending.is_empty() {
        return response;
    }

    if response.status().is_success() {
        debug!(count = pending.len(), "scheduling deferred tasks");
        for task in pending {
            state.tasks.enqueue(task);
        }
    } else {
        debug!(
            count = pending.len(),
            status = %response.status(),
            "discarding deferred tasks of failed request"
        );
    }

    response
}

pub struct MailWorker {
    receiver: TaskReceiver,
    mailer: Arc<dyn Mailer>,
}

impl MailWorker {
    pub fn new(receiver: TaskReceiver, mailer: Arc<dyn Mailer>) -> Self {
        Self { receiver, mailer }
    }

    /// Runs until every [`TaskQueue`] handle has been dropped.
    pub async fn run(mut self) {
        info!("mail worker started");
        while let Some(task) = self.receiver.recv().await {
            self.handle(task).await;
        }
        info!("mail worker stopped");
    }

    async fn handle(&self, task: DeferredTask) {
        match task {
            DeferredTask::SendMail(message) => {
                if !self.mailer.send_mail(&message).await {
                    warn!(
                        subject = %message.subject,
                        uid = ?message.uid,
                        "deferred mail was not delivered"
                    );
                }
            }
        }
    }
}
