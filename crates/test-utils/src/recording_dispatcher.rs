use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

use dagstart::errors::TaskFailure;
use dagstart::exec::context::panic_message;
use dagstart::exec::{DispatchFuture, Dispatcher};
use dagstart::TaskHandle;

/// A fake execution context that:
/// - records the name of every task dispatched to it
/// - runs the task inline on the calling unit, turning panics into failures.
#[derive(Debug, Clone)]
pub struct RecordingDispatcher {
    name: String,
    dispatched: Arc<Mutex<Vec<String>>>,
}

impl RecordingDispatcher {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            dispatched: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn dispatched(&self) -> Vec<String> {
        self.dispatched.lock().unwrap().clone()
    }
}

impl Dispatcher for RecordingDispatcher {
    fn name(&self) -> &str {
        &self.name
    }

    fn dispatch(&self, task: TaskHandle) -> DispatchFuture {
        let dispatched = Arc::clone(&self.dispatched);

        Box::pin(async move {
            {
                let mut guard = dispatched.lock().unwrap();
                guard.push(task.name().to_string());
            }

            panic::catch_unwind(AssertUnwindSafe(|| task.run())).map_err(|payload| {
                TaskFailure::Panicked {
                    task: task.name().to_string(),
                    message: panic_message(payload),
                }
            })
        })
    }
}
