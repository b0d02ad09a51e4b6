use std::sync::{Arc, Mutex};
use std::time::Duration;

use dagstart::TaskHandle;

/// Something a journaled task did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Started(String),
    Finished(String),
}

/// Shared log of task start/finish events, in the order they happened.
///
/// Tasks created through a journal record `Started(name)` on entry and
/// `Finished(name)` on exit, which lets tests check dependency ordering and
/// exactly-once execution.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    events: Arc<Mutex<Vec<Event>>>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    /// A task that only records itself.
    pub fn task(&self, name: &str) -> TaskHandle {
        self.task_with_delay(name, Duration::ZERO)
    }

    /// A task that blocks its thread for `delay` between start and finish.
    pub fn task_with_delay(&self, name: &str, delay: Duration) -> TaskHandle {
        let events = Arc::clone(&self.events);
        let label = name.to_string();
        TaskHandle::new(name, move || {
            events.lock().unwrap().push(Event::Started(label.clone()));
            if !delay.is_zero() {
                std::thread::sleep(delay);
            }
            events.lock().unwrap().push(Event::Finished(label.clone()));
        })
    }

    /// A task that records its start, then panics with `message`.
    pub fn failing_task(&self, name: &str, message: &'static str) -> TaskHandle {
        let events = Arc::clone(&self.events);
        let label = name.to_string();
        TaskHandle::new(name, move || {
            events.lock().unwrap().push(Event::Started(label.clone()));
            panic!("{message}");
        })
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn started(&self, name: &str) -> Option<usize> {
        self.position(&Event::Started(name.to_string()))
    }

    pub fn finished(&self, name: &str) -> Option<usize> {
        self.position(&Event::Finished(name.to_string()))
    }

    /// How many times `name` started.
    pub fn start_count(&self, name: &str) -> usize {
        let wanted = Event::Started(name.to_string());
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| **e == wanted)
            .count()
    }

    /// Names in the order they started.
    pub fn start_order(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                Event::Started(name) => Some(name.clone()),
                Event::Finished(_) => None,
            })
            .collect()
    }

    /// `true` if `dependency` finished before `dependent` started.
    pub fn finished_before_started(&self, dependency: &str, dependent: &str) -> bool {
        match (self.finished(dependency), self.started(dependent)) {
            (Some(done), Some(begun)) => done < begun,
            _ => false,
        }
    }

    fn position(&self, event: &Event) -> Option<usize> {
        self.events.lock().unwrap().iter().position(|e| e == event)
    }
}
