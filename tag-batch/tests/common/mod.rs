#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tag_batch::{AttemptOutcome, CharacterField, Rating, TagPayload, TagSource, TransportFailure};

/// In-memory source replaying a fixed sequence of outcomes per identifier.
/// Once a script runs out, its last outcome repeats.
pub struct ScriptedSource {
    scripts: HashMap<String, Vec<AttemptOutcome>>,
    latencies: HashMap<String, Duration>,
    calls: Mutex<HashMap<String, u32>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self {
            scripts: HashMap::new(),
            latencies: HashMap::new(),
            calls: Mutex::new(HashMap::new()),
        }
    }

    pub fn script(mut self, id: &str, outcomes: Vec<AttemptOutcome>) -> Self {
        self.scripts.insert(id.to_string(), outcomes);
        self
    }

    pub fn latency(mut self, id: &str, latency: Duration) -> Self {
        self.latencies.insert(id.to_string(), latency);
        self
    }

    pub fn calls(&self, id: &str) -> u32 {
        self.calls.lock().unwrap().get(id).copied().unwrap_or(0)
    }
}

#[async_trait]
impl TagSource for ScriptedSource {
    fn source_name(&self) -> String {
        "scripted".to_string()
    }

    async fn lookup(&self, id: &str) -> AttemptOutcome {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            let count = calls.entry(id.to_string()).or_insert(0);
            *count += 1;
            *count
        };

        if let Some(latency) = self.latencies.get(id) {
            tokio::time::sleep(*latency).await;
        }

        match self.scripts.get(id) {
            Some(script) if !script.is_empty() => {
                let index = (call as usize - 1).min(script.len() - 1);
                script[index].clone()
            }
            _ => status(404),
        }
    }
}

pub fn payload(id: &str, general: &[(&str, f64)], rating: Rating) -> TagPayload {
    TagPayload {
        id: id.to_string(),
        general: general.iter().map(|(label, score)| (label.to_string(), *score)).collect(),
        character: CharacterField::Scored(vec![("original".to_string(), 0.8)]),
        rating,
        image: Some("aGVsbG8=".to_string()),
    }
}

pub fn ready(id: &str, general: &[(&str, f64)]) -> AttemptOutcome {
    AttemptOutcome::Ready(payload(id, general, Rating::Safe))
}

pub fn processing() -> AttemptOutcome {
    AttemptOutcome::Failure(TransportFailure::Processing)
}

pub fn status(code: u16) -> AttemptOutcome {
    AttemptOutcome::Failure(TransportFailure::Status { code, message: None })
}

pub fn status_with_message(code: u16, message: &str) -> AttemptOutcome {
    AttemptOutcome::Failure(TransportFailure::Status {
        code,
        message: Some(message.to_string()),
    })
}

pub fn network() -> AttemptOutcome {
    AttemptOutcome::Failure(TransportFailure::Network {
        detail: "connection reset".to_string(),
    })
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}
