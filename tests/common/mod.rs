//! Fake channels for driving the bridge and session manager in tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use aquabridge::bridge::{BridgeError, InboundMessage, MqttChannel, SerialChannel};
use tokio::sync::mpsc;

/// Serial channel fed by the test and recording everything written to it.
pub struct FakeSerial {
    incoming: mpsc::Receiver<String>,
    written: Arc<Mutex<Vec<String>>>,
}

pub struct FakeSerialHandle {
    pub line_tx: mpsc::Sender<String>,
    pub written: Arc<Mutex<Vec<String>>>,
}

impl FakeSerial {
    pub fn new() -> (Self, FakeSerialHandle) {
        let (line_tx, incoming) = mpsc::channel(16);
        let written = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                incoming,
                written: written.clone(),
            },
            FakeSerialHandle { line_tx, written },
        )
    }
}

#[async_trait::async_trait]
impl SerialChannel for FakeSerial {
    async fn next_line(&mut self) -> Result<String, BridgeError> {
        match self.incoming.recv().await {
            Some(line) => Ok(line),
            // Sender dropped: behave like a dead port only if the test asked
            // for it by closing the channel.
            None => Err(BridgeError::SerialClosed("test channel closed".into())),
        }
    }

    async fn write_line(&mut self, line: &str) -> Result<(), BridgeError> {
        self.written.lock().unwrap().push(line.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct MqttCalls {
    pub connects: Vec<String>,
    pub subscribes: Vec<String>,
    pub publishes: Vec<(String, Vec<u8>)>,
}

/// Scripted MQTT channel. Connect and subscribe results are popped from
/// queues (empty queue means success); poll results are fed by the test and
/// the channel pends while there is nothing to deliver.
pub struct FakeMqtt {
    calls: Arc<Mutex<MqttCalls>>,
    connect_results: Arc<Mutex<VecDeque<Result<(), BridgeError>>>>,
    subscribe_results: Arc<Mutex<VecDeque<Result<(), BridgeError>>>>,
    events: mpsc::Receiver<Result<Option<InboundMessage>, BridgeError>>,
}

pub struct FakeMqttHandle {
    pub calls: Arc<Mutex<MqttCalls>>,
    pub connect_results: Arc<Mutex<VecDeque<Result<(), BridgeError>>>>,
    pub subscribe_results: Arc<Mutex<VecDeque<Result<(), BridgeError>>>>,
    pub event_tx: mpsc::Sender<Result<Option<InboundMessage>, BridgeError>>,
}

impl FakeMqtt {
    pub fn new() -> (Self, FakeMqttHandle) {
        let calls = Arc::new(Mutex::new(MqttCalls::default()));
        let connect_results = Arc::new(Mutex::new(VecDeque::new()));
        let subscribe_results = Arc::new(Mutex::new(VecDeque::new()));
        let (event_tx, events) = mpsc::channel(16);
        (
            Self {
                calls: calls.clone(),
                connect_results: connect_results.clone(),
                subscribe_results: subscribe_results.clone(),
                events,
            },
            FakeMqttHandle {
                calls,
                connect_results,
                subscribe_results,
                event_tx,
            },
        )
    }
}

#[async_trait::async_trait]
impl MqttChannel for FakeMqtt {
    async fn connect(&mut self, client_id: &str) -> Result<(), BridgeError> {
        self.calls.lock().unwrap().connects.push(client_id.to_string());
        self.connect_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(()))
    }

    async fn subscribe(&mut self, topic: &str) -> Result<(), BridgeError> {
        self.calls.lock().unwrap().subscribes.push(topic.to_string());
        self.subscribe_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(()))
    }

    async fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), BridgeError> {
        self.calls
            .lock()
            .unwrap()
            .publishes
            .push((topic.to_string(), payload.to_vec()));
        Ok(())
    }

    async fn poll(&mut self) -> Result<Option<InboundMessage>, BridgeError> {
        match self.events.recv().await {
            Some(result) => result,
            // Nothing scripted and the sender is gone: stay quiet instead of
            // reporting a lost connection the test never asked for.
            None => std::future::pending().await,
        }
    }
}
