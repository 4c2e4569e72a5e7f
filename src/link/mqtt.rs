//! MQTT channel backed by rumqttc.
//!
//! Each connect attempt builds a fresh client and polls its event loop until
//! the broker either confirms or refuses the session, so the session manager
//! sees connect as a single fallible call. Liveness is detected lazily: a
//! failed `poll` while connected reports the session as lost.

use std::time::Duration;

use rumqttc::{AsyncClient, ConnectReturnCode, Event, EventLoop, MqttOptions, Packet, QoS};
use tracing::debug;

use crate::bridge::{BridgeError, InboundMessage, MqttChannel};
use crate::config::BrokerSettings;

const REQUEST_CHANNEL_CAPACITY: usize = 100;

pub struct RumqttcChannel {
    host: String,
    port: u16,
    keep_alive: Duration,
    link: Option<(AsyncClient, EventLoop)>,
}

impl RumqttcChannel {
    pub fn new(settings: &BrokerSettings) -> Self {
        Self {
            host: settings.host.clone(),
            port: settings.port,
            keep_alive: Duration::from_secs(settings.keep_alive_secs),
            link: None,
        }
    }

    fn client(&self) -> Result<&AsyncClient, BridgeError> {
        self.link
            .as_ref()
            .map(|(client, _)| client)
            .ok_or_else(|| BridgeError::ConnectionLost("no active session".to_string()))
    }
}

#[async_trait::async_trait]
impl MqttChannel for RumqttcChannel {
    async fn connect(&mut self, client_id: &str) -> Result<(), BridgeError> {
        self.link = None;

        let mut options = MqttOptions::new(client_id, &self.host, self.port);
        options.set_keep_alive(self.keep_alive);

        let (client, mut event_loop) = AsyncClient::new(options, REQUEST_CHANNEL_CAPACITY);

        // Drive the new event loop until the broker answers the CONNECT.
        loop {
            match event_loop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                    if ack.code == ConnectReturnCode::Success {
                        self.link = Some((client, event_loop));
                        return Ok(());
                    }
                    return Err(BridgeError::Connect(format!(
                        "broker refused session: {:?}",
                        ack.code
                    )));
                }
                Ok(event) => {
                    debug!(?event, "Event before session confirmation");
                }
                Err(e) => return Err(BridgeError::Connect(e.to_string())),
            }
        }
    }

    async fn subscribe(&mut self, topic: &str) -> Result<(), BridgeError> {
        self.client()?
            .subscribe(topic, QoS::AtMostOnce)
            .await
            .map_err(|e| BridgeError::Subscribe(e.to_string()))
    }

    async fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), BridgeError> {
        self.client()?
            .publish(topic, QoS::AtMostOnce, false, payload.to_vec())
            .await
            .map_err(|e| BridgeError::Publish(e.to_string()))
    }

    async fn poll(&mut self) -> Result<Option<InboundMessage>, BridgeError> {
        let Some((_, event_loop)) = self.link.as_mut() else {
            return Err(BridgeError::ConnectionLost("no active session".to_string()));
        };

        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::Publish(publish))) => Ok(Some(InboundMessage {
                topic: publish.topic.clone(),
                payload: publish.payload.to_vec(),
            })),
            Ok(_) => Ok(None),
            Err(e) => {
                self.link = None;
                Err(BridgeError::ConnectionLost(e.to_string()))
            }
        }
    }
}
