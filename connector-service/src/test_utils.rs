//! Shared fakes and helpers for unit tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use tokio::task::JoinHandle;

use crate::relay::{InboundMessage, MessageRelay, RelayError};
use crate::store::SqliteConnectorStore;
use crate::telegram::{SentMessage, TelegramApi, TelegramError};
use crate::{AppState, Config};

pub const TEST_API_KEY: &str = "fake-api-key";
pub const TEST_BOT_TOKEN: &str = "123456:ABC-DEF";

/// A running axum server bound to an ephemeral local port.
pub struct TestServer {
    pub url: String,
    handle: JoinHandle<()>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub async fn spawn_test_server(router: Router) -> TestServer {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test server");
    let addr = listener.local_addr().expect("Failed to get local addr");

    let handle = tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("Test server failed");
    });

    TestServer {
        url: format!("http://{addr}"),
        handle,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetWebhookCall {
    pub bot_token: String,
    pub url: String,
    pub secret_token: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SendMessageCall {
    pub bot_token: String,
    pub chat_id: i64,
    pub text: String,
}

/// Records every Bot API call and answers from canned results.
#[derive(Default)]
pub struct FakeTelegram {
    pub webhooks: Mutex<Vec<SetWebhookCall>>,
    pub sends: Mutex<Vec<SendMessageCall>>,
    /// When set, `setWebhook` fails with this description
    pub reject_webhook: Option<String>,
    /// When set, `sendMessage` fails with this description
    pub reject_send: Option<String>,
}

impl FakeTelegram {
    pub fn rejecting_webhook(description: &str) -> Self {
        Self {
            reject_webhook: Some(description.to_string()),
            ..Default::default()
        }
    }

    pub fn rejecting_send(description: &str) -> Self {
        Self {
            reject_send: Some(description.to_string()),
            ..Default::default()
        }
    }

    pub fn webhook_calls(&self) -> Vec<SetWebhookCall> {
        self.webhooks.lock().unwrap().clone()
    }

    pub fn send_calls(&self) -> Vec<SendMessageCall> {
        self.sends.lock().unwrap().clone()
    }
}

#[async_trait]
impl TelegramApi for FakeTelegram {
    async fn set_webhook(
        &self,
        bot_token: &str,
        url: &str,
        secret_token: &str,
    ) -> Result<(), TelegramError> {
        self.webhooks.lock().unwrap().push(SetWebhookCall {
            bot_token: bot_token.to_string(),
            url: url.to_string(),
            secret_token: secret_token.to_string(),
        });
        match &self.reject_webhook {
            Some(description) => Err(TelegramError::Rejected(description.clone())),
            None => Ok(()),
        }
    }

    async fn send_message(
        &self,
        bot_token: &str,
        chat_id: i64,
        text: &str,
    ) -> Result<SentMessage, TelegramError> {
        let mut sends = self.sends.lock().unwrap();
        sends.push(SendMessageCall {
            bot_token: bot_token.to_string(),
            chat_id,
            text: text.to_string(),
        });
        match &self.reject_send {
            Some(description) => Err(TelegramError::Rejected(description.clone())),
            None => Ok(SentMessage {
                message_id: 1000 + sends.len() as i64,
            }),
        }
    }
}

/// Captures relayed messages; optionally fails every call.
#[derive(Default)]
pub struct RecordingRelay {
    pub messages: Mutex<Vec<InboundMessage>>,
    pub fail: bool,
}

impl RecordingRelay {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn relayed(&self) -> Vec<InboundMessage> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageRelay for RecordingRelay {
    async fn relay(&self, message: &InboundMessage) -> Result<(), RelayError> {
        self.messages.lock().unwrap().push(message.clone());
        if self.fail {
            return Err(RelayError::Status {
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        Ok(())
    }
}

/// Application state wired to an in-memory store and the given fakes.
pub struct TestContext {
    pub state: AppState,
    pub telegram: Arc<FakeTelegram>,
    pub relay: Arc<RecordingRelay>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with(FakeTelegram::default(), RecordingRelay::default())
    }

    pub fn with(telegram: FakeTelegram, relay: RecordingRelay) -> Self {
        let telegram = Arc::new(telegram);
        let relay = Arc::new(relay);
        let store = SqliteConnectorStore::open_in_memory().expect("in-memory store");
        let state = AppState::new(
            Config::for_tests(),
            Arc::new(store),
            telegram.clone(),
            relay.clone(),
        );
        Self {
            state,
            telegram,
            relay,
        }
    }
}
