//! Transports: straight into the reference server, or JSON over HTTP.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;
use tracing::debug;

use super::Transport;
use crate::app::App;
use crate::rpc_handler::handle_method;
use crate::types::errors::{RemoteError, StoreError};

/// Calls the reference server's handler in the same process.
#[derive(Clone)]
pub struct InProcessTransport {
    app: Arc<Mutex<App>>,
}

impl InProcessTransport {
    pub fn new(app: Arc<Mutex<App>>) -> Self {
        Self { app }
    }

    /// Fresh in-memory server with the default group provisioned.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Ok(Self::new(Arc::new(Mutex::new(App::open_in_memory()?))))
    }

    pub fn app(&self) -> &Arc<Mutex<App>> {
        &self.app
    }
}

#[async_trait(?Send)]
impl Transport for InProcessTransport {
    async fn call(&self, method: &str, params: Value) -> Result<Value, RemoteError> {
        handle_method(&self.app, method, &params).map_err(RemoteError::Server)
    }
}

/// POSTs `params` to `<base>/rpc/<method>` and unwraps a `{result}` / `{error}` envelope.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Result<Self, RemoteError> {
        let mut base_url = Url::parse(base_url)
            .map_err(|e| RemoteError::Network(format!("invalid base url '{}': {}", base_url, e)))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
        })
    }

    pub fn endpoint(&self, method: &str) -> Result<Url, RemoteError> {
        self.base_url
            .join(&format!("rpc/{}", method))
            .map_err(|e| RemoteError::Network(e.to_string()))
    }
}

#[async_trait(?Send)]
impl Transport for HttpTransport {
    async fn call(&self, method: &str, params: Value) -> Result<Value, RemoteError> {
        let url = self.endpoint(method)?;
        debug!(%url, "rpc request");

        let response = self
            .client
            .post(url)
            .json(&params)
            .send()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Server(format!("HTTP {}", status)));
        }

        let mut envelope: Value = response
            .json()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))?;

        if let Some(error) = envelope.get("error").filter(|e| !e.is_null()) {
            let message = error
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string());
            return Err(RemoteError::Server(message));
        }
        envelope
            .get_mut("result")
            .map(Value::take)
            .ok_or_else(|| RemoteError::Decode("response has no result".to_string()))
    }
}
