//! WebSocket-based live reload.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Messages sent to connected browsers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReloadMessage {
    /// The site was rebuilt; reload the page
    Reload,

    /// The rebuild failed; the previous output is still being served
    BuildFailed {
        /// Human-readable error
        message: String,
    },

    /// Connection established
    Connected,
}

impl ReloadMessage {
    /// Encode as the JSON text frame sent to clients.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Hub for broadcasting reload messages to all connected clients.
#[derive(Debug, Clone)]
pub struct ReloadHub {
    sender: broadcast::Sender<ReloadMessage>,
}

impl ReloadHub {
    /// Create a new reload hub.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(100);
        Self { sender }
    }

    /// Send a message to all connected clients.
    pub fn send(&self, msg: ReloadMessage) {
        // Ignore send errors (no receivers)
        let _ = self.sender.send(msg);
    }

    /// Subscribe to reload messages.
    pub fn subscribe(&self) -> broadcast::Receiver<ReloadMessage> {
        self.sender.subscribe()
    }

    /// Get the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ReloadHub {
    fn default() -> Self {
        Self::new()
    }
}

/// Client-side live reload script, served at `/__livereload.js`.
///
/// Connects back to whatever host served the page, so it works behind any
/// bind address or port.
pub fn client_script(ws_path: &str) -> String {
    format!(
        r#"
(function() {{
  'use strict';

  const protocol = location.protocol === 'https:' ? 'wss:' : 'ws:';
  const url = protocol + '//' + location.host + '{ws_path}';
  let reconnectAttempts = 0;
  const maxReconnectAttempts = 10;

  function showError(message) {{
    let overlay = document.getElementById('folio-build-error');
    if (!overlay) {{
      overlay = document.createElement('pre');
      overlay.id = 'folio-build-error';
      overlay.style.cssText = 'position:fixed;inset:auto 1rem 1rem 1rem;z-index:9999;' +
        'margin:0;padding:1rem;background:#2b0d0d;color:#ffd7d7;border-radius:0.5rem;' +
        'white-space:pre-wrap;font:13px/1.5 ui-monospace,monospace;';
      document.body.appendChild(overlay);
    }}
    overlay.textContent = 'Build failed\n\n' + message;
  }}

  function connect() {{
    const ws = new WebSocket(url);

    ws.onopen = function() {{
      console.log('[folio] Live reload connected');
      reconnectAttempts = 0;
    }};

    ws.onmessage = function(event) {{
      const msg = JSON.parse(event.data);

      switch (msg.type) {{
        case 'reload':
          location.reload();
          break;

        case 'build_failed':
          console.error('[folio] Build failed:', msg.message);
          showError(msg.message);
          break;

        case 'connected':
          break;
      }}
    }};

    ws.onclose = function() {{
      if (reconnectAttempts < maxReconnectAttempts) {{
        reconnectAttempts++;
        setTimeout(connect, 1000 * reconnectAttempts);
      }}
    }};
  }}

  connect();
}})();
"#
    )
}
