//! Live-reload broadcast hub.
//!
//! Browsers viewing the dev server open a WebSocket back to the hub (the
//! dev server injects a small script into every served HTML page). After
//! each rebuild the watch loop calls [`ReloadHub::broadcast`], which sends
//! a `reload` message to every connected page.

use crate::log;
use anyhow::{Context, Result};
use parking_lot::Mutex;
use std::{
    net::{IpAddr, TcpListener, TcpStream},
    sync::Arc,
    thread,
};
use tungstenite::{Message, WebSocket};

/// Message sent to browsers after every rebuild.
const RELOAD_MESSAGE: &str = "reload";

/// Accepts WebSocket connections on a background thread and broadcasts
/// reload signals to all of them.
#[derive(Clone)]
pub struct ReloadHub {
    peers: Arc<Mutex<Vec<WebSocket<TcpStream>>>>,
    port: u16,
}

impl ReloadHub {
    /// Bind the reload listener and spawn the accept thread.
    pub fn start(interface: IpAddr, port: u16) -> Result<Self> {
        let listener = TcpListener::bind((interface, port))
            .with_context(|| format!("Failed to bind reload socket on port {port}"))?;
        let port = listener.local_addr()?.port();
        let peers: Arc<Mutex<Vec<WebSocket<TcpStream>>>> = Arc::new(Mutex::new(Vec::new()));

        let accept_peers = Arc::clone(&peers);
        thread::spawn(move || {
            for stream in listener.incoming() {
                match stream {
                    Ok(stream) => match tungstenite::accept(stream) {
                        Ok(ws) => accept_peers.lock().push(ws),
                        Err(err) => log!("reload"; "handshake failed: {err}"),
                    },
                    Err(err) => log!("reload"; "connection failed: {err}"),
                }
            }
        });

        Ok(Self { peers, port })
    }

    /// Port the hub listens on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Send a reload signal to every connected browser.
    ///
    /// Peers whose socket has gone away are dropped from the list.
    pub fn broadcast(&self) {
        let mut peers = self.peers.lock();
        let before = peers.len();
        peers.retain_mut(|ws| ws.send(Message::text(RELOAD_MESSAGE)).is_ok());

        if before > 0 {
            log!("reload"; "notified {} client(s)", peers.len());
        }
    }

    #[cfg(test)]
    fn peer_count(&self) -> usize {
        self.peers.lock().len()
    }
}
