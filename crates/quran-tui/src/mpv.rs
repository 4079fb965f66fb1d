//! mpv IPC driver with separated reader/writer tasks, exposed to the player
//! as a [`PlaybackSink`].
//!
//! Architecture:
//!
//! ```text
//!   MpvDriver::spawn_and_connect()
//!         │
//!         ├── writer_task   ← receives PendingRequest via mpsc, serialises → socket
//!         └── reader_task   ← reads JSON lines from socket
//!                                ├── response (has request_id) → matched oneshot::Sender
//!                                └── event                     → broadcast channel
//! ```
//!
//! Events go out on a broadcast channel so that a pending `load` can wait
//! for `file-loaded` while `PlayerCore` independently watches for the
//! end-of-file that drives auto-advance.
//!
//! Platform notes:
//! - Unix:   Unix domain sockets
//! - Windows: Named pipes  \\.\pipe\<name>
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use quran_core::prober::{LoadedMedia, PlaybackSink};
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::{broadcast, mpsc, oneshot, Mutex};
use tracing::{debug, info, warn};

#[cfg(unix)]
use tokio::net::UnixStream;

#[cfg(windows)]
use tokio::net::windows::named_pipe::ClientOptions;

static NEXT_REQ_ID: AtomicU64 = AtomicU64::new(1);

type PendingMap = Arc<Mutex<HashMap<u64, oneshot::Sender<anyhow::Result<Value>>>>>;

struct PendingRequest {
    req_id: u64,
    payload: String, // serialised JSON line (already has '\n')
    reply: oneshot::Sender<anyhow::Result<Value>>,
}

/// An mpv event that arrived unsolicited (no request_id).
#[derive(Debug, Clone)]
pub struct MpvEvent {
    pub raw: Value,
}

impl MpvEvent {
    /// Returns the event name, e.g. "end-file", "start-file", "file-loaded".
    pub fn event_name(&self) -> Option<&str> {
        self.raw.get("event")?.as_str()
    }

    /// `reason` of an `end-file` event: "eof", "stop", "error", ...
    pub fn end_reason(&self) -> Option<&str> {
        if self.event_name()? != "end-file" {
            return None;
        }
        self.raw.get("reason")?.as_str()
    }

    /// True when the current file played to its end.
    pub fn is_eof(&self) -> bool {
        self.end_reason() == Some("eof")
    }

    pub fn file_error(&self) -> Option<&str> {
        self.raw.get("file_error")?.as_str()
    }
}

// ── public handle ─────────────────────────────────────────────────────────────

/// Cloneable handle to the mpv writer task.
#[derive(Clone)]
pub struct MpvHandle {
    tx: mpsc::Sender<PendingRequest>,
}

impl MpvHandle {
    pub async fn send(&self, command: Value) -> anyhow::Result<Value> {
        let req_id = NEXT_REQ_ID.fetch_add(1, Ordering::Relaxed);
        let msg = json!({ "command": command, "request_id": req_id });
        let mut raw = serde_json::to_string(&msg)?;
        raw.push('\n');

        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(PendingRequest {
                req_id,
                payload: raw,
                reply: reply_tx,
            })
            .await
            .map_err(|_| anyhow::anyhow!("mpv writer task gone"))?;

        tokio::time::timeout(tokio::time::Duration::from_secs(5), reply_rx)
            .await
            .map_err(|_| anyhow::anyhow!("mpv IPC timeout for req={}", req_id))?
            .map_err(|_| anyhow::anyhow!("mpv reply channel dropped req={}", req_id))?
    }

    pub async fn load_file(&self, url: &str) -> anyhow::Result<()> {
        debug!("mpv: loadfile {}", url);
        self.send(json!(["loadfile", url, "replace"])).await?;
        Ok(())
    }

    pub async fn stop(&self) -> anyhow::Result<()> {
        self.send(json!(["stop"])).await?;
        Ok(())
    }

    pub async fn set_pause(&self, paused: bool) -> anyhow::Result<()> {
        self.send(json!(["set_property", "pause", paused])).await?;
        Ok(())
    }

    /// Duration of the loaded file, if mpv knows it yet.
    pub async fn duration(&self) -> Option<f64> {
        match self.send(json!(["get_property", "duration"])).await {
            Ok(resp) => resp["data"].as_f64(),
            Err(e) => {
                debug!("mpv: duration unavailable: {}", e);
                None
            }
        }
    }
}

// ── driver ────────────────────────────────────────────────────────────────────

/// Owns the mpv child process.
pub struct MpvDriver {
    pub socket_name: String,
    process: Option<tokio::process::Child>,
}

impl MpvDriver {
    pub fn new() -> Self {
        Self {
            socket_name: quran_core::platform::mpv_socket_name(),
            process: None,
        }
    }

    pub fn process_alive(&mut self) -> bool {
        if let Some(ref mut child) = self.process {
            match child.try_wait() {
                Ok(None) => true,
                Ok(Some(status)) => {
                    if let Some(code) = status.code() {
                        warn!("mpv process exited with code: {}", code);
                    } else {
                        warn!("mpv process terminated by signal");
                    }
                    false
                }
                Err(e) => {
                    warn!("mpv process_alive check failed: {}", e);
                    false
                }
            }
        } else {
            false
        }
    }

    pub async fn kill(&mut self) {
        if let Some(mut p) = self.process.take() {
            let _ = p.kill().await;
        }
    }

    fn command(mpv_binary: &std::path::Path) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(mpv_binary);
        cmd.arg("--no-video")
            .arg("--idle=yes")
            .arg("--no-terminal")
            .arg(quran_core::platform::mpv_socket_arg())
            .stdout(std::process::Stdio::null())
            .kill_on_drop(true);
        cmd
    }

    #[cfg(unix)]
    pub async fn spawn_and_connect(
        &mut self,
        event_tx: broadcast::Sender<MpvEvent>,
    ) -> anyhow::Result<MpvHandle> {
        self.kill().await;

        let socket_path = std::path::PathBuf::from(&self.socket_name);
        let _ = tokio::fs::remove_file(&socket_path).await;

        info!("mpv: spawning new process");
        let mpv_binary = quran_core::platform::find_mpv_binary()
            .ok_or_else(|| anyhow::anyhow!("mpv binary not found"))?;

        let stderr_path = quran_core::platform::data_dir().join("mpv-stderr.log");
        let stderr_file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&stderr_path)?;

        let child = Self::command(&mpv_binary).stderr(stderr_file).spawn()?;
        info!("mpv: spawned process with pid {:?}", child.id());
        self.process = Some(child);

        // Wait for socket to appear
        for _ in 0..50 {
            tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
            if socket_path.exists() {
                break;
            }
        }
        if !socket_path.exists() {
            anyhow::bail!("mpv IPC socket did not appear");
        }

        let stream = UnixStream::connect(&socket_path).await?;
        info!("mpv: connected to IPC socket");
        let (read_half, write_half) = stream.into_split();
        Ok(start_io_tasks(BufReader::new(read_half), write_half, event_tx))
    }

    #[cfg(windows)]
    pub async fn spawn_and_connect(
        &mut self,
        event_tx: broadcast::Sender<MpvEvent>,
    ) -> anyhow::Result<MpvHandle> {
        self.kill().await;

        info!("mpv: spawning new process");
        let mpv_binary = quran_core::platform::find_mpv_binary()
            .ok_or_else(|| anyhow::anyhow!("mpv binary not found"))?;

        let child = Self::command(&mpv_binary)
            .stderr(std::process::Stdio::null())
            .spawn()?;
        self.process = Some(child);

        let pipe_path = format!(r"\\.\pipe\{}", self.socket_name);
        for _ in 0..50 {
            tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
            if let Ok(client) = ClientOptions::new().open(&pipe_path) {
                info!("mpv: connected to named pipe");
                let (read_half, write_half) = tokio::io::split(client);
                return Ok(start_io_tasks(BufReader::new(read_half), write_half, event_tx));
            }
        }
        anyhow::bail!("mpv named pipe did not appear")
    }
}

fn start_io_tasks<R, W>(
    reader: BufReader<R>,
    writer: W,
    event_tx: broadcast::Sender<MpvEvent>,
) -> MpvHandle
where
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
    W: tokio::io::AsyncWrite + Unpin + Send + 'static,
{
    // req_id → reply channel, shared between writer (inserts) and reader (resolves)
    let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
    let (cmd_tx, cmd_rx) = mpsc::channel::<PendingRequest>(64);

    tokio::spawn(writer_task(writer, cmd_rx, pending.clone()));
    tokio::spawn(reader_task(reader, pending, event_tx));

    MpvHandle { tx: cmd_tx }
}

// ── reader task ───────────────────────────────────────────────────────────────

async fn fail_pending(pending: &PendingMap, reason: &str) {
    let mut map = pending.lock().await;
    for (_, tx) in map.drain() {
        let _ = tx.send(Err(anyhow::anyhow!("{}", reason)));
    }
}

async fn reader_task<R>(mut reader: BufReader<R>, pending: PendingMap, event_tx: broadcast::Sender<MpvEvent>)
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => {
                debug!("mpv reader: connection closed");
                fail_pending(&pending, "mpv IPC connection closed").await;
                break;
            }
            Ok(_) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let val: Value = match serde_json::from_str(trimmed) {
                    Ok(v) => v,
                    Err(e) => {
                        debug!("mpv reader: invalid json '{}': {}", trimmed, e);
                        continue;
                    }
                };

                if let Some(req_id) = val.get("request_id").and_then(|v| v.as_u64()) {
                    let mut map = pending.lock().await;
                    if let Some(tx) = map.remove(&req_id) {
                        let result = if val["error"].as_str() == Some("success") {
                            Ok(val)
                        } else {
                            let err = val["error"].as_str().unwrap_or("unknown error").to_string();
                            debug!("mpv reader: response req={} err={}", req_id, err);
                            Err(anyhow::anyhow!("mpv error: {}", err))
                        };
                        let _ = tx.send(result);
                    }
                } else {
                    debug!("mpv reader: event {}", trimmed);
                    // no receivers is fine
                    let _ = event_tx.send(MpvEvent { raw: val });
                }
            }
            Err(e) => {
                warn!("mpv reader: read error: {}", e);
                fail_pending(&pending, "mpv IPC read error").await;
                break;
            }
        }
    }
}

// ── writer task ───────────────────────────────────────────────────────────────

async fn writer_task<W>(mut writer: W, mut rx: mpsc::Receiver<PendingRequest>, pending: PendingMap)
where
    W: tokio::io::AsyncWrite + Unpin,
{
    while let Some(req) = rx.recv().await {
        // Register reply channel before writing so reader can match it
        pending.lock().await.insert(req.req_id, req.reply);
        debug!("mpv writer: send req={} payload={}", req.req_id, req.payload.trim());
        if let Err(e) = writer.write_all(req.payload.as_bytes()).await {
            warn!("mpv writer: write error: {}", e);
            if let Some(tx) = pending.lock().await.remove(&req.req_id) {
                let _ = tx.send(Err(anyhow::anyhow!("mpv write error: {}", e)));
            }
            break;
        }
    }
    debug!("mpv writer: task exiting");
}

// ── playback sink ─────────────────────────────────────────────────────────────

/// mpv as the player's decoder. The process is spawned on first use and
/// respawned if it dies.
pub struct MpvSink {
    driver: MpvDriver,
    handle: Option<MpvHandle>,
    events: broadcast::Sender<MpvEvent>,
}

impl MpvSink {
    pub fn new(events: broadcast::Sender<MpvEvent>) -> Self {
        Self {
            driver: MpvDriver::new(),
            handle: None,
            events,
        }
    }

    async fn connected(&mut self) -> anyhow::Result<MpvHandle> {
        if let Some(handle) = &self.handle {
            if self.driver.process_alive() {
                return Ok(handle.clone());
            }
            warn!("mpv: process gone, respawning");
        }
        let handle = self.driver.spawn_and_connect(self.events.clone()).await?;
        self.handle = Some(handle.clone());
        Ok(handle)
    }
}

#[async_trait]
impl PlaybackSink for MpvSink {
    async fn load(&mut self, url: &str) -> anyhow::Result<LoadedMedia> {
        let mpv = self.connected().await?;
        // subscribe before loadfile so file-loaded cannot be missed
        let mut events = self.events.subscribe();
        mpv.set_pause(true).await?;
        mpv.load_file(url).await?;

        loop {
            let evt = match events.recv().await {
                Ok(evt) => evt,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("mpv: load lagged by {} events", n);
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => anyhow::bail!("mpv event channel closed"),
            };
            match evt.event_name() {
                Some("file-loaded") => break,
                Some("end-file") if evt.end_reason() == Some("error") => {
                    anyhow::bail!(
                        "mpv could not open {}: {}",
                        url,
                        evt.file_error().unwrap_or("unknown error")
                    );
                }
                _ => {}
            }
        }

        let duration_secs = mpv.duration().await;
        debug!("mpv: loaded {} (duration {:?})", url, duration_secs);
        Ok(LoadedMedia { duration_secs })
    }

    async fn play(&mut self) -> anyhow::Result<()> {
        self.connected().await?.set_pause(false).await
    }

    async fn stop(&mut self) -> anyhow::Result<()> {
        match &self.handle {
            Some(handle) => handle.stop().await,
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(raw: Value) -> MpvEvent {
        MpvEvent { raw }
    }

    #[test]
    fn end_file_reasons() {
        let eof = event(json!({"event": "end-file", "reason": "eof", "playlist_entry_id": 1}));
        assert!(eof.is_eof());

        let err = event(json!({"event": "end-file", "reason": "error", "file_error": "loading failed"}));
        assert_eq!(err.end_reason(), Some("error"));
        assert_eq!(err.file_error(), Some("loading failed"));
        assert!(!err.is_eof());

        let loaded = event(json!({"event": "file-loaded"}));
        assert_eq!(loaded.end_reason(), None);
        assert!(!loaded.is_eof());
    }

    #[tokio::test]
    async fn reader_routes_replies_and_events() {
        let (client, server) = tokio::io::duplex(4096);
        let (read_half, write_half) = tokio::io::split(client);
        let (event_tx, mut event_rx) = broadcast::channel(16);
        let handle = start_io_tasks(BufReader::new(read_half), write_half, event_tx);

        let reply = tokio::spawn(async move { handle.send(json!(["get_property", "duration"])).await });

        // read the request the writer produced and answer it
        let (server_read, mut server_write) = tokio::io::split(server);
        let mut server_reader = BufReader::new(server_read);
        let mut request = String::new();
        server_reader.read_line(&mut request).await.unwrap();
        let parsed: Value = serde_json::from_str(request.trim()).unwrap();
        let req_id = parsed["request_id"].as_u64().unwrap();
        assert_eq!(parsed["command"], json!(["get_property", "duration"]));

        let answer = format!(
            "{{\"event\":\"file-loaded\"}}\n{{\"data\":12.5,\"error\":\"success\",\"request_id\":{}}}\n",
            req_id
        );
        server_write.write_all(answer.as_bytes()).await.unwrap();

        let value = reply.await.unwrap().unwrap();
        assert_eq!(value["data"].as_f64(), Some(12.5));
        let evt = event_rx.recv().await.unwrap();
        assert_eq!(evt.event_name(), Some("file-loaded"));
    }
}
