//! Shared test fixtures: a one-route HTTP responder, a scripted media
//! element and a recording link opener.

#![allow(dead_code)]

use std::sync::Mutex;

use kirtan::adapters::{DownloadError, LinkOpener};
use kirtan::playback::{MediaElement, PlaybackError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Serve `body` with `status` to every request. Returns the base URL.
pub async fn serve(status: u16, body: impl Into<Vec<u8>>) -> String {
    let body = body.into();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let body = body.clone();
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;

                let head = format!(
                    "HTTP/1.1 {} OK\r\nContent-Length: {}\r\nContent-Type: application/json\r\nConnection: close\r\n\r\n",
                    status,
                    body.len()
                );
                let _ = socket.write_all(head.as_bytes()).await;
                let _ = socket.write_all(&body).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    format!("http://{}", addr)
}

/// Media element whose clock and behaviour the test sets directly
#[derive(Debug, Default)]
pub struct ScriptedElement {
    pub time: f64,
    pub duration: f64,
    pub volume: f64,
    pub playing: bool,
    pub refuse_play: bool,
}

impl ScriptedElement {
    pub fn with_duration(duration: f64) -> Self {
        Self {
            duration,
            ..Default::default()
        }
    }
}

impl MediaElement for ScriptedElement {
    fn current_time(&self) -> f64 {
        self.time
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.time = seconds;
    }

    fn set_volume(&mut self, volume: f64) {
        self.volume = volume;
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        if self.refuse_play {
            return Err(PlaybackError::PlayRejected(
                "play() can only be initiated by a user gesture".to_string(),
            ));
        }
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.playing = false;
    }
}

/// Link opener that records what it was asked to open
#[derive(Default)]
pub struct RecordingOpener {
    pub opened: Mutex<Vec<String>>,
}

impl LinkOpener for RecordingOpener {
    fn open(&self, url: &str) -> Result<(), DownloadError> {
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }
}
