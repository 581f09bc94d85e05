//! Background thread for payload decoding.
//!
//! Turning a payload into a bitmap is the only slow step of showing an image.
//! [`DecodeWorker`] runs it on a named thread; the widget polls results on
//! its own thread and hands them to the display, which applies only the
//! result carrying the latest [`LoadToken`].

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use image::RgbaImage;

use crate::constants::DECODER_THREAD_NAME;
use crate::convert::{ConvertError, buffer_to_rgba};
use crate::payload::{ImageBuffer, ImagePayload};

/// Generation counter of image loads. Strictly increasing per display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct LoadToken(pub u64);

impl LoadToken {
    pub fn next(self) -> Self {
        LoadToken(self.0 + 1)
    }
}

/// Request to decode a payload.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeRequest {
    pub token: LoadToken,
    pub payload: ImagePayload,
}

/// Successfully decoded image.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    /// Displayable bitmap
    pub bitmap: RgbaImage,
    /// Raw pixels for value lookup
    pub buffer: Arc<ImageBuffer>,
}

/// Result of a decode request.
#[derive(Debug)]
pub struct DecodeResult {
    pub token: LoadToken,
    pub outcome: Result<DecodedImage, ConvertError>,
}

/// Decode a payload into bitmap and raw buffer.
pub fn decode_payload(payload: &ImagePayload) -> Result<DecodedImage, ConvertError> {
    let buffer = ImageBuffer::from_payload(payload)?;
    let bitmap = buffer_to_rgba(&buffer)?;
    Ok(DecodedImage {
        bitmap,
        buffer: Arc::new(buffer),
    })
}

impl DecodeRequest {
    /// Run the request on the current thread.
    pub fn run(&self) -> DecodeResult {
        DecodeResult {
            token: self.token,
            outcome: decode_payload(&self.payload),
        }
    }
}

/// Message sent to the decoder thread.
enum ThreadMessage {
    /// Decode a payload
    Decode(DecodeRequest),
    /// Shutdown the thread
    Shutdown,
}

/// Manages a background thread for payload decoding.
#[derive(Debug)]
pub struct DecodeWorker {
    /// Sender for requests to the background thread
    request_tx: Sender<ThreadMessage>,
    /// Receiver for results from the background thread
    result_rx: Receiver<DecodeResult>,
    /// Handle to the background thread (for joining on drop)
    thread_handle: Option<JoinHandle<()>>,
    /// Requests sent but not yet received back
    pending: usize,
}

impl DecodeWorker {
    /// Spawn a new decoder thread.
    pub fn spawn() -> std::io::Result<Self> {
        let (request_tx, request_rx) = mpsc::channel::<ThreadMessage>();
        let (result_tx, result_rx) = mpsc::channel::<DecodeResult>();

        let thread_handle = thread::Builder::new()
            .name(DECODER_THREAD_NAME.to_string())
            .spawn(move || {
                log::debug!("Decoder thread started");
                Self::thread_loop(request_rx, result_tx);
                log::debug!("Decoder thread exiting");
            })?;

        Ok(Self {
            request_tx,
            result_rx,
            thread_handle: Some(thread_handle),
            pending: 0,
        })
    }

    /// Background thread main loop.
    fn thread_loop(request_rx: Receiver<ThreadMessage>, result_tx: Sender<DecodeResult>) {
        loop {
            match request_rx.recv() {
                Ok(ThreadMessage::Decode(request)) => {
                    log::debug!(
                        "Decoding load {} ({}x{})",
                        request.token.0,
                        request.payload.image_info.width,
                        request.payload.image_info.height
                    );
                    if result_tx.send(request.run()).is_err() {
                        log::warn!("Result channel closed, decoder thread exiting");
                        break;
                    }
                }
                Ok(ThreadMessage::Shutdown) => {
                    log::debug!("Received shutdown signal");
                    break;
                }
                Err(_) => {
                    log::debug!("Request channel closed, decoder thread exiting");
                    break;
                }
            }
        }
    }

    /// Queue a request. Returns the request back if the thread is gone so
    /// the caller can decode it inline.
    pub fn submit(&mut self, request: DecodeRequest) -> Result<(), DecodeRequest> {
        match self.request_tx.send(ThreadMessage::Decode(request)) {
            Ok(()) => {
                self.pending += 1;
                Ok(())
            }
            Err(mpsc::SendError(message)) => {
                log::error!("Failed to send decode request: channel closed");
                match message {
                    ThreadMessage::Decode(request) => Err(request),
                    ThreadMessage::Shutdown => Ok(()),
                }
            }
        }
    }

    /// Take one completed result without blocking.
    pub fn try_recv(&mut self) -> Option<DecodeResult> {
        match self.result_rx.try_recv() {
            Ok(result) => {
                self.pending = self.pending.saturating_sub(1);
                Some(result)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                log::warn!("Decoder thread disconnected");
                None
            }
        }
    }

    /// Wait up to `timeout` for one result.
    pub fn recv_timeout(&mut self, timeout: Duration) -> Option<DecodeResult> {
        match self.result_rx.recv_timeout(timeout) {
            Ok(result) => {
                self.pending = self.pending.saturating_sub(1);
                Some(result)
            }
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                log::warn!("Decoder thread disconnected");
                None
            }
        }
    }

    /// Get the number of pending requests.
    pub fn pending_count(&self) -> usize {
        self.pending
    }
}

impl Drop for DecodeWorker {
    fn drop(&mut self) {
        log::debug!("Shutting down decoder thread");

        let _ = self.request_tx.send(ThreadMessage::Shutdown);

        if let Some(handle) = self.thread_handle.take() {
            if let Err(e) = handle.join() {
                log::warn!("Decoder thread panicked: {:?}", e);
            }
        }
    }
}
