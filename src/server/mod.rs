//! Server mode: one independent orb session per telnet connection.

mod telnet;
mod writer;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use crossterm::cursor::{Hide, Show};
use crossterm::execute;
use crossterm::terminal::{Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::core::config::Config;
use crate::orb::{ColorProfile, Theme};
use crate::tui::{self, Event, Services, Session, SessionRunner, Viewport};

use telnet::{Decoder, HANDSHAKE, Input};
use writer::ChannelWriter;

/// How long a client has to report its window size.
const NEGOTIATION_TIMEOUT: Duration = Duration::from_secs(2);

const NO_SIZE_MESSAGE: &[u8] = b"No terminal size was negotiated. \
Connect with a telnet client that reports its window size (NAWS).\r\n";

const READ_BUFFER: usize = 1024;

/// How long a lone ESC waits for the rest of a key sequence.
const ESCAPE_TIMEOUT: Duration = Duration::from_millis(50);

/// Frames queued for a client before its session is ended for not reading.
const OUTPUT_QUEUE_FRAMES: usize = 64;

#[derive(Debug, Error)]
pub enum ServeError {
    #[error("failed to listen on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },
}

/// Bind the configured address and serve until the process is stopped.
pub async fn serve(config: Config, services: Services) -> Result<(), ServeError> {
    let listener = TcpListener::bind(&config.listen)
        .await
        .map_err(|source| ServeError::Bind {
            addr: config.listen.clone(),
            source,
        })?;
    let local = listener
        .local_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| config.listen.clone());
    log::info!("Listening on {local}, answers from {}", services.oracle.endpoint());
    println!("Pondering orb listening on {local} (telnet)");

    serve_on(listener, Arc::new(config), services).await;
    Ok(())
}

/// Accept connections forever, each in its own task.
async fn serve_on(listener: TcpListener, config: Arc<Config>, services: Services) {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                let config = Arc::clone(&config);
                let services = services.clone();
                tokio::spawn(handle_connection(stream, peer, config, services));
            }
            Err(e) => log::warn!("Failed to accept connection: {e}"),
        }
    }
}

async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    config: Arc<Config>,
    services: Services,
) {
    let id = Uuid::new_v4();
    log::info!("[{id}] connection from {peer}");
    match run_connection(stream, &config, services).await {
        Ok(()) => log::info!("[{id}] session closed"),
        Err(e) => log::warn!("[{id}] session ended: {e}"),
    }
}

async fn run_connection(stream: TcpStream, config: &Config, services: Services) -> io::Result<()> {
    stream.set_nodelay(true).ok();
    let (mut reader, mut writer) = stream.into_split();
    writer.write_all(&HANDSHAKE).await?;

    let mut decoder = Decoder::default();
    let negotiated = tokio::time::timeout(
        NEGOTIATION_TIMEOUT,
        negotiate_size(&mut reader, &mut writer, &mut decoder),
    )
    .await;
    let viewport = match negotiated {
        Ok(Ok(Some(viewport))) => viewport,
        Ok(Ok(None)) | Err(_) => {
            writer.write_all(NO_SIZE_MESSAGE).await?;
            writer.shutdown().await?;
            return Err(io::Error::other("no terminal size negotiated"));
        }
        Ok(Err(e)) => return Err(e),
    };

    // remote terminals are assumed to take 24-bit color unless configured otherwise
    let profile = config.color.unwrap_or(ColorProfile::TrueColor);
    let session = Session::new(viewport, tui::pick_start_frame(config), Theme::new(profile));

    let (out_tx, out_rx) = mpsc::channel(OUTPUT_QUEUE_FRAMES);
    let mut screen = ChannelWriter::new(out_tx.clone());
    execute!(screen, EnterAlternateScreen, Hide, Clear(ClearType::All))?;

    let runner = SessionRunner::new(ChannelWriter::new(out_tx.clone()), session, services)?;
    let cancel = runner.cancel_token();
    let write_task = tokio::spawn(write_output(writer, out_rx, cancel.clone()));
    let read_task = tokio::spawn(read_input(
        reader,
        decoder,
        runner.sender(),
        out_tx,
        cancel,
    ));

    let result = runner.run().await;
    read_task.abort();
    // best effort: the connection may already be gone
    let _ = execute!(screen, LeaveAlternateScreen, Show);
    drop(screen);
    let _ = write_task.await;
    result
}

/// Read until the client reports its size. `None` when it refuses or disconnects.
async fn negotiate_size(
    reader: &mut OwnedReadHalf,
    writer: &mut OwnedWriteHalf,
    decoder: &mut Decoder,
) -> io::Result<Option<Viewport>> {
    let mut buf = [0u8; READ_BUFFER];
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            return Ok(None);
        }
        for input in decoder.feed(&buf[..n]) {
            match input {
                Input::Resize(width, height) => return Ok(Some(Viewport::new(width, height))),
                Input::SizeRefused => return Ok(None),
                Input::Reply(reply) => writer.write_all(&reply).await?,
                // typed before the session exists
                Input::Key(_) => {}
            }
        }
    }
}

/// Forward client bytes into the session as events. Cancels the session on disconnect.
async fn read_input(
    mut reader: OwnedReadHalf,
    mut decoder: Decoder,
    events: mpsc::Sender<Event>,
    replies: mpsc::Sender<Vec<u8>>,
    cancel: CancellationToken,
) {
    let mut buf = [0u8; READ_BUFFER];
    loop {
        let read = tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(ESCAPE_TIMEOUT), if decoder.escape_pending() => {
                if let Some(key) = decoder.flush_escape() {
                    if events.send(Event::Key(key)).await.is_err() {
                        return;
                    }
                }
                continue;
            }
            read = reader.read(&mut buf) => read,
        };
        let n = match read {
            Ok(0) => {
                log::debug!("client closed the connection");
                cancel.cancel();
                break;
            }
            Ok(n) => n,
            Err(e) => {
                log::debug!("read failed: {e}");
                cancel.cancel();
                break;
            }
        };
        for input in decoder.feed(&buf[..n]) {
            let event = match input {
                Input::Key(key) => Event::Key(key),
                Input::Resize(width, height) => Event::Resize(Viewport::new(width, height)),
                Input::Reply(reply) => {
                    let _ = replies.try_send(reply.to_vec());
                    continue;
                }
                Input::SizeRefused => continue,
            };
            if events.send(event).await.is_err() {
                return;
            }
        }
    }
}

/// Write frames to the socket until every sender is gone. A failed write ends the session.
async fn write_output(
    mut writer: OwnedWriteHalf,
    mut frames: mpsc::Receiver<Vec<u8>>,
    cancel: CancellationToken,
) {
    while let Some(frame) = frames.recv().await {
        if let Err(e) = writer.write_all(&frame).await {
            log::debug!("write failed: {e}");
            cancel.cancel();
            return;
        }
    }
    let _ = writer.shutdown().await;
}
