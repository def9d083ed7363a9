use std::io::ErrorKind as IoErrorKind;
use std::net::{IpAddr, SocketAddr, TcpStream};
use std::time::{Duration, Instant};

use ledgerscope_protocol::TransportKind;
use tracing::{debug, trace};
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Connector, HandshakeError, Message, WebSocket};
use url::Url;

use crate::error::{ClientError, ClientResult};
use crate::transport::Transport;

type Socket = WebSocket<MaybeTlsStream<TcpStream>>;

/// One persistent WebSocket to the node.
///
/// The TCP stream carries read and write timeouts, so a silent node turns
/// into [`ClientError::Timeout`] rather than a hang. Control frames are
/// consumed transparently by `receive`.
pub struct StreamingTransport {
    url: Url,
    timeout: Duration,
    no_ssl_verify: bool,
    socket: Option<Socket>,
    remote_ip: Option<IpAddr>,
}

impl StreamingTransport {
    pub fn new(url: Url, timeout: Duration, no_ssl_verify: bool) -> Self {
        Self {
            url,
            timeout,
            no_ssl_verify,
            socket: None,
            remote_ip: None,
        }
    }

    fn tls_connector(&self) -> ClientResult<Option<Connector>> {
        if !self.no_ssl_verify || self.url.scheme() != "wss" {
            return Ok(None);
        }
        let connector = native_tls::TlsConnector::builder()
            .danger_accept_invalid_certs(true)
            .danger_accept_invalid_hostnames(true)
            .build()
            .map_err(|e| ClientError::Transport(format!("TLS setup: {e}")))?;
        Ok(Some(Connector::NativeTls(connector)))
    }

    fn open_stream(&self) -> ClientResult<TcpStream> {
        let addrs = self
            .url
            .socket_addrs(|| None)
            .map_err(|e| ClientError::Transport(format!("resolve {}: {e}", self.url)))?;
        let stream = connect_any(&addrs, self.timeout)?;
        stream.set_read_timeout(Some(self.timeout))?;
        stream.set_write_timeout(Some(self.timeout))?;
        stream.set_nodelay(true)?;
        Ok(stream)
    }
}

fn connect_any(addrs: &[SocketAddr], timeout: Duration) -> ClientResult<TcpStream> {
    let mut last = None;
    for addr in addrs {
        match TcpStream::connect_timeout(addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => {
                trace!(%addr, error = %e, "connect attempt failed");
                last = Some(e);
            }
        }
    }
    Err(match last {
        Some(e) if is_timeout(e.kind()) => ClientError::Timeout(timeout),
        Some(e) => ClientError::Transport(e.to_string()),
        None => ClientError::Transport("host resolved to no addresses".into()),
    })
}

/// Bound the next socket read. The OS rejects a zero read timeout, so the
/// floor is one millisecond.
fn set_read_timeout(socket: &mut Socket, wait: Duration) -> ClientResult<()> {
    let wait = Some(wait.max(Duration::from_millis(1)));
    match socket.get_mut() {
        MaybeTlsStream::Plain(stream) => stream.set_read_timeout(wait)?,
        MaybeTlsStream::NativeTls(stream) => stream.get_mut().set_read_timeout(wait)?,
        _ => {}
    }
    Ok(())
}

fn is_timeout(kind: IoErrorKind) -> bool {
    matches!(kind, IoErrorKind::WouldBlock | IoErrorKind::TimedOut)
}

fn map_ws_error(err: tungstenite::Error, timeout: Duration) -> ClientError {
    match err {
        tungstenite::Error::Io(e) if is_timeout(e.kind()) => ClientError::Timeout(timeout),
        tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => {
            ClientError::Transport("connection closed".into())
        }
        other => ClientError::Transport(other.to_string()),
    }
}

impl Transport for StreamingTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Streaming
    }

    fn connect(&mut self) -> ClientResult<Option<IpAddr>> {
        self.close()?;
        let stream = self.open_stream()?;
        let peer = stream.peer_addr().ok().map(|a| a.ip());
        let connector = self.tls_connector()?;

        let (socket, _response) =
            tungstenite::client_tls_with_config(self.url.as_str(), stream, None, connector).map_err(
                |e| match e {
                    HandshakeError::Interrupted(_) => ClientError::Timeout(self.timeout),
                    HandshakeError::Failure(e) => map_ws_error(e, self.timeout),
                },
            )?;
        debug!(url = %self.url, peer = ?peer, "websocket open");
        self.socket = Some(socket);
        self.remote_ip = peer;
        Ok(peer)
    }

    fn send(&mut self, message: &str) -> ClientResult<()> {
        let timeout = self.timeout;
        let socket = self.socket.as_mut().ok_or(ClientError::NotConnected)?;
        socket
            .send(Message::text(message))
            .map_err(|e| map_ws_error(e, timeout))
    }

    fn receive(&mut self, wait: Duration) -> ClientResult<String> {
        let timeout = self.timeout;
        let deadline = Instant::now() + wait;
        let socket = self.socket.as_mut().ok_or(ClientError::NotConnected)?;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(ClientError::Timeout(timeout));
            }
            set_read_timeout(socket, remaining)?;
            match socket.read().map_err(|e| map_ws_error(e, timeout))? {
                Message::Text(text) => return Ok(text),
                Message::Binary(bytes) => {
                    return String::from_utf8(bytes)
                        .map_err(|e| ClientError::Transport(format!("binary frame is not UTF-8: {e}")))
                }
                Message::Close(frame) => {
                    debug!(?frame, "node closed the websocket");
                    break;
                }
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
            }
        }
        self.socket = None;
        Err(ClientError::Transport("connection closed by node".into()))
    }

    fn close(&mut self) -> ClientResult<()> {
        let Some(mut socket) = self.socket.take() else {
            return Ok(());
        };
        let result = socket.close(None).and_then(|()| socket.flush());
        match result {
            Ok(()) | Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => Ok(()),
            Err(e) => Err(map_ws_error(e, self.timeout)),
        }
    }

    fn is_open(&self) -> bool {
        self.socket.is_some()
    }

    fn remote_ip(&self) -> Option<IpAddr> {
        self.remote_ip
    }
}

impl std::fmt::Debug for StreamingTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamingTransport")
            .field("url", &self.url.as_str())
            .field("open", &self.is_open())
            .field("no_ssl_verify", &self.no_ssl_verify)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::thread;

    fn echo_server() -> (Url, thread::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut ws = tungstenite::accept(stream).unwrap();
            ws.send(Message::Ping(vec![1])).unwrap();
            while let Ok(msg) = ws.read() {
                if msg.is_text() {
                    ws.send(msg).unwrap();
                }
            }
        });
        (Url::parse(&format!("ws://127.0.0.1:{port}")).unwrap(), handle)
    }

    #[test]
    fn round_trip_skips_control_frames() {
        let (url, server) = echo_server();
        let mut t = StreamingTransport::new(url, Duration::from_secs(5), false);
        let peer = t.connect().unwrap();
        assert_eq!(peer, Some("127.0.0.1".parse().unwrap()));
        assert!(t.is_open());

        t.send(r#"{"method":"ping"}"#).unwrap();
        assert_eq!(t.receive(Duration::from_secs(5)).unwrap(), r#"{"method":"ping"}"#);

        t.close().unwrap();
        assert!(!t.is_open());
        t.close().unwrap();
        server.join().unwrap();
    }

    #[test]
    fn receive_honours_shorter_wait() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut ws = tungstenite::accept(stream).unwrap();
            while ws.read().is_ok() {}
        });
        let url = Url::parse(&format!("ws://127.0.0.1:{port}")).unwrap();
        let mut t = StreamingTransport::new(url, Duration::from_secs(30), false);
        t.connect().unwrap();

        let started = Instant::now();
        let err = t.receive(Duration::from_millis(200)).unwrap_err();
        assert!(matches!(err, ClientError::Timeout(_)));
        assert!(started.elapsed() < Duration::from_secs(5));

        t.close().unwrap();
        server.join().unwrap();
    }

    #[test]
    fn refused_connection_is_transport_error() {
        let port = {
            let l = TcpListener::bind("127.0.0.1:0").unwrap();
            l.local_addr().unwrap().port()
        };
        let url = Url::parse(&format!("ws://127.0.0.1:{port}")).unwrap();
        let mut t = StreamingTransport::new(url, Duration::from_secs(2), false);
        assert!(matches!(t.connect(), Err(ClientError::Transport(_))));
        assert!(!t.is_open());
    }

    #[test]
    fn io_timeouts_map_to_timeout() {
        let err = tungstenite::Error::Io(std::io::Error::from(IoErrorKind::WouldBlock));
        assert!(matches!(
            map_ws_error(err, Duration::from_secs(3)),
            ClientError::Timeout(d) if d == Duration::from_secs(3)
        ));
    }
}
