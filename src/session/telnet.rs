use super::*;

use std::time::Duration;

const IAC: u8 = 255;
const DONT: u8 = 254;
const DO: u8 = 253;
const WONT: u8 = 252;
const WILL: u8 = 251;
const SB: u8 = 250;
const SE: u8 = 240;

/// Marker that ends the captured output: the echo of the final `exit`.
const END_MARKER: &str = "exit";

/// Lines IOS prints when a Telnet login is rejected.
const AUTH_FAILURE_MARKERS: &[&str] = &[
    "% Login invalid",
    "% Authentication failed",
    "% Bad passwords",
];

/// Logs in over Telnet and types the command sequence.
///
/// Sends the username, the password (when non-empty), the pager command, the
/// neighbor command and `exit`, then collects everything up to the echoed
/// `exit`. Every option the server offers is refused.
#[derive(Debug, Clone)]
pub struct TelnetReader {
    host: String,
    credentials: Credentials,
    config: ReaderConfig,
}

impl TelnetReader {
    pub fn new(host: impl Into<String>, credentials: Credentials, config: ReaderConfig) -> Self {
        Self {
            host: host.into(),
            credentials,
            config,
        }
    }

    fn device_addr(&self) -> String {
        format!(
            "{}@{}:{}",
            self.credentials.username, self.host, self.config.telnet_port
        )
    }
}

impl SessionReader for TelnetReader {
    fn transport(&self) -> &'static str {
        "telnet"
    }

    async fn read_neighbors(&self) -> Result<String, ConnectError> {
        let device_addr = self.device_addr();
        let connect_timeout = self.config.connect_timeout();
        let read_timeout = self.config.read_timeout();

        let stream = tokio::time::timeout(
            connect_timeout,
            TcpStream::connect((self.host.as_str(), self.config.telnet_port)),
        )
        .await
        .map_err(|_| ConnectError::Timeout(format!("telnet connect to {device_addr}")))??;
        debug!("{} TCP connection successful", device_addr);

        let mut session = TelnetSession::new(stream);

        session
            .read_until(&self.config.username_prompt, connect_timeout, false)
            .await?;
        session.write_line(&self.credentials.username).await?;

        if !self.credentials.password.is_empty() {
            session
                .read_until(&self.config.password_prompt, connect_timeout, false)
                .await?;
            session.write_line(&self.credentials.password).await?;
        }

        session.write_line(&self.config.pager_command).await?;
        session.write_line(&self.config.command).await?;
        session.write_line(END_MARKER).await?;

        let output = session.read_until(END_MARKER, read_timeout, true).await?;
        if let Some(marker) = AUTH_FAILURE_MARKERS.iter().find(|m| output.contains(*m)) {
            return Err(ConnectError::AuthenticationFailed(format!("{device_addr}: {marker}")));
        }

        debug!(
            "{} telnet session returned {} bytes",
            device_addr,
            output.len()
        );
        Ok(output)
    }
}

/// Byte stream with Telnet command handling.
struct TelnetSession {
    stream: TcpStream,
    /// Raw bytes not yet decoded, holding at most one partial command.
    pending: Vec<u8>,
    /// Decoded data not yet returned to the caller.
    data: Vec<u8>,
}

impl TelnetSession {
    fn new(stream: TcpStream) -> Self {
        Self {
            stream,
            pending: Vec::new(),
            data: Vec::new(),
        }
    }

    async fn write_line(&mut self, line: &str) -> Result<(), ConnectError> {
        let mut bytes = Vec::with_capacity(line.len() + 1);
        bytes.extend_from_slice(line.as_bytes());
        bytes.push(b'\n');
        self.stream.write_all(&bytes).await?;
        Ok(())
    }

    /// Reads until `marker` appears and returns the data up to and including it.
    ///
    /// With `accept_eof`, a connection closed before the marker returns what
    /// was received instead of failing.
    async fn read_until(
        &mut self,
        marker: &str,
        deadline: Duration,
        accept_eof: bool,
    ) -> Result<String, ConnectError> {
        let result = tokio::time::timeout(deadline, async {
            let mut buf = [0u8; 4096];
            loop {
                if let Some(pos) = find_bytes(&self.data, marker.as_bytes()) {
                    let chunk: Vec<u8> = self.data.drain(..pos + marker.len()).collect();
                    return Ok(String::from_utf8_lossy(&chunk).into_owned());
                }

                let n = self.stream.read(&mut buf).await?;
                if n == 0 {
                    if accept_eof && !self.data.is_empty() {
                        let chunk = std::mem::take(&mut self.data);
                        return Ok(String::from_utf8_lossy(&chunk).into_owned());
                    }
                    return Err(ConnectError::ChannelDisconnectError);
                }
                trace!("{:?}", String::from_utf8_lossy(&buf[..n]));

                self.pending.extend_from_slice(&buf[..n]);
                let mut replies = Vec::new();
                let consumed = strip_commands(&self.pending, &mut self.data, &mut replies);
                self.pending.drain(..consumed);
                if !replies.is_empty() {
                    self.stream.write_all(&replies).await?;
                }
            }
        })
        .await;

        match result {
            Ok(res) => res,
            Err(_) => Err(ConnectError::Timeout(format!(
                "waiting for '{}': {}",
                marker,
                String::from_utf8_lossy(&self.data)
            ))),
        }
    }
}

fn find_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Strips Telnet commands from `input`.
///
/// Data bytes go to `data`; refusals for `DO`/`WILL` requests go to
/// `replies`. Returns the number of bytes consumed. A command cut off at the
/// end of `input` is left unconsumed for the next call.
fn strip_commands(input: &[u8], data: &mut Vec<u8>, replies: &mut Vec<u8>) -> usize {
    let mut i = 0;
    while i < input.len() {
        if input[i] != IAC {
            data.push(input[i]);
            i += 1;
            continue;
        }
        let Some(&command) = input.get(i + 1) else {
            break;
        };
        match command {
            IAC => {
                data.push(IAC);
                i += 2;
            }
            DO | DONT | WILL | WONT => {
                let Some(&option) = input.get(i + 2) else {
                    break;
                };
                match command {
                    DO => replies.extend_from_slice(&[IAC, WONT, option]),
                    WILL => replies.extend_from_slice(&[IAC, DONT, option]),
                    _ => {}
                }
                i += 3;
            }
            SB => {
                let end = input[i + 2..]
                    .windows(2)
                    .position(|w| w[0] == IAC && w[1] == SE);
                match end {
                    Some(offset) => i += 2 + offset + 2,
                    None => break,
                }
            }
            _ => i += 2,
        }
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[test]
    fn negotiation_is_refused_and_stripped() {
        let input = [
            b'a', IAC, DO, 24, IAC, WILL, 1, b'b', IAC, IAC, IAC, DONT, 3, b'c',
        ];
        let mut data = Vec::new();
        let mut replies = Vec::new();

        let consumed = strip_commands(&input, &mut data, &mut replies);

        assert_eq!(consumed, input.len());
        assert_eq!(data, vec![b'a', b'b', IAC, b'c']);
        assert_eq!(replies, vec![IAC, WONT, 24, IAC, DONT, 1]);
    }

    #[test]
    fn partial_command_is_left_pending() {
        let mut data = Vec::new();
        let mut replies = Vec::new();

        let consumed = strip_commands(&[b'x', IAC, DO], &mut data, &mut replies);

        assert_eq!(consumed, 1);
        assert_eq!(data, b"x");
        assert!(replies.is_empty());
    }

    #[test]
    fn subnegotiation_is_skipped() {
        let input = [IAC, SB, 24, 1, IAC, SE, b'o', b'k'];
        let mut data = Vec::new();
        let mut replies = Vec::new();

        assert_eq!(strip_commands(&input, &mut data, &mut replies), input.len());
        assert_eq!(data, b"ok");
    }

    async fn fake_device(listener: TcpListener, body: &'static str) -> Vec<u8> {
        let (mut socket, _) = listener.accept().await.expect("accept");
        socket
            .write_all(&[IAC, DO, 24])
            .await
            .expect("send negotiation");
        socket.write_all(b"\r\nUsername: ").await.expect("prompt");

        let mut received = Vec::new();
        let mut buf = [0u8; 1024];
        let mut password_prompted = false;
        while find_bytes(&received, b"exit\n").is_none() {
            let n = socket.read(&mut buf).await.expect("read");
            if n == 0 {
                break;
            }
            received.extend_from_slice(&buf[..n]);
            if !password_prompted && find_bytes(&received, b"admin\n").is_some() {
                socket.write_all(b"Password: ").await.expect("prompt");
                password_prompted = true;
            }
        }
        socket.write_all(body.as_bytes()).await.expect("body");
        socket.write_all(b"switch#exit\r\n").await.expect("exit echo");
        received
    }

    fn local_config(port: u16) -> ReaderConfig {
        ReaderConfig {
            telnet_port: port,
            connect_timeout_secs: 5,
            read_timeout_secs: 5,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn reads_output_up_to_exit_echo() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let port = listener.local_addr().expect("addr").port();
        let device = tokio::spawn(fake_device(
            listener,
            "switch#show cdp neighbors detail\r\nDevice ID: sw2\r\nIP address: 10.0.0.2\r\n",
        ));

        let reader = TelnetReader::new(
            "127.0.0.1",
            Credentials::new("admin", "secret"),
            local_config(port),
        );
        let output = reader.read_neighbors().await.expect("telnet read");
        let received = device.await.expect("device task");

        assert!(output.contains("Device ID: sw2"));
        assert!(output.ends_with("exit"));
        assert!(find_bytes(&received, b"terminal length 0\n").is_some());
        assert!(find_bytes(&received, &[IAC, WONT, 24]).is_some());
    }

    #[tokio::test]
    async fn login_rejection_is_an_auth_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let port = listener.local_addr().expect("addr").port();
        let device = tokio::spawn(fake_device(listener, "\r\n% Login invalid\r\n\r\nUsername: "));

        let reader = TelnetReader::new(
            "127.0.0.1",
            Credentials::new("admin", "secret"),
            local_config(port),
        );
        let err = reader.read_neighbors().await.expect_err("login should fail");
        let _ = device.await;

        assert!(err.is_auth_failure());
    }

    #[tokio::test]
    async fn closed_port_fails_without_auth_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let port = listener.local_addr().expect("addr").port();
        drop(listener);

        let reader = TelnetReader::new("127.0.0.1", Credentials::new("a", ""), local_config(port));
        let err = reader.read_neighbors().await.expect_err("connect should fail");

        assert!(matches!(err, ConnectError::Io(_)));
        assert!(!err.is_auth_failure());
    }
}
