// src/sys/assuan.rs

use std::io;
use std::path::Path;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::UnixStream;
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};

use crate::error::TransportError;
use crate::sys::traits::AgentChannel;

/// One line received from the agent, classified.
#[derive(Debug, PartialEq, Eq)]
enum Response<'a> {
    Ok,
    Err { code: u32, reason: &'a str },
    Inquire(&'a str),
    /// Status (`S`), comment (`#`) and data (`D`) lines.
    Informational,
    Unexpected,
}

fn parse_response(line: &str) -> Response<'_> {
    let (keyword, rest) = line.split_once(' ').unwrap_or((line, ""));
    match keyword {
        "OK" => Response::Ok,
        "ERR" => {
            let (code, reason) = rest.split_once(' ').unwrap_or((rest, ""));
            match code.parse() {
                Ok(code) => Response::Err { code, reason },
                Err(_) => Response::Unexpected,
            }
        }
        "INQUIRE" => Response::Inquire(rest),
        "S" | "D" => Response::Informational,
        _ if keyword.starts_with('#') => Response::Informational,
        _ => Response::Unexpected,
    }
}

fn unexpected(line: &str) -> TransportError {
    TransportError::ChannelFailure(io::Error::new(
        io::ErrorKind::InvalidData,
        format!("unexpected response from agent: {line:?}"),
    ))
}

/// Client side of an Assuan connection over the agent's Unix socket.
pub struct AssuanConnection {
    lines: Lines<BufReader<OwnedReadHalf>>,
    // 🛡️ Unbuffered on purpose: request lines go straight from the caller's
    // wiped buffer into the socket.
    writer: OwnedWriteHalf,
}

impl AssuanConnection {
    /// Connects to the agent and consumes its greeting.
    pub async fn connect(socket_path: &Path) -> Result<Self, TransportError> {
        tracing::debug!(socket = %socket_path.display(), "connecting to agent");
        let stream = UnixStream::connect(socket_path).await?;
        let (read_half, writer) = stream.into_split();
        let mut conn = Self {
            lines: BufReader::new(read_half).lines(),
            writer,
        };

        // No request has been made yet, so even an `ERR` greeting is a
        // channel fault rather than a rejection. The agent's text is kept.
        let greeting = conn.next_line().await?;
        match parse_response(&greeting) {
            Response::Ok => Ok(conn),
            _ => Err(unexpected(&greeting)),
        }
    }

    async fn next_line(&mut self) -> Result<String, TransportError> {
        self.lines.next_line().await?.ok_or_else(|| {
            io::Error::new(io::ErrorKind::UnexpectedEof, "agent closed the connection").into()
        })
    }
}

#[async_trait]
impl AgentChannel for AssuanConnection {
    async fn transact(&mut self, line: &[u8]) -> Result<(), TransportError> {
        self.writer.write_all(line).await?;

        loop {
            let response = self.next_line().await?;
            match parse_response(&response) {
                Response::Ok => return Ok(()),
                Response::Err { code, reason } => {
                    return Err(TransportError::AgentRejected {
                        code,
                        reason: reason.to_string(),
                    });
                }
                Response::Inquire(keyword) => {
                    // We have nothing more to hand over; cancel and let the agent answer ERR.
                    tracing::debug!(keyword, "cancelling agent inquiry");
                    self.writer.write_all(b"CAN\n").await?;
                }
                Response::Informational => {
                    tracing::trace!(line = %response, "agent status");
                }
                Response::Unexpected => return Err(unexpected(&response)),
            }
        }
    }
}
