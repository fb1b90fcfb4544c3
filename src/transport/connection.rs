//! Connection Handler
//!
//! A single blocking TCP connection to one cache server.

use std::io::{BufReader, BufWriter};
use std::net::{TcpStream, ToSocketAddrs};

use crate::error::{CacheError, Result};
use crate::options::ClientOptions;
use crate::protocol::{read_response, write_frame, RequestFrame, ResponseFrame};
use crate::server::ServerDescriptor;

/// One open connection to a cache server
pub struct Connection {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Open a connection to the given server
    ///
    /// Applies the connect/read/write deadlines configured in the options;
    /// without them every operation blocks indefinitely, matching the
    /// legacy behavior.
    pub fn connect(server: &ServerDescriptor, options: &ClientOptions) -> Result<Self> {
        let address = server.address();

        let stream = match options.connect_timeout() {
            Some(timeout) => {
                let addrs = address.to_socket_addrs().map_err(|e| {
                    CacheError::Transport(format!("Failed to resolve {}: {}", address, e))
                })?;

                let mut stream = None;
                let mut last_err = None;
                for addr in addrs {
                    match TcpStream::connect_timeout(&addr, timeout) {
                        Ok(s) => {
                            stream = Some(s);
                            break;
                        }
                        Err(e) => last_err = Some(e),
                    }
                }

                stream.ok_or_else(|| {
                    let reason = last_err
                        .map(|e| e.to_string())
                        .unwrap_or_else(|| "no addresses resolved".to_string());
                    CacheError::Transport(format!("Failed to connect to {}: {}", address, reason))
                })?
            }
            None => TcpStream::connect(&address).map_err(|e| {
                CacheError::Transport(format!("Failed to connect to {}: {}", address, e))
            })?,
        };

        if options.tcp_nodelay() {
            // Disable Nagle's algorithm for low latency
            stream.set_nodelay(true)?;
        }
        if let Some(timeout) = options.recv_timeout() {
            stream.set_read_timeout(Some(timeout))?;
        }
        if let Some(timeout) = options.send_timeout() {
            stream.set_write_timeout(Some(timeout))?;
        }

        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| address.clone());

        // Clone stream for separate read/write handles
        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        tracing::debug!("Connected to cache server at {}", peer_addr);

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            peer_addr,
        })
    }

    /// Write a request frame, returning the number of bytes sent
    pub fn send(&mut self, frame: &RequestFrame) -> Result<usize> {
        let sent = write_frame(&mut self.writer, frame)?;
        tracing::trace!(
            "Sent {} bytes (opcode {:#04x}) to {}",
            sent,
            frame.opcode as u8,
            self.peer_addr
        );
        Ok(sent)
    }

    /// Block until a complete response frame has been received
    pub fn read_response(&mut self) -> Result<ResponseFrame> {
        let response = read_response(&mut self.reader)?;
        tracing::trace!(
            "Received response (status {:#06x}, body {} bytes) from {}",
            response.header.status,
            response.header.body_length,
            self.peer_addr
        );
        Ok(response)
    }
}
