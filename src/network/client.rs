//! Blocking client
//!
//! Speaks the wire protocol to a running server.

use std::fs;
use std::io::{BufReader, BufWriter};
use std::net::{TcpStream, ToSocketAddrs};
use std::path::Path;

use crate::error::{PromoError, Result};
use crate::protocol::{read_response, write_command, Command, Response, Status};
use crate::record::PromotionView;
use crate::store::StoreStats;

/// A single connection to a PromoKV server
pub struct Client {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

impl Client {
    /// Connect to a server
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let stream = TcpStream::connect(addr)
            .map_err(|e| PromoError::Network(format!("Failed to connect: {}", e)))?;
        stream.set_nodelay(true)?;

        Ok(Self {
            reader: BufReader::new(stream.try_clone()?),
            writer: BufWriter::new(stream),
        })
    }

    /// Send one command and wait for its response
    pub fn call(&mut self, command: &Command) -> Result<Response> {
        write_command(&mut self.writer, command)?;
        read_response(&mut self.reader)
    }

    /// Look up a promotion; `None` when the server has no such id
    pub fn lookup(&mut self, id: &str) -> Result<Option<PromotionView>> {
        let response = self.call(&Command::Lookup { id: id.to_string() })?;
        match response.status {
            Status::Ok => {
                let payload = response.payload.unwrap_or_default();
                Ok(Some(bincode::deserialize(&payload)?))
            }
            Status::NotFound => Ok(None),
            Status::Error => Err(server_error(&response)),
        }
    }

    /// Upload CSV bytes as the new dataset
    pub fn upload(&mut self, data: Vec<u8>) -> Result<String> {
        let response = self.call(&Command::Upload { data })?;
        match response.status {
            Status::Ok => Ok(response.message().unwrap_or_default()),
            _ => Err(server_error(&response)),
        }
    }

    /// Upload a CSV file; a missing file is reported without contacting the server
    pub fn upload_path(&mut self, path: &Path) -> Result<String> {
        if !path.is_file() {
            return Err(PromoError::MissingUpload(path.display().to_string()));
        }
        let data = fs::read(path)?;
        self.upload(data)
    }

    /// Round-trip a PING
    pub fn ping(&mut self) -> Result<()> {
        let response = self.call(&Command::Ping)?;
        match response.status {
            Status::Ok => Ok(()),
            _ => Err(server_error(&response)),
        }
    }

    /// Fetch the server's dataset stats
    pub fn stats(&mut self) -> Result<StoreStats> {
        let response = self.call(&Command::Stats)?;
        match response.status {
            Status::Ok => {
                let payload = response.payload.unwrap_or_default();
                Ok(bincode::deserialize(&payload)?)
            }
            _ => Err(server_error(&response)),
        }
    }
}

fn server_error(response: &Response) -> PromoError {
    PromoError::Server(
        response
            .message()
            .unwrap_or_else(|| format!("{:?}", response.status)),
    )
}
