// Copyright 2026 Daniel Smith
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Byte-at-a-time input loop.

use std::io::{self, Read, Write};
use std::os::unix::io::RawFd;

use tracing::trace;

use crate::output;
use crate::term::{ConfigError, Result};

/// Typing this ends the loop.
pub const QUIT: u8 = b'q';

/// What a read yields when no byte arrived before the timeout. Same value
/// as a typed NUL (Ctrl-@); the two can't be told apart.
pub const NO_BYTE: u8 = 0;

/// Unbuffered reads straight from a terminal file descriptor.
pub struct TtyReader {
    fd: RawFd,
}

impl TtyReader {
    pub fn new(fd: RawFd) -> Self {
        TtyReader { fd }
    }
}

impl Read for TtyReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = unsafe { libc::read(self.fd, buf.as_mut_ptr() as *mut libc::c_void, buf.len()) };
        if n < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(n as usize)
    }
}

/// Read one byte, or `NO_BYTE` if the read timed out.
pub fn read_byte(input: &mut impl Read) -> io::Result<u8> {
    let mut buf = [NO_BYTE; 1];
    match input.read(&mut buf) {
        Ok(_) => Ok(buf[0]),
        // Some platforms report a VTIME expiry as EAGAIN.
        Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted) => {
            Ok(NO_BYTE)
        }
        Err(e) => Err(e),
    }
}

/// Read and report bytes until `QUIT` has been reported.
pub fn run(input: &mut impl Read, out: &mut impl Write) -> Result<()> {
    loop {
        let b = read_byte(input).map_err(|e| ConfigError::new("read", e))?;
        trace!(byte = b, "read");

        output::report(out, b).map_err(|e| ConfigError::new("write", e))?;

        if b == QUIT {
            return Ok(());
        }
    }
}
