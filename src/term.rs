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

//! Terminal attribute snapshots for rawkeys.
//!
//! POSIX termios via libc: read the attribute set of a terminal device,
//! install one, and name the mode bits the raw-mode transition touches.

use std::fmt;
use std::io;
use std::os::unix::io::RawFd;

use bitflags::bitflags;
use thiserror::Error;

/// A terminal attribute query or install failed.
///
/// Displays as `<operation>: <system error>`, the way `perror` would.
#[derive(Error, Debug)]
#[error("{op}: {source}")]
pub struct ConfigError {
    pub op: &'static str,
    #[source]
    pub source: io::Error,
}

impl ConfigError {
    pub fn new(op: &'static str, source: io::Error) -> Self {
        ConfigError { op, source }
    }

    /// Wrap `errno` from the call that just failed.
    pub fn last_os_error(op: &'static str) -> Self {
        ConfigError::new(op, io::Error::last_os_error())
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;

bitflags! {
    /// `c_iflag` bits cleared when entering raw mode.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct InputModes: libc::tcflag_t {
        /// A break condition sends SIGINT.
        const BREAK_INTERRUPT = libc::BRKINT;
        /// Carriage return is translated to newline on input.
        const CR_TO_NL = libc::ICRNL;
        const PARITY_CHECK = libc::INPCK;
        /// The eighth bit of every input byte is stripped.
        const STRIP_HIGH_BIT = libc::ISTRIP;
        /// Ctrl-S / Ctrl-Q pause and resume output.
        const FLOW_CONTROL = libc::IXON;
    }
}

bitflags! {
    /// `c_oflag` bits cleared when entering raw mode.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct OutputModes: libc::tcflag_t {
        /// Output post-processing, including `\n` to `\r\n`.
        const POST_PROCESS = libc::OPOST;
    }
}

bitflags! {
    /// `c_cflag` bits set when entering raw mode.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct ControlModes: libc::tcflag_t {
        /// Eight-bit characters.
        const CHAR_SIZE_8 = libc::CS8;
    }
}

bitflags! {
    /// `c_lflag` bits cleared when entering raw mode.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct LocalModes: libc::tcflag_t {
        /// Typed characters are echoed back.
        const ECHO = libc::ECHO;
        /// Line-buffered input.
        const CANONICAL = libc::ICANON;
        /// Ctrl-V sends the next character literally.
        const EXTENDED = libc::IEXTEN;
        /// Ctrl-C, Ctrl-Z and Ctrl-\ raise signals.
        const SIGNALS = libc::ISIG;
    }
}

/// A captured terminal attribute set.
///
/// Bits outside the named mode sets are carried along untouched, so a
/// snapshot can always be installed again as a whole.
#[derive(Clone, Copy)]
pub struct TerminalAttributes(libc::termios);

impl TerminalAttributes {
    pub fn input_modes(&self) -> InputModes {
        InputModes::from_bits_retain(self.0.c_iflag)
    }

    pub fn set_input_modes(&mut self, modes: InputModes) {
        self.0.c_iflag = modes.bits();
    }

    pub fn output_modes(&self) -> OutputModes {
        OutputModes::from_bits_retain(self.0.c_oflag)
    }

    pub fn set_output_modes(&mut self, modes: OutputModes) {
        self.0.c_oflag = modes.bits();
    }

    pub fn control_modes(&self) -> ControlModes {
        ControlModes::from_bits_retain(self.0.c_cflag)
    }

    pub fn set_control_modes(&mut self, modes: ControlModes) {
        self.0.c_cflag = modes.bits();
    }

    pub fn local_modes(&self) -> LocalModes {
        LocalModes::from_bits_retain(self.0.c_lflag)
    }

    pub fn set_local_modes(&mut self, modes: LocalModes) {
        self.0.c_lflag = modes.bits();
    }

    /// `VMIN`: bytes a read waits for before returning.
    pub fn min_read(&self) -> libc::cc_t {
        self.0.c_cc[libc::VMIN]
    }

    /// `VTIME`: read timeout in tenths of a second.
    pub fn read_timeout(&self) -> libc::cc_t {
        self.0.c_cc[libc::VTIME]
    }

    pub fn set_read_policy(&mut self, min_read: libc::cc_t, timeout_deciseconds: libc::cc_t) {
        self.0.c_cc[libc::VMIN] = min_read;
        self.0.c_cc[libc::VTIME] = timeout_deciseconds;
    }

    pub fn as_termios(&self) -> &libc::termios {
        &self.0
    }
}

impl From<libc::termios> for TerminalAttributes {
    fn from(termios: libc::termios) -> Self {
        TerminalAttributes(termios)
    }
}

// Line discipline and baud rate are left out: the device normalizes them.
impl PartialEq for TerminalAttributes {
    fn eq(&self, other: &Self) -> bool {
        self.0.c_iflag == other.0.c_iflag
            && self.0.c_oflag == other.0.c_oflag
            && self.0.c_cflag == other.0.c_cflag
            && self.0.c_lflag == other.0.c_lflag
            && self.0.c_cc == other.0.c_cc
    }
}

impl Eq for TerminalAttributes {}

impl fmt::Debug for TerminalAttributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TerminalAttributes")
            .field("iflag", &format_args!("{:#o}", self.0.c_iflag))
            .field("oflag", &format_args!("{:#o}", self.0.c_oflag))
            .field("cflag", &format_args!("{:#o}", self.0.c_cflag))
            .field("lflag", &format_args!("{:#o}", self.0.c_lflag))
            .field("vmin", &self.min_read())
            .field("vtime", &self.read_timeout())
            .finish()
    }
}

/// When a new attribute set takes effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlushPolicy {
    /// Drain pending output and discard unread input first (`TCSAFLUSH`).
    Flush,
    /// Apply immediately (`TCSANOW`).
    Now,
}

impl FlushPolicy {
    fn action(self) -> libc::c_int {
        match self {
            FlushPolicy::Flush => libc::TCSAFLUSH,
            FlushPolicy::Now => libc::TCSANOW,
        }
    }
}

/// Read and write access to a terminal's attribute set.
pub trait TerminalDevice {
    fn capture(&self) -> Result<TerminalAttributes>;
    fn apply(&self, attrs: &TerminalAttributes, flush: FlushPolicy) -> Result<()>;
}

impl<D: TerminalDevice + ?Sized> TerminalDevice for &D {
    fn capture(&self) -> Result<TerminalAttributes> {
        (**self).capture()
    }

    fn apply(&self, attrs: &TerminalAttributes, flush: FlushPolicy) -> Result<()> {
        (**self).apply(attrs, flush)
    }
}

/// A terminal reached through a file descriptor the process does not own.
#[derive(Clone, Copy, Debug)]
pub struct Tty {
    fd: RawFd,
}

impl Tty {
    pub fn new(fd: RawFd) -> Self {
        Tty { fd }
    }

    pub fn stdin() -> Self {
        Tty::new(libc::STDIN_FILENO)
    }

    pub fn fd(&self) -> RawFd {
        self.fd
    }
}

impl TerminalDevice for Tty {
    fn capture(&self) -> Result<TerminalAttributes> {
        unsafe {
            let mut termios: libc::termios = std::mem::zeroed();
            if libc::tcgetattr(self.fd, &mut termios) == -1 {
                return Err(ConfigError::last_os_error("tcgetattr"));
            }
            Ok(TerminalAttributes(termios))
        }
    }

    fn apply(&self, attrs: &TerminalAttributes, flush: FlushPolicy) -> Result<()> {
        let rc = unsafe { libc::tcsetattr(self.fd, flush.action(), attrs.as_termios()) };
        if rc == -1 {
            return Err(ConfigError::last_os_error("tcsetattr"));
        }
        Ok(())
    }
}
