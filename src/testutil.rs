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

//! Test doubles: a real pseudo-terminal and an in-memory device.

use std::cell::{Cell, RefCell};
use std::io;
use std::os::unix::io::RawFd;
use std::ptr;

use crate::term::{ConfigError, FlushPolicy, Result, TerminalAttributes, TerminalDevice, Tty};

/// A pseudo-terminal pair, closed on drop.
pub struct Pty {
    pub master: RawFd,
    pub slave: RawFd,
}

impl Pty {
    pub fn open() -> Pty {
        let mut master = -1;
        let mut slave = -1;
        let rc = unsafe {
            libc::openpty(
                &mut master,
                &mut slave,
                ptr::null_mut(),
                ptr::null_mut(),
                ptr::null_mut(),
            )
        };
        assert_eq!(rc, 0, "openpty: {}", io::Error::last_os_error());
        Pty { master, slave }
    }

    pub fn tty(&self) -> Tty {
        Tty::new(self.slave)
    }
}

impl Drop for Pty {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.slave);
            libc::close(self.master);
        }
    }
}

/// Attributes of a freshly opened, line-buffered terminal.
pub fn cooked_attributes() -> TerminalAttributes {
    let mut t: libc::termios = unsafe { std::mem::zeroed() };
    t.c_iflag = libc::BRKINT | libc::ICRNL | libc::IXON | libc::IMAXBEL;
    t.c_oflag = libc::OPOST | libc::ONLCR;
    t.c_cflag = libc::CS7 | libc::CREAD;
    t.c_lflag = libc::ISIG | libc::ICANON | libc::ECHO | libc::ECHOE | libc::IEXTEN;
    t.c_cc[libc::VMIN] = 1;
    t.c_cc[libc::VTIME] = 0;
    t.c_cc[libc::VINTR] = 3;
    TerminalAttributes::from(t)
}

/// In-memory terminal that records every install and can be told to fail.
pub struct FakeDevice {
    pub current: Cell<TerminalAttributes>,
    pub applied: RefCell<Vec<(TerminalAttributes, FlushPolicy)>>,
    pub captures: Cell<usize>,
    pub fail_capture: Cell<bool>,
    /// Fail the install with this index (0 = first call to `apply`).
    pub fail_apply_at: Cell<Option<usize>>,
    apply_calls: Cell<usize>,
}

impl FakeDevice {
    pub fn new(current: TerminalAttributes) -> Self {
        FakeDevice {
            current: Cell::new(current),
            applied: RefCell::new(Vec::new()),
            captures: Cell::new(0),
            fail_capture: Cell::new(false),
            fail_apply_at: Cell::new(None),
            apply_calls: Cell::new(0),
        }
    }
}

impl TerminalDevice for FakeDevice {
    fn capture(&self) -> Result<TerminalAttributes> {
        self.captures.set(self.captures.get() + 1);
        if self.fail_capture.get() {
            return Err(ConfigError::new("tcgetattr", io::Error::from_raw_os_error(libc::ENOTTY)));
        }
        Ok(self.current.get())
    }

    fn apply(&self, attrs: &TerminalAttributes, flush: FlushPolicy) -> Result<()> {
        let call = self.apply_calls.get();
        self.apply_calls.set(call + 1);
        if self.fail_apply_at.get() == Some(call) {
            return Err(ConfigError::new("tcsetattr", io::Error::from_raw_os_error(libc::EIO)));
        }
        self.current.set(*attrs);
        self.applied.borrow_mut().push((*attrs, flush));
        Ok(())
    }
}
