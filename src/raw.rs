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

//! Raw mode: enter it once, and always leave it.
//!
//! `RawMode::enable` captures the terminal's attributes before touching
//! anything and hands back a guard that owns that snapshot. The snapshot
//! is put back by `disable`, or by `Drop` on any other way out of the
//! scope (early return, panic).

use tracing::debug;

use crate::term::{
    ControlModes, FlushPolicy, InputModes, LocalModes, OutputModes, Result, TerminalAttributes,
    TerminalDevice,
};

const INPUT_OFF: InputModes = InputModes::BREAK_INTERRUPT
    .union(InputModes::CR_TO_NL)
    .union(InputModes::PARITY_CHECK)
    .union(InputModes::STRIP_HIGH_BIT)
    .union(InputModes::FLOW_CONTROL);

const OUTPUT_OFF: OutputModes = OutputModes::POST_PROCESS;

const CONTROL_ON: ControlModes = ControlModes::CHAR_SIZE_8;

const LOCAL_OFF: LocalModes = LocalModes::ECHO
    .union(LocalModes::CANONICAL)
    .union(LocalModes::EXTENDED)
    .union(LocalModes::SIGNALS);

/// `VMIN` in raw mode: a read doesn't wait for any particular count.
pub const RAW_MIN_READ: libc::cc_t = 0;
/// `VTIME` in raw mode, in tenths of a second: give up after 100 ms.
pub const RAW_READ_TIMEOUT: libc::cc_t = 1;

/// Derive the raw-mode attribute set from `orig`.
pub fn raw_attributes(orig: &TerminalAttributes) -> TerminalAttributes {
    let mut raw = *orig;
    raw.set_input_modes(orig.input_modes() - INPUT_OFF);
    raw.set_output_modes(orig.output_modes() - OUTPUT_OFF);
    raw.set_control_modes(orig.control_modes() | CONTROL_ON);
    raw.set_local_modes(orig.local_modes() - LOCAL_OFF);
    raw.set_read_policy(RAW_MIN_READ, RAW_READ_TIMEOUT);
    raw
}

/// The terminal is in raw mode for as long as this value lives.
///
/// Calling `enable` again before the first guard is gone would capture
/// the raw attributes as "original"; don't.
pub struct RawMode<D: TerminalDevice> {
    device: D,
    original: TerminalAttributes,
    active: bool,
}

impl<D: TerminalDevice> RawMode<D> {
    /// Capture the current attributes, then switch `device` to raw mode.
    ///
    /// If installing the raw set fails, the original is put back before
    /// the error is returned.
    pub fn enable(device: D) -> Result<Self> {
        let original = device.capture()?;
        debug!(?original, "captured terminal attributes");

        let mode = RawMode {
            device,
            original,
            active: true,
        };

        let raw = raw_attributes(&mode.original);
        mode.device.apply(&raw, FlushPolicy::Flush)?;
        debug!(?raw, "raw mode on");
        Ok(mode)
    }

    /// The attributes captured before raw mode was entered.
    pub fn original(&self) -> &TerminalAttributes {
        &self.original
    }

    /// Put the original attributes back.
    pub fn disable(mut self) -> Result<()> {
        self.restore()
    }

    fn restore(&mut self) -> Result<()> {
        self.active = false;
        self.device.apply(&self.original, FlushPolicy::Flush)?;
        debug!("raw mode off");
        Ok(())
    }
}

impl<D: TerminalDevice> Drop for RawMode<D> {
    fn drop(&mut self) {
        if !self.active {
            return;
        }
        if let Err(e) = self.restore() {
            eprint!("rawkeys: {}\r\n", e);
        }
    }
}
