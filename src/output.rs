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

//! Report lines for each byte read.
//!
//! Output post-processing is off in raw mode, so every line carries its
//! own `\r\n`.

use std::io::{self, Write};

pub const CRLF: &[u8] = b"\r\n";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ByteClass {
    /// 0..=31 and 127.
    Control,
    Printable,
}

pub fn classify(b: u8) -> ByteClass {
    if b.is_ascii_control() {
        ByteClass::Control
    } else {
        ByteClass::Printable
    }
}

/// Write `"<code>\r\n"` or `"<code> ('<c>')\r\n"` and flush.
///
/// The character is written as the raw byte, so bytes above 127 show up
/// as whatever the terminal makes of them (usually part of a UTF-8
/// sequence).
pub fn report(out: &mut impl Write, b: u8) -> io::Result<()> {
    match classify(b) {
        ByteClass::Control => write!(out, "{}", b)?,
        ByteClass::Printable => {
            write!(out, "{} ('", b)?;
            out.write_all(&[b])?;
            out.write_all(b"')")?;
        }
    }
    out.write_all(CRLF)?;
    out.flush()
}
