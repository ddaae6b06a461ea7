//! Minimal telnet: option negotiation for a character-mode remote terminal, window size
//! via NAWS (RFC 1073), and decoding of the client's byte stream into key events.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

const IAC: u8 = 255;
const DONT: u8 = 254;
const DO: u8 = 253;
const WONT: u8 = 252;
const WILL: u8 = 251;
const SB: u8 = 250;
const SE: u8 = 240;

const ECHO: u8 = 1;
const SGA: u8 = 3;
const NAWS: u8 = 31;

const ESC: u8 = 0x1b;
/// Longest escape sequence or subnegotiation kept before it is dropped as garbage.
const MAX_SEQUENCE: usize = 32;

/// Sent on connect: we echo, we suppress go-ahead, and we want the window size.
pub const HANDSHAKE: [u8; 9] = [IAC, WILL, ECHO, IAC, WILL, SGA, IAC, DO, NAWS];

/// One decoded unit of client input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Key(KeyEvent),
    /// Window size reported via NAWS: (width, height).
    Resize(u16, u16),
    /// The client will not report its window size.
    SizeRefused,
    /// Negotiation answer to send back to the client.
    Reply([u8; 3]),
}

#[derive(Debug, Default)]
enum State {
    #[default]
    Data,
    /// Previous byte was CR; a following LF or NUL belongs to the same Enter.
    AfterCr,
    Iac,
    Verb(u8),
    Sub(Vec<u8>),
    SubIac(Vec<u8>),
    /// Lone ESC so far; the next byte decides between Esc, Alt+key and a key sequence.
    Escape,
    Csi(Vec<u8>),
    Ss3,
}

/// Incremental decoder; sequences may be split across reads.
#[derive(Debug, Default)]
pub struct Decoder {
    state: State,
    utf8: Vec<u8>,
}

impl Decoder {
    /// True while a lone ESC is held back waiting for the rest of a sequence.
    pub fn escape_pending(&self) -> bool {
        matches!(self.state, State::Escape)
    }

    /// Release a held-back ESC as a plain Esc key when nothing followed it in time.
    pub fn flush_escape(&mut self) -> Option<KeyEvent> {
        if !self.escape_pending() {
            return None;
        }
        self.state = State::Data;
        Some(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE))
    }

    pub fn feed(&mut self, bytes: &[u8]) -> Vec<Input> {
        let mut out = Vec::new();
        for &b in bytes {
            self.push(b, &mut out);
        }
        out
    }

    fn push(&mut self, b: u8, out: &mut Vec<Input>) {
        match std::mem::take(&mut self.state) {
            State::Data => self.data(b, out),
            State::AfterCr => {
                if b != b'\n' && b != 0 {
                    self.data(b, out);
                }
            }
            State::Iac => match b {
                WILL | WONT | DO | DONT => self.state = State::Verb(b),
                SB => self.state = State::Sub(Vec::new()),
                // escaped 0xFF is never valid UTF-8; other commands carry nothing for us
                _ => {}
            },
            State::Verb(verb) => negotiate(verb, b, out),
            State::Sub(mut buf) => {
                if b == IAC {
                    self.state = State::SubIac(buf);
                } else if buf.len() < MAX_SEQUENCE {
                    buf.push(b);
                    self.state = State::Sub(buf);
                } else {
                    self.state = State::Sub(buf);
                }
            }
            State::SubIac(mut buf) => match b {
                SE => {
                    if let Some(size) = parse_naws(&buf) {
                        out.push(size);
                    }
                }
                IAC => {
                    if buf.len() < MAX_SEQUENCE {
                        buf.push(IAC);
                    }
                    self.state = State::Sub(buf);
                }
                _ => self.state = State::Sub(buf),
            },
            State::Escape => match b {
                b'[' => self.state = State::Csi(Vec::new()),
                b'O' => self.state = State::Ss3,
                ESC => {
                    out.push(key(KeyCode::Esc));
                    self.state = State::Escape;
                }
                0x20..=0x7e => out.push(Input::Key(KeyEvent::new(
                    KeyCode::Char(char::from(b)),
                    KeyModifiers::ALT,
                ))),
                _ => {
                    out.push(key(KeyCode::Esc));
                    self.data(b, out);
                }
            },
            State::Csi(mut params) => match b {
                0x40..=0x7e => {
                    if let Some(code) = csi_key(&params, b) {
                        out.push(key(code));
                    }
                }
                _ if params.len() < MAX_SEQUENCE => {
                    params.push(b);
                    self.state = State::Csi(params);
                }
                _ => {}
            },
            State::Ss3 => {
                if let Some(code) = cursor_key(b) {
                    out.push(key(code));
                }
            }
        }
    }

    fn data(&mut self, b: u8, out: &mut Vec<Input>) {
        if !self.utf8.is_empty() || b >= 0x80 {
            if b == IAC {
                self.utf8.clear();
                self.state = State::Iac;
                return;
            }
            self.utf8_byte(b, out);
            return;
        }
        match b {
            IAC => self.state = State::Iac,
            b'\r' => {
                out.push(key(KeyCode::Enter));
                self.state = State::AfterCr;
            }
            b'\n' => out.push(key(KeyCode::Enter)),
            0x7f | 0x08 => out.push(key(KeyCode::Backspace)),
            b'\t' => out.push(key(KeyCode::Tab)),
            ESC => self.state = State::Escape,
            0 => {}
            0x01..=0x1a => out.push(Input::Key(KeyEvent::new(
                KeyCode::Char(char::from(b'a' + b - 1)),
                KeyModifiers::CONTROL,
            ))),
            0x20..=0x7e => out.push(key(KeyCode::Char(char::from(b)))),
            _ => {}
        }
    }

    fn utf8_byte(&mut self, b: u8, out: &mut Vec<Input>) {
        self.utf8.push(b);
        match std::str::from_utf8(&self.utf8) {
            Ok(text) => {
                out.extend(text.chars().map(|c| key(KeyCode::Char(c))));
                self.utf8.clear();
            }
            Err(e) if e.error_len().is_none() && self.utf8.len() < 4 => {}
            Err(_) => self.utf8.clear(),
        }
    }
}

fn key(code: KeyCode) -> Input {
    Input::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

fn negotiate(verb: u8, option: u8, out: &mut Vec<Input>) {
    match (verb, option) {
        (WONT, NAWS) => out.push(Input::SizeRefused),
        // acknowledgements of what we offered or asked for
        (WILL, NAWS) | (DO, ECHO) | (DO, SGA) => {}
        (WILL, other) => out.push(Input::Reply([IAC, DONT, other])),
        (DO, other) => out.push(Input::Reply([IAC, WONT, other])),
        _ => {}
    }
}

fn parse_naws(buf: &[u8]) -> Option<Input> {
    match buf {
        [NAWS, w1, w2, h1, h2] => Some(Input::Resize(
            u16::from_be_bytes([*w1, *w2]),
            u16::from_be_bytes([*h1, *h2]),
        )),
        _ => None,
    }
}

fn cursor_key(b: u8) -> Option<KeyCode> {
    match b {
        b'A' => Some(KeyCode::Up),
        b'B' => Some(KeyCode::Down),
        b'C' => Some(KeyCode::Right),
        b'D' => Some(KeyCode::Left),
        b'H' => Some(KeyCode::Home),
        b'F' => Some(KeyCode::End),
        _ => None,
    }
}

fn csi_key(params: &[u8], last: u8) -> Option<KeyCode> {
    if last != b'~' {
        return cursor_key(last);
    }
    match params {
        b"1" | b"7" => Some(KeyCode::Home),
        b"3" => Some(KeyCode::Delete),
        b"4" | b"8" => Some(KeyCode::End),
        _ => None,
    }
}
