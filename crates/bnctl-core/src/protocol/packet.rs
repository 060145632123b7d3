//! GBL4 frame codec.
//!
//! Every datagram is `prefix[4] | command[1] | payload[..] | checksum[1]` where
//! the checksum is the XOR of [`CHECKSUM_SEED`], the command byte and every
//! payload byte.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::FrameError;

/// Frame prefix `"GBL\x04"`.
pub const MAGIC: [u8; 4] = *b"GBL\x04";

/// XOR of the prefix bytes, folded into every checksum.
pub const CHECKSUM_SEED: u8 = b'G' ^ b'B' ^ b'L' ^ 0x04;

/// Largest datagram the devices handle.
pub const MAX_FRAME_LEN: usize = 1500;

/// Largest payload that fits a frame.
pub const MAX_PAYLOAD_LEN: usize = MAX_FRAME_LEN - MAGIC.len() - 2;

/// Smallest valid frame: prefix, command and checksum.
pub const MIN_FRAME_LEN: usize = MAGIC.len() + 2;

/// Request/reply command codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Command {
    GetNetconf = 1,
    SetNetconf = 2,
    FlashPrepare = 3,
    FlashPage = 4,
    Reset = 5,
    Ping = 9,
    SetMac = 10,
    KickWatchdog = 11,
}

impl Command {
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Human readable operation name, used in errors and logs.
    pub fn name(self) -> &'static str {
        match self {
            Command::GetNetconf => "get-netconf",
            Command::SetNetconf => "set-netconf",
            Command::FlashPrepare => "flash-prepare",
            Command::FlashPage => "flash-page",
            Command::Reset => "reset",
            Command::Ping => "ping",
            Command::SetMac => "set-mac",
            Command::KickWatchdog => "kick-watchdog",
        }
    }
}

impl TryFrom<u8> for Command {
    type Error = FrameError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Command::GetNetconf),
            2 => Ok(Command::SetNetconf),
            3 => Ok(Command::FlashPrepare),
            4 => Ok(Command::FlashPage),
            5 => Ok(Command::Reset),
            9 => Ok(Command::Ping),
            10 => Ok(Command::SetMac),
            11 => Ok(Command::KickWatchdog),
            other => Err(FrameError::UnknownCommand(other)),
        }
    }
}

/// XOR checksum over a command byte and its payload.
pub fn checksum(command: u8, payload: &[u8]) -> u8 {
    payload
        .iter()
        .fold(CHECKSUM_SEED ^ command, |acc, b| acc ^ b)
}

/// A decoded GBL4 frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub command: Command,
    pub payload: Bytes,
}

impl Packet {
    pub fn new(command: Command, payload: impl Into<Bytes>) -> Result<Self, FrameError> {
        let payload = payload.into();
        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(FrameError::PayloadTooLarge {
                len: payload.len(),
                max: MAX_PAYLOAD_LEN,
            });
        }
        Ok(Self { command, payload })
    }

    /// Encode into a wire frame with trailing checksum.
    pub fn encode(&self) -> Bytes {
        let code = self.command.code();
        let mut buf = BytesMut::with_capacity(MIN_FRAME_LEN + self.payload.len());
        buf.put_slice(&MAGIC);
        buf.put_u8(code);
        buf.put_slice(&self.payload);
        buf.put_u8(checksum(code, &self.payload));
        buf.freeze()
    }

    /// Decode a received datagram.
    pub fn decode(frame: &[u8]) -> Result<Self, FrameError> {
        if frame.len() < MIN_FRAME_LEN {
            return Err(FrameError::TooShort { len: frame.len() });
        }
        if frame[..MAGIC.len()] != MAGIC {
            return Err(FrameError::BadMagic);
        }

        let code = frame[MAGIC.len()];
        let (body, trailer) = frame.split_at(frame.len() - 1);
        let payload = &body[MAGIC.len() + 1..];

        let expected = checksum(code, payload);
        let actual = trailer[0];
        if expected != actual {
            return Err(FrameError::ChecksumMismatch { expected, actual });
        }

        let command = Command::try_from(code)?;
        Packet::new(command, Bytes::copy_from_slice(payload))
    }
}
