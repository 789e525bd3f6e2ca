//! Voice relay to the MixIA device over Bluetooth Low Energy.
//!
//! Finished transcripts are written to the device's UART write characteristic as a series of
//! small chunks followed by a single `\n`. The device replies through the notify
//! characteristic, which is surfaced through a single registered handler per session.
//!
//! - [`protocol`] - service and characteristic identifiers, chunk sizing
//! - [`characteristic`] - the write side of a GATT characteristic
//! - [`sender`] - chunked, paced transmission of a single utterance
//! - [`session`] - connection lifetime and notification subscription
//! - [`transcript`] - relaying a stream of speech recognition results

pub mod characteristic;
pub mod protocol;
pub mod sender;
pub mod session;
pub mod transcript;

pub use characteristic::{Characteristic, StreamCharacteristic, TransportError};
pub use sender::{ChunkedSender, SendError, SendReport};
pub use session::{pump_notifications, BleSession, LinkStatus, Notifications};
pub use transcript::{relay_transcripts, RelayStats, TranscriptEvent};
