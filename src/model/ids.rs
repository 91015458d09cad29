//! Key types used across the model. Every entity key is a plain `String`
//! (survey documents mint their own identifiers); these aliases exist so
//! call sites read as domain concepts rather than bare strings.

pub type PoleId = String;
pub type AttachmentId = String;
pub type MidspanId = String;
pub type ConnectionId = String;
pub type AnchorId = String;
