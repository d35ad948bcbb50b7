//! Item display metadata encoded as NBT for Minecraft clients of any protocol version,
//! without a game server behind the items.

pub mod java;

pub mod nbt;
pub mod proto;
pub mod text;

pub mod skull;
pub mod meta;

pub use meta::{DisplaySource, ItemDisplay, ItemMeta, ItemMetaConfig, MetaError};
pub use proto::{MetaThresholds, ProtocolVersion, TextField};
pub use skull::{SkullError, SkullProfile};
pub use text::{NamedColor, Text, TextColor, TextError};
