//! Protocol versions and the release thresholds at which item metadata changed.

use std::fmt;


/// A client protocol version, as the numeric id sent in the handshake. Versions are 
/// totally ordered, a later release always has a greater id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProtocolVersion(pub i32);

/// Internal macro to define named releases and their lookup by name.
macro_rules! releases {
    (
        $($name:ident = $id:literal : $display:literal),* $(,)?
    ) => {

        impl ProtocolVersion {
            $(pub const $name: Self = Self($id);)*

            /// Find a named release from its display name, like `1.13`.
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($display => Some(Self::$name),)*
                    _ => None,
                }
            }

            /// Get the display name of this version if it is a named release.
            pub fn name(self) -> Option<&'static str> {
                match self {
                    $(Self::$name => Some($display),)*
                    _ => None,
                }
            }
        }

    };
}

releases! {
    MINECRAFT_1_7_2     = 4     : "1.7.2",
    MINECRAFT_1_8       = 47    : "1.8",
    MINECRAFT_1_9       = 107   : "1.9",
    MINECRAFT_1_12_2    = 340   : "1.12.2",
    MINECRAFT_1_13      = 393   : "1.13",
    MINECRAFT_1_14      = 477   : "1.14",
    MINECRAFT_1_16      = 735   : "1.16",
    MINECRAFT_1_20_2    = 764   : "1.20.2",
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name} ({})", self.0),
            None => write!(f, "{}", self.0),
        }
    }
}


/// A text field of the item display compound, each one switching to structured
/// encoding at its own release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Name,
    Lore,
}

/// The first versions supporting each metadata format. Every version comparison made
/// when encoding goes through this table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetaThresholds {
    /// Display name is a JSON text component from this version, legacy string before.
    pub name: ProtocolVersion,
    /// Lore lines are JSON text components from this version, legacy strings before.
    pub lore: ProtocolVersion,
    /// Enchantments are stored in `Enchantments` with namespaced ids from this version,
    /// in `ench` with numeric ids before.
    pub enchantments: ProtocolVersion,
    /// JSON text components may carry RGB colors from this version.
    pub hex_color: ProtocolVersion,
    /// Item stack NBT is sent as is from this version, gzip compressed before.
    pub uncompressed_nbt: ProtocolVersion,
    /// Network NBT root tags have no name from this version.
    pub nameless_nbt: ProtocolVersion,
}

impl MetaThresholds {

    pub const DEFAULT: Self = Self {
        name: ProtocolVersion::MINECRAFT_1_13,
        lore: ProtocolVersion::MINECRAFT_1_14,
        enchantments: ProtocolVersion::MINECRAFT_1_13,
        hex_color: ProtocolVersion::MINECRAFT_1_16,
        uncompressed_nbt: ProtocolVersion::MINECRAFT_1_8,
        nameless_nbt: ProtocolVersion::MINECRAFT_1_20_2,
    };

    /// Get the first version encoding the given field as a structured component.
    #[inline]
    pub fn text_field(&self, field: TextField) -> ProtocolVersion {
        match field {
            TextField::Name => self.name,
            TextField::Lore => self.lore,
        }
    }

}

impl Default for MetaThresholds {
    fn default() -> Self {
        Self::DEFAULT
    }
}


#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn ordering() {
        assert!(ProtocolVersion::MINECRAFT_1_12_2 < ProtocolVersion::MINECRAFT_1_13);
        assert!(ProtocolVersion::MINECRAFT_1_13 < ProtocolVersion::MINECRAFT_1_14);
        assert!(MetaThresholds::DEFAULT.lore > MetaThresholds::DEFAULT.name);
    }

    #[test]
    fn names() {
        assert_eq!(ProtocolVersion::from_name("1.14"), Some(ProtocolVersion(477)));
        assert_eq!(ProtocolVersion::from_name("1.15"), None);
        assert_eq!(ProtocolVersion::MINECRAFT_1_8.to_string(), "1.8 (47)");
        assert_eq!(ProtocolVersion(1000).to_string(), "1000");
    }

}
