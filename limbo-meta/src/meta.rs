//! Item display metadata, validated once and then encoded to NBT for any client
//! protocol version.

use std::borrow::Cow;
use std::io::Write;

use flate2::write::GzEncoder;
use flate2::Compression;
use serde::Deserialize;
use tracing::trace;

use crate::java::JavaRandom;
use crate::nbt::{self, Nbt, NbtCompound, NbtError};
use crate::proto::{MetaThresholds, ProtocolVersion, TextField};
use crate::skull::{SkullError, SkullProfile};
use crate::text::{self, Text, TextError};


/// Every tooltip section is hidden on encoded items.
const HIDE_FLAGS: i32 = 255;


/// Something that gives the display name and lore of an item.
pub trait DisplaySource {

    /// The display name, none to keep the client default name.
    fn name(&self) -> Option<Cow<'_, Text>>;

    /// Lines of lore, in display order.
    fn lore(&self) -> Cow<'_, [Text]>;

}

/// The different kinds of item definitions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ItemDisplay {
    /// No name or lore, the item only shows its material.
    #[default]
    Blank,
    /// A fixed name and lore.
    Static {
        name: Option<Text>,
        lore: Vec<Text>,
    },
}

impl DisplaySource for ItemDisplay {

    fn name(&self) -> Option<Cow<'_, Text>> {
        match self {
            ItemDisplay::Blank => None,
            ItemDisplay::Static { name, .. } => name.as_ref().map(Cow::Borrowed),
        }
    }

    fn lore(&self) -> Cow<'_, [Text]> {
        match self {
            ItemDisplay::Blank => Cow::Borrowed(&[]),
            ItemDisplay::Static { lore, .. } => Cow::Borrowed(&lore[..]),
        }
    }

}


/// Item metadata as found in configuration files.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ItemMetaConfig {
    /// Leather armor color, if any.
    pub color: Option<i32>,
    /// Show the enchantment glint, ignored when a skull owner is given.
    pub enchanted: bool,
    /// Skull owner specification, see [`SkullProfile::parse`].
    pub skull_owner: Option<String>,
}


/// Display metadata of an item. It is immutable once created, encoding it has no side
/// effect and can be done concurrently.
#[derive(Debug, Clone)]
pub struct ItemMeta<D = ItemDisplay> {
    has_color: bool,
    color: i32,
    enchanted: bool,
    skull: Option<SkullProfile>,
    display: D,
}

impl<D: DisplaySource> ItemMeta<D> {

    /// Create the metadata, the skull placeholder name is taken from a freshly seeded
    /// random generator.
    pub fn new(
        has_color: bool,
        color: i32,
        enchanted: bool,
        skull_owner: Option<&str>,
        display: D,
    ) -> Result<Self, SkullError> {
        Self::with_rand(has_color, color, enchanted, skull_owner, display, &mut JavaRandom::new_seeded())
    }

    /// Create the metadata, using the given generator for the skull placeholder name.
    /// An enchanted skull is not possible, so enchantment is ignored if the skull
    /// owner is not blank.
    pub fn with_rand(
        has_color: bool,
        color: i32,
        enchanted: bool,
        skull_owner: Option<&str>,
        display: D,
        rand: &mut JavaRandom,
    ) -> Result<Self, SkullError> {

        let skull = SkullProfile::parse(skull_owner, rand)?;

        Ok(Self {
            has_color,
            color,
            enchanted: enchanted && skull.is_none(),
            skull,
            display,
        })

    }

    /// Create the metadata from its configuration.
    pub fn from_config(config: &ItemMetaConfig, display: D) -> Result<Self, SkullError> {
        Self::new(
            config.color.is_some(),
            config.color.unwrap_or(0),
            config.enchanted,
            config.skull_owner.as_deref(),
            display,
        )
    }

    /// Encode the metadata for the given client version.
    #[inline]
    pub fn encode(&self, version: ProtocolVersion) -> Result<NbtCompound, TextError> {
        self.encode_with(version, &MetaThresholds::DEFAULT)
    }

    /// Encode the metadata for the given client version, using custom version
    /// thresholds.
    pub fn encode_with(&self, version: ProtocolVersion, thresholds: &MetaThresholds) -> Result<NbtCompound, TextError> {

        trace!("encoding item meta for {version}");

        let mut display = NbtCompound::new();

        if let Some(name) = self.display.name() {
            display.insert("Name", text::encode_field(&name, TextField::Name, version, thresholds)?);
        }

        let lore = self.display.lore();
        if !lore.is_empty() {
            let lines = lore.iter()
                .map(|line| text::encode_field(line, TextField::Lore, version, thresholds).map(Nbt::String))
                .collect::<Result<Vec<_>, _>>()?;
            display.insert("Lore", lines);
        }

        if self.has_color {
            display.insert("color", self.color);
        }

        let mut root = NbtCompound::new();
        root.insert("display", display);
        root.insert("HideFlags", HIDE_FLAGS);

        if self.enchanted {
            // A single enchantment is enough for the glint, it is hidden by the flags.
            let mut ench = NbtCompound::new();
            if version >= thresholds.enchantments {
                ench.insert("id", "minecraft:sharpness");
                ench.insert("lvl", 1i16);
                root.insert("Enchantments", vec![Nbt::Compound(ench)]);
            } else {
                ench.insert("id", 0i32);
                ench.insert("lvl", 1i16);
                root.insert("ench", vec![Nbt::Compound(ench)]);
            }
        }

        if let Some(skull) = &self.skull {

            let mut texture = NbtCompound::new();
            texture.insert("Value", skull.texture());

            let mut properties = NbtCompound::new();
            properties.insert("textures", vec![Nbt::Compound(texture)]);

            let mut owner = NbtCompound::new();
            owner.insert("Id", Nbt::IntArray(skull.id().to_vec()));
            owner.insert("Name", skull.placeholder_name());
            owner.insert("Properties", properties);

            root.insert("SkullOwner", owner);

        }

        Ok(root)

    }

    /// Encode the metadata and write it as binary NBT, as embedded in an item stack
    /// of the given client version. Before 1.8 the NBT is gzip compressed, the slot
    /// length prefix of the compressed data is left to the caller.
    pub fn write_nbt(&self, version: ProtocolVersion, writer: impl Write) -> Result<(), MetaError> {

        let thresholds = &MetaThresholds::DEFAULT;
        let root = Nbt::Compound(self.encode_with(version, thresholds)?);

        if version < thresholds.uncompressed_nbt {
            let mut encoder = GzEncoder::new(writer, Compression::default());
            nbt::to_writer(&mut encoder, &root)?;
            encoder.finish().map_err(NbtError::Io)?;
        } else if version >= thresholds.nameless_nbt {
            nbt::to_writer_nameless(writer, &root)?;
        } else {
            nbt::to_writer(writer, &root)?;
        }

        Ok(())

    }

}

impl<D> ItemMeta<D> {

    #[inline]
    pub fn has_color(&self) -> bool {
        self.has_color
    }

    #[inline]
    pub fn color(&self) -> i32 {
        self.color
    }

    #[inline]
    pub fn is_enchanted(&self) -> bool {
        self.enchanted
    }

    #[inline]
    pub fn skull(&self) -> Option<&SkullProfile> {
        self.skull.as_ref()
    }

    #[inline]
    pub fn display(&self) -> &D {
        &self.display
    }

}


/// Error returned when writing encoded metadata.
#[derive(thiserror::Error, Debug)]
pub enum MetaError {
    #[error("text: {0}")]
    Text(#[from] TextError),
    #[error("nbt: {0}")]
    Nbt(#[from] NbtError),
}


#[cfg(test)]
mod tests {

    use super::*;
    use crate::text::NamedColor;

    const V1_12_2: ProtocolVersion = ProtocolVersion::MINECRAFT_1_12_2;
    const V1_13: ProtocolVersion = ProtocolVersion::MINECRAFT_1_13;
    const V1_14: ProtocolVersion = ProtocolVersion::MINECRAFT_1_14;

    fn meta(has_color: bool, color: i32, enchanted: bool, skull_owner: Option<&str>) -> ItemMeta {
        let display = ItemDisplay::Static {
            name: Some(Text::new("Survival").color(NamedColor::Green)),
            lore: vec![Text::new("Join").color(NamedColor::Gray), Text::new("now")],
        };
        ItemMeta::with_rand(has_color, color, enchanted, skull_owner, display, &mut JavaRandom::new(0)).unwrap()
    }

    #[test]
    fn color() {

        let root = meta(true, 0x123456, false, None).encode(V1_13).unwrap();
        assert_eq!(root.get_compound("display").unwrap().get_int("color"), Some(0x123456));

        let root = meta(false, 0x123456, false, None).encode(V1_13).unwrap();
        assert!(!root.get_compound("display").unwrap().contains_key("color"));

    }

    #[test]
    fn hide_flags() {
        for version in [V1_12_2, V1_13, V1_14] {
            for enchanted in [false, true] {
                let root = meta(false, 0, enchanted, Some("TEX")).encode(version).unwrap();
                assert_eq!(root.get_int("HideFlags"), Some(255));
            }
        }
    }

    #[test]
    fn skull_disables_enchant() {

        let skull = meta(false, 0, true, Some("1,2,3,4;TEX"));
        assert!(!skull.is_enchanted());

        let root = skull.encode(V1_14).unwrap();
        assert!(!root.contains_key("Enchantments"));
        assert!(!root.contains_key("ench"));

        // A blank skull owner is no skull at all.
        let blank = meta(false, 0, true, Some("   "));
        assert!(blank.is_enchanted());
        assert!(blank.skull().is_none());

    }

    #[test]
    fn enchantments() {

        let root = meta(false, 0, true, None).encode(V1_13).unwrap();
        assert!(!root.contains_key("ench"));
        let list = root.get_list("Enchantments").unwrap();
        assert_eq!(list.len(), 1);
        let ench = list[0].as_compound().unwrap();
        assert_eq!(ench.get_string("id"), Some("minecraft:sharpness"));
        assert_eq!(ench.get_short("lvl"), Some(1));

        let root = meta(false, 0, true, None).encode(V1_12_2).unwrap();
        assert!(!root.contains_key("Enchantments"));
        let list = root.get_list("ench").unwrap();
        assert_eq!(list.len(), 1);
        let ench = list[0].as_compound().unwrap();
        assert_eq!(ench.get_int("id"), Some(0));
        assert_eq!(ench.get_short("lvl"), Some(1));

    }

    #[test]
    fn name_and_lore() {

        let meta = meta(false, 0, false, None);

        let root = meta.encode(V1_12_2).unwrap();
        let display = root.get_compound("display").unwrap();
        assert_eq!(display.get_string("Name"), Some("§aSurvival"));
        assert_eq!(display.get_list("Lore").unwrap(), [Nbt::from("§7Join"), Nbt::from("now")]);

        let root = meta.encode(V1_13).unwrap();
        let display = root.get_compound("display").unwrap();
        assert_eq!(display.get_string("Name"), Some(r#"{"text":"Survival","color":"green"}"#));
        assert_eq!(display.get_list("Lore").unwrap(), [Nbt::from("§7Join"), Nbt::from("now")]);

        let root = meta.encode(V1_14).unwrap();
        let display = root.get_compound("display").unwrap();
        assert_eq!(display.get_list("Lore").unwrap(), [
            Nbt::from(r#"{"text":"Join","color":"gray"}"#),
            Nbt::from(r#"{"text":"now"}"#),
        ]);

    }

    #[test]
    fn blank_display() {
        let meta = ItemMeta::with_rand(false, 0, false, None, ItemDisplay::Blank, &mut JavaRandom::new(0)).unwrap();
        let root = meta.encode(V1_14).unwrap();
        assert!(root.get_compound("display").unwrap().is_empty());
        assert_eq!(root.keys().collect::<Vec<_>>(), ["display", "HideFlags"]);
    }

    #[test]
    fn skull_owner() {

        let root = meta(true, 7, false, Some("1,2,3,4;TEX")).encode(V1_14).unwrap();
        assert_eq!(root.keys().collect::<Vec<_>>(), ["display", "HideFlags", "SkullOwner"]);

        let owner = root.get_compound("SkullOwner").unwrap();
        assert_eq!(owner.keys().collect::<Vec<_>>(), ["Id", "Name", "Properties"]);
        assert_eq!(owner.get_int_array("Id"), Some(&[1, 2, 3, 4][..]));
        assert_eq!(owner.get_string("Name"), Some("npc-1155484576"));

        let textures = owner.get_compound("Properties").unwrap().get_list("textures").unwrap();
        assert_eq!(textures.len(), 1);
        assert_eq!(textures[0].as_compound().unwrap().get_string("Value"), Some("TEX"));

    }

    #[test]
    fn invalid_skull_owner() {
        let res = ItemMeta::with_rand(false, 0, false, Some("1,2,3;TEX"), ItemDisplay::Blank, &mut JavaRandom::new(0));
        assert!(matches!(res, Err(SkullError::InvalidIdArrayLength(3))));
    }

    #[test]
    fn encode_is_pure() {

        let meta = meta(true, 1, false, Some("TEX"));
        assert_eq!(meta.encode(V1_13).unwrap(), meta.encode(V1_13).unwrap());

        let expected = meta.encode(V1_14).unwrap();
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| assert_eq!(meta.encode(V1_14).unwrap(), expected));
            }
        });

    }

    #[test]
    fn placeholder_name_is_fixed() {
        let meta = ItemMeta::new(false, 0, false, Some("TEX"), ItemDisplay::Blank).unwrap();
        let a = meta.encode(V1_14).unwrap();
        let b = meta.encode(V1_12_2).unwrap();
        assert_eq!(
            a.get_compound("SkullOwner").unwrap().get_string("Name"),
            b.get_compound("SkullOwner").unwrap().get_string("Name"),
        );
    }

    #[test]
    fn write_nbt() {

        let meta = ItemMeta::with_rand(false, 0, false, None, ItemDisplay::Blank, &mut JavaRandom::new(0)).unwrap();

        let mut named = Vec::new();
        meta.write_nbt(V1_14, &mut named).unwrap();
        assert_eq!(&named[..3], &[10, 0, 0]);
        assert_eq!(nbt::from_reader(&named[..]).unwrap(), Nbt::Compound(meta.encode(V1_14).unwrap()));

        let mut nameless = Vec::new();
        meta.write_nbt(ProtocolVersion::MINECRAFT_1_20_2, &mut nameless).unwrap();
        assert_eq!(nameless.len(), named.len() - 2);
        assert_eq!(nbt::from_reader_nameless(&nameless[..]).unwrap(), Nbt::Compound(meta.encode(V1_14).unwrap()));

    }

    #[test]
    fn write_nbt_compressed() {

        use flate2::read::GzDecoder;

        let meta = meta(true, 3, true, None);
        let version = ProtocolVersion::MINECRAFT_1_7_2;

        let mut compressed = Vec::new();
        meta.write_nbt(version, &mut compressed).unwrap();
        assert_eq!(&compressed[..2], &[0x1F, 0x8B]);

        let decoded = nbt::from_reader(GzDecoder::new(&compressed[..])).unwrap();
        assert_eq!(decoded, Nbt::Compound(meta.encode(version).unwrap()));

        // From 1.8 the same tree is written without compression.
        let mut plain = Vec::new();
        meta.write_nbt(ProtocolVersion::MINECRAFT_1_8, &mut plain).unwrap();
        assert_eq!(&plain[..3], &[10, 0, 0]);

    }

    #[test]
    fn config() {

        let config: ItemMetaConfig = serde_json::from_str(r#"{"color": 16711680, "enchanted": true}"#).unwrap();
        let meta = ItemMeta::from_config(&config, ItemDisplay::Blank).unwrap();
        assert!(meta.has_color());
        assert_eq!(meta.color(), 0xFF0000);
        assert!(meta.is_enchanted());

        let config: ItemMetaConfig = serde_json::from_str(r#"{"enchanted": true, "skull-owner": "TEX"}"#).unwrap();
        let meta = ItemMeta::from_config(&config, ItemDisplay::Blank).unwrap();
        assert!(!meta.has_color());
        assert!(!meta.is_enchanted());
        assert_eq!(meta.skull().unwrap().texture(), "TEX");

    }

}
