//! Text components as shown in item names and lore, with the two ways clients expect
//! them: JSON components and legacy strings with `§` formatting codes.

use std::borrow::Cow;
use std::fmt::Write as _;

use serde::Serialize;

use crate::proto::{MetaThresholds, ProtocolVersion, TextField};


/// Internal macro to define the named colors with their legacy code and RGB value.
macro_rules! named_colors {
    (
        $($name:ident = $code:literal, $json:literal, $rgb:literal),* $(,)?
    ) => {

        /// One of the 16 colors known to all client versions.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum NamedColor {
            $($name,)*
        }

        impl NamedColor {

            pub const ALL: [Self; 16] = [$(Self::$name,)*];

            /// The character following `§` to select this color in a legacy string.
            pub fn code(self) -> char {
                match self {
                    $(Self::$name => $code,)*
                }
            }

            /// The name of this color in a JSON component.
            pub fn name(self) -> &'static str {
                match self {
                    $(Self::$name => $json,)*
                }
            }

            pub fn rgb(self) -> u32 {
                match self {
                    $(Self::$name => $rgb,)*
                }
            }

        }

    };
}

named_colors! {
    Black       = '0', "black",         0x000000,
    DarkBlue    = '1', "dark_blue",     0x0000AA,
    DarkGreen   = '2', "dark_green",    0x00AA00,
    DarkAqua    = '3', "dark_aqua",     0x00AAAA,
    DarkRed     = '4', "dark_red",      0xAA0000,
    DarkPurple  = '5', "dark_purple",   0xAA00AA,
    Gold        = '6', "gold",          0xFFAA00,
    Gray        = '7', "gray",          0xAAAAAA,
    DarkGray    = '8', "dark_gray",     0x555555,
    Blue        = '9', "blue",          0x5555FF,
    Green       = 'a', "green",         0x55FF55,
    Aqua        = 'b', "aqua",          0x55FFFF,
    Red         = 'c', "red",           0xFF5555,
    LightPurple = 'd', "light_purple",  0xFF55FF,
    Yellow      = 'e', "yellow",        0xFFFF55,
    White       = 'f', "white",         0xFFFFFF,
}

impl NamedColor {

    /// Find the named color closest to the given RGB value.
    pub fn nearest(rgb: u32) -> Self {

        fn channels(rgb: u32) -> [i32; 3] {
            [(rgb >> 16 & 0xFF) as i32, (rgb >> 8 & 0xFF) as i32, (rgb & 0xFF) as i32]
        }

        let target = channels(rgb);
        let mut best = Self::White;
        let mut best_dist = i32::MAX;

        for color in Self::ALL {
            let dist = channels(color.rgb()).iter()
                .zip(target)
                .map(|(&a, b)| (a - b) * (a - b))
                .sum::<i32>();
            if dist < best_dist {
                best = color;
                best_dist = dist;
            }
        }

        best

    }

}


/// Color of a text component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextColor {
    Named(NamedColor),
    /// A 24-bit RGB color, clients before 1.16 only see the closest named color.
    Rgb(u32),
}

impl TextColor {

    /// Get the named color to use when RGB colors are not supported.
    pub fn downsample(self) -> NamedColor {
        match self {
            TextColor::Named(color) => color,
            TextColor::Rgb(rgb) => NamedColor::nearest(rgb),
        }
    }

    fn json_name(self, hex: bool) -> Cow<'static, str> {
        match self {
            TextColor::Rgb(rgb) if hex => Cow::Owned(format!("#{:06x}", rgb & 0xFFFFFF)),
            color => Cow::Borrowed(color.downsample().name()),
        }
    }

}

impl From<NamedColor> for TextColor {
    #[inline]
    fn from(color: NamedColor) -> Self {
        Self::Named(color)
    }
}


/// Style of a text component, any unset property is inherited from the parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextStyle {
    pub color: Option<TextColor>,
    pub obfuscated: Option<bool>,
    pub bold: Option<bool>,
    pub strikethrough: Option<bool>,
    pub underlined: Option<bool>,
    pub italic: Option<bool>,
}

impl TextStyle {

    /// Return this style with unset properties taken from the parent style.
    fn inherit(self, parent: &TextStyle) -> TextStyle {
        TextStyle {
            color: self.color.or(parent.color),
            obfuscated: self.obfuscated.or(parent.obfuscated),
            bold: self.bold.or(parent.bold),
            strikethrough: self.strikethrough.or(parent.strikethrough),
            underlined: self.underlined.or(parent.underlined),
            italic: self.italic.or(parent.italic),
        }
    }

    /// Decorations enabled by this style, in legacy code order.
    fn decorations(&self) -> u8 {
        [self.obfuscated, self.bold, self.strikethrough, self.underlined, self.italic]
            .into_iter()
            .enumerate()
            .fold(0, |acc, (i, d)| if d == Some(true) { acc | 1 << i } else { acc })
    }

}

/// Legacy codes of decorations, index matching bits from `TextStyle::decorations`.
const DECORATION_CODES: [char; 5] = ['k', 'l', 'm', 'n', 'o'];
const SECTION: char = '§';


/// A text component with its children.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Text {
    pub content: String,
    pub style: TextStyle,
    pub extra: Vec<Text>,
}

impl Text {

    pub fn new(content: impl Into<String>) -> Self {
        Self { content: content.into(), ..Default::default() }
    }

    pub fn color(mut self, color: impl Into<TextColor>) -> Self {
        self.style.color = Some(color.into());
        self
    }

    pub fn bold(mut self, bold: bool) -> Self {
        self.style.bold = Some(bold);
        self
    }

    pub fn italic(mut self, italic: bool) -> Self {
        self.style.italic = Some(italic);
        self
    }

    pub fn underlined(mut self, underlined: bool) -> Self {
        self.style.underlined = Some(underlined);
        self
    }

    pub fn strikethrough(mut self, strikethrough: bool) -> Self {
        self.style.strikethrough = Some(strikethrough);
        self
    }

    pub fn obfuscated(mut self, obfuscated: bool) -> Self {
        self.style.obfuscated = Some(obfuscated);
        self
    }

    /// Append a child component, inheriting this component's style.
    pub fn append(mut self, child: Text) -> Self {
        self.extra.push(child);
        self
    }

    /// Get the text without any formatting.
    pub fn to_plain(&self) -> String {
        let mut out = String::new();
        self.visit(&TextStyle::default(), &mut |_, content| out.push_str(content));
        out
    }

    /// Serialize to a legacy string, colors and decorations being `§` codes. RGB colors
    /// are replaced by their closest named color.
    pub fn to_legacy(&self) -> String {

        let mut out = String::new();
        let mut current: (Option<NamedColor>, u8) = (None, 0);

        self.visit(&TextStyle::default(), &mut |style, content| {

            if content.is_empty() {
                return;
            }

            let format = (style.color.map(TextColor::downsample), style.decorations());
            if format != current {

                let removed = current.1 & !format.1 != 0;
                if format.0 != current.0 || removed {
                    // A color code resets all decorations, so they are all written again.
                    match format.0 {
                        Some(color) => { out.push(SECTION); out.push(color.code()); }
                        None => { out.push(SECTION); out.push('r'); }
                    }
                    push_decorations(&mut out, format.1);
                } else {
                    push_decorations(&mut out, format.1 & !current.1);
                }

                current = format;

            }

            out.push_str(content);

        });

        out

    }

    /// Serialize to a JSON component for the given client version.
    pub fn to_json(&self, version: ProtocolVersion, thresholds: &MetaThresholds) -> Result<String, TextError> {
        let json = JsonText::new(self, version >= thresholds.hex_color);
        Ok(serde_json::to_string(&json)?)
    }

    /// Depth-first visit of this component and its children with their resolved style.
    fn visit(&self, parent: &TextStyle, func: &mut impl FnMut(&TextStyle, &str)) {
        let style = self.style.inherit(parent);
        func(&style, &self.content);
        for child in &self.extra {
            child.visit(&style, func);
        }
    }

}

impl From<&str> for Text {
    fn from(content: &str) -> Self {
        Self::new(content)
    }
}

impl From<String> for Text {
    fn from(content: String) -> Self {
        Self::new(content)
    }
}

fn push_decorations(out: &mut String, decorations: u8) {
    for (i, code) in DECORATION_CODES.into_iter().enumerate() {
        if decorations & (1 << i) != 0 {
            let _ = write!(out, "{SECTION}{code}");
        }
    }
}


/// Borrowed JSON view of a text component.
#[derive(Serialize)]
struct JsonText<'a> {
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<Cow<'static, str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    obfuscated: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bold: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    strikethrough: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    underlined: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    italic: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    extra: Vec<JsonText<'a>>,
}

impl<'a> JsonText<'a> {

    fn new(text: &'a Text, hex: bool) -> Self {
        let style = &text.style;
        Self {
            text: &text.content,
            color: style.color.map(|color| color.json_name(hex)),
            obfuscated: style.obfuscated,
            bold: style.bold,
            strikethrough: style.strikethrough,
            underlined: style.underlined,
            italic: style.italic,
            extra: text.extra.iter().map(|child| JsonText::new(child, hex)).collect(),
        }
    }

}


/// Serialize a text value for the given field of the display compound: a JSON
/// component from the field's threshold version, a legacy string before.
pub fn encode_field(
    text: &Text,
    field: TextField,
    version: ProtocolVersion,
    thresholds: &MetaThresholds,
) -> Result<String, TextError> {
    if version >= thresholds.text_field(field) {
        text.to_json(version, thresholds)
    } else {
        Ok(text.to_legacy())
    }
}


/// Error returned when a text value cannot be serialized.
#[derive(thiserror::Error, Debug)]
pub enum TextError {
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}
