//! Skull owner parsing, giving the profile of a custom head texture.
//!
//! A skull owner is written `<id>;<texture>` where the id is either four comma
//! separated integers or a UUID, or just `<texture>` in which case the nil UUID is
//! used.

use std::num::ParseIntError;

use tracing::debug;
use uuid::Uuid;

use crate::java::JavaRandom;


/// Id used when the specification only gives a texture.
const NIL_UUID: &str = "00000000-0000-0000-0000-000000000000";

/// A resolved skull profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkullProfile {
    /// The profile UUID as four big-endian integers.
    id: [i32; 4],
    /// The base64 texture property value, this is opaque to us.
    texture: String,
    /// A generated profile name, it has no relation with the id or texture.
    placeholder_name: String,
}

impl SkullProfile {

    /// Parse a skull owner specification, returning none if the specification is
    /// absent or blank. The random generator is used once for the placeholder name.
    pub fn parse(spec: Option<&str>, rand: &mut JavaRandom) -> Result<Option<Self>, SkullError> {

        let Some(spec) = spec.filter(|s| !s.trim().is_empty()) else {
            return Ok(None);
        };

        let (id_spec, texture) = spec.split_once(';').unwrap_or((NIL_UUID, spec));

        let id = if id_spec.contains(',') {
            parse_id_array(id_spec)?
        } else {
            uuid_to_id(parse_uuid(id_spec)?)
        };

        let placeholder_name = format!("npc{}", rand.next_int());
        debug!("resolved skull profile {placeholder_name} with id {id:?}");

        Ok(Some(Self {
            id,
            texture: texture.to_string(),
            placeholder_name,
        }))

    }

    #[inline]
    pub fn id(&self) -> [i32; 4] {
        self.id
    }

    /// Reconstruct the UUID from the id array.
    pub fn uuid(&self) -> Uuid {
        let bits = self.id.iter().fold(0u128, |acc, &n| acc << 32 | n as u32 as u128);
        Uuid::from_u128(bits)
    }

    #[inline]
    pub fn texture(&self) -> &str {
        &self.texture
    }

    #[inline]
    pub fn placeholder_name(&self) -> &str {
        &self.placeholder_name
    }

}

/// Split the 128 bits of the UUID into four integers, most significant first.
fn uuid_to_id(uuid: Uuid) -> [i32; 4] {
    let bits = uuid.as_u128();
    [(bits >> 96) as i32, (bits >> 64) as i32, (bits >> 32) as i32, bits as i32]
}

/// Parse a UUID, only accepting the hyphenated `8-4-4-4-12` form.
fn parse_uuid(id_spec: &str) -> Result<Uuid, SkullError> {

    let hyphenated = id_spec.len() == 36
        && id_spec.char_indices().all(|(i, c)| (c == '-') == matches!(i, 8 | 13 | 18 | 23));

    if !hyphenated {
        return Err(SkullError::InvalidUuid(id_spec.to_string()));
    }

    Uuid::try_parse(id_spec).map_err(|_| SkullError::InvalidUuid(id_spec.to_string()))

}

fn parse_id_array(id_spec: &str) -> Result<[i32; 4], SkullError> {

    let mut tokens = id_spec.split(',').collect::<Vec<_>>();
    // Trailing empty tokens are ignored, "1,2,3,4," is still four integers.
    while tokens.last().is_some_and(|t| t.is_empty()) {
        tokens.pop();
    }

    let ints = tokens.into_iter()
        .map(|token| token.parse::<i32>().map_err(|e| SkullError::InvalidInteger(token.to_string(), e)))
        .collect::<Result<Vec<_>, _>>()?;

    let len = ints.len();
    ints.try_into().map_err(|_| SkullError::InvalidIdArrayLength(len))

}


/// Error returned when a skull owner specification is invalid.
#[derive(thiserror::Error, Debug)]
pub enum SkullError {
    #[error("Invalid id array length, expected 4 integers but got {0}.")]
    InvalidIdArrayLength(usize),
    #[error("Invalid integer {0:?} in id array: {1}")]
    InvalidInteger(String, #[source] ParseIntError),
    #[error("Invalid UUID {0:?}, expected the hyphenated form.")]
    InvalidUuid(String),
}
