// 🔎 Entity references
// Users paste killboard or profile links; the entity id is the last
// non-empty path segment.

use crate::error::InvalidEntityRef;

pub const IMAGE_SERVER: &str = "https://images.evetech.net";

/// Accepts `2119066983` or e.g. `https://zkillboard.com/character/454518485/`
pub fn parse_entity_ref(input: &str) -> Result<i64, InvalidEntityRef> {
    let trimmed = input.trim();

    // query strings and fragments are not part of the path
    let path = trimmed
        .split(['?', '#'])
        .next()
        .unwrap_or_default();

    path.split('/')
        .filter(|segment| !segment.is_empty())
        .last()
        .and_then(|segment| segment.parse::<i64>().ok())
        .filter(|id| *id > 0)
        .ok_or_else(|| InvalidEntityRef {
            input: input.to_string(),
        })
}

pub fn portrait_url(entity_id: i64) -> String {
    format!("{}/characters/{}/portrait", IMAGE_SERVER, entity_id)
}
