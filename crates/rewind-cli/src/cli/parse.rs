use anyhow::{Context, bail};
use chrono::{DateTime, Utc};
use rewind_core::{EntityRef, timestamp};

/// Parse `Type#id`. `Type#?` and a bare `Type` name an unsaved entity.
pub fn parse_entity(value: &str) -> anyhow::Result<EntityRef> {
    let (entity_type, id) = value.split_once('#').unwrap_or((value, "?"));
    if entity_type.is_empty() {
        bail!("invalid entity '{value}': expected Type#id");
    }
    if id == "?" || id.is_empty() {
        return Ok(EntityRef::unsaved(entity_type));
    }
    let id = id
        .parse::<i64>()
        .with_context(|| format!("invalid entity id in '{value}'"))?;
    Ok(EntityRef::new(entity_type, id))
}

pub fn parse_optional_entity(value: Option<&str>) -> anyhow::Result<Option<EntityRef>> {
    value.map(parse_entity).transpose()
}

/// Parse `YYYY-MM-DD HH:MM:SS` (UTC) or RFC 3339.
pub fn parse_time(value: &str) -> anyhow::Result<DateTime<Utc>> {
    timestamp::parse(value).with_context(|| format!("invalid time '{value}'"))
}
