use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Zone - a named grouping of monitored devices within one generation
///
/// The same zone name in two different generations yields two distinct rows;
/// within one generation a name is unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub idx_zone: i64,
    /// Owning generation
    pub idx_event: i64,
    pub name: String,
    pub company_name: Option<String>,
    pub address_0: Option<String>,
    pub address_1: Option<String>,
    pub address_2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
    pub enabled: bool,
    pub ts_created: DateTime<Utc>,
    pub ts_modified: DateTime<Utc>,
}

/// Insert/update payload for the zone table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewZone {
    pub idx_event: i64,
    pub name: String,
    pub company_name: Option<String>,
    pub address_0: Option<String>,
    pub address_1: Option<String>,
    pub address_2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
    pub enabled: bool,
}

impl NewZone {
    /// An enabled zone with only a name, as created during ingest
    pub fn named(idx_event: i64, name: impl Into<String>) -> Self {
        Self {
            idx_event,
            name: name.into(),
            enabled: true,
            ..Self::default()
        }
    }
}

impl From<&Zone> for NewZone {
    fn from(zone: &Zone) -> Self {
        Self {
            idx_event: zone.idx_event,
            name: zone.name.clone(),
            company_name: zone.company_name.clone(),
            address_0: zone.address_0.clone(),
            address_1: zone.address_1.clone(),
            address_2: zone.address_2.clone(),
            city: zone.city.clone(),
            state: zone.state.clone(),
            country: zone.country.clone(),
            postal_code: zone.postal_code.clone(),
            phone: zone.phone.clone(),
            notes: zone.notes.clone(),
            enabled: zone.enabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_zone_is_enabled_and_bare() {
        let zone = NewZone::named(3, "campus-a");
        assert_eq!(zone.idx_event, 3);
        assert_eq!(zone.name, "campus-a");
        assert!(zone.enabled);
        assert!(zone.notes.is_none());
        assert!(zone.city.is_none());
    }
}
