// 🏷️ Classification Table - Notable cohorts
// Static super-group IDs grouped into named cohorts, plus the NPC range check.
//
// The built-in table is compiled in and initialized on first use only.
// After that it is shared read-only; tests build their own tables.

use crate::config::SystemOperatedRange;
use anyhow::{Context as AnyhowContext, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, OnceLock};

// ============================================================================
// COHORT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cohort {
    Legacy,
    PanFam,
    Winter,
    Fire,
}

impl Cohort {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cohort::Legacy => "Legacy",
            Cohort::PanFam => "PanFam",
            Cohort::Winter => "Winter",
            Cohort::Fire => "Fire",
        }
    }
}

// ============================================================================
// BUILT-IN ENTRIES
// ============================================================================

const LEGACY: &[(i64, &str)] = &[
    (99003214, "Brave Collective"),
    (498125261, "Test Alliance Please Ignore"),
    (99004116, "Warped Intentions"),
    (99007289, "Federation Uprising"),
    (99009104, "VINDICTIVE"),
    (99010428, "Eternal Requiem"),
    (99002367, "Evictus."),
    (99008809, "Already Replaced."),
    (982284363, "Sev3rance"),
    (99009082, "The Army of Mango Alliance"),
    (99010079, "Brave United"),
    (99007439, "Blue Sun Interstellar Technologies"),
    (99003838, "Requiem Eternal"),
    (99008098, "The Watchman International Alliance"),
];

const PANFAM: &[(i64, &str)] = &[
    (1727758877, "Northern Coalition."),
    (99005338, "Pandemic Horde"),
    (386292982, "Pandemic Legion"),
    (1042504553, "Solyaris Chtonium"),
    (99000163, "Northern Associates."),
    (99003006, "Brothers of Tangra"),
    (99009289, "Reckless Contingency."),
    (99002003, "No Value"),
    (99007722, "Stellae Renascitur"),
    (99006411, "NullSechnaya Sholupen"),
    (99003557, "LowSechnaya Sholupen"),
];

const WINTER: &[(i64, &str)] = &[
    (99003581, "Fraternity."),
    (99009310, "VENI VIDI VICI."),
    (99007498, "STARCHASER Alliance"),
    (99008278, "Literally Triggered"),
    (99005393, "Blades of Grass"),
    (99006343, "Lord of Worlds Alliance"),
    (99009275, "The Stars of northern moon"),
    (99001954, "Caladrius Alliance"),
    (99009764, "Azure Citizen"),
    (99009977, "Sylvanas Super mercenary"),
];

const FIRE: &[(i64, &str)] = &[
    (1411711376, "Legion of xXDEATHXx"),
    (741557221, "Razor Alliance"),
    (99008469, "UNREAL Alliance"),
    (99009168, "Valkyrie Alliance"),
    (99001648, "P-A-T-R-I-O-T-S"),
    (99002685, "Synergy of Steel"),
    (99002392, "NEXT FORCE"),
];

static BUILTIN: OnceLock<Arc<ClassificationTable>> = OnceLock::new();

// ============================================================================
// CLASSIFICATION TABLE
// ============================================================================

/// One `id → cohort` pair, as stored in table files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationEntry {
    pub id: i64,
    pub cohort: Cohort,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassificationTable {
    entries: HashMap<i64, Cohort>,
}

impl ClassificationTable {
    /// Shared compiled-in table, built on first call
    pub fn builtin() -> Arc<ClassificationTable> {
        BUILTIN
            .get_or_init(|| {
                let cohorts = [
                    (Cohort::Legacy, LEGACY),
                    (Cohort::PanFam, PANFAM),
                    (Cohort::Winter, WINTER),
                    (Cohort::Fire, FIRE),
                ];

                let entries = cohorts.iter().flat_map(|(cohort, members)| {
                    members.iter().map(move |(id, _name)| ClassificationEntry {
                        id: *id,
                        cohort: *cohort,
                    })
                });

                Arc::new(ClassificationTable::from_entries(entries))
            })
            .clone()
    }

    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = ClassificationEntry>,
    {
        ClassificationTable {
            entries: entries.into_iter().map(|e| (e.id, e.cohort)).collect(),
        }
    }

    /// Load a table from a JSON array of `{"id": .., "cohort": ..}` objects
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read classification file: {:?}", path.as_ref()))?;

        let entries: Vec<ClassificationEntry> =
            serde_json::from_str(&content).context("Failed to parse classification JSON")?;

        Ok(ClassificationTable::from_entries(entries))
    }

    pub fn lookup(&self, id: i64) -> Option<Cohort> {
        self.entries.get(&id).copied()
    }

    pub fn is_flagged(&self, id: i64) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// NPC corporation check against the default range
pub fn is_system_operated(group_id: i64) -> bool {
    SystemOperatedRange::NPC_CORPORATIONS.contains(group_id)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup() {
        let table = ClassificationTable::builtin();

        assert_eq!(table.lookup(99003214), Some(Cohort::Legacy));
        assert_eq!(table.lookup(386292982), Some(Cohort::PanFam));
        assert_eq!(table.lookup(99003581), Some(Cohort::Winter));
        assert_eq!(table.lookup(741557221), Some(Cohort::Fire));
        assert_eq!(table.lookup(500), None);
    }

    #[test]
    fn test_builtin_is_initialized_once() {
        let a = ClassificationTable::builtin();
        let b = ClassificationTable::builtin();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.len(), LEGACY.len() + PANFAM.len() + WINTER.len() + FIRE.len());
    }

    #[test]
    fn test_is_flagged_only_for_keys() {
        let table = ClassificationTable::builtin();

        for (id, _) in LEGACY.iter().chain(PANFAM).chain(WINTER).chain(FIRE) {
            assert!(table.is_flagged(*id), "{} should be flagged", id);
        }

        for id in [0, -1, -99003214, i64::MIN, i64::MAX, 1, 99003215, 1_000_000] {
            assert!(!table.is_flagged(id), "{} should not be flagged", id);
        }
    }

    #[test]
    fn test_cohort_lookup() {
        let table = ClassificationTable::builtin();

        assert!(FIRE.iter().all(|(id, _)| table.lookup(*id) == Some(Cohort::Fire)));
        assert_eq!(table.lookup(99002392), Some(Cohort::Fire));
    }

    #[test]
    fn test_custom_table() {
        let table = ClassificationTable::from_entries(vec![ClassificationEntry {
            id: 700,
            cohort: Cohort::Winter,
        }]);

        assert!(table.is_flagged(700));
        assert!(!table.is_flagged(99003214));
        assert_eq!(table.lookup(700).map(|c| c.as_str()), Some("Winter"));
    }

    #[test]
    fn test_entries_parse_from_json() {
        let entries: Vec<ClassificationEntry> =
            serde_json::from_str(r#"[{"id": 1, "cohort": "PanFam"}]"#).unwrap();
        let table = ClassificationTable::from_entries(entries);

        assert_eq!(table.lookup(1), Some(Cohort::PanFam));
    }

    #[test]
    fn test_system_operated_range() {
        assert!(is_system_operated(1_000_000));
        assert!(is_system_operated(1_000_125));
        assert!(is_system_operated(2_000_000));
        assert!(!is_system_operated(98_000_001));
        assert!(!is_system_operated(0));
    }
}
