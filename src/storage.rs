use crate::model::Snapshot;
use anyhow::Context;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub trait Storage {
    /// Charge un état de génération depuis un support.
    fn load(&self) -> anyhow::Result<Snapshot>;
    /// Sauvegarde de manière atomique.
    fn save(&self, snapshot: &Snapshot) -> anyhow::Result<()>;
}

pub struct JsonStorage {
    path: PathBuf,
}

impl JsonStorage {
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl Storage for JsonStorage {
    fn load(&self) -> anyhow::Result<Snapshot> {
        let data =
            fs::read(&self.path).with_context(|| format!("reading {}", self.path.display()))?;
        let snapshot: Snapshot = serde_json::from_slice(&data)
            .with_context(|| format!("parsing {}", self.path.display()))?;
        Ok(snapshot)
    }

    fn save(&self, snapshot: &Snapshot) -> anyhow::Result<()> {
        let json = serde_json::to_vec_pretty(snapshot)?;
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).with_context(|| "creating temp file")?;
        tmp.write_all(&json)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).with_context(|| "atomic rename")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DayType, Medic, MedicId, Round, ShiftSlot};
    use chrono::{NaiveDate, Weekday};
    use tempfile::tempdir;

    #[test]
    fn save_then_load_keeps_counters_and_blocks() {
        let d = NaiveDate::from_ymd_opt(2025, 11, 1).unwrap();
        let mut ana = Medic::new("ana", 6, 1).with_preferences([DayType::Weekday(Weekday::Sat)]);
        ana.stats_mut(11).increment(DayType::Weekday(Weekday::Sat));
        let mut slot = ShiftSlot::new(d, Round::Night, 1);
        slot.assigned.push(ana.id.clone());
        let mut next = ShiftSlot::new(d.succ_opt().unwrap(), Round::Day, 1);
        next.block([&MedicId::new("ana")]);

        let snapshot = Snapshot {
            medics: vec![ana],
            slots: vec![slot, next],
        };

        let dir = tempdir().unwrap();
        let store = JsonStorage::open(dir.path().join("state.json"));
        store.save(&snapshot).unwrap();
        let back = store.load().unwrap();

        let ana = back.find_medic("ana").unwrap();
        assert_eq!(ana.stats(11).get(DayType::Weekday(Weekday::Sat)), 1);
        assert!(ana.prefers(DayType::Weekday(Weekday::Sat)));
        assert_eq!(back.slots, snapshot.slots);
    }

    #[test]
    fn load_missing_file_fails() {
        let dir = tempdir().unwrap();
        let store = JsonStorage::open(dir.path().join("nope.json"));
        assert!(store.load().is_err());
    }
}
