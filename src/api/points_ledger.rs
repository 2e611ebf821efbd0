use std::fs;
use std::io::{ ErrorKind, Write };
use std::path::Path;
use std::sync::{ Mutex, MutexGuard };
use serde_json::json;
use crate::api::error::{ Error, Result };
use crate::api::models::{ LedgerRecord, UserAccount, UserId };
use crate::api::ResourceService;

/// Point balances of every known card, backed by a line per user
/// (`id, name, balance`). Each change rewrites the whole file while the
/// ledger lock is held.
pub struct PointsLedger {
    resource_service: ResourceService,
    ledger_file_path: Box<Path>,
    records: Mutex<Vec<LedgerRecord>>
}

impl PointsLedger {
    pub fn load(resource_service: ResourceService, ledger_file_path: Box<Path>) -> Result<PointsLedger> {
        let content = match fs::read_to_string(&ledger_file_path) {
            Ok(content) => content,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                log::warn!("{}", resource_service.render(
                    "ledger_missing_warn_message_template",
                    &json!({ "path": ledger_file_path.display().to_string() })
                ));
                String::new()
            },
            Err(error) => return Err(error.into())
        };
        let records = Self::parse(&resource_service, &content);
        log::info!("{}", resource_service.render(
            "ledger_loaded_info_message_template",
            &json!({ "count": records.len(), "path": ledger_file_path.display().to_string() })
        ));
        Ok(PointsLedger { resource_service, ledger_file_path, records: Mutex::new(records) })
    }

    fn parse(resource_service: &ResourceService, content: &str) -> Vec<LedgerRecord> {
        let mut records: Vec<LedgerRecord> = vec![];
        for (index, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let message_data = &json!({ "line": index + 1, "content": line });
            match LedgerRecord::parse(line) {
                Some(record) if records.iter().any(|known| known.account.id == record.account.id) => {
                    log::warn!("{}", resource_service.render("ledger_duplicate_line_warn_message_template", message_data));
                },
                Some(record) => records.push(record),
                None => {
                    log::warn!("{}", resource_service.render("ledger_corrupt_line_warn_message_template", message_data));
                }
            }
        }
        records
    }

    pub fn find(&self, user: &UserId) -> Result<Option<UserAccount>> {
        let records = self.lock_records()?;
        Ok(records.iter().find(|record| &record.account.id == user).map(|record| record.account.clone()))
    }

    pub fn balance(&self, user: &UserId) -> Result<f64> {
        self.find(user)?.map(|account| account.balance).ok_or_else(|| Error::UnknownUser(user.clone()))
    }

    pub fn accounts(&self) -> Result<Vec<UserAccount>> {
        Ok(self.lock_records()?.iter().map(|record| record.account.clone()).collect())
    }

    /// Adds `delta` to the user's balance and persists it. Returns the new
    /// balance. Nothing changes in memory if the write fails.
    pub fn apply(&self, user: &UserId, delta: f64) -> Result<f64> {
        if !delta.is_finite() {
            return Err(Error::Input(format!("{} is not a point amount", delta)));
        }
        let mut records = self.lock_records()?;
        let index = records
            .iter()
            .position(|record| &record.account.id == user)
            .ok_or_else(|| Error::UnknownUser(user.clone()))?;
        let mut updated = records.clone();
        let balance = updated[index].account.balance + delta;
        updated[index].set_balance(balance);
        self.write(&updated)?;
        *records = updated;
        log::info!("{}", self.resource_service.render(
            "points_applied_info_message_template",
            &json!({ "user": user.as_str(), "delta": delta, "balance": balance })
        ));
        Ok(balance)
    }

    fn write(&self, records: &[LedgerRecord]) -> Result<()> {
        let mut content = String::new();
        for record in records {
            content.push_str(&record.to_line());
            content.push('\n');
        }
        if let Some(parent) = self.ledger_file_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let temp_file_path = self.ledger_file_path.with_extension("tmp");
        let mut ledger_file = fs::File::create(&temp_file_path)?;
        ledger_file.write_all(content.as_bytes())?;
        ledger_file.sync_all()?;
        fs::rename(&temp_file_path, &self.ledger_file_path)?;
        Ok(())
    }

    fn lock_records(&self) -> Result<MutexGuard<'_, Vec<LedgerRecord>>> {
        self.records.lock().map_err(|_| Error::poisoned("points ledger"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    const LEDGER: &str = "1234, Alice, 100.0\n\ngarbage line\n5678, Bob, 12.25\n9, Carol\n";

    fn ledger(dir: &Path, content: &str) -> PointsLedger {
        let file_path = dir.join("accepted_id.txt");
        fs::write(&file_path, content).unwrap();
        PointsLedger::load(ResourceService::embedded().unwrap(), file_path.into_boxed_path()).unwrap()
    }

    #[test]
    fn test_corrupt_lines_dropped_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ledger(dir.path(), LEDGER);
        let ids: Vec<String> = ledger.accounts().unwrap().iter().map(|account| account.id.to_string()).collect();
        assert_eq!(ids, vec!["1234", "5678"]);
    }

    #[test]
    fn test_apply_rewrites_only_that_user() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ledger(dir.path(), LEDGER);
        assert_eq!(ledger.apply(&UserId::from("1234"), -25.0).unwrap(), 75.0);
        let content = fs::read_to_string(dir.path().join("accepted_id.txt")).unwrap();
        assert_eq!(content, "1234, Alice, 75.0\n5678, Bob, 12.25\n");
    }

    #[test]
    fn test_apply_round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("accepted_id.txt");
        let ledger = ledger(dir.path(), LEDGER);
        let in_memory = ledger.apply(&UserId::from("5678"), 50.0).unwrap();
        let reloaded = PointsLedger::load(ResourceService::embedded().unwrap(), file_path.into_boxed_path()).unwrap();
        assert_eq!(reloaded.balance(&UserId::from("5678")).unwrap(), in_memory);
        assert_eq!(in_memory, 62.25);
    }

    #[test]
    fn test_unknown_user() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ledger(dir.path(), LEDGER);
        assert!(matches!(ledger.apply(&UserId::from("4242"), 5.0), Err(Error::UnknownUser(_))));
        assert!(ledger.find(&UserId::from("4242")).unwrap().is_none());
        assert!(matches!(ledger.balance(&UserId::from("4242")), Err(Error::UnknownUser(_))));
    }

    #[test]
    fn test_missing_file_is_empty_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = PointsLedger::load(
            ResourceService::embedded().unwrap(),
            dir.path().join("nope.txt").into_boxed_path()
        ).unwrap();
        assert!(ledger.accounts().unwrap().is_empty());
    }

    #[test]
    fn test_balance_may_go_negative() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ledger(dir.path(), "1, Dan, 5\n");
        assert_eq!(ledger.apply(&UserId::from("1"), -11.5).unwrap(), -6.5);
    }

    #[test]
    fn test_concurrent_applies_are_serialized() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("accepted_id.txt");
        let ledger = Arc::new(ledger(dir.path(), "1, Dan, 0\n2, Eve, 0\n"));
        let workers: Vec<_> = (0..4)
            .map(|worker| {
                let ledger = ledger.clone();
                thread::spawn(move || {
                    let user = UserId::from(if worker % 2 == 0 { "1" } else { "2" });
                    for _ in 0..25 {
                        ledger.apply(&user, 1.0).unwrap();
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }
        assert_eq!(ledger.balance(&UserId::from("1")).unwrap(), 50.0);
        assert_eq!(ledger.balance(&UserId::from("2")).unwrap(), 50.0);
        let reloaded = PointsLedger::load(ResourceService::embedded().unwrap(), file_path.into_boxed_path()).unwrap();
        assert_eq!(reloaded.balance(&UserId::from("1")).unwrap(), 50.0);
    }
}
