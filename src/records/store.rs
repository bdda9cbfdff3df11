use super::{InsertPosition, Record};
use crate::errors::{AppError, AppResult};

/// Ordered in-memory collection of one record kind.
#[derive(Debug, Clone)]
pub struct RecordStore<R: Record> {
    records: Vec<R>,
}

impl<R: Record> Default for RecordStore<R> {
    fn default() -> Self {
        Self { records: Vec::new() }
    }
}

impl<R: Record> RecordStore<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads fixtures in the given order, rejecting duplicate ids.
    pub fn seeded(records: Vec<R>) -> AppResult<Self> {
        let mut store = Self::new();
        for record in records {
            if store.contains(record.id()) {
                return Err(AppError::Conflict(format!(
                    "Duplicate {} id '{}' in seed data",
                    R::ID_PREFIX,
                    record.id()
                )));
            }
            store.records.push(record);
        }
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&R> {
        self.records.iter().find(|record| record.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn insert(&mut self, record: R) -> AppResult<()> {
        if self.contains(record.id()) {
            return Err(AppError::Conflict(format!(
                "{} '{}' already exists",
                R::ID_PREFIX,
                record.id()
            )));
        }
        match R::INSERT_AT {
            InsertPosition::Front => self.records.insert(0, record),
            InsertPosition::Back => self.records.push(record),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::RecordStore;
    use crate::practice::{fixtures, Contract, SpendLine};
    use crate::records::Record;

    #[test]
    fn seeded_store_keeps_fixture_order() {
        let store = RecordStore::seeded(fixtures::contracts()).expect("seed contracts");
        let ids: Vec<&str> = store.records().iter().map(Record::id).collect();
        let expected: Vec<String> = fixtures::contracts().into_iter().map(|contract| contract.id).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut contracts = fixtures::contracts();
        contracts.push(contracts[0].clone());
        let error = RecordStore::<Contract>::seeded(contracts).expect_err("duplicate seed");
        assert!(error.to_string().contains("CONFLICT"));

        let mut store = RecordStore::seeded(fixtures::contracts()).expect("seed contracts");
        let existing = store.records()[3].clone();
        assert!(store.insert(existing).is_err());
        assert_eq!(store.len(), fixtures::contracts().len());
    }

    #[test]
    fn insert_position_follows_record_kind() {
        let mut contracts = RecordStore::seeded(fixtures::contracts()).expect("seed contracts");
        let mut contract = contracts.records()[0].clone();
        contract.id = "contract-new".to_string();
        contracts.insert(contract).expect("insert contract");
        assert_eq!(contracts.records()[0].id, "contract-new");

        let mut spend = RecordStore::seeded(fixtures::spend_lines()).expect("seed spend");
        let mut line: SpendLine = spend.records()[0].clone();
        line.id = "spend-new".to_string();
        spend.insert(line).expect("insert spend line");
        assert_eq!(spend.records().last().map(|line| line.id.as_str()), Some("spend-new"));
    }
}
