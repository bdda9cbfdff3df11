use crate::errors::{AppError, AppResult};
use crate::practice::{fixtures, Client, Contract, KnowledgeItem, LegalEntity, Matter, SpendLine};
use crate::records::aggregate::compute;
use crate::records::filter::run_query;
use crate::records::form::submit;
use crate::records::{Aggregate, FormData, Record, RecordStore, Selection, ViewQuery};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewKind {
    Matters,
    Contracts,
    Clients,
    Entities,
    Knowledge,
    Spend,
}

impl ViewKind {
    pub const ALL: [ViewKind; 6] = [
        Self::Matters,
        Self::Contracts,
        Self::Clients,
        Self::Entities,
        Self::Knowledge,
        Self::Spend,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Matters => "matters",
            Self::Contracts => "contracts",
            Self::Clients => "clients",
            Self::Entities => "entities",
            Self::Knowledge => "knowledge",
            Self::Spend => "spend",
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewKind {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == raw)
            .ok_or_else(|| AppError::NotFound(format!("Unknown view '{}'", raw)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewPage {
    pub kind: ViewKind,
    pub items: Vec<Value>,
    pub total: usize,
    pub next_cursor: Option<String>,
    pub aggregates: Vec<Aggregate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSummary {
    pub kind: ViewKind,
    pub total: usize,
    pub aggregates: Vec<Aggregate>,
}

/// Object-safe face of a typed record store so handlers can treat every
/// view kind the same way.
pub trait RecordView: Send + Sync {
    fn kind(&self) -> ViewKind;
    fn list(&self, query: &ViewQuery) -> AppResult<ViewPage>;
    fn detail(&self, id: &str) -> AppResult<Selection<Value>>;
    fn create(&self, form: &FormData, now: DateTime<Utc>) -> AppResult<Value>;
    fn summary(&self) -> AppResult<ViewSummary>;
}

pub struct View<R: Record> {
    kind: ViewKind,
    store: RwLock<RecordStore<R>>,
}

impl<R: Record> View<R> {
    pub fn new(kind: ViewKind, store: RecordStore<R>) -> Self {
        Self {
            kind,
            store: RwLock::new(store),
        }
    }

    fn read<T>(&self, f: impl FnOnce(&RecordStore<R>) -> AppResult<T>) -> AppResult<T> {
        let store = self
            .store
            .read()
            .map_err(|_| AppError::Internal(format!("{} store lock poisoned", self.kind)))?;
        f(&*store)
    }
}

impl<R: Record> RecordView for View<R> {
    fn kind(&self) -> ViewKind {
        self.kind
    }

    fn list(&self, query: &ViewQuery) -> AppResult<ViewPage> {
        tracing::debug!(
            kind = %self.kind,
            query = %query.query,
            filters = query.filters.len(),
            sort = query.sort.len(),
            limit = ?query.limit,
            "listing view"
        );
        self.read(|store| {
            let page = run_query(store.records(), query)?;
            let items = page
                .items
                .into_iter()
                .map(serde_json::to_value)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ViewPage {
                kind: self.kind,
                items,
                total: page.total,
                next_cursor: page.next_cursor,
                aggregates: compute(store.records()),
            })
        })
    }

    fn detail(&self, id: &str) -> AppResult<Selection<Value>> {
        self.read(|store| {
            let record = store
                .get(id)
                .ok_or_else(|| AppError::NotFound(format!("{} '{}' not found", self.kind, id)))?;
            let mut selection = Selection::default();
            selection.select(serde_json::to_value(record)?);
            Ok(selection)
        })
    }

    fn create(&self, form: &FormData, now: DateTime<Utc>) -> AppResult<Value> {
        let mut store = self
            .store
            .write()
            .map_err(|_| AppError::Internal(format!("{} store lock poisoned", self.kind)))?;
        let record = submit(&mut *store, form, now)?;
        Ok(serde_json::to_value(record)?)
    }

    fn summary(&self) -> AppResult<ViewSummary> {
        self.read(|store| {
            Ok(ViewSummary {
                kind: self.kind,
                total: store.len(),
                aggregates: compute(store.records()),
            })
        })
    }
}

#[derive(Clone)]
pub struct ViewRegistry {
    views: BTreeMap<ViewKind, Arc<dyn RecordView>>,
}

impl ViewRegistry {
    /// Every view kind loaded with its fixture collection.
    pub fn seeded() -> AppResult<Self> {
        Ok(Self::from_stores(
            RecordStore::seeded(fixtures::matters())?,
            RecordStore::seeded(fixtures::contracts())?,
            RecordStore::seeded(fixtures::clients())?,
            RecordStore::seeded(fixtures::entities())?,
            RecordStore::seeded(fixtures::knowledge_items())?,
            RecordStore::seeded(fixtures::spend_lines())?,
        ))
    }

    pub fn empty() -> Self {
        Self::from_stores(
            RecordStore::new(),
            RecordStore::new(),
            RecordStore::new(),
            RecordStore::new(),
            RecordStore::new(),
            RecordStore::new(),
        )
    }

    fn from_stores(
        matters: RecordStore<Matter>,
        contracts: RecordStore<Contract>,
        clients: RecordStore<Client>,
        entities: RecordStore<LegalEntity>,
        knowledge: RecordStore<KnowledgeItem>,
        spend: RecordStore<SpendLine>,
    ) -> Self {
        let mut views: BTreeMap<ViewKind, Arc<dyn RecordView>> = BTreeMap::new();
        views.insert(ViewKind::Matters, Arc::new(View::new(ViewKind::Matters, matters)));
        views.insert(ViewKind::Contracts, Arc::new(View::new(ViewKind::Contracts, contracts)));
        views.insert(ViewKind::Clients, Arc::new(View::new(ViewKind::Clients, clients)));
        views.insert(ViewKind::Entities, Arc::new(View::new(ViewKind::Entities, entities)));
        views.insert(ViewKind::Knowledge, Arc::new(View::new(ViewKind::Knowledge, knowledge)));
        views.insert(ViewKind::Spend, Arc::new(View::new(ViewKind::Spend, spend)));
        Self { views }
    }

    pub fn get(&self, kind: ViewKind) -> AppResult<Arc<dyn RecordView>> {
        self.views
            .get(&kind)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("View '{}' is not registered", kind)))
    }

    pub fn summaries(&self) -> AppResult<Vec<ViewSummary>> {
        self.views.values().map(|view| view.summary()).collect()
    }
}
