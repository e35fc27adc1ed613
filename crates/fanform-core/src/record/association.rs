use crate::{
    model::{AssociationKind, AssociationModel},
    record::{Record, RecordHandle, RecordId},
};

///
/// Association
///
/// Accumulated record set for one declared association.
/// `loaded` is false only for stored owners whose rows have not yet been
/// fetched; reconciliation loads it once and then works in memory.
///

#[derive(Clone, Debug)]
pub struct Association {
    model: &'static AssociationModel,
    loaded: bool,
    records: Vec<Record>,
}

impl Association {
    pub(crate) const fn new(model: &'static AssociationModel, loaded: bool) -> Self {
        Self {
            model,
            loaded,
            records: Vec::new(),
        }
    }

    #[must_use]
    pub const fn model(&self) -> &'static AssociationModel {
        self.model
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.model.name
    }

    #[must_use]
    pub const fn kind(&self) -> AssociationKind {
        self.model.kind
    }

    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.loaded
    }

    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut [Record] {
        &mut self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn contains(&self, handle: RecordHandle) -> bool {
        self.records.iter().any(|r| r.handle() == handle)
    }

    /// Index of the first record carrying the given persistence id.
    #[must_use]
    pub fn position_by_id(&self, id: RecordId) -> Option<usize> {
        self.records.iter().position(|r| r.id() == Some(id))
    }

    /// Install the rows fetched from the store and mark the set loaded.
    /// Records added before the load are kept after the fetched rows.
    pub fn load(&mut self, fetched: Vec<Record>) {
        let pending = std::mem::replace(&mut self.records, fetched);
        for record in pending {
            if !self.contains(record.handle()) {
                self.records.push(record);
            }
        }
        self.loaded = true;
    }

    /// Add a record according to the association kind: `HasMany` appends
    /// unless the handle is present, `BelongsTo` replaces wholesale.
    /// Returns the index the record now occupies.
    pub fn attach(&mut self, record: Record) -> usize {
        match self.model.kind {
            AssociationKind::BelongsTo => {
                self.records.clear();
                self.records.push(record);
                0
            }
            AssociationKind::HasMany => {
                let handle = record.handle();
                if let Some(index) = self.records.iter().position(|r| r.handle() == handle) {
                    index
                } else {
                    self.records.push(record);
                    self.records.len() - 1
                }
            }
        }
    }

    /// The single record of a `BelongsTo` association.
    #[must_use]
    pub fn target(&self) -> Option<&Record> {
        self.records.first()
    }

    pub fn target_mut(&mut self) -> Option<&mut Record> {
        self.records.first_mut()
    }
}
