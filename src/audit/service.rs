//! Audit service
//!
//! Entry point for producing audit entries from tracked entities. The
//! service resolves the entity key through the mapping model, detects the
//! change and returns a draft that only needs a description before it can
//! be finalized.

use std::marker::PhantomData;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::detection::ChangeDetector;
use super::fluent::{AuditDraft, ChangesComputed, Draft, KeyAssigned};
use super::keys::EntityKeyExtractor;
use super::writer::{AuditSink, AuditWriter};
use crate::error::{AuditError, AuditResult};
use crate::tracking::{Entity, MappingModel, TrackedEntity, UnitOfWork};

/// Service for building audit entries keyed by `K`
pub struct AuditService<'a, K> {
    writer: AuditWriter<'a, K>,
    detector: &'a dyn ChangeDetector,
    model: &'a dyn MappingModel,
}

impl<K> Clone for AuditService<'_, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for AuditService<'_, K> {}

impl<'a, K> AuditService<'a, K>
where
    K: Serialize + DeserializeOwned,
{
    /// Create a new audit service
    pub fn new(
        sink: &'a dyn AuditSink<K>,
        detector: &'a dyn ChangeDetector,
        model: &'a dyn MappingModel,
    ) -> Self {
        Self {
            writer: AuditWriter::new(sink),
            detector,
            model,
        }
    }

    /// Start configuring a service
    pub fn builder() -> AuditServiceBuilder<'a, K> {
        AuditServiceBuilder::default()
    }

    /// Get the writer entries are written through
    pub fn writer(&self) -> AuditWriter<'a, K> {
        self.writer
    }

    /// Start an empty draft timestamped now
    pub fn draft(&self) -> AuditDraft<'a, K, Draft> {
        self.draft_at(Utc::now())
    }

    fn draft_at(&self, audited_on: DateTime<Utc>) -> AuditDraft<'a, K, Draft> {
        AuditDraft::new(self.writer, self.detector, audited_on)
    }

    /// Draft an audit for a tracked entity, timestamped now
    pub fn generate_entry(
        &self,
        entity: &dyn TrackedEntity,
    ) -> AuditResult<AuditDraft<'a, K, ChangesComputed<K>>> {
        self.generate_entry_at(entity, Utc::now())
    }

    /// Draft an audit for a tracked entity
    ///
    /// The key is taken from the entity's current values before the change
    /// is detected.
    ///
    /// # Errors
    ///
    /// Fails if the key cannot be extracted as `K` or the entity is not
    /// tracked.
    pub fn generate_entry_at(
        &self,
        entity: &dyn TrackedEntity,
        audited_on: DateTime<Utc>,
    ) -> AuditResult<AuditDraft<'a, K, ChangesComputed<K>>> {
        let key = EntityKeyExtractor::new(self.model).key_of::<K>(entity)?;
        self.draft_at(audited_on).with_key(key).with_changes_for(entity)
    }

    /// Draft an audit for a known key, timestamped now
    pub fn generate_entry_for_key(&self, entity_id: K) -> AuditDraft<'a, K, KeyAssigned<K>> {
        self.generate_entry_for_key_at(entity_id, Utc::now())
    }

    /// Draft an audit for a known key
    pub fn generate_entry_for_key_at(
        &self,
        entity_id: K,
        audited_on: DateTime<Utc>,
    ) -> AuditDraft<'a, K, KeyAssigned<K>> {
        self.draft_at(audited_on).with_key(entity_id)
    }

    /// Draft an audit with every optional field supplied at once
    pub fn build(
        &self,
        entity: &dyn TrackedEntity,
        description: Option<&str>,
        user_id: Option<&str>,
        audited_on: Option<DateTime<Utc>>,
    ) -> AuditResult<AuditDraft<'a, K, ChangesComputed<K>>> {
        let mut draft = self.generate_entry_at(entity, audited_on.unwrap_or_else(Utc::now))?;
        if let Some(description) = description {
            draft = draft.with_description(description);
        }
        if let Some(user_id) = user_id {
            draft = draft.with_user_id(user_id);
        }
        Ok(draft)
    }

    /// Audit entities of one type whose key is chosen by the caller
    pub fn for_entities<'u, T, F>(
        &self,
        uow: &'u UnitOfWork,
        key_selector: F,
    ) -> AuditFactory<'a, 'u, K, T, F>
    where
        T: Entity,
        F: Fn(&T) -> K,
    {
        AuditFactory {
            service: *self,
            uow,
            key_selector,
            entity: PhantomData,
        }
    }
}

/// Drafts audits for entities of type `T`, keyed by a selector
pub struct AuditFactory<'a, 'u, K, T, F> {
    service: AuditService<'a, K>,
    uow: &'u UnitOfWork,
    key_selector: F,
    entity: PhantomData<fn(&T)>,
}

impl<'a, K, T, F> AuditFactory<'a, '_, K, T, F>
where
    K: Serialize + DeserializeOwned,
    T: Entity,
    F: Fn(&T) -> K,
{
    /// Draft an audit for an entity tracked by the factory's unit of work
    pub fn generate_entry(
        &self,
        entity: &Rc<T>,
        audited_on: Option<DateTime<Utc>>,
    ) -> AuditResult<AuditDraft<'a, K, ChangesComputed<K>>> {
        let key = (self.key_selector)(&**entity);
        self.service
            .draft_at(audited_on.unwrap_or_else(Utc::now))
            .with_key(key)
            .with_changes_for(&self.uow.entry(entity))
    }
}

/// Builder for `AuditService`
pub struct AuditServiceBuilder<'a, K> {
    sink: Option<&'a dyn AuditSink<K>>,
    detector: Option<&'a dyn ChangeDetector>,
    model: Option<&'a dyn MappingModel>,
}

impl<K> Default for AuditServiceBuilder<'_, K> {
    fn default() -> Self {
        Self {
            sink: None,
            detector: None,
            model: None,
        }
    }
}

impl<'a, K> AuditServiceBuilder<'a, K>
where
    K: Serialize + DeserializeOwned,
{
    pub fn sink(mut self, sink: &'a dyn AuditSink<K>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn detector(mut self, detector: &'a dyn ChangeDetector) -> Self {
        self.detector = Some(detector);
        self
    }

    pub fn model(mut self, model: &'a dyn MappingModel) -> Self {
        self.model = Some(model);
        self
    }

    /// Build the service
    ///
    /// # Errors
    ///
    /// Returns a missing-argument error naming the first collaborator that
    /// was not supplied.
    pub fn build(self) -> AuditResult<AuditService<'a, K>> {
        let sink = self.sink.ok_or(AuditError::MissingArgument("sink"))?;
        let detector = self.detector.ok_or(AuditError::MissingArgument("detector"))?;
        let model = self.model.ok_or(AuditError::MissingArgument("model"))?;
        Ok(AuditService::new(sink, detector, model))
    }
}
