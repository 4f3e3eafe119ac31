use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::{debug, warn};

use crate::descriptor::SchemaDescriptor;
use crate::error::SchemaResult;
use crate::traits::Record;
use crate::validator::SchemaValidator;

type Entry = Arc<dyn Any + Send + Sync>;

/// Validates each record type once and caches the outcome.
///
/// Both successes and failures are cached: a type that failed validation
/// returns the identical [`SchemaError`](crate::SchemaError) on every later
/// lookup. When two threads validate the same type concurrently, the first
/// result inserted wins and both observe it.
pub struct SchemaRegistry {
    validator: SchemaValidator,
    entries: RwLock<HashMap<TypeId, Entry>>,
}

impl SchemaRegistry {
    pub fn new(validator: SchemaValidator) -> Self {
        Self {
            validator,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn validator(&self) -> &SchemaValidator {
        &self.validator
    }

    /// The descriptor for `R`, validating it on first use.
    pub fn descriptor<R: Record>(&self) -> SchemaResult<Arc<SchemaDescriptor<R>>> {
        let type_id = TypeId::of::<R>();
        if let Some(cached) = self.lookup::<R>(type_id) {
            return cached;
        }

        let outcome = self.validator.validate::<R>().map(Arc::new);
        match &outcome {
            Ok(descriptor) => debug!(
                record = descriptor.record_type(),
                table = descriptor.table(),
                bindings = descriptor.bindings().len(),
                "schema validated"
            ),
            Err(e) => warn!(
                record = std::any::type_name::<R>(),
                error = %e,
                "schema validation failed"
            ),
        }

        let mut entries = self.entries.write().expect("lock poisoned");
        let entry = entries
            .entry(type_id)
            .or_insert_with(|| Arc::new(outcome.clone()) as Entry);
        match entry.downcast_ref::<SchemaResult<Arc<SchemaDescriptor<R>>>>() {
            Some(stored) => stored.clone(),
            None => outcome,
        }
    }

    /// `true` if `R` validates. The error, if any, is discarded.
    pub fn is_valid<R: Record>(&self) -> bool {
        self.descriptor::<R>().is_ok()
    }

    /// Number of record types seen so far, valid or not.
    pub fn len(&self) -> usize {
        self.entries.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().expect("lock poisoned").is_empty()
    }

    fn lookup<R: Record>(&self, type_id: TypeId) -> Option<SchemaResult<Arc<SchemaDescriptor<R>>>> {
        let entries = self.entries.read().expect("lock poisoned");
        entries
            .get(&type_id)?
            .downcast_ref::<SchemaResult<Arc<SchemaDescriptor<R>>>>()
            .cloned()
    }
}
