//! Descriptor-driven query construction
//!
//! Entry points for the repository layer: turn filter and sort descriptors
//! for an entity type into chains, or a whole request into a `QueryPlan`.
//!
//! ## Logging Ownership
//!
//! `build_filter`, `build_sorter` and `build_query` own the lifecycle events
//! (`log_op_start!`, `log_op_end!`, `log_op_error!`). Per-descriptor detail
//! goes to `tracing::debug!` and never includes raw values.

use std::time::Instant;

use querex_core_types::RequestContext;
use serde::{Deserialize, Serialize};

use crate::builder::builder_for;
use crate::chain::{FilterChain, SorterChain};
use crate::config::EngineConfig;
use crate::descriptor::{FilterDescriptor, SortDescriptor};
use crate::errors::{ExError, QueryError, Result};
use crate::expr::{KeySelector, Predicate};
use crate::model::Reflect;
use crate::path::PropertyPath;
use crate::queryable::{MemorySource, OrderedMemorySource, Paginate, Queryable};
use crate::{log_op_end, log_op_error, log_op_start};

/// Skip/take window of a request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub skip: usize,
    #[serde(default)]
    pub take: Option<usize>,
}

impl Page {
    pub fn new(skip: usize, take: usize) -> Self {
        Self {
            skip,
            take: Some(take),
        }
    }

    fn apply<P: Paginate>(self, source: P) -> P {
        let source = if self.skip > 0 {
            source.skip(self.skip)
        } else {
            source
        };
        match self.take {
            Some(take) => source.take(take),
            None => source,
        }
    }
}

/// Everything a caller can ask for in one query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub filters: Vec<FilterDescriptor>,
    #[serde(default)]
    pub sorts: Vec<SortDescriptor>,
    #[serde(default)]
    pub page: Option<Page>,
}

/// Built form of a `QueryRequest`
pub struct QueryPlan<E> {
    pub filter: FilterChain<E>,
    /// `None` when the request had no sort descriptors
    pub sorter: Option<SorterChain<E>>,
    pub page: Option<Page>,
}

/// Result of applying a plan: ordered only if the plan had sort keys
pub enum PlannedQuery<Q, O> {
    Unordered(Q),
    Ordered(O),
}

impl<E> QueryPlan<E> {
    /// Filter, then order, then window `source`
    ///
    /// # Errors
    ///
    /// Propagates filter and ordering errors from the source.
    pub fn apply_to<Q>(&self, source: Q) -> Result<PlannedQuery<Q, Q::Ordered>>
    where
        Q: Queryable<E> + Paginate,
        Q::Ordered: Paginate,
    {
        let filtered = self.filter.apply_to(source)?;
        let page = self.page.unwrap_or_default();
        Ok(match &self.sorter {
            Some(sorter) => PlannedQuery::Ordered(page.apply(sorter.apply_to(filtered)?)),
            None => PlannedQuery::Unordered(page.apply(filtered)),
        })
    }
}

impl<E: Reflect> PlannedQuery<MemorySource<E>, OrderedMemorySource<E>> {
    /// Collect the resulting items
    ///
    /// # Errors
    ///
    /// Returns key evaluation errors from deferred ordering.
    pub fn into_vec(self) -> Result<Vec<E>> {
        match self {
            PlannedQuery::Unordered(source) => Ok(source.into_vec()),
            PlannedQuery::Ordered(source) => source.into_vec(),
        }
    }
}

/// Builds chains from descriptors under one configuration
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    config: EngineConfig,
    context: Option<RequestContext>,
}

impl QueryBuilder {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            context: None,
        }
    }

    /// Correlate log events and errors with an inbound request
    pub fn with_context(mut self, context: RequestContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn context(&self) -> Option<&RequestContext> {
        self.context.as_ref()
    }

    /// In-memory source ordered with this builder's null placement
    pub fn memory_source<E>(&self, items: Vec<E>) -> MemorySource<E> {
        MemorySource::new(items).with_null_ordering(self.config.null_ordering)
    }

    /// Resolve a dotted path against `E`
    ///
    /// # Errors
    ///
    /// `NullDescriptor`, `PathTooDeep` or `UnknownProperty`.
    pub fn resolve<E: Reflect>(&self, path: &str) -> Result<PropertyPath> {
        self.config.path_resolver().resolve(E::type_info(), path)
    }

    /// Build one predicate from a filter descriptor
    ///
    /// # Errors
    ///
    /// Path resolution errors, `UnsupportedOperatorForType`,
    /// `NullDescriptor` or `ConversionFailed`.
    pub fn predicate<E: Reflect + 'static>(
        &self,
        descriptor: &FilterDescriptor,
    ) -> Result<Predicate<E>> {
        let path = self.resolve::<E>(&descriptor.property)?;
        let leaf = path.leaf_type();
        let builder = builder_for::<E>(leaf, self.config.text_comparison).ok_or_else(|| {
            QueryError::UnsupportedOperatorForType {
                operator: descriptor.operator.to_string(),
                field_type: leaf.to_string(),
                path: path.text(),
            }
        })?;
        let predicate = builder.predicate(&path, descriptor.operator, &descriptor.value)?;
        tracing::debug!(path = %path, operator = %descriptor.operator, "built predicate");
        Ok(predicate)
    }

    /// Build one key selector from a sort descriptor
    ///
    /// # Errors
    ///
    /// Path resolution errors, or `UnsupportedOperatorForType` when the path
    /// ends at a nested entity.
    pub fn key<E: Reflect + 'static>(&self, descriptor: &SortDescriptor) -> Result<KeySelector<E>> {
        let path = self.resolve::<E>(&descriptor.property)?;
        let leaf = path.leaf_type();
        let builder = builder_for::<E>(leaf, self.config.text_comparison).ok_or_else(|| {
            QueryError::UnsupportedOperatorForType {
                operator: "OrderBy".to_string(),
                field_type: leaf.to_string(),
                path: path.text(),
            }
        })?;
        let key = builder.key(&path)?;
        tracing::debug!(path = %path, direction = ?descriptor.direction, "built key");
        Ok(key)
    }

    /// Conjoin one predicate per descriptor, in order
    ///
    /// An empty slice yields `FilterChain::Empty`.
    ///
    /// # Errors
    ///
    /// `TooManyDescriptors` past `max_filter_count`, otherwise the first
    /// descriptor error; no partial chain is returned.
    pub fn build_filter<E: Reflect + 'static>(
        &self,
        descriptors: &[FilterDescriptor],
    ) -> Result<FilterChain<E>> {
        self.logged("build_filter", E::type_info().name, descriptors.len(), || {
            self.filter_chain(descriptors)
        })
    }

    /// Chain one key per descriptor, primary first
    ///
    /// # Errors
    ///
    /// `TooManyDescriptors` past `max_sort_count`, otherwise the first
    /// descriptor error.
    pub fn build_sorter<E: Reflect + 'static>(
        &self,
        descriptors: &[SortDescriptor],
    ) -> Result<SorterChain<E>> {
        self.logged("build_sorter", E::type_info().name, descriptors.len(), || {
            self.sorter_chain(descriptors)
        })
    }

    /// Build filter, sorter and page of a request
    ///
    /// # Errors
    ///
    /// The first descriptor error.
    pub fn build_query<E: Reflect + 'static>(&self, request: &QueryRequest) -> Result<QueryPlan<E>> {
        let count = request.filters.len() + request.sorts.len();
        self.logged("build_query", E::type_info().name, count, || {
            let filter = self.filter_chain(&request.filters)?;
            let sorter = if request.sorts.is_empty() {
                None
            } else {
                Some(self.sorter_chain(&request.sorts)?)
            };
            Ok(QueryPlan {
                filter,
                sorter,
                page: request.page,
            })
        })
    }

    /// Structured form of `err` carrying this builder's correlation ids
    pub fn to_ex_error(&self, err: QueryError, op: &str) -> ExError {
        let ex = ExError::from(err).with_op(op);
        match &self.context {
            Some(context) => ex.with_context(context),
            None => ex,
        }
    }

    fn filter_chain<E: Reflect + 'static>(
        &self,
        descriptors: &[FilterDescriptor],
    ) -> Result<FilterChain<E>> {
        check_count("filter", descriptors.len(), self.config.max_filter_count)?;
        descriptors
            .iter()
            .try_fold(FilterChain::new(), |chain, descriptor| {
                Ok(chain.and(self.predicate(descriptor)?))
            })
    }

    fn sorter_chain<E: Reflect + 'static>(
        &self,
        descriptors: &[SortDescriptor],
    ) -> Result<SorterChain<E>> {
        check_count("sort", descriptors.len(), self.config.max_sort_count)?;
        descriptors
            .iter()
            .try_fold(SorterChain::new(), |chain, descriptor| {
                Ok(chain.then_by(self.key(descriptor)?, descriptor.direction))
            })
    }

    fn request_id(&self) -> Option<&str> {
        self.context.as_ref().map(|c| c.request_id.as_str())
    }

    fn logged<T>(
        &self,
        op: &str,
        entity: &str,
        descriptor_count: usize,
        build: impl FnOnce() -> Result<T>,
    ) -> Result<T> {
        log_op_start!(
            op,
            entity = entity,
            descriptor_count = descriptor_count as u64,
            request_id = self.request_id()
        );
        let start = Instant::now();

        let result = build().map_err(|e| {
            log_op_error!(
                op,
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                request_id = self.request_id()
            );
            e
        })?;

        log_op_end!(
            op,
            duration_ms = start.elapsed().as_millis() as u64,
            request_id = self.request_id()
        );
        Ok(result)
    }
}

fn check_count(list: &'static str, count: usize, max: usize) -> Result<()> {
    if count > max {
        return Err(QueryError::TooManyDescriptors { list, count, max });
    }
    Ok(())
}

/// `build_filter` with the default configuration
///
/// # Errors
///
/// See [`QueryBuilder::build_filter`].
pub fn build_filter<E: Reflect + 'static>(
    descriptors: &[FilterDescriptor],
) -> Result<FilterChain<E>> {
    QueryBuilder::default().build_filter(descriptors)
}

/// `build_sorter` with the default configuration
///
/// # Errors
///
/// See [`QueryBuilder::build_sorter`].
pub fn build_sorter<E: Reflect + 'static>(descriptors: &[SortDescriptor]) -> Result<SorterChain<E>> {
    QueryBuilder::default().build_sorter(descriptors)
}

/// `build_query` with the default configuration
///
/// # Errors
///
/// See [`QueryBuilder::build_query`].
pub fn build_query<E: Reflect + 'static>(request: &QueryRequest) -> Result<QueryPlan<E>> {
    QueryBuilder::default().build_query(request)
}
