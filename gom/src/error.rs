//! Field wiring errors.
use displaydoc::Display;
use serde::Serialize;
use thiserror::Error;

use crate::json_ext::Object;
use crate::json_ext::Value;
use crate::registry::Arity;

/// Error returned to the caller of a single field fetch.
///
/// One failure can be shared by every caller of a batch, so handler errors are kept as messages
/// rather than as boxed errors.
#[derive(Error, Display, Debug, Clone, Serialize, Eq, PartialEq)]
#[serde(untagged)]
#[ignore_extra_doc_attributes]
#[non_exhaustive]
pub enum FetchError {
    /// batched resolver for '{field}' failed: {reason}
    ///
    /// every fetch that shared the failing resolver call receives this error
    BatchInvocation {
        /// The batched field, as `Type.field`.
        field: String,
        /// The reason the resolver failed.
        reason: String,
    },

    /// batched resolver for '{field}' returned no result for {requested}
    MissingResult {
        /// The batched field, as `Type.field`.
        field: String,
        /// Debug representation of the source left without a result.
        requested: String,
    },

    /// results for '{field}' were addressed to unknown or duplicated group {group}
    CrossGroupAddressing {
        /// The batched field, as `Type.field`.
        field: String,
        /// The group the results were addressed to.
        group: String,
    },

    /// resolver for '{field}' failed: {reason}
    Resolver {
        /// The field, as `Type.field`.
        field: String,
        /// The reason the resolver failed.
        reason: String,
    },

    /// '{field}' needs a source object but was fetched without one
    MissingSource {
        /// The field, as `Type.field`.
        field: String,
    },

    /// fetch of '{field}' was abandoned before a result was produced
    Abandoned {
        /// The field, as `Type.field`.
        field: String,
    },
}

impl FetchError {
    /// The field this error was raised for.
    pub fn field(&self) -> &str {
        match self {
            FetchError::BatchInvocation { field, .. }
            | FetchError::MissingResult { field, .. }
            | FetchError::CrossGroupAddressing { field, .. }
            | FetchError::Resolver { field, .. }
            | FetchError::MissingSource { field }
            | FetchError::Abandoned { field } => field,
        }
    }

    pub fn extension_code(&self) -> &'static str {
        match self {
            FetchError::BatchInvocation { .. } => "BATCH_INVOCATION_FAILED",
            FetchError::MissingResult { .. } => "BATCH_MISSING_RESULT",
            FetchError::CrossGroupAddressing { .. } => "BATCH_ADDRESSING_VIOLATION",
            FetchError::Resolver { .. } => "RESOLVER_FAILED",
            FetchError::MissingSource { .. } => "MISSING_SOURCE",
            FetchError::Abandoned { .. } => "FETCH_ABANDONED",
        }
    }

    /// GraphQL error extensions describing this error, for the host to attach to its response.
    pub fn to_extensions(&self) -> Object {
        let mut extensions = match serde_json_bytes::to_value(self) {
            Ok(Value::Object(object)) => object,
            _ => Object::new(),
        };
        extensions
            .entry("code")
            .or_insert_with(|| self.extension_code().into());
        extensions
    }
}

/// Error raised while building field wirings; these are fatal to startup.
#[derive(Error, Display, Debug, Clone, Eq, PartialEq)]
#[non_exhaustive]
pub enum WiringError {
    /// batched resolver for '{field}' must accept a set of sources, but takes {arity}
    InvalidBatchedShape { field: String, arity: Arity },

    /// field '{field}' is registered more than once
    DuplicateField { field: String },
}

/// Error converting a JSON value to field arguments.
#[derive(Error, Display, Debug, Clone, Eq, PartialEq)]
pub enum ArgumentsError {
    /// field arguments must be a JSON object, found: {found}
    NotAnObject { found: String },
}
