//! Wires field resolvers into a query execution graph.
//!
//! Resolvers are registered per `(type, field)` through [`FieldWirings::builder`]. Plain resolvers
//! are called once per field fetch. Batched resolvers receive a set of sources instead: every fetch
//! of a batched field is parked in the field's batch channel until the host signals the end of a
//! dispatch window with [`FieldWirings::dispatch`], at which point the parked fetches are grouped by
//! argument set and each group is serviced by a single resolver call.

#![warn(unreachable_pub)]

#[macro_use]
pub mod json_ext;

mod arguments;
mod batching;
mod configuration;
pub mod error;
mod registry;

pub use arguments::Arguments;
pub use batching::BatchKey;
pub use batching::BatchSource;
pub use configuration::Batching;
pub use configuration::Configuration;
pub use configuration::ConfigurationError;
pub use error::FetchError;
pub use error::WiringError;
pub use registry::Arity;
pub use registry::BatchResolver;
pub use registry::BatchResults;
pub use registry::FieldRequest;
pub use registry::FieldWiring;
pub use registry::FieldWirings;
pub use registry::FieldWiringsBuilder;
pub use registry::Handler;
pub use registry::Resolver;
pub use tower::BoxError;
