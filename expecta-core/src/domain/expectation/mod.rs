// expecta-core/src/domain/expectation/mod.rs

pub mod binder;
pub mod check;
pub mod checks;
pub mod registry;
pub mod schema;

pub use binder::{BoundParameters, ParamValue, RangeBound, Target, bind, required};
pub use check::{Check, Verdict};
pub use registry::{ExpectationDescriptor, ExpectationRegistry};
pub use schema::{ParamSchema, ParamSpec, ParamType, Scope};
