// Application layer: wires the provider to the core components and exposes
// one entry point per capability.

pub mod tools;

pub use tools::{Assistant, BatchReport, LookupOutcome, PackageReport};
