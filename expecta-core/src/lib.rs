// expecta-core/src/lib.rs

// 1. Mandatory documentation for production code
#![allow(missing_docs)] // On autorise le manque de doc pour le moment

// 2. Memory safety
#![deny(unsafe_code)]
// 3. Robustness
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
// 4. Performance
#![warn(clippy::perf)]

// --- MODULES HEXAGONAUX ---

// 1. Ports (Interfaces / Traits)
// Contrats consommés par le moteur : DataAccessor, RuleSource
pub mod ports;

// 2. Domain (Cœur du métier)
// Rule records, registry, binder, checks, report.
// Ne dépend que des Ports.
pub mod domain;

// 3. Infrastructure (Adapters)
// DuckDB, DataFusion, in-memory accessor, config files, report writer
pub mod infrastructure;

// 4. Application (Use Cases)
// Loading rules, running a validation
pub mod application;

// --- GESTION DES ERREURS GLOBALE ---
pub mod error;

// --- RE-EXPORTS (FACADE) ---
pub use error::ExpectaError;
