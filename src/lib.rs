#![allow(clippy::doc_markdown)] // Allow technical terms like camelCase in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Modelmap Core
//!
//! In-memory metadata registries for domain-model traceability.
//!
//! ## Overview
//!
//! Modelmap Core indexes structured descriptive metadata about domain-model
//! components — milestones, steps, executable logic, domain events and their
//! handlers, attributes, tests, and bilateral expectations — into queryable
//! per-kind registries. There is no business-logic execution, no networking,
//! and no persistence: every operation is a synchronous in-process write or
//! read against mapping structures keyed by component identity.
//!
//! Application code constructs a descriptor record (a plain structured value)
//! for each component it declares and calls the matching registry's
//! `register` operation. Downstream tooling then queries by name, identifier,
//! parent, or predicate to produce traceability matrices, coverage reports,
//! or dependency graphs.
//!
//! ## Key Features
//!
//! - **Per-kind registries** with secondary indices (by name, journey,
//!   stakeholder, parent, event type)
//! - **Prerequisite graphs** with advisory depth-first cycle detection
//! - **Forward references**: cross-registry joins are string-keyed, so
//!   components may be declared in any order
//! - **Deferred resolution** for tests declared before their parent
//!   expectation or behavior is known
//! - **Deterministic identifiers**: expectation-ID validation, per-expectation
//!   test-ID sequences, and event types derived from type names
//!
//! ## Module Organization
//!
//! - [`metadata`] - Descriptor records passed into the registries
//! - [`registry`] - The registries themselves plus the [`registry::RegistrySet`] container
//! - [`identifiers`] - Component identity and identifier-format helpers
//! - [`errors`] - Structured error handling
//!
//! ## Quick Start
//!
//! ```rust
//! use modelmap_core::metadata::{MilestoneMetadata, MilestoneScope};
//! use modelmap_core::registry::RegistrySet;
//! use modelmap_core::ComponentId;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registries = RegistrySet::new();
//!
//! let metadata = MilestoneMetadata::new("order-placed", "customer");
//! registries
//!     .milestones()
//!     .register(metadata, ComponentId::new(), Some("checkout"))?;
//!
//! let milestones = registries.milestones().get_by_journey("checkout")?;
//! assert_eq!(milestones.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod identifiers;
pub mod metadata;
pub mod registry;

pub use errors::{RegistryError, RegistryResult};
pub use identifiers::ComponentId;
pub use registry::RegistrySet;
