//! Shared primitive types used across the entire pricing core.

/// Stable supplier identifier, e.g. "KMC".
pub type SupplierKey = String;

/// Marketplace channel identifier. Lookups lowercase it ("amazon").
pub type Marketplace = String;

/// Identifier for a generated output file (UUID v4 string).
pub type OutputId = String;

/// Identifier for a saved feed upload (UUID v4 string).
pub type UploadId = String;
