//! Well-known label names and tag syntax.
//!
//! Identity label keys are formed as `{identity_prefix}/{suffix}`.

/// Characters that split a raw tag into key and value.
///
/// Only the first occurrence of any of them splits; the rest stay in the value.
pub const TAG_SEPARATORS: [char; 2] = [':', '='];

/// Instance label (human readable instance name).
pub const IDENTITY_LABEL: &str = "label";

/// Numeric instance identifier.
pub const IDENTITY_INSTANCE_ID: &str = "instance-id";

/// Region the instance runs in.
pub const IDENTITY_REGION: &str = "region";

/// Instance plan / type.
pub const IDENTITY_INSTANCE_TYPE: &str = "instance-type";

/// Identifier of the physical host.
pub const IDENTITY_HOST: &str = "host";
