//! Identifier generation.

use uuid::Uuid;

/// Generates a new UUID v4.
#[must_use]
pub fn generate_uuid() -> Uuid {
    Uuid::new_v4()
}

/// Builds an opaque execution reference for a workflow instance.
///
/// The random suffix keeps retried invocations for the same order from
/// colliding in the external execution engine.
#[must_use]
pub fn new_execution_ref(tenant_id: &str, order_id: &str) -> String {
    let suffix = generate_uuid().simple().to_string();
    format!("{tenant_id}-{order_id}-{}", &suffix[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_ref_shape() {
        let exec_ref = new_execution_ref("pardos", "O1");
        assert!(exec_ref.starts_with("pardos-O1-"));
        assert_eq!(exec_ref.len(), "pardos-O1-".len() + 8);
    }

    #[test]
    fn test_execution_refs_are_unique() {
        let a = new_execution_ref("pardos", "O1");
        let b = new_execution_ref("pardos", "O1");
        assert_ne!(a, b);
    }
}
