//! Script assembly and resource identity.

use sha2::{Digest, Sha256};

/// Prefix the create document with a directive pinning the request delimiter
/// and, when a database is named, the statements that create and select it.
pub fn assemble_create_script(document: &str, delimiter: &str, database: Option<&str>) -> String {
    let mut script = format!("DELIMITER {delimiter}\n");
    if let Some(database) = database {
        script.push_str(&format!("CREATE DATABASE IF NOT EXISTS {database}{delimiter}"));
        script.push_str(&format!("USE {database}{delimiter}"));
    }
    script.push_str(document);
    script
}

/// Stable identifier of an assembled script: lowercase hex SHA-256.
pub fn physical_resource_id(script: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(script.as_bytes());
    hex::encode(hasher.finalize())
}
