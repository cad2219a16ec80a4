use std::sync::RwLock;

use super::{CredentialRecord, DirectoryError, UserDirectory};

/// In-process directory; contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    records: RwLock<Vec<CredentialRecord>>,
}

impl MemoryDirectory {
    pub fn with_records(records: Vec<CredentialRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }
}

impl UserDirectory for MemoryDirectory {
    fn read(&self) -> Result<Vec<CredentialRecord>, DirectoryError> {
        self.records
            .read()
            .map(|records| records.clone())
            .map_err(|_| DirectoryError::Unavailable("directory lock poisoned".to_string()))
    }

    fn write(&self, records: &[CredentialRecord]) -> Result<(), DirectoryError> {
        let mut guard = self
            .records
            .write()
            .map_err(|_| DirectoryError::Unavailable("directory lock poisoned".to_string()))?;
        *guard = records.to_vec();
        Ok(())
    }
}
