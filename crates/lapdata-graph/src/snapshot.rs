//! Binary snapshot format for [`MemoryGraph`]
//!
//! Layout: magic `LAPG`, u32 LE version, u64 LE body length, bincode body.
//! Signal state and the event journal are not persisted.

use crate::MemoryGraph;
use anyhow::{anyhow, Context, Result};
use std::path::Path;

pub const SNAPSHOT_MAGIC: &[u8; 4] = b"LAPG";
pub const SNAPSHOT_VERSION: u32 = 1;

impl MemoryGraph {
    /// Serialize to binary format
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let body = bincode::serialize(self)?;

        let mut result = Vec::with_capacity(16 + body.len());
        result.extend_from_slice(SNAPSHOT_MAGIC);
        result.extend_from_slice(&SNAPSHOT_VERSION.to_le_bytes());
        result.extend_from_slice(&(body.len() as u64).to_le_bytes());
        result.extend_from_slice(&body);
        Ok(result)
    }

    /// Deserialize from binary format
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 16 || &bytes[0..4] != SNAPSHOT_MAGIC {
            return Err(anyhow!("Invalid graph snapshot"));
        }

        let version = u32::from_le_bytes(bytes[4..8].try_into()?);
        if version != SNAPSHOT_VERSION {
            return Err(anyhow!("Unsupported graph snapshot version: {}", version));
        }

        let body_len = u64::from_le_bytes(bytes[8..16].try_into()?) as usize;
        let body = 16usize
            .checked_add(body_len)
            .and_then(|end| bytes.get(16..end))
            .ok_or_else(|| anyhow!("Truncated graph snapshot"))?;
        let graph: MemoryGraph = bincode::deserialize(body)?;
        Ok(graph)
    }

    /// Write a snapshot file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes)
            .with_context(|| format!("failed to write snapshot {}", path.display()))?;
        tracing::debug!(path = %path.display(), objects = self.object_count(), "graph snapshot saved");
        Ok(())
    }

    /// Read a snapshot file.
    pub fn open(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read snapshot {}", path.display()))?;
        Self::from_bytes(&bytes).with_context(|| format!("in snapshot {}", path.display()))
    }
}
