use coreds_base64::Key;

/// A record as delivered by a fetch.
pub trait RemoteRecord {
    fn key(&self) -> &Key;
}

/// A record held in the store's buffer.
pub trait Record {
    type Remote: RemoteRecord;

    fn key(&self) -> &Key;

    fn from_remote(remote: &Self::Remote) -> Self;

    /// Overwrites this record's fields with the ones carried by `remote`.
    /// Both share the same key.
    fn merge(&mut self, remote: &Self::Remote);
}
