/// Opaque transaction context. The buffer pool and hash table never
/// inspect it; it exists only so callers have a stable handle to pass
/// through to whatever sits above this core (lock manager, log manager).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransactionId(u64);

impl TransactionId {
    pub fn new(id: u64) -> Self {
        TransactionId(id)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}
