//! Log entries emitted by LOG0..LOG4

use bytes::Bytes;
use ember_primitives::{Address, H256};

/// A log record
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Log {
    /// Emitting contract
    pub address: Address,
    /// Up to four topics
    pub topics: Vec<H256>,
    /// Unindexed payload
    pub data: Bytes,
}
