use casper_types::{Key, U512};

/// Per-call facts supplied by the execution environment: who is calling,
/// how much ETH is attached and the current block time (ms).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    pub caller: Key,
    pub value: U512,
    pub block_time: u64,
}

impl CallContext {
    pub fn new(caller: Key, block_time: u64) -> Self {
        Self {
            caller,
            value: U512::zero(),
            block_time,
        }
    }

    pub fn with_value(mut self, value: U512) -> Self {
        self.value = value;
        self
    }
}
