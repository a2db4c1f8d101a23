//! Call context handed to every controller action

use crate::interfaces::ManagedPool;
use crate::types::{Address, UnixTimestamp};

/// One controller call: who is calling, the host clock, and the pool the
/// controller should act on.
pub struct Invocation<'a, P: ManagedPool + ?Sized> {
    pub caller: Address,
    pub now: UnixTimestamp,
    pub pool: &'a mut P,
}

impl<'a, P: ManagedPool + ?Sized> Invocation<'a, P> {
    pub fn new(caller: Address, now: UnixTimestamp, pool: &'a mut P) -> Self {
        Self { caller, now, pool }
    }
}
