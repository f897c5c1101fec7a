pub trait IThreadContext {
    /// Context that enters `entry_pc` on a fresh stack the first time it is
    /// switched to.
    fn new(entry_pc: usize, stack_top: usize) -> Self;
}

#[repr(C)]
#[derive(Default, Clone, Copy, Debug)]
pub struct DummyThreadContext;

impl IThreadContext for DummyThreadContext {
    fn new(_entry_pc: usize, _stack_top: usize) -> Self {
        Self
    }
}
