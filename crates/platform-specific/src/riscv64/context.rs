use crate::IThreadContext;

/// Callee-saved register file of a suspended thread.
///
/// Only `ra`, `sp` and `s0..s11` are recorded: the switch primitive is an
/// ordinary function call, so everything caller-saved is already dead or
/// spilled by the compiler at the call site. The layout is fixed because the
/// switch assembly addresses fields by offset.
#[repr(C)]
#[derive(Default, Clone, Copy, Debug)]
pub struct SavedThreadContext {
    pub ra: usize,       // 0
    pub sp: usize,       // 8
    pub s: [usize; 12],  // 16..112
}

// RISC-V psABI stack alignment
const STACK_ALIGN: usize = 16;

impl IThreadContext for SavedThreadContext {
    fn new(entry_pc: usize, stack_top: usize) -> Self {
        SavedThreadContext {
            ra: entry_pc,
            // The stack grows down from its aligned top
            sp: stack_top & !(STACK_ALIGN - 1),
            s: [0; 12],
        }
    }
}
