mod boot;
mod context;
mod system;
mod trap;

pub use boot::_start;
pub use context::switch_context;
pub use system::{machine_shutdown, schedule_next_tick};
pub use trap::{
    init_trap, restore_trap, return_from_kernel_entry, translate_current_trap, TrapFrame,
};
