/// Decoded `scause`, as far as the dispatcher cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrapCause {
    /// Supervisor software interrupt; firmware raises it as the tick.
    SoftwareTimer,
    /// Supervisor timer interrupt from the SBI timer, same tick path.
    HardwareTimer,
    /// Supervisor external interrupt, claimed from the PLIC.
    External,
    /// `ecall` from user mode: a system call.
    UserEnvCall,
    /// `ecall` from supervisor mode: a kernel-side yield.
    SupervisorEnvCall,
    /// Anything else; the dispatcher prints diagnostics and parks.
    Unknown(usize),
}
