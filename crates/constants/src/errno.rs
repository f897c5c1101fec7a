/// Error codes returned to user code in `a0`. Zero is success, everything
/// negative is an error.
pub struct KernelError;

#[allow(non_upper_case_globals)]
impl KernelError {
    pub const Success: isize = 0;
    // Invalid handle, joining self, bad pointer argument
    pub const InvalidArgument: isize = -1;
    // The allocator returned null
    pub const OutOfMemory: isize = -1;
    // The thread already has a pending sleep
    pub const AlreadySleeping: isize = -1;
    // The semaphore was closed while the caller was blocked on it
    pub const SemaphoreClosed: isize = -2;
}
