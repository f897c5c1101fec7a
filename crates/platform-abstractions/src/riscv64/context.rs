use core::arch::naked_asm;

use platform_specific::SavedThreadContext;

/// Switch the CPU from one thread context to another.
///
/// Saves `ra`, `sp` and `s0..s11` into `*old` (skipped when `old` is null;
/// the exit paths discard the outgoing thread), loads them from `*new`, then
/// clears `*kernel_lock` so the incoming thread observes the kernel critical
/// section as released, and returns into the new thread's saved `ra`.
///
/// # Safety
/// Must be called with supervisor interrupts masked. `new` has to point at a
/// context whose `ra`/`sp` describe a resumable thread; `old`, when non-null,
/// must be writable. A null `old` makes the call diverge from the caller's
/// point of view.
#[unsafe(naked)]
pub unsafe extern "C" fn switch_context(
    old: *mut SavedThreadContext,
    new: *const SavedThreadContext,
    kernel_lock: *mut bool,
) {
    // Field offsets fixed by SavedThreadContext's #[repr(C)] layout:
    // ra at 0, sp at 8, s0..s11 at 16 + n*8.
    naked_asm!(
        "beqz a0, 1f",
        "sd ra, 0(a0)",
        "sd sp, 8(a0)",
        "sd s0, 16(a0)",
        "sd s1, 24(a0)",
        "sd s2, 32(a0)",
        "sd s3, 40(a0)",
        "sd s4, 48(a0)",
        "sd s5, 56(a0)",
        "sd s6, 64(a0)",
        "sd s7, 72(a0)",
        "sd s8, 80(a0)",
        "sd s9, 88(a0)",
        "sd s10, 96(a0)",
        "sd s11, 104(a0)",
        "1:",
        "ld ra, 0(a1)",
        "ld sp, 8(a1)",
        "ld s0, 16(a1)",
        "ld s1, 24(a1)",
        "ld s2, 32(a1)",
        "ld s3, 40(a1)",
        "ld s4, 48(a1)",
        "ld s5, 56(a1)",
        "ld s6, 64(a1)",
        "ld s7, 72(a1)",
        "ld s8, 80(a1)",
        "ld s9, 88(a1)",
        "ld s10, 96(a1)",
        "ld s11, 104(a1)",
        "sb zero, 0(a2)",
        "ret",
    )
}
