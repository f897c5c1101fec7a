//! NS16550A UART on the QEMU virt board, memory mapped and polled byte by
//! byte. The interrupt-driven console driver in the kernel consumes the raw
//! register accessors; `console_putchar` is the busy-wait path used by boot
//! banners, the logger and fatal-trap diagnostics.

use bitflags::bitflags;

const UART0_BASE: usize = 0x1000_0000;

// Register offsets. RHR/THR share offset 0, reads hit RHR, writes hit THR.
const UART_RHR: usize = 0;
const UART_THR: usize = 0;
const UART_IER: usize = 1;
const UART_FCR: usize = 2;
const UART_ISR: usize = 2;
const UART_LCR: usize = 3;
const UART_LSR: usize = 5;

const IER_RX_ENABLE: u8 = 1 << 0;
const IER_TX_ENABLE: u8 = 1 << 1;
const FCR_FIFO_ENABLE: u8 = 1 << 0;
const FCR_FIFO_CLEAR: u8 = 3 << 1;
const LCR_EIGHT_BITS: u8 = 3;

bitflags! {
    /// Line status register bits consumed by the console driver.
    #[derive(Debug, Clone, Copy)]
    pub struct LineStatus: u8 {
        /// A received byte is waiting in RHR.
        const DATA_READY = 1 << 0;
        /// THR is empty, the UART can accept a byte.
        const TX_IDLE = 1 << 5;
    }
}

/// Interrupt id the PLIC reports for the UART.
pub const CONSOLE_IRQ: u32 = 10;

#[inline(always)]
fn read_reg(offset: usize) -> u8 {
    unsafe { ((UART0_BASE + offset) as *const u8).read_volatile() }
}

#[inline(always)]
fn write_reg(offset: usize, value: u8) {
    unsafe { ((UART0_BASE + offset) as *mut u8).write_volatile(value) }
}

/// Program 8N1, reset the FIFOs and enable receive plus transmit interrupts.
pub fn init_console() {
    write_reg(UART_IER, 0);
    write_reg(UART_LCR, LCR_EIGHT_BITS);
    write_reg(UART_FCR, FCR_FIFO_ENABLE | FCR_FIFO_CLEAR);
    write_reg(UART_IER, IER_RX_ENABLE | IER_TX_ENABLE);
}

pub fn console_status() -> LineStatus {
    LineStatus::from_bits_truncate(read_reg(UART_LSR))
}

/// Reading ISR drops a pending transmit interrupt; without it the level
/// triggered PLIC line would re-assert forever when nothing gets written.
pub fn console_ack_interrupt() {
    read_reg(UART_ISR);
}

pub fn console_read_data() -> u8 {
    read_reg(UART_RHR)
}

pub fn console_write_data(byte: u8) {
    write_reg(UART_THR, byte);
}

/// Synchronous transmit, spins until the UART drains. Diagnostics only; the
/// scheduled output path goes through the console driver's worker thread.
pub fn console_putchar(byte: u8) {
    while !console_status().contains(LineStatus::TX_IDLE) {
        core::hint::spin_loop();
    }
    console_write_data(byte);
}

pub fn console_writestr(bytes: &[u8]) {
    for byte in bytes {
        console_putchar(*byte);
    }
}
