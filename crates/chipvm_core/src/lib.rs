pub mod app;
mod config;
mod error;
pub mod instruction;
pub mod machine;

pub use app::EmulatorApp;
pub use config::MachineConfig;
pub use error::{VmError, VmResult};
pub use instruction::Instruction;
pub use machine::{Machine, StepOutcome};

/// Logical screen width in pixels.
pub const SCREEN_WIDTH: usize = 64;
/// Logical screen height in pixels.
pub const SCREEN_HEIGHT: usize = 32;

pub const RAM_SIZE: usize = 4096;
pub const NUM_REGS: usize = 16;
pub const STACK_SIZE: usize = 16;
pub const NUM_KEYS: usize = 16;

/// Programs are loaded, and execution starts, at this address.
pub const START_ADDRESS: u16 = 0x200;
/// Largest program image that fits between `START_ADDRESS` and the end of RAM.
pub const MAX_PROGRAM_SIZE: usize = RAM_SIZE - START_ADDRESS as usize;

/// Index of VF, the register doubling as carry/borrow/collision flag.
pub const FLAG_REG: usize = 0xF;

/// Bytes per hex digit glyph in the font table.
pub const GLYPH_SIZE: usize = 5;
pub const FONTSET_SIZE: usize = 80;
pub const FONTSET: [u8; FONTSET_SIZE] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];
