/// Fatal conditions raised while loading or running a program.
///
/// Every variant ends the run; the host decides whether to halt, reset or
/// report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VmError {
    #[error("program is too large ({size} bytes), max size is {max_size} bytes")]
    ProgramTooLarge { size: usize, max_size: usize },

    #[error("unknown opcode {opcode:#06X} at {pc:#05X}")]
    UnknownOpcode { opcode: u16, pc: u16 },

    #[error("stack overflow: call at {pc:#05X} with a full call stack")]
    StackOverflow { pc: u16 },

    #[error("stack underflow: return at {pc:#05X} with an empty call stack")]
    StackUnderflow { pc: u16 },

    #[error("memory access out of bounds at address {address:#06X} (pc {pc:#05X})")]
    MemoryOutOfBounds { address: usize, pc: u16 },

    #[error("invalid key index {key}, keys are 0x0-0xF")]
    InvalidKey { key: usize },
}

pub type VmResult<T> = Result<T, VmError>;
