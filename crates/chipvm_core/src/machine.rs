use std::ops::Range;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::{
    Instruction, MachineConfig, VmError, VmResult, FLAG_REG, FONTSET, FONTSET_SIZE,
    MAX_PROGRAM_SIZE, NUM_KEYS, NUM_REGS, RAM_SIZE, SCREEN_HEIGHT, SCREEN_WIDTH, STACK_SIZE,
    START_ADDRESS,
};

mod execute;

/// What a single [`Machine::step`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// An instruction ran and the timers decayed.
    Executed,
    /// `FX0A` found no pressed key: PC and timers are untouched and the same
    /// instruction is re-evaluated on the next step.
    Stalled,
}

/// The complete CHIP-8 machine state.
///
/// VF is not a separate field: it is `v_reg[FLAG_REG]`, shared by the
/// arithmetic/draw flag writes and by every generic register access
/// (`FX55`, `FX65`, `8XY0`, ...).
pub struct Machine {
    /// program counter
    pc: u16,
    ram: [u8; RAM_SIZE],
    /// display, row-major
    screen: [bool; SCREEN_WIDTH * SCREEN_HEIGHT],
    /// V Registers
    v_reg: [u8; NUM_REGS],
    /// I Register
    i_reg: u16,
    /// number of occupied stack slots, 0..=STACK_SIZE
    stack_pointer: u16,
    stack: [u16; STACK_SIZE],
    keys: [bool; NUM_KEYS],
    delay_timer: u8,
    sound_timer: u8,
    rng: StdRng,
    config: MachineConfig,
    /// kept so `reset` can restore the loaded image
    program: Vec<u8>,
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}

impl Machine {
    pub fn new() -> Self {
        Self::with_config(MachineConfig::default())
    }

    pub fn with_config(config: MachineConfig) -> Self {
        let mut machine = Self {
            pc: START_ADDRESS,
            ram: [0; RAM_SIZE],
            screen: [false; SCREEN_WIDTH * SCREEN_HEIGHT],
            v_reg: [0; NUM_REGS],
            i_reg: 0,
            stack_pointer: 0,
            stack: [0; STACK_SIZE],
            keys: [false; NUM_KEYS],
            delay_timer: 0,
            sound_timer: 0,
            rng: new_rng(&config),
            config,
            program: Vec::new(),
        };
        machine.ram[..FONTSET_SIZE].copy_from_slice(&FONTSET);
        machine
    }

    /// Restore the power-on state, keeping the loaded program in memory.
    ///
    /// A seeded machine replays the same `CXNN` sequence after a reset.
    pub fn reset(&mut self) {
        let program = std::mem::take(&mut self.program);
        *self = Self::with_config(self.config);
        let len = program.len();
        let start = START_ADDRESS as usize;
        self.ram[start..start + len].copy_from_slice(&program);
        self.program = program;
    }

    /// Copy a program image into memory at `START_ADDRESS`.
    ///
    /// Images larger than `MAX_PROGRAM_SIZE` are rejected and memory is left
    /// untouched.
    pub fn load_program(&mut self, rom: &[u8]) -> VmResult<()> {
        if rom.len() > MAX_PROGRAM_SIZE {
            return Err(VmError::ProgramTooLarge {
                size: rom.len(),
                max_size: MAX_PROGRAM_SIZE,
            });
        }
        let start = START_ADDRESS as usize;
        let end = start + rom.len();
        self.ram[start..end].copy_from_slice(rom);
        self.program = rom.to_vec();
        log::info!("Loaded {} byte program at {:#05X}", rom.len(), START_ADDRESS);
        Ok(())
    }

    /// Run one fetch-decode-execute cycle, then decay both timers unless the
    /// cycle stalled on `FX0A`.
    ///
    /// Any error is fatal to the run; state is not advanced past the
    /// faulting instruction.
    pub fn step(&mut self) -> VmResult<StepOutcome> {
        let opcode = self.fetch_opcode()?;
        let instruction = Instruction::decode(opcode).ok_or(VmError::UnknownOpcode {
            opcode,
            pc: self.pc,
        })?;
        log::trace!("{:#05X}: {:04X} {}", self.pc, opcode, instruction);
        let outcome = self.execute(instruction)?;
        if outcome == StepOutcome::Executed {
            self.tick_timers();
        }
        Ok(outcome)
    }

    fn fetch_opcode(&self) -> VmResult<u16> {
        let range = self.mem_range(self.pc as usize, 2)?;
        let bytes = &self.ram[range];
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    fn tick_timers(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }

    fn push(&mut self, val: u16) -> VmResult<()> {
        let slot = self
            .stack
            .get_mut(self.stack_pointer as usize)
            .ok_or(VmError::StackOverflow { pc: self.pc })?;
        *slot = val;
        self.stack_pointer += 1;
        Ok(())
    }

    fn pop(&mut self) -> VmResult<u16> {
        self.stack_pointer = self
            .stack_pointer
            .checked_sub(1)
            .ok_or(VmError::StackUnderflow { pc: self.pc })?;
        Ok(self.stack[self.stack_pointer as usize])
    }

    /// Bounds-checked `addr..addr + len` into RAM.
    fn mem_range(&self, addr: usize, len: usize) -> VmResult<Range<usize>> {
        let end = addr + len;
        if end > RAM_SIZE {
            return Err(VmError::MemoryOutOfBounds {
                address: addr.max(RAM_SIZE),
                pc: self.pc,
            });
        }
        Ok(addr..end)
    }

    /// VF, the alias of V[0xF] written by flag-setting instructions.
    pub fn flag(&self) -> u8 {
        self.v_reg[FLAG_REG]
    }

    fn set_flag(&mut self, set: bool) {
        self.v_reg[FLAG_REG] = set as u8;
    }

    /// Live level of a key; indices past the keypad read as released.
    fn is_key_pressed(&self, key: usize) -> bool {
        self.keys.get(key).copied().unwrap_or(false)
    }

    pub fn set_key(&mut self, idx: usize, pressed: bool) -> VmResult<()> {
        let key = self
            .keys
            .get_mut(idx)
            .ok_or(VmError::InvalidKey { key: idx })?;
        *key = pressed;
        Ok(())
    }

    pub fn set_keys(&mut self, keys: [bool; NUM_KEYS]) {
        self.keys = keys;
    }

    pub fn keys(&self) -> &[bool; NUM_KEYS] {
        &self.keys
    }

    pub fn display(&self) -> &[bool; SCREEN_WIDTH * SCREEN_HEIGHT] {
        &self.screen
    }

    /// Cell at `(x, y)`, or `None` off screen.
    pub fn pixel(&self, x: usize, y: usize) -> Option<bool> {
        if x >= SCREEN_WIDTH || y >= SCREEN_HEIGHT {
            return None;
        }
        Some(self.screen[y * SCREEN_WIDTH + x])
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn registers(&self) -> &[u8; NUM_REGS] {
        &self.v_reg
    }

    pub fn register(&self, idx: usize) -> u8 {
        self.v_reg[idx & 0xF]
    }

    pub fn index(&self) -> u16 {
        self.i_reg
    }

    pub fn stack_depth(&self) -> usize {
        self.stack_pointer as usize
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }

    /// Whether a host with audio would currently be beeping.
    pub fn sound_active(&self) -> bool {
        self.sound_timer > 0
    }

    pub fn memory(&self) -> &[u8; RAM_SIZE] {
        &self.ram
    }
}

fn new_rng(config: &MachineConfig) -> StdRng {
    match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
