use rand::Rng;

use super::{Machine, StepOutcome};
use crate::{Instruction, GLYPH_SIZE, SCREEN_HEIGHT, SCREEN_WIDTH};

/// How the program counter moves once an instruction's effects are applied.
enum PcUpdate {
    /// PC += 2
    Next,
    /// PC += 4, skipping the following instruction
    Skip,
    /// PC = addr
    Jump(u16),
    /// PC untouched, the cycle does not count
    Stall,
}

impl PcUpdate {
    fn skip_if(cond: bool) -> Self {
        if cond {
            PcUpdate::Skip
        } else {
            PcUpdate::Next
        }
    }
}

impl Machine {
    /// Apply one decoded instruction.
    ///
    /// Every fallible check (stack depth, memory bounds) runs before any state
    /// is written, so an error leaves the machine as it was.
    pub(super) fn execute(&mut self, instruction: Instruction) -> crate::VmResult<StepOutcome> {
        use Instruction::*;

        let update = match instruction {
            ClearScreen => {
                self.screen = [false; SCREEN_WIDTH * SCREEN_HEIGHT];
                PcUpdate::Next
            }
            Return => {
                // the stack holds the address of the CALL itself
                self.pc = self.pop()?;
                PcUpdate::Next
            }
            Jump { addr } => PcUpdate::Jump(addr),
            Call { addr } => {
                self.push(self.pc)?;
                PcUpdate::Jump(addr)
            }
            SkipEqImm { x, value } => PcUpdate::skip_if(self.v_reg[x] == value),
            SkipNeImm { x, value } => PcUpdate::skip_if(self.v_reg[x] != value),
            SkipEqReg { x, y } => PcUpdate::skip_if(self.v_reg[x] == self.v_reg[y]),
            SetImm { x, value } => {
                self.v_reg[x] = value;
                PcUpdate::Next
            }
            AddImm { x, value } => {
                self.v_reg[x] = self.v_reg[x].wrapping_add(value);
                PcUpdate::Next
            }
            SetReg { x, y } => {
                self.v_reg[x] = self.v_reg[y];
                PcUpdate::Next
            }
            Or { x, y } => {
                self.v_reg[x] |= self.v_reg[y];
                PcUpdate::Next
            }
            And { x, y } => {
                self.v_reg[x] &= self.v_reg[y];
                PcUpdate::Next
            }
            Xor { x, y } => {
                self.v_reg[x] ^= self.v_reg[y];
                PcUpdate::Next
            }
            // VF is written before V[X], so the result wins when X is F
            AddReg { x, y } => {
                let (_, carry) = self.v_reg[x].overflowing_add(self.v_reg[y]);
                self.set_flag(carry);
                self.v_reg[x] = self.v_reg[x].wrapping_add(self.v_reg[y]);
                PcUpdate::Next
            }
            SubReg { x, y } => {
                self.set_flag(self.v_reg[x] >= self.v_reg[y]);
                self.v_reg[x] = self.v_reg[x].wrapping_sub(self.v_reg[y]);
                PcUpdate::Next
            }
            ShiftRight { x } => {
                self.set_flag(self.v_reg[x] & 0x1 == 1);
                self.v_reg[x] >>= 1;
                PcUpdate::Next
            }
            SubN { x, y } => {
                self.set_flag(self.v_reg[y] >= self.v_reg[x]);
                self.v_reg[x] = self.v_reg[y].wrapping_sub(self.v_reg[x]);
                PcUpdate::Next
            }
            ShiftLeft { x } => {
                self.set_flag(self.v_reg[x] >> 7 == 1);
                self.v_reg[x] <<= 1;
                PcUpdate::Next
            }
            SkipNeReg { x, y } => PcUpdate::skip_if(self.v_reg[x] != self.v_reg[y]),
            SetIndex { addr } => {
                self.i_reg = addr;
                PcUpdate::Next
            }
            JumpOffset { addr } => PcUpdate::Jump(addr + self.v_reg[0] as u16),
            Random { x, mask } => {
                let byte: u8 = self.rng.gen();
                self.v_reg[x] = byte & mask;
                PcUpdate::Next
            }
            Draw { x, y, height } => {
                self.draw_sprite(x, y, height as usize)?;
                PcUpdate::Next
            }
            SkipKeyPressed { x } => PcUpdate::skip_if(self.is_key_pressed(self.v_reg[x] as usize)),
            SkipKeyNotPressed { x } => {
                PcUpdate::skip_if(!self.is_key_pressed(self.v_reg[x] as usize))
            }
            LoadDelay { x } => {
                self.v_reg[x] = self.delay_timer;
                PcUpdate::Next
            }
            WaitKey { x } => match self.keys.iter().position(|&pressed| pressed) {
                Some(key) => {
                    self.v_reg[x] = key as u8;
                    PcUpdate::Next
                }
                None => PcUpdate::Stall,
            },
            SetDelay { x } => {
                self.delay_timer = self.v_reg[x];
                PcUpdate::Next
            }
            SetSound { x } => {
                self.sound_timer = self.v_reg[x];
                PcUpdate::Next
            }
            AddIndex { x } => {
                self.set_flag(self.i_reg as u32 + self.v_reg[x] as u32 > 0xFFF);
                self.i_reg = self.i_reg.wrapping_add(self.v_reg[x] as u16);
                PcUpdate::Next
            }
            FontAddr { x } => {
                self.i_reg = self.v_reg[x] as u16 * GLYPH_SIZE as u16;
                PcUpdate::Next
            }
            Bcd { x } => {
                let range = self.mem_range(self.i_reg as usize, 3)?;
                let val = self.v_reg[x];
                self.ram[range].copy_from_slice(&[val / 100, (val / 10) % 10, val % 10]);
                PcUpdate::Next
            }
            StoreRegs { x } => {
                let range = self.mem_range(self.i_reg as usize, x + 1)?;
                self.ram[range].copy_from_slice(&self.v_reg[..=x]);
                self.i_reg += x as u16 + 1;
                PcUpdate::Next
            }
            LoadRegs { x } => {
                let range = self.mem_range(self.i_reg as usize, x + 1)?;
                self.v_reg[..=x].copy_from_slice(&self.ram[range]);
                self.i_reg += x as u16 + 1;
                PcUpdate::Next
            }
        };

        match update {
            PcUpdate::Next => self.pc = self.pc.wrapping_add(2),
            PcUpdate::Skip => self.pc = self.pc.wrapping_add(4),
            PcUpdate::Jump(addr) => self.pc = addr,
            PcUpdate::Stall => return Ok(StepOutcome::Stalled),
        }
        Ok(StepOutcome::Executed)
    }

    /// XOR-blit an 8xN sprite from `ram[I..I + N]` at `(Vx, Vy)`.
    ///
    /// Cells past the right or bottom edge wrap around to the opposite edge.
    /// VF ends as 1 if any lit cell was turned off.
    fn draw_sprite(&mut self, x: usize, y: usize, height: usize) -> crate::VmResult<()> {
        let rows = self.mem_range(self.i_reg as usize, height)?;
        let x_coord = self.v_reg[x] as usize;
        let y_coord = self.v_reg[y] as usize;

        let mut collision = false;
        for (row, addr) in rows.enumerate() {
            let pixels = self.ram[addr];
            for col in 0..8 {
                if (pixels >> (7 - col)) & 0x1 == 0 {
                    continue;
                }
                let x = (x_coord + col) % SCREEN_WIDTH;
                let y = (y_coord + row) % SCREEN_HEIGHT;
                let screen_pixel = &mut self.screen[x + y * SCREEN_WIDTH];
                collision |= *screen_pixel;
                *screen_pixel ^= true;
            }
        }
        self.set_flag(collision);
        Ok(())
    }
}
