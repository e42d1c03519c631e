use std::fmt;

/// One decoded CHIP-8 instruction.
///
/// `x` and `y` are V register indices taken from bits 8-11 and 4-7 of the
/// instruction word; `addr` is the 12-bit `NNN` immediate and `value`/`mask`
/// the low byte `NN`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0 - CLS
    ClearScreen,
    /// 00EE - RET
    Return,
    /// 1NNN - JP addr
    Jump { addr: u16 },
    /// 2NNN - CALL addr
    Call { addr: u16 },
    /// 3XNN - SE Vx, byte
    SkipEqImm { x: usize, value: u8 },
    /// 4XNN - SNE Vx, byte
    SkipNeImm { x: usize, value: u8 },
    /// 5XY0 - SE Vx, Vy
    SkipEqReg { x: usize, y: usize },
    /// 6XNN - LD Vx, byte
    SetImm { x: usize, value: u8 },
    /// 7XNN - ADD Vx, byte (no carry)
    AddImm { x: usize, value: u8 },
    /// 8XY0 - LD Vx, Vy
    SetReg { x: usize, y: usize },
    /// 8XY1 - OR Vx, Vy
    Or { x: usize, y: usize },
    /// 8XY2 - AND Vx, Vy
    And { x: usize, y: usize },
    /// 8XY3 - XOR Vx, Vy
    Xor { x: usize, y: usize },
    /// 8XY4 - ADD Vx, Vy, VF = carry
    AddReg { x: usize, y: usize },
    /// 8XY5 - SUB Vx, Vy, VF = !borrow
    SubReg { x: usize, y: usize },
    /// 8XY6 - SHR Vx, VF = lsb
    ShiftRight { x: usize },
    /// 8XY7 - SUBN Vx, Vy, VF = !borrow
    SubN { x: usize, y: usize },
    /// 8XYE - SHL Vx, VF = msb
    ShiftLeft { x: usize },
    /// 9XY0 - SNE Vx, Vy
    SkipNeReg { x: usize, y: usize },
    /// ANNN - LD I, addr
    SetIndex { addr: u16 },
    /// BNNN - JP V0, addr
    JumpOffset { addr: u16 },
    /// CXNN - RND Vx, byte
    Random { x: usize, mask: u8 },
    /// DXYN - DRW Vx, Vy, nibble
    Draw { x: usize, y: usize, height: u8 },
    /// EX9E - SKP Vx
    SkipKeyPressed { x: usize },
    /// EXA1 - SKNP Vx
    SkipKeyNotPressed { x: usize },
    /// FX07 - LD Vx, DT
    LoadDelay { x: usize },
    /// FX0A - LD Vx, K
    WaitKey { x: usize },
    /// FX15 - LD DT, Vx
    SetDelay { x: usize },
    /// FX18 - LD ST, Vx
    SetSound { x: usize },
    /// FX1E - ADD I, Vx
    AddIndex { x: usize },
    /// FX29 - LD F, Vx
    FontAddr { x: usize },
    /// FX33 - LD B, Vx
    Bcd { x: usize },
    /// FX55 - LD [I], Vx
    StoreRegs { x: usize },
    /// FX65 - LD Vx, [I]
    LoadRegs { x: usize },
}

impl Instruction {
    /// Decode a big-endian instruction word.
    ///
    /// Families 0x0, 0x8, 0xE and 0xF select the operation from the low
    /// nibble or low byte; a word matching nothing in its family returns
    /// `None`.
    pub fn decode(opcode: u16) -> Option<Self> {
        let family = (opcode & 0xF000) >> 12;
        let x = ((opcode & 0x0F00) >> 8) as usize;
        let y = ((opcode & 0x00F0) >> 4) as usize;
        let n = (opcode & 0x000F) as u8;
        let nn = (opcode & 0x00FF) as u8;
        let nnn = opcode & 0x0FFF;

        let instruction = match family {
            0x0 => match nn {
                0xE0 => Self::ClearScreen,
                0xEE => Self::Return,
                _ => return None,
            },
            0x1 => Self::Jump { addr: nnn },
            0x2 => Self::Call { addr: nnn },
            0x3 => Self::SkipEqImm { x, value: nn },
            0x4 => Self::SkipNeImm { x, value: nn },
            0x5 => Self::SkipEqReg { x, y },
            0x6 => Self::SetImm { x, value: nn },
            0x7 => Self::AddImm { x, value: nn },
            0x8 => match n {
                0x0 => Self::SetReg { x, y },
                0x1 => Self::Or { x, y },
                0x2 => Self::And { x, y },
                0x3 => Self::Xor { x, y },
                0x4 => Self::AddReg { x, y },
                0x5 => Self::SubReg { x, y },
                0x6 => Self::ShiftRight { x },
                0x7 => Self::SubN { x, y },
                0xE => Self::ShiftLeft { x },
                _ => return None,
            },
            0x9 => Self::SkipNeReg { x, y },
            0xA => Self::SetIndex { addr: nnn },
            0xB => Self::JumpOffset { addr: nnn },
            0xC => Self::Random { x, mask: nn },
            0xD => Self::Draw { x, y, height: n },
            0xE => match nn {
                0x9E => Self::SkipKeyPressed { x },
                0xA1 => Self::SkipKeyNotPressed { x },
                _ => return None,
            },
            0xF => match nn {
                0x07 => Self::LoadDelay { x },
                0x0A => Self::WaitKey { x },
                0x15 => Self::SetDelay { x },
                0x18 => Self::SetSound { x },
                0x1E => Self::AddIndex { x },
                0x29 => Self::FontAddr { x },
                0x33 => Self::Bcd { x },
                0x55 => Self::StoreRegs { x },
                0x65 => Self::LoadRegs { x },
                _ => return None,
            },
            _ => unreachable!("high nibble is 4 bits"),
        };
        Some(instruction)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::ClearScreen => write!(f, "CLS"),
            Self::Return => write!(f, "RET"),
            Self::Jump { addr } => write!(f, "JP {addr:#05X}"),
            Self::Call { addr } => write!(f, "CALL {addr:#05X}"),
            Self::SkipEqImm { x, value } => write!(f, "SE V{x:X}, {value:#04X}"),
            Self::SkipNeImm { x, value } => write!(f, "SNE V{x:X}, {value:#04X}"),
            Self::SkipEqReg { x, y } => write!(f, "SE V{x:X}, V{y:X}"),
            Self::SetImm { x, value } => write!(f, "LD V{x:X}, {value:#04X}"),
            Self::AddImm { x, value } => write!(f, "ADD V{x:X}, {value:#04X}"),
            Self::SetReg { x, y } => write!(f, "LD V{x:X}, V{y:X}"),
            Self::Or { x, y } => write!(f, "OR V{x:X}, V{y:X}"),
            Self::And { x, y } => write!(f, "AND V{x:X}, V{y:X}"),
            Self::Xor { x, y } => write!(f, "XOR V{x:X}, V{y:X}"),
            Self::AddReg { x, y } => write!(f, "ADD V{x:X}, V{y:X}"),
            Self::SubReg { x, y } => write!(f, "SUB V{x:X}, V{y:X}"),
            Self::ShiftRight { x } => write!(f, "SHR V{x:X}"),
            Self::SubN { x, y } => write!(f, "SUBN V{x:X}, V{y:X}"),
            Self::ShiftLeft { x } => write!(f, "SHL V{x:X}"),
            Self::SkipNeReg { x, y } => write!(f, "SNE V{x:X}, V{y:X}"),
            Self::SetIndex { addr } => write!(f, "LD I, {addr:#05X}"),
            Self::JumpOffset { addr } => write!(f, "JP V0, {addr:#05X}"),
            Self::Random { x, mask } => write!(f, "RND V{x:X}, {mask:#04X}"),
            Self::Draw { x, y, height } => write!(f, "DRW V{x:X}, V{y:X}, {height}"),
            Self::SkipKeyPressed { x } => write!(f, "SKP V{x:X}"),
            Self::SkipKeyNotPressed { x } => write!(f, "SKNP V{x:X}"),
            Self::LoadDelay { x } => write!(f, "LD V{x:X}, DT"),
            Self::WaitKey { x } => write!(f, "LD V{x:X}, K"),
            Self::SetDelay { x } => write!(f, "LD DT, V{x:X}"),
            Self::SetSound { x } => write!(f, "LD ST, V{x:X}"),
            Self::AddIndex { x } => write!(f, "ADD I, V{x:X}"),
            Self::FontAddr { x } => write!(f, "LD F, V{x:X}"),
            Self::Bcd { x } => write!(f, "LD B, V{x:X}"),
            Self::StoreRegs { x } => write!(f, "LD [I], V{x:X}"),
            Self::LoadRegs { x } => write!(f, "LD V{x:X}, [I]"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Instruction;

    #[test]
    fn decodes_operand_nibbles() {
        assert_eq!(
            Instruction::decode(0x8AB4),
            Some(Instruction::AddReg { x: 0xA, y: 0xB })
        );
        assert_eq!(
            Instruction::decode(0xD125),
            Some(Instruction::Draw {
                x: 1,
                y: 2,
                height: 5
            })
        );
        assert_eq!(
            Instruction::decode(0x3C7F),
            Some(Instruction::SkipEqImm { x: 0xC, value: 0x7F })
        );
        assert_eq!(
            Instruction::decode(0xA123),
            Some(Instruction::SetIndex { addr: 0x123 })
        );
        assert_eq!(
            Instruction::decode(0xBFFF),
            Some(Instruction::JumpOffset { addr: 0xFFF })
        );
    }

    #[test]
    fn decodes_secondary_dispatch_families() {
        assert_eq!(Instruction::decode(0x00E0), Some(Instruction::ClearScreen));
        assert_eq!(Instruction::decode(0x00EE), Some(Instruction::Return));
        assert_eq!(
            Instruction::decode(0x830E),
            Some(Instruction::ShiftLeft { x: 3 })
        );
        assert_eq!(
            Instruction::decode(0xE59E),
            Some(Instruction::SkipKeyPressed { x: 5 })
        );
        assert_eq!(
            Instruction::decode(0xE5A1),
            Some(Instruction::SkipKeyNotPressed { x: 5 })
        );
        assert_eq!(Instruction::decode(0xF40A), Some(Instruction::WaitKey { x: 4 }));
        assert_eq!(Instruction::decode(0xF765), Some(Instruction::LoadRegs { x: 7 }));
    }

    #[test]
    fn rejects_unknown_words_in_secondary_families() {
        for opcode in [0x0000, 0x0123, 0x00E1, 0x8008, 0x800F, 0xE000, 0xE19F, 0xF000, 0xF0FF] {
            assert_eq!(Instruction::decode(opcode), None, "{opcode:#06X}");
        }
    }

    #[test]
    fn every_primary_family_decodes_without_secondary_dispatch() {
        for family in [0x1u16, 0x2, 0x3, 0x4, 0x5, 0x6, 0x7, 0x9, 0xA, 0xB, 0xC, 0xD] {
            let opcode = family << 12 | 0x0ABC;
            assert!(Instruction::decode(opcode).is_some(), "{opcode:#06X}");
        }
    }

    #[test]
    fn formats_mnemonics() {
        assert_eq!(Instruction::SetImm { x: 3, value: 0x2A }.to_string(), "LD V3, 0x2A");
        assert_eq!(Instruction::Call { addr: 0x300 }.to_string(), "CALL 0x300");
        assert_eq!(
            Instruction::Draw {
                x: 0xA,
                y: 0xB,
                height: 15
            }
            .to_string(),
            "DRW VA, VB, 15"
        );
    }
}
