/// Host keys a frontend can report, independent of the windowing or terminal
/// backend.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Key {
    Num1,
    Num2,
    Num3,
    Num4,
    Q,
    W,
    E,
    R,
    A,
    S,
    D,
    F,
    Z,
    X,
    C,
    V,
    Escape,
    None,
}

impl Key {
    /// Map a typed character, ignoring case.
    pub fn from_char(c: char) -> Key {
        match c.to_ascii_lowercase() {
            '1' => Key::Num1,
            '2' => Key::Num2,
            '3' => Key::Num3,
            '4' => Key::Num4,
            'q' => Key::Q,
            'w' => Key::W,
            'e' => Key::E,
            'r' => Key::R,
            'a' => Key::A,
            's' => Key::S,
            'd' => Key::D,
            'f' => Key::F,
            'z' => Key::Z,
            'x' => Key::X,
            'c' => Key::C,
            'v' => Key::V,
            _ => Key::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Key;

    #[test]
    fn maps_characters_case_insensitively() {
        assert_eq!(Key::from_char('q'), Key::Q);
        assert_eq!(Key::from_char('Q'), Key::Q);
        assert_eq!(Key::from_char('4'), Key::Num4);
        assert_eq!(Key::from_char('p'), Key::None);
    }
}
