#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hand {
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Finger {
    Pinky,
    Ring,
    Middle,
    Index,
    Thumb,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FingerAssignment {
    pub hand: Hand,
    pub finger: Finger,
}

impl FingerAssignment {
    pub fn new(hand: Hand, finger: Finger) -> Self {
        Self { hand, finger }
    }
}

/// Home row keys with a tactile bump.
pub const ANCHOR_KEYS: [char; 2] = ['F', 'J'];

pub fn is_anchor(ch: char) -> bool {
    ANCHOR_KEYS.contains(&ch.to_ascii_uppercase())
}

pub fn qwerty_finger(ch: char) -> FingerAssignment {
    use Finger::*;
    use Hand::*;

    match ch.to_ascii_lowercase() {
        'q' | 'a' | 'z' | '1' => FingerAssignment::new(Left, Pinky),
        'w' | 's' | 'x' | '2' => FingerAssignment::new(Left, Ring),
        'e' | 'd' | 'c' | '3' => FingerAssignment::new(Left, Middle),
        'r' | 'f' | 'v' | 't' | 'g' | 'b' | '4' | '5' => FingerAssignment::new(Left, Index),
        'y' | 'h' | 'n' | 'u' | 'j' | 'm' | '6' | '7' => FingerAssignment::new(Right, Index),
        'i' | 'k' | ',' | '8' => FingerAssignment::new(Right, Middle),
        'o' | 'l' | '.' | '9' => FingerAssignment::new(Right, Ring),
        'p' | ';' | '/' | '0' | '-' | '=' | '[' | ']' | '\'' | '\\' => {
            FingerAssignment::new(Right, Pinky)
        }
        ' ' => FingerAssignment::new(Right, Thumb),
        _ => FingerAssignment::new(Right, Index),
    }
}

/// Plain-language finger name used in prompts, e.g. "left pointer finger".
pub fn finger_name(ch: char) -> String {
    let assignment = qwerty_finger(ch);
    let hand = match assignment.hand {
        Hand::Left => "left",
        Hand::Right => "right",
    };
    let finger = match assignment.finger {
        Finger::Pinky => "pinky",
        Finger::Ring => "ring finger",
        Finger::Middle => "middle finger",
        Finger::Index => "pointer finger",
        Finger::Thumb => "thumb",
    };
    format!("{hand} {finger}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_keys_case_insensitive() {
        assert!(is_anchor('f'));
        assert!(is_anchor('J'));
        assert!(!is_anchor('k'));
    }

    #[test]
    fn test_home_row_hands() {
        assert_eq!(qwerty_finger('F').hand, Hand::Left);
        assert_eq!(qwerty_finger('j').hand, Hand::Right);
        assert_eq!(qwerty_finger(';').finger, Finger::Pinky);
    }

    #[test]
    fn test_finger_name() {
        assert_eq!(finger_name('f'), "left pointer finger");
        assert_eq!(finger_name('K'), "right middle finger");
    }
}
