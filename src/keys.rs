/// Identifier of the space bar on the virtual keyboard.
pub const SPACE_KEY: &str = "space";

/// Modeled US layout, one slice per keyboard row.
pub const KEYBOARD_LAYOUT: [&[&str]; 5] = [
    &[
        "`", "1", "2", "3", "4", "5", "6", "7", "8", "9", "0", "-", "=", "backspace",
    ],
    &[
        "tab", "q", "w", "e", "r", "t", "y", "u", "i", "o", "p", "[", "]", "\\",
    ],
    &[
        "capslock", "a", "s", "d", "f", "g", "h", "j", "k", "l", ";", "'", "enter",
    ],
    &[
        "shift", "z", "x", "c", "v", "b", "n", "m", ",", ".", "/", "shift",
    ],
    &["ctrl", "alt", SPACE_KEY, "alt", "ctrl"],
];

/// Transient key feedback coming from physical key events.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyFlash {
    Down,
    Released,
    Correct,
    Incorrect,
}

/// Virtual key to highlight for the next expected character.
pub fn key_for(expected: Option<char>) -> Option<String> {
    match expected? {
        ' ' => Some(SPACE_KEY.to_string()),
        c => Some(c.to_lowercase().collect()),
    }
}

/// Map a physical key name to its layout identifier.
pub fn normalize_key(name: &str) -> String {
    match name {
        " " => SPACE_KEY.to_string(),
        "Backspace" => "backspace".to_string(),
        "Shift" => "shift".to_string(),
        "Control" => "ctrl".to_string(),
        "Alt" => "alt".to_string(),
        "Enter" => "enter".to_string(),
        "Tab" => "tab".to_string(),
        "CapsLock" => "capslock".to_string(),
        other => other.to_lowercase(),
    }
}

pub fn is_on_layout(key_id: &str) -> bool {
    KEYBOARD_LAYOUT
        .iter()
        .any(|row| row.iter().any(|k| *k == key_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_for_none() {
        assert_eq!(key_for(None), None);
    }

    #[test]
    fn test_key_for_space() {
        assert_eq!(key_for(Some(' ')).as_deref(), Some("space"));
    }

    #[test]
    fn test_key_for_letters_are_lowercased() {
        assert_eq!(key_for(Some('t')).as_deref(), Some("t"));
        assert_eq!(key_for(Some('Q')).as_deref(), Some("q"));
    }

    #[test]
    fn test_key_for_punctuation_verbatim() {
        assert_eq!(key_for(Some(',')).as_deref(), Some(","));
        assert_eq!(key_for(Some('/')).as_deref(), Some("/"));
    }

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key(" "), "space");
        assert_eq!(normalize_key("Enter"), "enter");
        assert_eq!(normalize_key("Control"), "ctrl");
        assert_eq!(normalize_key("CapsLock"), "capslock");
        assert_eq!(normalize_key("A"), "a");
    }

    #[test]
    fn test_layout_covers_lowercase_letters() {
        for c in 'a'..='z' {
            let key = key_for(Some(c)).unwrap();
            assert!(is_on_layout(&key), "missing {key}");
        }
        assert!(is_on_layout("space"));
        assert!(!is_on_layout("f13"));
    }
}
