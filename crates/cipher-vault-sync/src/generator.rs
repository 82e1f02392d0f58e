//! Random password generation.

use rand::rngs::OsRng;
use rand::seq::SliceRandom;

const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
const DIGITS: &str = "0123456789";
const SYMBOLS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

/// Characters dropped when `exclude_ambiguous` is set.
pub const AMBIGUOUS: &str = "{}[]()/\\'\"`~,;.<>";

/// Default generated length.
pub const DEFAULT_LENGTH: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorOptions {
    pub length: usize,
    pub uppercase: bool,
    pub lowercase: bool,
    pub digits: bool,
    pub symbols: bool,
    pub exclude_ambiguous: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            length: DEFAULT_LENGTH,
            uppercase: true,
            lowercase: true,
            digits: true,
            symbols: true,
            exclude_ambiguous: true,
        }
    }
}

impl GeneratorOptions {
    /// The characters a password may be drawn from.
    pub fn charset(&self) -> Vec<char> {
        let classes = [
            (self.uppercase, UPPERCASE),
            (self.lowercase, LOWERCASE),
            (self.digits, DIGITS),
            (self.symbols, SYMBOLS),
        ];
        classes
            .iter()
            .filter(|(enabled, _)| *enabled)
            .flat_map(|(_, set)| set.chars())
            .filter(|c| !(self.exclude_ambiguous && AMBIGUOUS.contains(*c)))
            .collect()
    }
}

/// Generate a password. With no character class enabled the result is empty.
pub fn generate(options: &GeneratorOptions) -> String {
    let charset = options.charset();
    if charset.is_empty() {
        return String::new();
    }
    let mut rng = OsRng;
    (0..options.length)
        .filter_map(|_| charset.choose(&mut rng).copied())
        .collect()
}
