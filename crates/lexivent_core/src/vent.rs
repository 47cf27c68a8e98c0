//! The hydrothermal vent: the only token source in the world.
//!
//! A vent sits on the grid floor and emits one randomly chosen C token on a
//! fixed cadence. Everything else in the simulation only moves, bonds or
//! destroys tokens; the vent is where matter enters.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::VentConfig;
use crate::token::Token;

/// The spawn vocabulary: common C keywords, operators, punctuation,
/// identifiers and literals.
pub const VENT_TOKENS: &[&str] = &[
    // Keywords
    "if", "else", "for", "while", "return", "int", "float", "char", "void",
    "struct", "typedef", "sizeof", "const", "static", "break", "continue",
    // Operators
    "+", "-", "*", "/", "=", "==", "!=", "<", ">", "<=", ">=", "&&", "||",
    "++", "--", "+=", "-=", "*=", "/=", "&", "|", "^", "~", "<<", ">>",
    // Punctuation
    "(", ")", "{", "}", "[", "]", ";", ",", ".", "->", "%",
    // Common identifiers
    "main", "printf", "scanf", "malloc", "free", "NULL", "argc", "argv",
    "i", "j", "k", "x", "y", "z", "n", "count", "sum", "temp", "result",
    // Literals
    "0", "1", "2", "10", "100", "0x00", "0xFF",
];

/// Emits tokens at a fixed floor position on a fixed cadence.
#[derive(Clone, Debug)]
pub struct Vent {
    x: usize,
    y: usize,
    z: usize,
    spawn_rate: u64,
    token_energy: i32,
    tick_counter: u64,
    tokens_spawned: u64,
}

impl Vent {
    pub fn new(config: &VentConfig, position: (usize, usize, usize)) -> Self {
        Self {
            x: position.0,
            y: position.1,
            z: position.2,
            spawn_rate: config.spawn_rate.max(1),
            token_energy: config.token_energy,
            tick_counter: 0,
            tokens_spawned: 0,
        }
    }

    pub fn position(&self) -> (usize, usize, usize) {
        (self.x, self.y, self.z)
    }

    /// Total tokens emitted since the start of the run.
    pub fn tokens_spawned(&self) -> u64 {
        self.tokens_spawned
    }

    /// Advances the cadence counter and spawns a token when it's due.
    pub fn update<R: Rng>(&mut self, rng: &mut R) -> Option<Token> {
        self.tick_counter += 1;
        if self.tick_counter >= self.spawn_rate {
            self.tick_counter = 0;
            return Some(self.spawn_token(rng));
        }
        None
    }

    fn spawn_token<R: Rng>(&mut self, rng: &mut R) -> Token {
        let value = VENT_TOKENS
            .choose(rng)
            .copied()
            .unwrap_or("0");
        self.tokens_spawned += 1;
        Token::new(
            value,
            self.x as f64,
            self.y as f64,
            self.z as f64,
            self.token_energy,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn vent(spawn_rate: u64) -> Vent {
        let config = VentConfig {
            position: None,
            spawn_rate,
            token_energy: 50,
        };
        Vent::new(&config, (5, 5, 0))
    }

    #[test]
    fn spawns_on_cadence() {
        let mut v = vent(10);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        for _ in 0..9 {
            assert!(v.update(&mut rng).is_none());
        }
        assert!(v.update(&mut rng).is_some());
        assert_eq!(v.tokens_spawned(), 1);

        // Counter resets: next spawn is another 10 ticks out.
        for _ in 0..9 {
            assert!(v.update(&mut rng).is_none());
        }
        assert!(v.update(&mut rng).is_some());
        assert_eq!(v.tokens_spawned(), 2);
    }

    #[test]
    fn spawned_tokens_carry_vent_energy_and_position() {
        let mut v = vent(1);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let token = v.update(&mut rng).unwrap();
        assert_eq!(token.energy, 50);
        assert_eq!(token.position(), (5.0, 5.0, 0.0));
        assert!(VENT_TOKENS.contains(&token.value.as_str()));
    }

    #[test]
    fn spawn_values_come_from_vocabulary() {
        let mut v = vent(1);
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        for _ in 0..200 {
            let token = v.update(&mut rng).unwrap();
            assert!(VENT_TOKENS.contains(&token.value.as_str()));
        }
        assert_eq!(v.tokens_spawned(), 200);
    }
}
