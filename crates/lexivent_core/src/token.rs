//! Token model: a lexical code unit behaving as a particle.
//!
//! Tokens carry position, velocity, energy and mass (mass equals the
//! character length of the value). Bonding compatibility between two tokens
//! is a pure pairwise function over their values and kinds; mutual exclusion
//! (repulsion) is a separate relation used by the grid's admission rule.

use serde::{Deserialize, Serialize};

/// Stable handle for a token in the grid's arena.
///
/// Identity is the handle, never the value: two tokens with equal values are
/// still distinct particles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TokenId(pub u64);

/// Stable handle for a chain in the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChainId(pub u64);

/// Lexical classification of a token value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Keyword,
    Operator,
    Punctuation,
    Identifier,
    Literal,
    Unknown,
}

const KEYWORDS: &[&str] = &[
    "if", "else", "for", "while", "function", "class", "return", "int", "float", "var", "let",
    "const",
];

const OPERATORS: &[&str] = &[
    "+", "-", "*", "/", "=", "==", "!=", "<", ">", "<=", ">=", "&&", "||",
];

const PUNCTUATION: &[&str] = &["(", ")", "{", "}", "[", "]", ";", ",", "."];

/// Delimiter pairs that form the strongest bonds.
const MATCHING_PAIRS: &[(&str, &str)] = &[("(", ")"), ("{", "}"), ("[", "]")];

/// Value sets whose distinct members repel each other in the same cell.
const EXCLUSIVE_SETS: &[&[&str]] = &[
    &["if", "while", "for"],
    &["int", "float", "var"],
    &["++", "--"],
    &["&&", "||"],
];

impl TokenKind {
    /// Classifies a raw token value.
    pub fn classify(value: &str) -> Self {
        if KEYWORDS.contains(&value) {
            Self::Keyword
        } else if OPERATORS.contains(&value) {
            Self::Operator
        } else if PUNCTUATION.contains(&value) {
            Self::Punctuation
        } else if is_identifier(value) {
            Self::Identifier
        } else if value.parse::<f64>().is_ok() {
            Self::Literal
        } else {
            Self::Unknown
        }
    }
}

fn is_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// A single code token in 3D space.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Token {
    pub value: String,
    pub kind: TokenKind,
    /// Mass equals the character length of the value.
    pub mass: u32,
    /// Positive energy drives rising; at or below zero the token sinks.
    pub energy: i32,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub vx: f64,
    pub vy: f64,
    pub vz: f64,
    pub damaged: bool,
    pub chain: Option<ChainId>,
}

impl Token {
    pub fn new(value: &str, x: f64, y: f64, z: f64, energy: i32) -> Self {
        Self {
            kind: TokenKind::classify(value),
            mass: value.len().max(1) as u32,
            value: value.to_string(),
            energy,
            x,
            y,
            z,
            vx: 0.0,
            vy: 0.0,
            vz: 0.0,
            damaged: false,
            chain: None,
        }
    }

    pub fn position(&self) -> (f64, f64, f64) {
        (self.x, self.y, self.z)
    }

    /// Whether the token is currently rising (energy remaining).
    pub fn is_rising(&self) -> bool {
        self.energy > 0
    }

    /// One tick of vertical motion plus velocity integration.
    ///
    /// Rising costs one energy per unit of climb; sinking is free fall at one
    /// unit per tick. Velocity decays by a fixed friction factor.
    pub fn advance(&mut self) {
        if self.energy > 0 {
            self.z += 1.0;
            self.energy -= 1;
        } else {
            self.z -= 1.0;
        }

        self.x += self.vx;
        self.y += self.vy;
        self.z += self.vz;

        self.vx *= FRICTION;
        self.vy *= FRICTION;
        self.vz *= FRICTION;
    }

    /// Re-derives the kind from the value (used when damage is repaired).
    pub fn restore_kind(&mut self) {
        self.kind = TokenKind::classify(&self.value);
    }
}

/// Per-tick velocity decay factor.
pub const FRICTION: f64 = 0.9;

/// Minimum strength for a bond to actually form.
pub const BOND_FORM_THRESHOLD: u8 = 50;

/// Bonds below this strength break under grammar validation.
pub const BOND_BREAK_THRESHOLD: u8 = 30;

/// Computes the bond strength between `a` (considered first) and `b`.
///
/// Returns `None` when the pair cannot bond at all. Damaged tokens never
/// bond. The table is an intentionally shallow pairwise heuristic, not a
/// grammar: it scores "does this look like code" locally.
pub fn bond_strength(a: &Token, b: &Token) -> Option<u8> {
    if a.damaged || b.damaged {
        return None;
    }

    // Matching delimiters: strongest bond.
    if MATCHING_PAIRS
        .iter()
        .any(|(open, close)| a.value == *open && b.value == *close)
    {
        return Some(100);
    }

    if a.kind == TokenKind::Keyword {
        if matches!(a.value.as_str(), "if" | "while" | "for") && b.value == "(" {
            return Some(90);
        }
        if matches!(a.value.as_str(), "int" | "float" | "var" | "let" | "const")
            && b.kind == TokenKind::Identifier
        {
            return Some(85);
        }
    }

    if a.kind == TokenKind::Operator {
        let operand = matches!(b.kind, TokenKind::Identifier | TokenKind::Literal);
        if a.value == "=" && operand {
            return Some(80);
        }
        if matches!(
            a.value.as_str(),
            "+" | "-" | "*" | "/" | "==" | "!=" | "<" | ">"
        ) && operand
        {
            return Some(75);
        }
    }

    if a.value == "("
        && matches!(
            b.kind,
            TokenKind::Identifier | TokenKind::Literal | TokenKind::Keyword
        )
    {
        return Some(70);
    }

    if a.value == "," && matches!(b.kind, TokenKind::Identifier | TokenKind::Literal) {
        return Some(60);
    }

    // Weak sequential bond: operand followed by a continuation.
    if matches!(a.kind, TokenKind::Identifier | TokenKind::Literal)
        && matches!(b.value.as_str(), "+" | "-" | "*" | "/" | "=" | ";" | "," | ")")
    {
        return Some(50);
    }

    None
}

/// Whether two tokens repel each other (distinct members of the same
/// functional set, e.g. `if` vs `while`). Used for cell admission conflicts,
/// never for bonding.
pub fn mutually_exclusive(a: &Token, b: &Token) -> bool {
    if a.value == b.value {
        return false;
    }
    EXCLUSIVE_SETS
        .iter()
        .any(|set| set.contains(&a.value.as_str()) && set.contains(&b.value.as_str()))
}
