use crate::element::Element;
use crate::smiles::error::SmilesError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Atom(AtomToken),
    Bond(BondToken, usize),
    RingClosure {
        bond: Option<BondToken>,
        digit: u16,
        pos: usize,
    },
    OpenParen(usize),
    CloseParen(usize),
    Dot(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomToken {
    pub element: Element,
    pub is_aromatic: bool,
    pub isotope: u16,
    pub hcount: Option<u8>,
    pub charge: i8,
    pub atom_class: u16,
    pub is_bracket: bool,
    pub pos: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BondToken {
    Single,
    Double,
    Triple,
    Aromatic,
    /// `/` and `\`. Stereo is not tracked; both read as single bonds.
    Directional,
}

pub fn tokenize(input: &str) -> Result<Vec<Token>, SmilesError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let two_char = |next: char| i + 1 < chars.len() && chars[i + 1] == next;
        match chars[i] {
            '[' => {
                let (tok, next) = parse_bracket_atom(&chars, i)?;
                tokens.push(Token::Atom(tok));
                i = next;
            }
            'B' if two_char('r') => {
                tokens.push(Token::Atom(bare_atom(Element::Br, false, i)));
                i += 2;
            }
            'C' if two_char('l') => {
                tokens.push(Token::Atom(bare_atom(Element::Cl, false, i)));
                i += 2;
            }
            ch @ ('B' | 'C' | 'N' | 'O' | 'P' | 'S' | 'F' | 'I') => {
                let element = organic_element(ch);
                tokens.push(Token::Atom(bare_atom(element, false, i)));
                i += 1;
            }
            ch @ ('b' | 'c' | 'n' | 'o' | 'p' | 's') => {
                let element = organic_element(ch.to_ascii_uppercase());
                tokens.push(Token::Atom(bare_atom(element, true, i)));
                i += 1;
            }
            '-' => {
                tokens.push(Token::Bond(BondToken::Single, i));
                i += 1;
            }
            '=' => {
                tokens.push(Token::Bond(BondToken::Double, i));
                i += 1;
            }
            '#' => {
                tokens.push(Token::Bond(BondToken::Triple, i));
                i += 1;
            }
            ':' => {
                tokens.push(Token::Bond(BondToken::Aromatic, i));
                i += 1;
            }
            '/' | '\\' => {
                tokens.push(Token::Bond(BondToken::Directional, i));
                i += 1;
            }
            '(' => {
                tokens.push(Token::OpenParen(i));
                i += 1;
            }
            ')' => {
                tokens.push(Token::CloseParen(i));
                i += 1;
            }
            '.' => {
                tokens.push(Token::Dot(i));
                i += 1;
            }
            '%' => {
                let (digit, next) = parse_percent_ring(&chars, i)?;
                let bond = try_consume_pending_bond(&mut tokens);
                tokens.push(Token::RingClosure { bond, digit, pos: i });
                i = next;
            }
            d @ '0'..='9' => {
                let bond = try_consume_pending_bond(&mut tokens);
                tokens.push(Token::RingClosure {
                    bond,
                    digit: digit_value(d),
                    pos: i,
                });
                i += 1;
            }
            ch => return Err(SmilesError::UnexpectedChar { pos: i, ch }),
        }
    }

    Ok(tokens)
}

fn organic_element(ch: char) -> Element {
    match ch {
        'B' => Element::B,
        'N' => Element::N,
        'O' => Element::O,
        'P' => Element::P,
        'S' => Element::S,
        'F' => Element::F,
        'I' => Element::I,
        _ => Element::C,
    }
}

fn digit_value(d: char) -> u16 {
    (d as u16) - u16::from(b'0')
}

fn bare_atom(element: Element, aromatic: bool, pos: usize) -> AtomToken {
    AtomToken {
        element,
        is_aromatic: aromatic,
        isotope: 0,
        hcount: None,
        charge: 0,
        atom_class: 0,
        is_bracket: false,
        pos,
    }
}

/// A bond written directly before a ring digit belongs to the ring closure.
fn try_consume_pending_bond(tokens: &mut Vec<Token>) -> Option<BondToken> {
    if let Some(Token::Bond(..)) = tokens.last() {
        if let Some(Token::Bond(b, _)) = tokens.pop() {
            return Some(b);
        }
    }
    None
}

fn parse_percent_ring(chars: &[char], start: usize) -> Result<(u16, usize), SmilesError> {
    let i = start + 1;
    if i + 1 >= chars.len() || !chars[i].is_ascii_digit() || !chars[i + 1].is_ascii_digit() {
        return Err(SmilesError::UnexpectedChar {
            pos: start,
            ch: '%',
        });
    }
    Ok((digit_value(chars[i]) * 10 + digit_value(chars[i + 1]), i + 2))
}

fn parse_bracket_atom(chars: &[char], start: usize) -> Result<(AtomToken, usize), SmilesError> {
    let mut i = start + 1;

    let isotope = parse_isotope(chars, &mut i, start)?;
    let (element, is_aromatic) = parse_bracket_element(chars, &mut i, start)?;
    skip_chirality(chars, &mut i);
    let hcount = parse_hcount(chars, &mut i);
    let charge = parse_charge(chars, &mut i, start)?;
    let atom_class = parse_atom_class(chars, &mut i, start)?;

    if i >= chars.len() || chars[i] != ']' {
        return Err(SmilesError::UnclosedBracket { pos: start });
    }
    i += 1;

    Ok((
        AtomToken {
            element,
            is_aromatic,
            isotope,
            hcount: Some(hcount.unwrap_or(0)),
            charge,
            atom_class,
            is_bracket: true,
            pos: start,
        },
        i,
    ))
}

fn parse_isotope(chars: &[char], i: &mut usize, start: usize) -> Result<u16, SmilesError> {
    let mut val: u16 = 0;
    while *i < chars.len() && chars[*i].is_ascii_digit() {
        val = val
            .checked_mul(10)
            .and_then(|v| v.checked_add(digit_value(chars[*i])))
            .ok_or(SmilesError::InvalidIsotope { pos: start })?;
        *i += 1;
    }
    Ok(val)
}

fn parse_bracket_element(
    chars: &[char],
    i: &mut usize,
    bracket_start: usize,
) -> Result<(Element, bool), SmilesError> {
    if *i >= chars.len() {
        return Err(SmilesError::UnclosedBracket { pos: bracket_start });
    }

    const AROMATIC: [(&str, Element); 9] = [
        ("se", Element::Se),
        ("te", Element::Te),
        ("as", Element::As),
        ("b", Element::B),
        ("c", Element::C),
        ("n", Element::N),
        ("o", Element::O),
        ("p", Element::P),
        ("s", Element::S),
    ];

    for (pat, elem) in AROMATIC {
        let end = *i + pat.len();
        if end <= chars.len() && chars[*i..end].iter().copied().eq(pat.chars()) {
            *i = end;
            return Ok((elem, true));
        }
    }

    if *i + 1 < chars.len() && chars[*i].is_ascii_uppercase() && chars[*i + 1].is_ascii_lowercase()
    {
        let sym: String = chars[*i..=*i + 1].iter().collect();
        if let Some(e) = Element::from_symbol(&sym) {
            *i += 2;
            return Ok((e, false));
        }
    }

    if chars[*i].is_ascii_uppercase() {
        let sym = chars[*i].to_string();
        if let Some(e) = Element::from_symbol(&sym) {
            *i += 1;
            return Ok((e, false));
        }
    }

    Err(SmilesError::InvalidElement {
        pos: *i,
        text: chars[*i].to_string(),
    })
}

/// Tetrahedral and extended chirality marks are accepted and dropped.
fn skip_chirality(chars: &[char], i: &mut usize) {
    if *i >= chars.len() || chars[*i] != '@' {
        return;
    }
    while *i < chars.len() && chars[*i] == '@' {
        *i += 1;
    }
    for class in ["TH", "AL", "SP", "TB", "OH"] {
        let end = *i + 2;
        if end <= chars.len() && chars[*i..end].iter().copied().eq(class.chars()) {
            *i = end;
            while *i < chars.len() && chars[*i].is_ascii_digit() {
                *i += 1;
            }
            break;
        }
    }
}

fn parse_hcount(chars: &[char], i: &mut usize) -> Option<u8> {
    if *i < chars.len() && chars[*i] == 'H' {
        *i += 1;
        let mut count: u8 = 1;
        if *i < chars.len() && chars[*i].is_ascii_digit() {
            count = chars[*i] as u8 - b'0';
            *i += 1;
        }
        Some(count)
    } else {
        None
    }
}

fn parse_charge(chars: &[char], i: &mut usize, bracket_start: usize) -> Result<i8, SmilesError> {
    let sign: i8 = match chars.get(*i) {
        Some('+') => 1,
        Some('-') => -1,
        _ => return Ok(0),
    };
    let symbol = chars[*i];
    *i += 1;

    if *i < chars.len() && chars[*i] == symbol {
        let mut count: i8 = 1;
        while *i < chars.len() && chars[*i] == symbol {
            count = count
                .checked_add(1)
                .ok_or(SmilesError::InvalidCharge { pos: bracket_start })?;
            *i += 1;
        }
        return Ok(sign * count);
    }

    if *i < chars.len() && chars[*i].is_ascii_digit() {
        let mut val: i8 = 0;
        while *i < chars.len() && chars[*i].is_ascii_digit() {
            val = val
                .checked_mul(10)
                .and_then(|v| v.checked_add((chars[*i] as u8 - b'0') as i8))
                .ok_or(SmilesError::InvalidCharge { pos: bracket_start })?;
            *i += 1;
        }
        return Ok(sign * val);
    }

    Ok(sign)
}

fn parse_atom_class(chars: &[char], i: &mut usize, start: usize) -> Result<u16, SmilesError> {
    if *i >= chars.len() || chars[*i] != ':' {
        return Ok(0);
    }
    *i += 1;
    let mut val: u16 = 0;
    while *i < chars.len() && chars[*i].is_ascii_digit() {
        val = val
            .checked_mul(10)
            .and_then(|v| v.checked_add(digit_value(chars[*i])))
            .ok_or(SmilesError::InvalidAtomClass { pos: start })?;
        *i += 1;
    }
    Ok(val)
}
