use std::collections::HashMap;

use petgraph::graph::NodeIndex;

use crate::element::Element;
use crate::mol::Mol;

use super::error::SmartsError;
use super::query::{AtomExpr, BondExpr, QueryMol};

const BOND_CHARS: [char; 12] = ['-', '=', '#', '~', ':', '/', '\\', '@', '!', '&', ',', ';'];

pub fn parse(s: &str) -> Result<QueryMol, SmartsError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(SmartsError::EmptyInput);
    }
    Parser::new(trimmed, 0).parse_smarts()
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    next_recursive: u32,
}

struct RingOpen {
    atom: NodeIndex,
    bond: Option<BondExpr>,
}

impl Parser {
    fn new(input: &str, next_recursive: u32) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
            next_recursive,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn at(&self, ch: char) -> bool {
        self.peek() == Some(ch)
    }

    fn expect(&mut self, ch: char) -> Result<(), SmartsError> {
        match self.peek() {
            Some(c) if c == ch => {
                self.pos += 1;
                Ok(())
            }
            Some(c) => Err(SmartsError::UnexpectedChar { pos: self.pos, ch: c }),
            None => Err(SmartsError::UnexpectedEnd { pos: self.pos }),
        }
    }

    fn parse_number(&mut self) -> Result<Option<u32>, SmartsError> {
        let start = self.pos;
        let mut value: u32 = 0;
        while let Some(d) = self.peek().and_then(|c| c.to_digit(10)) {
            value = value
                .checked_mul(10)
                .and_then(|v| v.checked_add(d))
                .ok_or(SmartsError::NumberOutOfRange { pos: start })?;
            self.pos += 1;
        }
        Ok((self.pos > start).then_some(value))
    }

    fn count_or(&mut self, default: u32) -> Result<u8, SmartsError> {
        let pos = self.pos;
        let n = self.parse_number()?.unwrap_or(default);
        u8::try_from(n).map_err(|_| SmartsError::NumberOutOfRange { pos })
    }

    fn parse_smarts(&mut self) -> Result<QueryMol, SmartsError> {
        let mut mol: QueryMol = Mol::new();
        let mut stack: Vec<(NodeIndex, usize)> = Vec::new();
        let mut current: Option<NodeIndex> = None;
        let mut pending_bond: Option<(BondExpr, usize)> = None;
        let mut ring_opens: HashMap<u16, RingOpen> = HashMap::new();

        while let Some(ch) = self.peek() {
            match ch {
                '(' => {
                    let cur = current.ok_or(SmartsError::UnmatchedParen { pos: self.pos })?;
                    if let Some((_, pos)) = pending_bond {
                        return Err(SmartsError::DanglingBond { pos });
                    }
                    stack.push((cur, self.pos));
                    self.pos += 1;
                }
                ')' => {
                    if let Some((_, pos)) = pending_bond {
                        return Err(SmartsError::DanglingBond { pos });
                    }
                    let (prev, _) = stack
                        .pop()
                        .ok_or(SmartsError::UnmatchedParen { pos: self.pos })?;
                    current = Some(prev);
                    self.pos += 1;
                }
                '.' => {
                    if let Some((_, pos)) = pending_bond {
                        return Err(SmartsError::DanglingBond { pos });
                    }
                    current = None;
                    self.pos += 1;
                }
                c if BOND_CHARS.contains(&c) => {
                    let pos = self.pos;
                    if current.is_none() || pending_bond.is_some() {
                        return Err(SmartsError::DanglingBond { pos });
                    }
                    pending_bond = Some((self.parse_bond_low_and()?, pos));
                }
                '0'..='9' | '%' => {
                    let pos = self.pos;
                    let digit = self.parse_ring_digit()?;
                    let cur = current.ok_or(SmartsError::UnexpectedChar { pos, ch })?;
                    let bond = pending_bond.take().map(|(b, _)| b);
                    match ring_opens.remove(&digit) {
                        Some(open) => {
                            let bond = bond.or(open.bond).unwrap_or(BondExpr::SingleOrAromatic);
                            mol.add_bond(open.atom, cur, bond);
                        }
                        None => {
                            ring_opens.insert(digit, RingOpen { atom: cur, bond });
                        }
                    }
                }
                _ => {
                    let expr = if ch == '[' {
                        self.parse_bracket_atom()?
                    } else {
                        self.parse_bare_atom()?
                    };
                    let idx = mol.add_atom(expr);
                    match (current, pending_bond.take()) {
                        (Some(prev), bond) => {
                            let bond = bond.map(|(b, _)| b).unwrap_or(BondExpr::SingleOrAromatic);
                            mol.add_bond(prev, idx, bond);
                        }
                        (None, Some((_, pos))) => return Err(SmartsError::DanglingBond { pos }),
                        (None, None) => {}
                    }
                    current = Some(idx);
                }
            }
        }

        if let Some((_, pos)) = pending_bond {
            return Err(SmartsError::DanglingBond { pos });
        }
        if let Some(&(_, pos)) = stack.last() {
            return Err(SmartsError::UnmatchedParen { pos });
        }
        if let Some(&digit) = ring_opens.keys().min() {
            return Err(SmartsError::UnclosedRing { digit });
        }
        Ok(mol)
    }

    fn parse_ring_digit(&mut self) -> Result<u16, SmartsError> {
        let start = self.pos;
        if self.at('%') {
            self.pos += 1;
            let tens = self.peek().and_then(|c| c.to_digit(10));
            let ones = self.peek_at(1).and_then(|c| c.to_digit(10));
            return match (tens, ones) {
                (Some(t), Some(o)) => {
                    self.pos += 2;
                    Ok((t * 10 + o) as u16)
                }
                _ => Err(SmartsError::UnexpectedChar {
                    pos: start,
                    ch: '%',
                }),
            };
        }
        let d = self
            .peek()
            .and_then(|c| c.to_digit(10))
            .ok_or(SmartsError::UnexpectedEnd { pos: start })?;
        self.pos += 1;
        Ok(d as u16)
    }

    // Bond expressions: `;` binds loosest, then `,`, then `&` (or adjacency),
    // then `!`.

    fn parse_bond_low_and(&mut self) -> Result<BondExpr, SmartsError> {
        let mut parts = vec![self.parse_bond_or()?];
        while self.at(';') {
            self.pos += 1;
            parts.push(self.parse_bond_or()?);
        }
        Ok(flatten(parts, BondExpr::And))
    }

    fn parse_bond_or(&mut self) -> Result<BondExpr, SmartsError> {
        let mut parts = vec![self.parse_bond_high_and()?];
        while self.at(',') {
            self.pos += 1;
            parts.push(self.parse_bond_high_and()?);
        }
        Ok(flatten(parts, BondExpr::Or))
    }

    fn parse_bond_high_and(&mut self) -> Result<BondExpr, SmartsError> {
        let mut parts = vec![self.parse_bond_not()?];
        loop {
            if self.at('&') {
                self.pos += 1;
                parts.push(self.parse_bond_not()?);
            } else if matches!(
                self.peek(),
                Some('-' | '=' | '#' | '~' | ':' | '/' | '\\' | '@' | '!')
            ) {
                parts.push(self.parse_bond_not()?);
            } else {
                break;
            }
        }
        Ok(flatten(parts, BondExpr::And))
    }

    fn parse_bond_not(&mut self) -> Result<BondExpr, SmartsError> {
        if self.at('!') {
            self.pos += 1;
            return Ok(BondExpr::Not(Box::new(self.parse_bond_not()?)));
        }
        let ch = self.peek().ok_or(SmartsError::UnexpectedEnd { pos: self.pos })?;
        let expr = match ch {
            '-' | '/' | '\\' => BondExpr::Single,
            '=' => BondExpr::Double,
            '#' => BondExpr::Triple,
            '~' => BondExpr::True,
            ':' => BondExpr::Aromatic,
            '@' => BondExpr::Ring,
            _ => return Err(SmartsError::UnexpectedChar { pos: self.pos, ch }),
        };
        self.pos += 1;
        Ok(expr)
    }

    fn parse_bare_atom(&mut self) -> Result<AtomExpr, SmartsError> {
        let start = self.pos;
        let ch = self.peek().ok_or(SmartsError::UnexpectedEnd { pos: start })?;
        let two = |next: char| self.peek_at(1) == Some(next);

        let (expr, width) = match ch {
            '*' => (AtomExpr::True, 1),
            'a' => (AtomExpr::Aromatic, 1),
            'A' => (AtomExpr::Aliphatic, 1),
            'B' if two('r') => (element(Element::Br, Some(false)), 2),
            'C' if two('l') => (element(Element::Cl, Some(false)), 2),
            'B' => (element(Element::B, Some(false)), 1),
            'C' => (element(Element::C, Some(false)), 1),
            'N' => (element(Element::N, Some(false)), 1),
            'O' => (element(Element::O, Some(false)), 1),
            'P' => (element(Element::P, Some(false)), 1),
            'S' => (element(Element::S, Some(false)), 1),
            'F' => (element(Element::F, Some(false)), 1),
            'I' => (element(Element::I, Some(false)), 1),
            'b' => (element(Element::B, Some(true)), 1),
            'c' => (element(Element::C, Some(true)), 1),
            'n' => (element(Element::N, Some(true)), 1),
            'o' => (element(Element::O, Some(true)), 1),
            'p' => (element(Element::P, Some(true)), 1),
            's' => (element(Element::S, Some(true)), 1),
            _ => return Err(SmartsError::UnexpectedChar { pos: start, ch }),
        };
        self.pos += width;
        Ok(expr)
    }

    fn parse_bracket_atom(&mut self) -> Result<AtomExpr, SmartsError> {
        let bracket_start = self.pos;
        self.expect('[')?;

        let mut expr = self.parse_atom_low_and()?;

        if self.at(':') {
            self.pos += 1;
            let pos = self.pos;
            let map = self
                .parse_number()?
                .ok_or(SmartsError::UnexpectedEnd { pos })?;
            let map = u16::try_from(map).map_err(|_| SmartsError::NumberOutOfRange { pos })?;
            expr = flatten(vec![expr, AtomExpr::AtomMapClass(map)], AtomExpr::And);
        }

        if !self.at(']') {
            return Err(SmartsError::UnclosedBracket { pos: bracket_start });
        }
        self.pos += 1;
        Ok(expr)
    }

    fn parse_atom_low_and(&mut self) -> Result<AtomExpr, SmartsError> {
        let mut parts = vec![self.parse_atom_or()?];
        while self.at(';') {
            self.pos += 1;
            parts.push(self.parse_atom_or()?);
        }
        Ok(flatten(parts, AtomExpr::And))
    }

    fn parse_atom_or(&mut self) -> Result<AtomExpr, SmartsError> {
        let mut parts = vec![self.parse_atom_high_and()?];
        while self.at(',') {
            self.pos += 1;
            parts.push(self.parse_atom_high_and()?);
        }
        Ok(flatten(parts, AtomExpr::Or))
    }

    fn parse_atom_high_and(&mut self) -> Result<AtomExpr, SmartsError> {
        let mut parts = Vec::new();
        while let Some(ch) = self.peek() {
            match ch {
                ']' | ',' | ';' | ':' => break,
                '&' => self.pos += 1,
                _ => parts.push(self.parse_atom_not()?),
            }
        }
        if parts.is_empty() {
            return Err(SmartsError::UnexpectedEnd { pos: self.pos });
        }
        Ok(flatten(parts, AtomExpr::And))
    }

    fn parse_atom_not(&mut self) -> Result<AtomExpr, SmartsError> {
        if self.at('!') {
            self.pos += 1;
            return Ok(AtomExpr::Not(Box::new(self.parse_atom_not()?)));
        }
        self.parse_primitive()
    }

    fn parse_primitive(&mut self) -> Result<AtomExpr, SmartsError> {
        let start = self.pos;
        let ch = self.peek().ok_or(SmartsError::UnexpectedEnd { pos: start })?;

        match ch {
            '*' => {
                self.pos += 1;
                Ok(AtomExpr::True)
            }
            'a' if self.peek_at(1) != Some('s') => {
                self.pos += 1;
                Ok(AtomExpr::Aromatic)
            }
            'A' if !self.peek_at(1).is_some_and(|c| c.is_ascii_lowercase()) => {
                self.pos += 1;
                Ok(AtomExpr::Aliphatic)
            }
            '#' => {
                self.pos += 1;
                let n = self
                    .parse_number()?
                    .ok_or(SmartsError::InvalidAtomicNum { pos: start })?;
                if n == 0 || n > 118 {
                    return Err(SmartsError::InvalidAtomicNum { pos: start });
                }
                Ok(AtomExpr::Element {
                    atomic_num: n as u8,
                    aromatic: None,
                })
            }
            'D' => {
                self.pos += 1;
                Ok(AtomExpr::Degree(self.count_or(1)?))
            }
            'v' => {
                self.pos += 1;
                Ok(AtomExpr::Valence(self.count_or(1)?))
            }
            'X' => {
                self.pos += 1;
                Ok(AtomExpr::Connectivity(self.count_or(1)?))
            }
            'H' if self.is_hydrogen_element() => {
                self.pos += 1;
                Ok(element(Element::H, Some(false)))
            }
            'H' => {
                self.pos += 1;
                Ok(AtomExpr::TotalHCount(self.count_or(1)?))
            }
            'h' => {
                self.pos += 1;
                Ok(AtomExpr::ImplicitHCount(self.count_or(1)?))
            }
            'R' => {
                self.pos += 1;
                match self.parse_number()? {
                    Some(n) => Ok(AtomExpr::RingMembership(
                        u8::try_from(n).map_err(|_| SmartsError::NumberOutOfRange { pos: start })?,
                    )),
                    None => Ok(AtomExpr::InRing),
                }
            }
            'r' => {
                self.pos += 1;
                match self.parse_number()? {
                    Some(0) => Ok(AtomExpr::RingMembership(0)),
                    Some(n) => Ok(AtomExpr::SmallestRingSize(
                        u8::try_from(n).map_err(|_| SmartsError::NumberOutOfRange { pos: start })?,
                    )),
                    None => Ok(AtomExpr::InRing),
                }
            }
            'x' => {
                self.pos += 1;
                Ok(AtomExpr::RingBondCount(self.count_or(1)?))
            }
            '+' | '-' => self.parse_charge(ch),
            '@' => {
                // Stereo is not perceived on targets, so chirality never
                // constrains a match.
                while self.at('@') {
                    self.pos += 1;
                }
                Ok(AtomExpr::True)
            }
            '$' => self.parse_recursive(),
            c if c.is_ascii_digit() => {
                let n = self.parse_number()?.unwrap_or(0);
                let iso = u16::try_from(n)
                    .map_err(|_| SmartsError::NumberOutOfRange { pos: start })?;
                Ok(AtomExpr::Isotope(iso))
            }
            c if c.is_ascii_alphabetic() => self.parse_bracket_element(),
            _ => Err(SmartsError::UnexpectedChar { pos: start, ch }),
        }
    }

    fn parse_charge(&mut self, sign: char) -> Result<AtomExpr, SmartsError> {
        let start = self.pos;
        let mut magnitude: u32 = 0;
        while self.at(sign) {
            magnitude += 1;
            self.pos += 1;
        }
        if magnitude == 1 {
            if let Some(n) = self.parse_number()? {
                magnitude = n;
            }
        }
        let magnitude =
            i8::try_from(magnitude).map_err(|_| SmartsError::NumberOutOfRange { pos: start })?;
        Ok(AtomExpr::Charge(if sign == '-' { -magnitude } else { magnitude }))
    }

    fn parse_recursive(&mut self) -> Result<AtomExpr, SmartsError> {
        let start = self.pos;
        self.pos += 1;
        if !self.at('(') {
            return Err(SmartsError::UnclosedRecursive { pos: start });
        }
        self.pos += 1;

        let inner_start = self.pos;
        let mut depth = 1usize;
        while depth > 0 {
            match self.peek() {
                Some('(') => depth += 1,
                Some(')') => depth -= 1,
                Some(_) => {}
                None => return Err(SmartsError::UnclosedRecursive { pos: start }),
            }
            self.pos += 1;
        }
        let inner: String = self.chars[inner_start..self.pos - 1].iter().collect();
        if inner.trim().is_empty() {
            return Err(SmartsError::EmptyInput);
        }

        let mut sub = Parser::new(&inner, self.next_recursive);
        let query = sub.parse_smarts()?;
        let id = sub.next_recursive;
        self.next_recursive = id + 1;
        Ok(AtomExpr::Recursive {
            id,
            query: Box::new(query),
        })
    }

    /// `H` names hydrogen itself when it is the first element-like primitive
    /// in the bracket, as in `[H]`, `[H+]` or `[2H]`.
    fn is_hydrogen_element(&self) -> bool {
        if self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            return false;
        }
        let mut i = self.pos;
        while i > 0 && self.chars[i - 1] != '[' {
            if !self.chars[i - 1].is_ascii_digit() {
                return false;
            }
            i -= 1;
        }
        i > 0
    }

    fn parse_bracket_element(&mut self) -> Result<AtomExpr, SmartsError> {
        let start = self.pos;
        let ch = self.peek().ok_or(SmartsError::UnexpectedEnd { pos: start })?;

        if ch.is_ascii_lowercase() {
            const AROMATIC: [(&str, Element); 9] = [
                ("se", Element::Se),
                ("as", Element::As),
                ("te", Element::Te),
                ("b", Element::B),
                ("c", Element::C),
                ("n", Element::N),
                ("o", Element::O),
                ("p", Element::P),
                ("s", Element::S),
            ];
            for (sym, elem) in AROMATIC {
                let end = self.pos + sym.len();
                if end <= self.chars.len()
                    && self.chars[self.pos..end].iter().copied().eq(sym.chars())
                {
                    self.pos = end;
                    return Ok(element(elem, Some(true)));
                }
            }
            return Err(SmartsError::UnexpectedChar { pos: start, ch });
        }

        if let Some(next) = self.peek_at(1).filter(|c| c.is_ascii_lowercase()) {
            let symbol: String = [ch, next].iter().collect();
            if let Some(elem) = Element::from_symbol(&symbol) {
                self.pos += 2;
                return Ok(element(elem, Some(false)));
            }
        }
        match Element::from_symbol(&ch.to_string()) {
            Some(elem) => {
                self.pos += 1;
                Ok(element(elem, Some(false)))
            }
            None => Err(SmartsError::UnexpectedChar { pos: start, ch }),
        }
    }
}

fn element(elem: Element, aromatic: Option<bool>) -> AtomExpr {
    AtomExpr::Element {
        atomic_num: elem.atomic_num(),
        aromatic,
    }
}

/// Collapses a one-element list and merges nested nodes of the same kind.
fn flatten<E: Flatten>(mut parts: Vec<E>, wrap: fn(Vec<E>) -> E) -> E {
    if parts.len() == 1 {
        if let Some(only) = parts.pop() {
            return only;
        }
    }
    let probe = wrap(Vec::new());
    let mut flat = Vec::with_capacity(parts.len());
    for part in parts {
        match part.same_kind_children(&probe) {
            Ok(children) => flat.extend(children),
            Err(part) => flat.push(part),
        }
    }
    wrap(flat)
}

trait Flatten: Sized {
    /// Returns the children when `self` is the same connective as `probe`.
    fn same_kind_children(self, probe: &Self) -> Result<Vec<Self>, Self>;
}

impl Flatten for AtomExpr {
    fn same_kind_children(self, probe: &Self) -> Result<Vec<Self>, Self> {
        match (self, probe) {
            (AtomExpr::And(c), AtomExpr::And(_)) | (AtomExpr::Or(c), AtomExpr::Or(_)) => Ok(c),
            (other, _) => Err(other),
        }
    }
}

impl Flatten for BondExpr {
    fn same_kind_children(self, probe: &Self) -> Result<Vec<Self>, Self> {
        match (self, probe) {
            (BondExpr::And(c), BondExpr::And(_)) | (BondExpr::Or(c), BondExpr::Or(_)) => Ok(c),
            (other, _) => Err(other),
        }
    }
}
