//! Backtracking execution engine for built match patterns.
//!
//! A built pattern is a flat instruction program over "units" (a character
//! from an allowed class, or one `%HH` triplet). Execution walks the
//! program with an explicit backtrack stack; capture slots accumulate one
//! span per repetition, which is what lets the interpreter distinguish a
//! single scalar from a multi-item composite.

use crate::encode::{hex_value, is_reserved, is_unreserved};

/// Character class of a matchable unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CharClass {
    /// Unreserved characters and pct-triplets only; runs over it are
    /// matched greedily and backtrack where a separator (such as the
    /// label `.`) falls inside the class.
    Unreserved,
    /// Unreserved plus reserved characters and pct-triplets; overlaps
    /// most separators and literals, so runs over it are matched lazily.
    Full,
}

impl CharClass {
    pub(crate) fn contains(self, c: char) -> bool {
        match self {
            Self::Unreserved => is_unreserved(c),
            Self::Full => is_unreserved(c) || is_reserved(c),
        }
    }
}

/// One instruction of a built pattern.
#[derive(Debug, Clone)]
pub(crate) enum Inst {
    /// Match literal text exactly
    Lit(String),
    /// Consume one unit from the class
    Unit(CharClass),
    /// Try `primary` first; on backtrack, resume at `alternate`
    Split {
        /// First choice instruction index
        primary: usize,
        /// Backtrack instruction index
        alternate: usize,
    },
    /// Unconditional jump
    Jmp(usize),
    /// Record the start of a capture for a slot
    Open(usize),
    /// Record the end of a capture for a slot
    Close(usize),
    /// Succeed if the whole input has been consumed
    Accept,
}

/// Capture slots of one variable occurrence within one expression.
#[derive(Debug, Clone, Copy)]
pub(crate) struct VarSlots {
    /// Index of the owning part in the template's part list
    pub part: usize,
    /// Index of the varspec within the owning expression
    pub var: usize,
    /// Slot collecting scalar/list item spans
    pub item: usize,
    /// Slot collecting map key spans
    pub key: usize,
    /// Slot collecting map value spans
    pub entry: usize,
}

/// A compiled match pattern for one template plus one hint set.
#[derive(Debug, Clone)]
pub(crate) struct Program {
    pub code: Vec<Inst>,
    pub slot_count: usize,
    pub vars: Vec<VarSlots>,
}

/// Spans captured per slot, in match order.
#[derive(Debug)]
pub(crate) struct Captures {
    pub spans: Vec<Vec<(usize, usize)>>,
}

struct Frame {
    ip: usize,
    pos: usize,
    mark: usize,
}

/// One reversible capture action, journalled so backtracking can undo
/// `Open`/`Close` effects exactly.
enum Event {
    Opened(usize, usize),
    Closed(usize, usize, usize),
}

/// Reads the byte encoded by a `%HH` triplet at `pos`, if one is there.
fn triplet_value(bytes: &[u8], pos: usize) -> Option<u8> {
    if bytes.get(pos) != Some(&b'%') {
        return None;
    }
    let hi = hex_value(*bytes.get(pos + 1)?)?;
    let lo = hex_value(*bytes.get(pos + 2)?)?;
    Some(hi << 4 | lo)
}

/// Consumes one unit at `pos`: one class character, or the `%HH`
/// encoding of one character. A triplet carrying a UTF-8 lead byte
/// takes its continuation triplets with it, so prefix-bounded runs
/// count decoded characters rather than escapes.
fn consume_unit(input: &str, pos: usize, class: CharClass) -> Option<usize> {
    let bytes = input.as_bytes();
    if pos >= bytes.len() {
        return None;
    }
    if let Some(byte) = triplet_value(bytes, pos) {
        let mut next = pos + 3;
        if byte >= 0xC0 {
            while matches!(triplet_value(bytes, next), Some(b) if (0x80..0xC0).contains(&b)) {
                next += 3;
            }
        }
        return Some(next);
    }
    if bytes[pos] == b'%' {
        return None;
    }
    let c = input[pos..].chars().next()?;
    if class.contains(c) {
        Some(pos + c.len_utf8())
    } else {
        None
    }
}

/// Runs `program` against the whole of `input`, anchored at both ends.
pub(crate) fn execute(program: &Program, input: &str) -> Option<Captures> {
    let mut stack: Vec<Frame> = Vec::new();
    // Every Open/Close lands in the journal; a frame remembers its
    // length, and backtracking unwinds entries one by one so the
    // `opens` stack is restored exactly, Close effects included.
    let mut journal: Vec<Event> = Vec::new();
    let mut opens: Vec<(usize, usize)> = Vec::new();
    let mut ip = 0;
    let mut pos = 0;

    loop {
        let stepped = match &program.code[ip] {
            Inst::Lit(text) => {
                if input.as_bytes()[pos..].starts_with(text.as_bytes()) {
                    pos += text.len();
                    ip += 1;
                    true
                } else {
                    false
                }
            }
            Inst::Unit(class) => match consume_unit(input, pos, *class) {
                Some(next) => {
                    pos = next;
                    ip += 1;
                    true
                }
                None => false,
            },
            Inst::Split { primary, alternate } => {
                stack.push(Frame {
                    ip: *alternate,
                    pos,
                    mark: journal.len(),
                });
                ip = *primary;
                true
            }
            Inst::Jmp(target) => {
                ip = *target;
                true
            }
            Inst::Open(slot) => {
                opens.push((*slot, pos));
                journal.push(Event::Opened(*slot, pos));
                ip += 1;
                true
            }
            Inst::Close(slot) => match opens.pop() {
                Some((opened, start)) => {
                    debug_assert_eq!(opened, *slot);
                    journal.push(Event::Closed(*slot, start, pos));
                    ip += 1;
                    true
                }
                None => false,
            },
            Inst::Accept => {
                if pos == input.len() {
                    let mut spans = vec![Vec::new(); program.slot_count];
                    for event in &journal {
                        if let Event::Closed(slot, start, end) = *event {
                            spans[slot].push((start, end));
                        }
                    }
                    return Some(Captures { spans });
                }
                false
            }
        };

        if !stepped {
            let Some(frame) = stack.pop() else {
                return None;
            };
            ip = frame.ip;
            pos = frame.pos;
            for event in journal.drain(frame.mark..).rev() {
                match event {
                    Event::Opened(..) => {
                        opens.pop();
                    }
                    Event::Closed(slot, start, _) => opens.push((slot, start)),
                }
            }
        }
    }
}
