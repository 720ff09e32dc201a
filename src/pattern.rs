//! Construction of match patterns from template parts and hints.
//!
//! For every expression variable the builder chooses candidate shapes
//! (scalar, list, map) from the caller's hints and the varspec's own
//! modifier, then lowers the combined alternatives into a flat
//! [`Program`](crate::matcher::Program) for the backtracking engine.
//! Alternatives are ordered, which makes the "unspecified choice" for an
//! ambiguous candidate deterministic: map-explode before list, and for
//! reserved-capable operators a whole-scalar branch before the item split.

use crate::matcher::{CharClass, Inst, Program, VarSlots};
use crate::matching::MatchHints;
use crate::operator::Operator;
use crate::part::TemplatePart;
use crate::varspec::VarSpec;

/// Pattern AST for one variable's shape alternatives.
#[derive(Debug, Clone)]
enum Node {
    Lit(String),
    /// A run of units; `max: None` is unbounded. Runs are lazy exactly
    /// when the class overlaps separators and literals.
    Run {
        class: CharClass,
        max: Option<usize>,
        lazy: bool,
    },
    Seq(Vec<Node>),
    /// Ordered alternation
    Alt(Vec<Node>),
    Star {
        inner: Box<Node>,
    },
    Group {
        slot: usize,
        inner: Box<Node>,
    },
}

fn lit(text: impl Into<String>) -> Node {
    Node::Lit(text.into())
}

fn run(class: CharClass, lazy: bool) -> Node {
    Node::Run { class, max: None, lazy }
}

fn group(slot: usize, inner: Node) -> Node {
    Node::Group { slot, inner: Box::new(inner) }
}

/// A zero-width capture: binds the empty string to a slot.
fn empty_group(slot: usize) -> Node {
    group(slot, Node::Run { class: CharClass::Unreserved, max: Some(0), lazy: false })
}

/// Wraps a named operator's value body as `name=body`, with the bare-name
/// alternative for operators whose empty values drop the `=`.
fn named_value(op: Operator, name: &str, body: Node, empty: Node) -> Node {
    if op.ifemp().is_empty() {
        Node::Alt(vec![
            Node::Seq(vec![lit(format!("{name}=")), body]),
            Node::Seq(vec![lit(name), empty]),
        ])
    } else {
        Node::Seq(vec![lit(format!("{name}=")), body])
    }
}

/// Scalar shape: one captured run, bounded by the prefix length if any.
fn scalar_node(op: Operator, spec: &VarSpec, slots: &VarSlots, class: CharClass, lazy: bool) -> Node {
    let body = group(
        slots.item,
        Node::Run { class, max: spec.prefix_len().map(usize::from), lazy },
    );
    if op.named() {
        named_value(op, spec.name(), body, empty_group(slots.item))
    } else {
        body
    }
}

/// Non-explode list shape: comma-joined items, one capture per item.
/// A single captured item doubles as the scalar shape.
fn list_joined_node(op: Operator, name: &str, slots: &VarSlots, class: CharClass, lazy: bool) -> Node {
    let item = group(slots.item, run(class, lazy));
    let body = Node::Seq(vec![
        item.clone(),
        Node::Star { inner: Box::new(Node::Seq(vec![lit(","), item])) },
    ]);
    if op.named() {
        named_value(op, name, body, empty_group(slots.item))
    } else {
        body
    }
}

/// Explode list shape: items joined by the operator separator, each item
/// carrying its own `name=` for named operators.
fn list_explode_node(op: Operator, name: &str, slots: &VarSlots, class: CharClass, lazy: bool) -> Node {
    let item = if op.named() {
        named_value(op, name, group(slots.item, run(class, lazy)), empty_group(slots.item))
    } else {
        group(slots.item, run(class, lazy))
    };
    Node::Seq(vec![
        item.clone(),
        Node::Star {
            inner: Box::new(Node::Seq(vec![lit(op.separator().to_string()), item])),
        },
    ])
}

/// Explode map shape: `key=value` pairs joined by the operator separator.
fn assoc_explode_node(op: Operator, slots: &VarSlots, class: CharClass, lazy: bool) -> Node {
    let key = group(slots.key, run(class, lazy));
    let value = group(slots.entry, run(class, lazy));
    let pair = if op.named() && op.ifemp().is_empty() {
        // An empty value renders as the bare key.
        Node::Seq(vec![
            key,
            Node::Alt(vec![
                Node::Seq(vec![lit("="), value]),
                empty_group(slots.entry),
            ]),
        ])
    } else {
        Node::Seq(vec![key, lit("="), value])
    };
    Node::Seq(vec![
        pair.clone(),
        Node::Star {
            inner: Box::new(Node::Seq(vec![lit(op.separator().to_string()), pair])),
        },
    ])
}

/// Non-explode map shape: `k,v,k,v` comma-joined, with the single `name=`
/// prefix for named operators.
fn assoc_joined_node(op: Operator, name: &str, slots: &VarSlots, class: CharClass, lazy: bool) -> Node {
    let key = group(slots.key, run(class, lazy));
    let value = group(slots.entry, run(class, lazy));
    let pair = Node::Seq(vec![key, lit(","), value]);
    let body = Node::Seq(vec![
        pair.clone(),
        Node::Star { inner: Box::new(Node::Seq(vec![lit(","), pair])) },
    ]);
    if op.named() {
        Node::Seq(vec![lit(format!("{name}=")), body])
    } else {
        body
    }
}

/// Builds the shape alternatives for one variable occurrence.
///
/// Hint compatibility is validated before pattern construction, so a
/// prefixed variable reaching this point is scalar-only.
fn var_node(op: Operator, spec: &VarSpec, slots: &VarSlots, hints: &MatchHints) -> Node {
    let class = if op.allows_reserved() { CharClass::Full } else { CharClass::Unreserved };
    let lazy = op.allows_reserved();
    let name = spec.name();

    if spec.prefix_len().is_some() {
        return scalar_node(op, spec, slots, class, lazy);
    }
    if hints.is_assoc(name) {
        return if spec.is_explode() {
            assoc_explode_node(op, slots, class, lazy)
        } else {
            assoc_joined_node(op, name, slots, class, lazy)
        };
    }
    if hints.is_list(name) {
        return if spec.is_explode() {
            list_explode_node(op, name, slots, class, lazy)
        } else {
            list_joined_node(op, name, slots, class, lazy)
        };
    }
    if spec.is_explode() {
        // Unhinted: a key=value pair sequence is recognizably a map, and
        // anything else is a list (a single item reads back as a scalar).
        return Node::Alt(vec![
            assoc_explode_node(op, slots, class, lazy),
            list_explode_node(op, name, slots, class, lazy),
        ]);
    }
    if op.allows_reserved() {
        // A reserved-capable scalar may itself contain commas; prefer the
        // whole-value reading over an item split.
        return Node::Alt(vec![
            scalar_node(op, spec, slots, class, lazy),
            list_joined_node(op, name, slots, class, lazy),
        ]);
    }
    list_joined_node(op, name, slots, class, lazy)
}

struct Compiler {
    code: Vec<Inst>,
}

impl Compiler {
    fn patch_alternate(&mut self, split: usize, target: usize) {
        if let Inst::Split { alternate, .. } = &mut self.code[split] {
            *alternate = target;
        }
    }

    fn node(&mut self, node: &Node) {
        match node {
            Node::Lit(text) => {
                if !text.is_empty() {
                    self.code.push(Inst::Lit(text.clone()));
                }
            }
            Node::Run { class, max, lazy } => self.emit_run(*class, *max, *lazy),
            Node::Seq(items) => {
                for item in items {
                    self.node(item);
                }
            }
            Node::Alt(branches) => self.emit_alt(branches),
            Node::Star { inner } => self.emit_star(inner),
            Node::Group { slot, inner } => {
                self.code.push(Inst::Open(*slot));
                self.node(inner);
                self.code.push(Inst::Close(*slot));
            }
        }
    }

    fn emit_run(&mut self, class: CharClass, max: Option<usize>, lazy: bool) {
        match max {
            None => {
                let split = self.code.len();
                self.code.push(Inst::Split { primary: 0, alternate: 0 });
                let body = self.code.len();
                self.code.push(Inst::Unit(class));
                self.code.push(Inst::Jmp(split));
                let end = self.code.len();
                self.code[split] = if lazy {
                    Inst::Split { primary: end, alternate: body }
                } else {
                    Inst::Split { primary: body, alternate: end }
                };
            }
            Some(n) => {
                // Bounded run: a chain of optional units.
                let mut splits = Vec::with_capacity(n);
                for _ in 0..n {
                    let split = self.code.len();
                    self.code.push(Inst::Split { primary: 0, alternate: 0 });
                    splits.push(split);
                    self.code.push(Inst::Unit(class));
                }
                let end = self.code.len();
                for split in splits {
                    self.code[split] = if lazy {
                        Inst::Split { primary: end, alternate: split + 1 }
                    } else {
                        Inst::Split { primary: split + 1, alternate: end }
                    };
                }
            }
        }
    }

    fn emit_star(&mut self, inner: &Node) {
        let split = self.code.len();
        self.code.push(Inst::Split { primary: 0, alternate: 0 });
        let body = self.code.len();
        self.node(inner);
        self.code.push(Inst::Jmp(split));
        let end = self.code.len();
        self.code[split] = Inst::Split { primary: body, alternate: end };
    }

    fn emit_alt(&mut self, branches: &[Node]) {
        match branches {
            [] => {}
            [only] => self.node(only),
            _ => {
                let mut end_jumps = Vec::new();
                let mut pending_split: Option<usize> = None;
                for (i, branch) in branches.iter().enumerate() {
                    if let Some(split) = pending_split.take() {
                        let here = self.code.len();
                        self.patch_alternate(split, here);
                    }
                    if i + 1 < branches.len() {
                        let split = self.code.len();
                        self.code.push(Inst::Split { primary: split + 1, alternate: 0 });
                        pending_split = Some(split);
                    }
                    self.node(branch);
                    if i + 1 < branches.len() {
                        end_jumps.push(self.code.len());
                        self.code.push(Inst::Jmp(0));
                    }
                }
                let end = self.code.len();
                for jump in end_jumps {
                    self.code[jump] = Inst::Jmp(end);
                }
            }
        }
    }

    /// Emits one expression: a chain in which the first contributing
    /// variable consumes the operator introducer and every later one
    /// consumes the separator. Required variables have no skip branch,
    /// which structurally forces their presence on every path.
    fn expression(
        &mut self,
        op: Operator,
        varspecs: &[VarSpec],
        slots: &[VarSlots],
        hints: &MatchHints,
    ) {
        let n = varspecs.len();
        let nodes: Vec<Node> = varspecs
            .iter()
            .zip(slots)
            .map(|(spec, vs)| var_node(op, spec, vs, hints))
            .collect();
        let required: Vec<bool> = varspecs
            .iter()
            .map(|spec| hints.is_required(spec.name()))
            .collect();
        let introducer = op.first();
        let separator = op.separator().to_string();

        // (jump index, index into f_labels)
        let mut jumps_to_f: Vec<(usize, usize)> = Vec::new();
        let mut jumps_to_end: Vec<usize> = Vec::new();

        // Chain while nothing has contributed yet.
        let mut pending_skip: Option<usize> = None;
        for i in 0..n {
            if let Some(split) = pending_skip.take() {
                let here = self.code.len();
                self.patch_alternate(split, here);
            }
            if !required[i] {
                let split = self.code.len();
                self.code.push(Inst::Split { primary: split + 1, alternate: 0 });
                pending_skip = Some(split);
            }
            if !introducer.is_empty() {
                self.code.push(Inst::Lit(introducer.to_string()));
            }
            self.node(&nodes[i]);
            jumps_to_f.push((self.code.len(), i + 1));
            self.code.push(Inst::Jmp(0));
            if required[i] {
                // Every path must pass through this variable; later
                // variables are reachable only via the separator chain.
                break;
            }
        }
        if let Some(split) = pending_skip.take() {
            // All variables skipped: the expression contributes nothing.
            let here = self.code.len();
            self.patch_alternate(split, here);
            jumps_to_end.push(self.code.len());
            self.code.push(Inst::Jmp(0));
        }

        // Chain once some variable has contributed.
        let mut f_labels = vec![0usize; n + 1];
        let mut pending_skip: Option<usize> = None;
        for i in 1..n {
            let here = self.code.len();
            if let Some(split) = pending_skip.take() {
                self.patch_alternate(split, here);
            }
            f_labels[i] = here;
            if !required[i] {
                let split = self.code.len();
                self.code.push(Inst::Split { primary: split + 1, alternate: 0 });
                pending_skip = Some(split);
            }
            self.code.push(Inst::Lit(separator.clone()));
            self.node(&nodes[i]);
        }
        let end = self.code.len();
        if let Some(split) = pending_skip.take() {
            self.patch_alternate(split, end);
        }
        f_labels[n] = end;

        for (jump, fi) in jumps_to_f {
            self.code[jump] = Inst::Jmp(f_labels[fi]);
        }
        for jump in jumps_to_end {
            self.code[jump] = Inst::Jmp(end);
        }
    }
}

/// Compiles `parts` plus `hints` into an executable match program.
pub(crate) fn build_program(parts: &[TemplatePart], hints: &MatchHints) -> Program {
    let mut vars = Vec::new();
    let mut slot_count = 0;
    for (p, part) in parts.iter().enumerate() {
        if let TemplatePart::Expression { varspecs, .. } = part {
            for v in 0..varspecs.len() {
                vars.push(VarSlots {
                    part: p,
                    var: v,
                    item: slot_count,
                    key: slot_count + 1,
                    entry: slot_count + 2,
                });
                slot_count += 3;
            }
        }
    }

    let mut compiler = Compiler { code: Vec::new() };
    let mut cursor = 0;
    for part in parts {
        match part {
            TemplatePart::Literal(text) => {
                if !text.is_empty() {
                    compiler.code.push(Inst::Lit(text.clone()));
                }
            }
            TemplatePart::Expression { operator, varspecs } => {
                let slots = &vars[cursor..cursor + varspecs.len()];
                compiler.expression(*operator, varspecs, slots, hints);
                cursor += varspecs.len();
            }
        }
    }
    compiler.code.push(Inst::Accept);

    Program { code: compiler.code, slot_count, vars }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::execute;
    use crate::template::UriTemplate;

    fn program(template: &str, hints: &MatchHints) -> Program {
        let template = UriTemplate::parse(template).unwrap();
        build_program(template.parts(), hints)
    }

    #[test]
    fn simple_scalar_captures_one_span() {
        let prog = program("/users/{id}", &MatchHints::new());
        let caps = execute(&prog, "/users/alice").unwrap();
        let vs = prog.vars[0];
        assert_eq!(caps.spans[vs.item], vec![(7, 12)]);
        assert!(caps.spans[vs.key].is_empty());
    }

    #[test]
    fn expression_is_optional() {
        let prog = program("/users{/id}", &MatchHints::new());
        assert!(execute(&prog, "/users").is_some());
        assert!(execute(&prog, "/users/alice").is_some());
        assert!(execute(&prog, "/groups").is_none());
    }

    #[test]
    fn required_variable_forces_presence() {
        let hints = MatchHints::new().require("id");
        let prog = program("/users{/id}", &hints);
        assert!(execute(&prog, "/users").is_none());
        assert!(execute(&prog, "/users/alice").is_some());
    }

    #[test]
    fn reserved_run_stops_before_literal() {
        let prog = program("{+path}/here", &MatchHints::new());
        let caps = execute(&prog, "/foo/bar/here").unwrap();
        let vs = prog.vars[0];
        assert_eq!(caps.spans[vs.item], vec![(0, 8)]);
    }

    #[test]
    fn explode_list_captures_items() {
        let hints = MatchHints::new().list("list");
        let prog = program("{/list*}", &hints);
        let caps = execute(&prog, "/red/green/blue").unwrap();
        let vs = prog.vars[0];
        assert_eq!(caps.spans[vs.item], vec![(1, 4), (5, 10), (11, 15)]);
    }

    #[test]
    fn assoc_joined_captures_pairs() {
        let hints = MatchHints::new().assoc("keys");
        let prog = program("{?keys}", &hints);
        let caps = execute(&prog, "?keys=dot,.,semi,%3B").unwrap();
        let vs = prog.vars[0];
        assert_eq!(caps.spans[vs.key].len(), 2);
        assert_eq!(caps.spans[vs.entry].len(), 2);
    }

    #[test]
    fn unhinted_explode_prefers_map_reading() {
        let prog = program("{/pairs*}", &MatchHints::new());
        let caps = execute(&prog, "/a=1/b=2").unwrap();
        let vs = prog.vars[0];
        assert_eq!(caps.spans[vs.key].len(), 2);
    }

    #[test]
    fn query_name_must_match() {
        let prog = program("{?q}", &MatchHints::new());
        assert!(execute(&prog, "?q=test").is_some());
        assert!(execute(&prog, "?other=test").is_none());
    }

    #[test]
    fn prefix_bounds_unit_count() {
        let prog = program("{v:3}", &MatchHints::new());
        assert!(execute(&prog, "val").is_some());
        assert!(execute(&prog, "value").is_none());
    }
}
