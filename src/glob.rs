//! Extended glob patterns compiled into a small matcher tree.
//!
//! Supported grammar:
//! - literal characters match verbatim, `\x` matches `x` literally
//! - `*` matches any run of characters within one path segment
//! - `?` matches exactly one character within one path segment
//! - `[abc]`, `[a-z]`, `[!a-z]` / `[^a-z]` match one character from a set
//! - `{a,b,...}` matches any of the alternatives; groups may nest and must
//!   hold at least two alternatives
//!
//! A pattern either compiles completely or is rejected with
//! [`LeanError::InvalidPattern`].

use crate::error::{LeanError, PatternError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Literal(char),
    AnyChar,
    AnyRun,
    Class(CharClass),
    Alternation(Vec<Vec<Node>>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ClassItem {
    Single(char),
    Range(char, char),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CharClass {
    negated: bool,
    items: Vec<ClassItem>,
}

impl CharClass {
    fn matches(&self, c: char) -> bool {
        // Classes never match the segment separator, negated or not
        if c == '/' {
            return false;
        }
        let hit = self.items.iter().any(|item| match *item {
            ClassItem::Single(s) => s == c,
            ClassItem::Range(start, end) => (start..=end).contains(&c),
        });
        hit != self.negated
    }
}

/// A compiled glob pattern, reusable across any number of `matches` calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobMatcher {
    pattern: String,
    nodes: Vec<Node>,
}

impl GlobMatcher {
    /// Compile `pattern`, rejecting it outright on any syntax error.
    pub fn compile(pattern: &str) -> Result<Self> {
        let nodes = Parser::new(pattern)
            .parse()
            .map_err(|reason| LeanError::InvalidPattern {
                pattern: pattern.to_string(),
                reason,
            })?;

        Ok(GlobMatcher {
            pattern: pattern.to_string(),
            nodes,
        })
    }

    /// The source text this matcher was compiled from.
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// Check a relative, `/`-separated path against the pattern.
    /// A trailing `/` (directory artifact) is ignored.
    pub fn matches(&self, path: &str) -> bool {
        let path = path.strip_suffix('/').unwrap_or(path);
        let input: Vec<char> = path.chars().collect();
        match_nodes(&self.nodes, None, &input)
    }

    /// Number of path segments a match can span.
    pub fn depth(&self) -> usize {
        1 + separators(&self.nodes)
    }
}

/// Shorthand for [`GlobMatcher::compile`].
pub fn compile(pattern: &str) -> Result<GlobMatcher> {
    GlobMatcher::compile(pattern)
}

fn separators(nodes: &[Node]) -> usize {
    nodes
        .iter()
        .map(|node| match node {
            Node::Literal('/') => 1,
            Node::Alternation(alternatives) => alternatives
                .iter()
                .map(|alt| separators(alt))
                .max()
                .unwrap_or(0),
            _ => 0,
        })
        .sum()
}

/// What still has to match after the current node sequence is exhausted.
/// Alternation branches push the remainder of their enclosing sequence here.
struct Continuation<'a> {
    nodes: &'a [Node],
    next: Option<&'a Continuation<'a>>,
}

fn match_nodes<'a>(nodes: &'a [Node], cont: Option<&'a Continuation<'a>>, input: &[char]) -> bool {
    let Some((first, rest)) = nodes.split_first() else {
        return match cont {
            Some(c) => match_nodes(c.nodes, c.next, input),
            None => input.is_empty(),
        };
    };

    match first {
        Node::Literal(expected) => {
            input.first() == Some(expected) && match_nodes(rest, cont, &input[1..])
        }
        Node::AnyChar => {
            input.first().is_some_and(|c| *c != '/') && match_nodes(rest, cont, &input[1..])
        }
        Node::Class(class) => {
            input.first().is_some_and(|c| class.matches(*c)) && match_nodes(rest, cont, &input[1..])
        }
        Node::AnyRun => {
            let mut consumed = 0;
            loop {
                if match_nodes(rest, cont, &input[consumed..]) {
                    return true;
                }
                if consumed == input.len() || input[consumed] == '/' {
                    return false;
                }
                consumed += 1;
            }
        }
        Node::Alternation(alternatives) => {
            let after = Continuation { nodes: rest, next: cont };
            alternatives
                .iter()
                .any(|alt| match_nodes(alt, Some(&after), input))
        }
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(pattern: &str) -> Self {
        Parser {
            chars: pattern.chars().collect(),
            pos: 0,
        }
    }

    fn parse(mut self) -> std::result::Result<Vec<Node>, PatternError> {
        if self.chars.is_empty() {
            return Err(PatternError::Empty);
        }
        self.sequence(0)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn sequence(&mut self, depth: usize) -> std::result::Result<Vec<Node>, PatternError> {
        let mut nodes = Vec::new();

        while let Some(c) = self.peek() {
            match c {
                '}' | ',' if depth > 0 => break,
                '}' => return Err(PatternError::UnmatchedBrace { offset: self.pos }),
                '{' => nodes.push(self.group(depth)?),
                '[' => nodes.push(self.class()?),
                '*' => {
                    self.pos += 1;
                    if nodes.last() != Some(&Node::AnyRun) {
                        nodes.push(Node::AnyRun);
                    }
                }
                '?' => {
                    self.pos += 1;
                    nodes.push(Node::AnyChar);
                }
                '\\' => nodes.push(Node::Literal(self.escaped()?)),
                _ => {
                    self.pos += 1;
                    nodes.push(Node::Literal(c));
                }
            }
        }

        Ok(nodes)
    }

    fn escaped(&mut self) -> std::result::Result<char, PatternError> {
        let c = self
            .chars
            .get(self.pos + 1)
            .copied()
            .ok_or(PatternError::TrailingEscape)?;
        self.pos += 2;
        Ok(c)
    }

    fn group(&mut self, depth: usize) -> std::result::Result<Node, PatternError> {
        let offset = self.pos;
        self.pos += 1;

        let mut alternatives = Vec::new();
        loop {
            alternatives.push(self.sequence(depth + 1)?);
            match self.peek() {
                Some(',') => self.pos += 1,
                Some('}') => {
                    self.pos += 1;
                    break;
                }
                _ => return Err(PatternError::UnclosedGroup { offset }),
            }
        }

        if alternatives.len() < 2 {
            return Err(PatternError::DegenerateGroup { offset });
        }
        Ok(Node::Alternation(alternatives))
    }

    fn class(&mut self) -> std::result::Result<Node, PatternError> {
        let offset = self.pos;
        self.pos += 1;

        let negated = matches!(self.peek(), Some('!') | Some('^'));
        if negated {
            self.pos += 1;
        }

        let mut items = Vec::new();
        loop {
            let start = match self.peek() {
                None => return Err(PatternError::UnclosedClass { offset }),
                Some(']') => {
                    self.pos += 1;
                    break;
                }
                Some('\\') => self.escaped()?,
                Some(c) => {
                    self.pos += 1;
                    c
                }
            };

            let is_range = self.peek() == Some('-')
                && self
                    .chars
                    .get(self.pos + 1)
                    .is_some_and(|next| *next != ']');
            if !is_range {
                items.push(ClassItem::Single(start));
                continue;
            }

            self.pos += 1;
            let end = match self.peek() {
                Some('\\') => self.escaped()?,
                Some(c) => {
                    self.pos += 1;
                    c
                }
                None => return Err(PatternError::UnclosedClass { offset }),
            };
            if end < start {
                return Err(PatternError::ReversedRange { start, end });
            }
            items.push(ClassItem::Range(start, end));
        }

        if items.is_empty() {
            return Err(PatternError::EmptyClass { offset });
        }
        Ok(Node::Class(CharClass { negated, items }))
    }
}
