//! Planning-problem input: PDDL-style problem documents and their JSON form.
//!
//! A problem document looks like
//!
//! ```text
//! (define (problem BLOCKS-4-0)
//! (:domain BLOCKS)
//! (:objects D B A C)
//! (:INIT (CLEAR C) (CLEAR A) (CLEAR B) (CLEAR D) (ONTABLE C) (ONTABLE A)
//!  (ONTABLE B) (ONTABLE D) (HANDEMPTY))
//! (:goal (AND (ON D C) (ON C B) (ON B A))))
//! ```
//!
//! and is flattened into a [`ParsedProblem`] whose facts are plain strings
//! such as `"ON D C"`.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};
use crate::state::{Block, Configuration};

/// Objects plus initial and goal facts, one fact per string
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedProblem {
    #[serde(default)]
    pub objects: Vec<Block>,
    pub initial_facts: Vec<String>,
    pub goal_facts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Open,
    Close,
    Atom(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Sexp {
    Atom(String),
    List(Vec<Sexp>),
}

impl Sexp {
    fn head(&self) -> Option<&str> {
        match self {
            Sexp::List(items) => match items.first() {
                Some(Sexp::Atom(name)) => Some(name),
                _ => None,
            },
            Sexp::Atom(_) => None,
        }
    }

    fn has_head(&self, keyword: &str) -> bool {
        self.head().map_or(false, |h| h.eq_ignore_ascii_case(keyword))
    }

    fn tail(&self) -> &[Sexp] {
        match self {
            Sexp::List(items) if !items.is_empty() => &items[1..],
            _ => &[],
        }
    }
}

fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut atom = String::new();

    let flush = |atom: &mut String, tokens: &mut Vec<Token>| {
        if !atom.is_empty() {
            tokens.push(Token::Atom(std::mem::take(atom)));
        }
    };

    for line in text.lines() {
        // `;` starts a comment that runs to the end of the line
        let line = line.split(';').next().unwrap_or("");
        for c in line.chars() {
            match c {
                '(' => {
                    flush(&mut atom, &mut tokens);
                    tokens.push(Token::Open);
                }
                ')' => {
                    flush(&mut atom, &mut tokens);
                    tokens.push(Token::Close);
                }
                c if c.is_whitespace() => flush(&mut atom, &mut tokens),
                c => atom.push(c),
            }
        }
        flush(&mut atom, &mut tokens);
    }

    tokens
}

fn parse_sexp(tokens: &[Token], pos: &mut usize) -> Result<Sexp> {
    match tokens.get(*pos) {
        Some(Token::Atom(name)) => {
            *pos += 1;
            Ok(Sexp::Atom(name.clone()))
        }
        Some(Token::Open) => {
            *pos += 1;
            let mut items = Vec::new();
            loop {
                match tokens.get(*pos) {
                    Some(Token::Close) => {
                        *pos += 1;
                        return Ok(Sexp::List(items));
                    }
                    Some(_) => items.push(parse_sexp(tokens, pos)?),
                    None => {
                        return Err(PlannerError::MalformedInput(
                            "unbalanced parentheses: missing ')'".to_string(),
                        ))
                    }
                }
            }
        }
        Some(Token::Close) => Err(PlannerError::MalformedInput(
            "unbalanced parentheses: unexpected ')'".to_string(),
        )),
        None => Err(PlannerError::MalformedInput("empty problem document".to_string())),
    }
}

/// Render `(ON A B)` as `"ON A B"`
fn fact_text(fact: &Sexp) -> Result<String> {
    let Sexp::List(items) = fact else {
        return Err(PlannerError::MalformedInput(format!(
            "expected a parenthesized fact, found {fact:?}"
        )));
    };
    let mut words = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Sexp::Atom(word) => words.push(word.as_str()),
            Sexp::List(_) => {
                return Err(PlannerError::MalformedInput(
                    "nested expression inside a fact".to_string(),
                ))
            }
        }
    }
    if words.is_empty() {
        return Err(PlannerError::MalformedInput("empty fact".to_string()));
    }
    Ok(words.join(" "))
}

/// Prefix validation messages with the part of the problem they concern
fn in_section(section: &str, error: PlannerError) -> PlannerError {
    match error {
        PlannerError::MalformedInput(msg) => PlannerError::MalformedInput(format!("{section}: {msg}")),
        other => other,
    }
}

impl ParsedProblem {
    /// Parse a PDDL-style problem document.
    ///
    /// `:objects` may be omitted (blocks are then taken from the facts);
    /// `:init` and `:goal` are required. The goal is either a single fact
    /// or an `(and ...)` of facts.
    pub fn from_pddl(text: &str) -> Result<Self> {
        let tokens = tokenize(text);
        let mut pos = 0;
        let document = parse_sexp(&tokens, &mut pos)?;
        if pos != tokens.len() {
            return Err(PlannerError::MalformedInput(
                "trailing content after the problem definition".to_string(),
            ));
        }
        if !document.has_head("define") {
            return Err(PlannerError::MalformedInput(
                "problem document must start with (define ...)".to_string(),
            ));
        }

        let mut objects = Vec::new();
        let mut initial_facts = None;
        let mut goal_facts = None;

        for section in document.tail() {
            if section.has_head(":objects") {
                let mut atoms = section.tail().iter();
                while let Some(item) = atoms.next() {
                    match item {
                        // Typed object lists: `A B - block`
                        Sexp::Atom(dash) if dash == "-" => {
                            atoms.next();
                        }
                        Sexp::Atom(name) => objects.push(name.clone()),
                        Sexp::List(_) => {
                            return Err(PlannerError::MalformedInput(
                                "unexpected list in :objects".to_string(),
                            ))
                        }
                    }
                }
            } else if section.has_head(":init") {
                initial_facts = Some(
                    section
                        .tail()
                        .iter()
                        .map(fact_text)
                        .collect::<Result<Vec<_>>>()?,
                );
            } else if section.has_head(":goal") {
                let [condition] = section.tail() else {
                    return Err(PlannerError::MalformedInput(
                        ":goal must hold exactly one condition".to_string(),
                    ));
                };
                let facts = if condition.has_head("and") {
                    condition
                        .tail()
                        .iter()
                        .map(fact_text)
                        .collect::<Result<Vec<_>>>()?
                } else {
                    vec![fact_text(condition)?]
                };
                goal_facts = Some(facts);
            }
        }

        Ok(Self {
            objects,
            initial_facts: initial_facts.ok_or_else(|| {
                PlannerError::MalformedInput("no :init section found".to_string())
            })?,
            goal_facts: goal_facts.ok_or_else(|| {
                PlannerError::MalformedInput("no :goal section found".to_string())
            })?,
        })
    }

    /// Parse the JSON form (`objects`, `initialFacts`, `goalFacts`).
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read a problem file: JSON for `.json` files, PDDL otherwise.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json(&text)
        } else {
            Self::from_pddl(&text)
        }
    }

    /// The initial configuration, checked against every invariant.
    pub fn initial_configuration(&self) -> Result<Configuration> {
        let config = Configuration::from_facts(&self.initial_facts)?;
        config
            .validate(&self.objects)
            .map_err(|e| in_section("initial state", e))?;
        Ok(config)
    }

    /// The goal configuration; goals may describe only part of the arrangement.
    pub fn goal_configuration(&self) -> Result<Configuration> {
        let config = Configuration::from_facts(&self.goal_facts)?;
        config
            .validate_goal(&self.objects)
            .map_err(|e| in_section("goal state", e))?;
        Ok(config)
    }
}
